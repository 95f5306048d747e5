//! Configuration sources, lowest precedence first: global file, project
//! file, environment.

pub mod environment;
pub mod global_file;
pub mod project_file;
