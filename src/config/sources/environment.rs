//! Environment source: `CTXLOCAL__SECTION__KEY=value`, e.g.
//! `CTXLOCAL__CONTEXT__THREAD_SPAWN=inherit`.

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::Environment;

pub const ENV_PREFIX: &str = "CTXLOCAL";

pub fn add_to_builder(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__"),
    )
}
