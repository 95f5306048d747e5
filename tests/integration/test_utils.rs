//! Shared test utilities for integration tests
//!
//! Environment variables and the thread spawn policy are process-wide, so
//! tests that touch either are serialized through one mutex.

use std::sync::{Mutex, MutexGuard};
use tempfile::TempDir;

static PROCESS_STATE_MUTEX: Mutex<()> = Mutex::new(());

/// Hold while changing process-wide state (env vars, spawn policy).
pub fn lock_process_state() -> MutexGuard<'static, ()> {
    PROCESS_STATE_MUTEX
        .lock()
        .unwrap_or_else(|e| e.into_inner())
}

/// Environment variable state to restore after test
struct EnvState {
    vars: Vec<(&'static str, Option<String>)>,
}

impl EnvState {
    fn capture(names: &[&'static str]) -> Self {
        Self {
            vars: names
                .iter()
                .map(|name| (*name, std::env::var(name).ok()))
                .collect(),
        }
    }

    fn restore(self) {
        for (name, value) in self.vars {
            match value {
                Some(orig) => std::env::set_var(name, orig),
                None => std::env::remove_var(name),
            }
        }
    }
}

const ISOLATED_VARS: &[&str] = &[
    "HOME",
    "XDG_CONFIG_HOME",
    "XDG_DATA_HOME",
    "CTXLOCAL__CONTEXT__THREAD_SPAWN",
    "CTXLOCAL__LOGGING__LEVEL",
    "CTXLOCAL__LOGGING__FORMAT",
];

/// Run `f` with HOME pointed into `test_dir` and no CTXLOCAL__* overrides.
pub fn with_isolated_home<F, R>(test_dir: &TempDir, f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = lock_process_state();
    let state = EnvState::capture(ISOLATED_VARS);

    let home = test_dir.path().join("home");
    std::fs::create_dir_all(&home).unwrap();
    for name in ISOLATED_VARS {
        std::env::remove_var(name);
    }
    std::env::set_var("HOME", &home);

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(f));
    state.restore();
    match result {
        Ok(value) => value,
        Err(panic) => std::panic::resume_unwind(panic),
    }
}
