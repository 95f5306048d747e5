//! Integration tests for layered configuration loading

use super::with_isolated_home;
use ctxlocal::config::{global_config_path, ConfigLoader, LocalConfig, PROJECT_CONFIG_FILE};
use ctxlocal::context::{self, ThreadSpawnPolicy};
use ctxlocal::{LocalError, Namespace};
use tempfile::TempDir;

fn write_global(contents: &str) {
    let path = global_config_path().unwrap();
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, contents).unwrap();
}

#[test]
fn test_defaults_when_no_sources_exist() {
    let temp_dir = TempDir::new().unwrap();
    let (config, defaults) = with_isolated_home(&temp_dir, || {
        (
            ConfigLoader::load(temp_dir.path()).unwrap(),
            ConfigLoader::load_defaults().unwrap(),
        )
    });
    assert_eq!(config, defaults);
    assert!(config.logging.file.starts_with(temp_dir.path()));
    assert_eq!(config.context.thread_spawn, ThreadSpawnPolicy::Empty);
    assert_eq!(config.logging.format, "text");
    assert!(config.logging.color);
}

#[test]
fn test_global_config_lives_under_home() {
    let temp_dir = TempDir::new().unwrap();
    let path = with_isolated_home(&temp_dir, || global_config_path().unwrap());
    assert!(path.starts_with(temp_dir.path()));
    assert!(path.ends_with("config.toml"));
}

#[test]
fn test_layer_precedence() {
    let temp_dir = TempDir::new().unwrap();
    let project = temp_dir.path().join("project");
    std::fs::create_dir_all(&project).unwrap();

    let config = with_isolated_home(&temp_dir, || {
        write_global(
            r#"
[context]
thread_spawn = "inherit"

[logging]
level = "warn"
format = "json"
"#,
        );
        std::fs::write(
            project.join(PROJECT_CONFIG_FILE),
            "[logging]\nlevel = \"debug\"\n",
        )
        .unwrap();
        std::env::set_var("CTXLOCAL__LOGGING__FORMAT", "text");
        ConfigLoader::load(&project).unwrap()
    });

    // global
    assert_eq!(config.context.thread_spawn, ThreadSpawnPolicy::Inherit);
    // project over global
    assert_eq!(config.logging.level, "debug");
    // environment over both
    assert_eq!(config.logging.format, "text");
}

#[test]
fn test_invalid_file_is_a_config_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join(PROJECT_CONFIG_FILE);
    std::fs::write(&path, "[context]\nthread_spawn = \"sometimes\"\n").unwrap();

    let result = ConfigLoader::load_from_file(&path);
    assert!(matches!(result, Err(LocalError::ConfigError(_))));
}

#[test]
fn test_install_applies_thread_spawn_policy() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("inherit.toml");
    std::fs::write(
        &path,
        "[context]\nthread_spawn = \"inherit\"\n\n[logging]\nlevel = \"warn\"\n",
    )
    .unwrap();
    let config = ConfigLoader::load_from_file(&path).unwrap();

    let inherited = with_isolated_home(&temp_dir, || {
        config.install().unwrap();
        assert_eq!(context::thread_spawn_policy(), ThreadSpawnPolicy::Inherit);

        let ns = Namespace::new();
        ns.set("user", "alice".to_string());
        let seen = {
            let ns = ns.clone();
            context::spawn_thread(move || ns.get_value("user").ok())
                .join()
                .unwrap()
        };

        LocalConfig::default().install().unwrap();
        seen
    });

    assert_eq!(inherited.as_deref(), Some("alice"));
}

#[test]
fn test_install_rejects_invalid_config() {
    let mut config = LocalConfig::default();
    config.logging.level = "loud".to_string();
    assert!(config.validate().is_err());
    assert!(matches!(config.install(), Err(LocalError::ConfigError(_))));
}
