//! Integration tests for configuration files

use encore_foundation::ErrorKind;
use encore_runtime::{ConfigOverrides, RuntimeConfig};

use crate::temp_file;

#[test]
fn file_settings_with_flag_overrides() {
    let path = temp_file(
        "encore.toml",
        "prompt = \"music> \"\nauto_commit = false\nlog_filter = \"encore=debug\"\n",
    );
    let config = RuntimeConfig::load(&path).unwrap();
    assert_eq!(config.prompt, "music> ");
    assert!(!config.auto_commit);
    assert!(config.show_banner);

    let config = config.with_overrides(ConfigOverrides {
        log_filter: Some("encore=trace".to_string()),
        no_banner: true,
        seed_demo: true,
        ..ConfigOverrides::default()
    });
    assert_eq!(config.log_filter, "encore=trace");
    assert_eq!(config.prompt, "music> ");
    assert!(!config.show_banner);
    assert!(config.seed_demo);
}

#[test]
fn malformed_file_is_config_error() {
    let path = temp_file("bad.toml", "auto_commit = \"sometimes\"\n");
    let err = RuntimeConfig::load(&path).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Config(_)));
    assert!(err.to_string().starts_with("configuration error: failed to parse TOML"));
}

#[test]
fn history_path_from_file() {
    let path = temp_file("history.toml", "history_file = \"/tmp/encore_history\"\n");
    let config = RuntimeConfig::load(&path).unwrap();
    assert_eq!(
        config.history_file.as_deref(),
        Some(std::path::Path::new("/tmp/encore_history"))
    );
}
