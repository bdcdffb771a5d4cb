//! Layered configuration loading from real files

use printlink::cli::{Commands, ConfigCommands, RunContext};
use printlink::config::{ConfigLoader, PrintlinkConfig, TelemetryConfig};
use printlink::error::ConfigError;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

fn write_config_dir(dir: &TempDir, contents: &str) {
    fs::write(dir.path().join("config.toml"), contents).unwrap();
}

#[test]
fn test_config_dir_file_overrides_defaults() {
    let dir = TempDir::new().unwrap();
    write_config_dir(
        &dir,
        r#"
[telemetry]
printing_interval_ms = 500
jitter_threshold = 1.5

[commands]
max_attempts = 20
"#,
    );

    let config = ConfigLoader::load(dir.path()).unwrap();
    assert_eq!(config.telemetry.printing_interval(), Duration::from_millis(500));
    assert_eq!(config.telemetry.jitter_threshold, 1.5);
    assert_eq!(
        config.telemetry.idle_interval_ms,
        TelemetryConfig::default().idle_interval_ms
    );
    assert_eq!(config.commands.max_attempts, 20);
    assert_eq!(config.commands.resume_gcode, "M602");
}

#[test]
fn test_empty_config_dir_gives_defaults() {
    let dir = TempDir::new().unwrap();
    let config = ConfigLoader::load(dir.path()).unwrap();
    assert_eq!(config.telemetry, TelemetryConfig::default());
    assert!(config.validate().is_ok());
}

#[test]
fn test_load_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bridge.toml");
    fs::write(
        &path,
        r#"
[logging]
level = "debug"
format = "text"
"#,
    )
    .unwrap();

    let config = ConfigLoader::load_from_file(&path).unwrap();
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.format, "text");
    assert_eq!(config.telemetry, PrintlinkConfig::default().telemetry);
}

#[test]
fn test_load_from_missing_file_fails() {
    let dir = TempDir::new().unwrap();
    let err = ConfigLoader::load_from_file(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Load(_)));
}

#[test]
fn test_malformed_file_fails_to_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.toml");
    fs::write(&path, "[telemetry\nprinting_interval_ms = ").unwrap();
    assert!(ConfigLoader::load_from_file(&path).is_err());
}

#[test]
fn test_invalid_values_load_but_fail_validation() {
    let dir = TempDir::new().unwrap();
    write_config_dir(
        &dir,
        r#"
[telemetry]
printing_interval_ms = 5000
idle_interval_ms = 1000
"#,
    );

    let config = ConfigLoader::load(dir.path()).unwrap();
    let context = RunContext::new(dir.path().to_path_buf(), config);
    let err = context
        .execute(&Commands::Config(ConfigCommands::Validate))
        .unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn test_path_command_names_config_dir_file() {
    let dir = TempDir::new().unwrap();
    let context = RunContext::new(dir.path().to_path_buf(), PrintlinkConfig::default());
    let output = context
        .execute(&Commands::Config(ConfigCommands::Path))
        .unwrap();
    let expected = dir.path().join("config.toml");
    assert!(output.contains(&expected.display().to_string()));
}

#[test]
fn test_profile_file_ignored_without_profile() {
    let dir = TempDir::new().unwrap();
    write_config_dir(&dir, "[commands]\nmax_attempts = 4\n");
    fs::write(dir.path().join("development.toml"), "[commands]\nmax_attempts = 9\n").unwrap();

    // Only an explicit PRINTLINK_PROFILE selects a profile file.
    if std::env::var("PRINTLINK_PROFILE").is_err() {
        let config = ConfigLoader::load(dir.path()).unwrap();
        assert_eq!(config.commands.max_attempts, 4);
    }
}
