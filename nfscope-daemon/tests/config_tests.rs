//! Integration tests for daemon configuration loading.

use std::io::Write;

use clap::Parser;
use serial_test::serial;

use nfscope_core::config::NfscopeConfig;
use nfscope_daemon::cli::DaemonCli;

#[tokio::test]
#[serial]
async fn missing_config_file_falls_back_to_defaults() {
    // Given: a path that does not exist
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");

    // When
    let config = NfscopeConfig::load_or_default(&path).await.unwrap();

    // Then
    assert_eq!(config.server.port, 3000);
    assert_eq!(config.message_flow.sources.len(), 7);
}

#[tokio::test]
#[serial]
async fn cli_flags_win_over_file_values() {
    // Given: a config file with port 4000 and pretty logs
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "[general]\nlog_format = \"pretty\"\n\n[server]\nport = 4000\n"
    )
    .unwrap();
    let cli = DaemonCli::parse_from([
        "nfscope-daemon",
        "--config",
        file.path().to_str().unwrap(),
        "--port",
        "5000",
    ]);

    // When
    let mut config = NfscopeConfig::load_or_default(&cli.config).await.unwrap();
    cli.apply_overrides(&mut config);

    // Then
    assert_eq!(config.server.port, 5000);
    assert_eq!(config.general.log_format, "pretty");
    assert!(config.validate().is_ok());
}

#[test]
fn invalid_cli_override_fails_validation() {
    let cli = DaemonCli::parse_from(["nfscope-daemon", "--log-level", "chatty"]);
    let mut config = NfscopeConfig::default();

    cli.apply_overrides(&mut config);

    assert!(config.validate().is_err());
}

#[tokio::test]
#[serial]
async fn broken_toml_is_an_error_not_a_fallback() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[server\nport = ").unwrap();

    let result = NfscopeConfig::load_or_default(file.path()).await;

    assert!(result.is_err());
}
