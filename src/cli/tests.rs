//! Tests for argument parsing

use super::*;
use clap::Parser;
use std::path::PathBuf;

#[test]
fn test_sync_is_default_command() {
    let cli = Cli::try_parse_from(["tap-forecast", "--config", "config.json"]).unwrap();
    assert_eq!(cli.resolved_command(), Commands::Sync);
    assert_eq!(cli.config, Some(PathBuf::from("config.json")));
}

#[test]
fn test_global_flags_after_subcommand() {
    let cli = Cli::try_parse_from([
        "tap-forecast",
        "sync",
        "-c",
        "config.json",
        "--state",
        "state.json",
        "--state-output",
        "out.json",
        "--catalog",
        "catalog.json",
        "-v",
    ])
    .unwrap();

    assert_eq!(cli.resolved_command(), Commands::Sync);
    assert_eq!(cli.state, Some(PathBuf::from("state.json")));
    assert_eq!(cli.state_output, Some(PathBuf::from("out.json")));
    assert_eq!(cli.catalog, Some(PathBuf::from("catalog.json")));
    assert!(cli.verbose);
}

#[test]
fn test_properties_alias() {
    let cli =
        Cli::try_parse_from(["tap-forecast", "--properties", "catalog.json"]).unwrap();
    assert_eq!(cli.catalog, Some(PathBuf::from("catalog.json")));
}

#[test]
fn test_discover_and_check() {
    let cli = Cli::try_parse_from(["tap-forecast", "discover"]).unwrap();
    assert_eq!(cli.resolved_command(), Commands::Discover);

    let cli = Cli::try_parse_from(["tap-forecast", "check", "--config-json", "{}"]).unwrap();
    assert_eq!(cli.resolved_command(), Commands::Check);
    assert_eq!(cli.config_json.as_deref(), Some("{}"));
}

#[test]
fn test_unknown_command_rejected() {
    assert!(Cli::try_parse_from(["tap-forecast", "read"]).is_err());
}
