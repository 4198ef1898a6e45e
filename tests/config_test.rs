use clap::Parser;
use k6_workbench::config::*;
use std::path::PathBuf;

#[test]
fn test_default_port() {
    assert_eq!(DEFAULT_PORT, 9880);
    assert_eq!(DEFAULT_BIND_ADDR, "0.0.0.0");
}

#[test]
fn test_default_server_config() {
    let config = ServerConfig::default();
    assert_eq!(config.port, DEFAULT_PORT);
    assert_eq!(config.max_body_bytes, DEFAULT_MAX_BODY_BYTES);
    assert_eq!(config.socket_addr().unwrap().port(), 9880);
}

#[test]
fn test_serve_args_defaults() {
    let args = CliArgs::try_parse_from(["k6-workbench", "serve"]).unwrap();
    let Command::Serve(serve) = args.command else {
        panic!("expected serve");
    };
    let config = ServerConfig::from_args(serve);
    assert_eq!(config.bind, DEFAULT_BIND_ADDR);
    assert_eq!(config.port, DEFAULT_PORT);
}

#[test]
fn test_serve_args_override() {
    let args = CliArgs::try_parse_from([
        "k6-workbench",
        "serve",
        "--bind",
        "127.0.0.1",
        "-p",
        "9000",
        "--max-body-bytes",
        "1024",
    ])
    .unwrap();
    let Command::Serve(serve) = args.command else {
        panic!("expected serve");
    };
    let config = ServerConfig::from_args(serve);
    assert_eq!(config.socket_addr().unwrap().to_string(), "127.0.0.1:9000");
    assert_eq!(config.max_body_bytes, 1024);
}

#[test]
fn test_invalid_bind_address() {
    let config = ServerConfig {
        bind: "not an address".to_string(),
        ..ServerConfig::default()
    };
    assert!(config.socket_addr().is_err());
}

#[test]
fn test_file_subcommands() {
    let args = CliArgs::try_parse_from(["k6-workbench", "compile", "smoke.json"]).unwrap();
    assert!(matches!(args.command, Command::Compile { config } if config == PathBuf::from("smoke.json")));

    let args = CliArgs::try_parse_from(["k6-workbench", "timeseries", "points.ndjson"]).unwrap();
    assert!(matches!(args.command, Command::Timeseries { .. }));

    assert!(CliArgs::try_parse_from(["k6-workbench", "parse"]).is_err());
}

#[test]
fn test_log_filter_targets_crate() {
    assert!(DEFAULT_LOG_FILTER.contains("k6_workbench="));
}
