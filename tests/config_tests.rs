// Config loading and validation tests

use hostpulse::config::AppConfig;

const VALID_CONFIG: &str = r#"
[server]
port = 8080
host = "0.0.0.0"

[storage]
data_dir = "data"

[scan]
cpu_sample_ms = 1000
probe_addr = "8.8.8.8:53"
probe_timeout_ms = 2000
log_tail_lines = 250

[stream]
broadcast_capacity = 256
keepalive_ms = 500
"#;

#[test]
fn test_config_loads_from_str() {
    let config = AppConfig::load_from_str(VALID_CONFIG).expect("load_from_str");
    assert_eq!(config.server.port, 8080);
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.storage.data_dir, "data");
    assert_eq!(config.scan.cpu_sample_ms, 1000);
    assert_eq!(config.scan.probe_addr, "8.8.8.8:53");
    assert_eq!(config.stream.broadcast_capacity, 256);
    assert!(config.forwarder.is_none());
}

#[test]
fn test_config_defaults_for_omitted_sections() {
    let minimal = r#"
[server]
port = 8080
host = "127.0.0.1"

[storage]
data_dir = "data"
"#;
    let config = AppConfig::load_from_str(minimal).expect("minimal config");
    assert_eq!(config.scan.cpu_sample_ms, 1000);
    assert_eq!(config.scan.probe_addr, "8.8.8.8:53");
    assert_eq!(config.scan.probe_timeout_ms, 2000);
    assert_eq!(config.scan.log_tail_lines, 250);
    assert_eq!(config.stream.broadcast_capacity, 256);
    assert_eq!(config.stream.keepalive_ms, 500);
}

#[test]
fn test_config_validation_rejects_invalid_port() {
    let bad = VALID_CONFIG.replace("port = 8080", "port = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("server.port"));
}

#[test]
fn test_config_validation_rejects_empty_data_dir() {
    let bad = VALID_CONFIG.replace("data_dir = \"data\"", "data_dir = \"\"");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("storage.data_dir"));
}

#[test]
fn test_config_validation_rejects_cpu_sample_zero() {
    let bad = VALID_CONFIG.replace("cpu_sample_ms = 1000", "cpu_sample_ms = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("cpu_sample_ms"));
}

#[test]
fn test_config_validation_rejects_empty_probe_addr() {
    let bad = VALID_CONFIG.replace("probe_addr = \"8.8.8.8:53\"", "probe_addr = \"\"");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("probe_addr"));
}

#[test]
fn test_config_validation_rejects_probe_timeout_zero() {
    let bad = VALID_CONFIG.replace("probe_timeout_ms = 2000", "probe_timeout_ms = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("probe_timeout_ms"));
}

#[test]
fn test_config_validation_rejects_log_tail_lines_zero() {
    let bad = VALID_CONFIG.replace("log_tail_lines = 250", "log_tail_lines = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("log_tail_lines"));
}

#[test]
fn test_config_validation_rejects_broadcast_capacity_zero() {
    let bad = VALID_CONFIG.replace("broadcast_capacity = 256", "broadcast_capacity = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("broadcast_capacity"));
}

#[test]
fn test_config_validation_rejects_keepalive_zero() {
    let bad = VALID_CONFIG.replace("keepalive_ms = 500", "keepalive_ms = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("keepalive_ms"));
}

#[test]
fn test_config_validation_rejects_invalid_toml() {
    let err = AppConfig::load_from_str("not valid toml [[[").unwrap_err();
    assert!(!err.to_string().is_empty());
}

#[test]
fn test_config_load_from_file_via_env() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, VALID_CONFIG).unwrap();
    unsafe { std::env::set_var("CONFIG_FILE", path.to_str().unwrap()) };
    let result = AppConfig::load();
    unsafe { std::env::remove_var("CONFIG_FILE") };
    let config = result.expect("load from CONFIG_FILE");
    assert_eq!(config.server.port, 8080);
    assert_eq!(config.storage.data_dir, "data");
}

const VALID_CONFIG_WITH_FORWARDER: &str = r#"
[server]
port = 8080
host = "0.0.0.0"

[storage]
data_dir = "data"

[forwarder]
endpoint = "http://aggregator.local:5000"
api_token = "secret"
timeout_ms = 5000
"#;

#[test]
fn test_config_loads_with_forwarder() {
    let config = AppConfig::load_from_str(VALID_CONFIG_WITH_FORWARDER).expect("valid");
    let forwarder = config.forwarder.expect("forwarder section");
    assert_eq!(forwarder.endpoint, "http://aggregator.local:5000");
    assert_eq!(forwarder.api_token, "secret");
    assert_eq!(forwarder.timeout_ms, 5000);
}

#[test]
fn test_config_forwarder_timeout_defaults_when_omitted() {
    let without_timeout = VALID_CONFIG_WITH_FORWARDER.replace("timeout_ms = 5000", "");
    let config = AppConfig::load_from_str(&without_timeout).expect("valid");
    assert_eq!(config.forwarder.expect("forwarder").timeout_ms, 5000);
}

#[test]
fn test_config_validation_rejects_empty_forwarder_token() {
    let bad = VALID_CONFIG_WITH_FORWARDER.replace("api_token = \"secret\"", "api_token = \"\"");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("forwarder.api_token"));
}

#[test]
fn test_config_validation_rejects_empty_forwarder_endpoint() {
    let bad = VALID_CONFIG_WITH_FORWARDER.replace(
        "endpoint = \"http://aggregator.local:5000\"",
        "endpoint = \"\"",
    );
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("forwarder.endpoint"));
}

#[test]
fn test_scan_options_reflect_config() {
    let config = AppConfig::load_from_str(VALID_CONFIG).expect("valid");
    let options = config.scan_options();
    assert_eq!(options.cpu_sample.as_millis(), 1000);
    assert_eq!(options.probe_addr, "8.8.8.8:53");
    assert_eq!(options.probe_timeout.as_millis(), 2000);
    assert_eq!(options.log_tail_lines, 250);
}
