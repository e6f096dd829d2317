//! `ServerConfig::load` against the process environment
//!
//! These tests mutate environment variables and run serially.

use std::io::Write;

use serial_test::serial;

use pollcast::backend::server::ServerConfig;

const KEYS: [&str; 6] = [
    "SERVER_PORT",
    "POLL_DEADLINE_SECS",
    "MAX_LISTENERS",
    "CLEANUP_INTERVAL_SECS",
    "JWT_SECRET",
    "POLLCAST_CONFIG",
];

fn clear_env() {
    for key in KEYS {
        std::env::remove_var(key);
    }
}

#[test]
#[serial]
fn test_load_reads_environment() {
    clear_env();
    std::env::set_var("SERVER_PORT", "4100");
    std::env::set_var("POLL_DEADLINE_SECS", "25");
    std::env::set_var("MAX_LISTENERS", "12");

    let config = ServerConfig::load().unwrap();
    clear_env();

    assert_eq!(config.port, 4100);
    assert_eq!(config.feed_deadline_secs, 25);
    assert_eq!(config.thread_deadline_secs, 25);
    assert_eq!(config.max_listeners, 12);
}

#[test]
#[serial]
fn test_config_file_overrides_environment() {
    clear_env();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "port = 4200\nthread_deadline_secs = 30").unwrap();
    std::env::set_var("SERVER_PORT", "4100");
    std::env::set_var("POLLCAST_CONFIG", file.path());

    let config = ServerConfig::load().unwrap();
    clear_env();

    assert_eq!(config.port, 4200);
    assert_eq!(config.feed_deadline_secs, 60);
    assert_eq!(config.thread_deadline_secs, 30);
}

#[test]
#[serial]
fn test_invalid_environment_value_is_rejected() {
    clear_env();
    std::env::set_var("MAX_LISTENERS", "lots");

    let result = ServerConfig::load();
    clear_env();

    crate::assert_err!(result);
}
