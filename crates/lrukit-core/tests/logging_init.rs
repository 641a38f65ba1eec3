//! Global subscriber installation.
//!
//! Lives in its own test binary so the process starts with no subscriber.
//! Everything runs in one test because the subscriber can only be set once.

use lrukit_core::config::LogFormat;
use lrukit_core::logging::{LogConfig, LogError, init_logging};

#[test]
fn json_file_logging_then_second_init_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("logs").join("lrukit.log");
    let config = LogConfig {
        level: "info".to_string(),
        format: LogFormat::Json,
        file: Some(path.clone()),
    };

    init_logging(&config).expect("first init installs the subscriber");
    assert!(path.exists(), "log file and its directory are created");

    tracing::error!(target: "lrukit_test", marker = "file-sink", "written to the log file");

    let content = std::fs::read_to_string(&path).unwrap();
    let line = content
        .lines()
        .find(|line| line.contains("file-sink"))
        .unwrap_or_else(|| panic!("event missing from log file:\n{content}"));
    let event: serde_json::Value = serde_json::from_str(line).expect("log line is JSON");
    assert_eq!(event["level"], "ERROR");
    assert_eq!(event["target"], "lrukit_test");
    assert_eq!(event["message"], "written to the log file");
    assert_eq!(event["marker"], "file-sink");

    let err = init_logging(&LogConfig::default()).unwrap_err();
    assert!(matches!(err, LogError::AlreadyInitialized));
}
