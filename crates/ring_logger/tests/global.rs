use std::fs;

use ring_logger::{DispatcherState, Level, LoggerConfig, ShutdownSignal};
use tempfile::tempdir;

// The process-wide logger can only be initialized once per test binary, so
// the whole lifecycle runs in a single test.
#[test]
fn process_logger_lifecycle() {
    assert!(!ring_logger::is_initialized());
    assert!(ring_logger::completion().is_none());
    // Echoed to stdout, not queued.
    ring_logger::info!("boot", "logger not ready yet");

    let dir = tempdir().unwrap();
    let signal = ShutdownSignal::new();
    let config = LoggerConfig::default()
        .with_base_dir(dir.path())
        .with_level(" info ");
    assert!(ring_logger::init(config, &signal));
    assert_eq!(ring_logger::threshold(), Some(Level::Info));

    // A second init is a no-op, even with a config that would fail.
    let other = tempdir().unwrap();
    let bad = LoggerConfig::default()
        .with_base_dir(other.path())
        .with_level("nonsense");
    assert!(ring_logger::init(bad, &ShutdownSignal::new()));
    assert_eq!(ring_logger::threshold(), Some(Level::Info));
    assert!(!other.path().join("logs").exists());

    ring_logger::log!("svc", "INFO", "user %s logged in", "bob");
    ring_logger::debug!("svc", "filtered out");
    ring_logger::warning!("svc", "%d retries left", 2);
    ring_logger::error!("svc", "disk %s", "full",);

    signal.trigger();
    ring_logger::completion().unwrap().wait();
    assert_eq!(ring_logger::dispatcher_state(), Some(DispatcherState::Stopped));

    // Late records are dropped without blocking or panicking.
    ring_logger::info!("svc", "after shutdown");

    let content = fs::read_to_string(dir.path().join("logs").join("server.log.1")).unwrap();
    assert!(content.contains("]@[global.process_logger_lifecycle]:\nuser bob logged in\n"));
    assert!(content.contains("\n2 retries left\n"));
    assert!(content.contains("\ndisk full\n"));
    assert!(!content.contains("filtered out"));
    assert!(!content.contains("after shutdown"));
    assert!(content.contains("[WARNING]:: received logger termination"));
}
