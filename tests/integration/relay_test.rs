//! Relay Integration Tests
//!
//! Drives the relay through an in-memory watch source so every event the
//! loop sees is under test control.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use filetime::FileTime;
use tempfile::TempDir;

use bucket_relay::services::relay::{ChangeType, WatchChannels, WatchEvent, WatchSink, WatchSource};
use bucket_relay::services::NoopNotifier;
use bucket_relay::{Entry, Relay, RelayConfig, RelayError, RelayResult, SyncOutcome};

// ============================================================================
// Helper Functions
// ============================================================================

#[derive(Default)]
struct FakeWatchSource {
    watched: HashSet<PathBuf>,
}

impl WatchSource for FakeWatchSource {
    fn watch(&mut self, path: &Path) -> RelayResult<()> {
        self.watched.insert(path.to_path_buf());
        Ok(())
    }

    fn unwatch(&mut self, path: &Path) -> RelayResult<()> {
        self.watched.remove(path);
        Ok(())
    }

    fn is_watching(&self, path: &Path) -> bool {
        self.watched.contains(path)
    }
}

struct Fixture {
    _temp: TempDir,
    a: PathBuf,
    b: PathBuf,
    relay: Relay<FakeWatchSource>,
    sink: WatchSink,
}

/// `a.txt` containing "X" relayed to `b.txt`, registered through the JSON config path
fn setup() -> Fixture {
    let temp = TempDir::new().unwrap();
    let a = temp.path().join("a.txt");
    let b = temp.path().join("b.txt");
    fs::write(&a, "X").unwrap();

    let raw = serde_json::json!([{ "source": a, "destination": b }]).to_string();
    let config = RelayConfig::from_json(&raw).unwrap();

    let (sink, channels) = WatchChannels::pair();
    let mut relay = Relay::new(FakeWatchSource::default(), channels, Arc::new(NoopNotifier));
    relay.register(&config.entries).unwrap();

    Fixture {
        _temp: temp,
        a,
        b,
        relay,
        sink,
    }
}

fn mtime(path: &Path) -> FileTime {
    FileTime::from_last_modification_time(&fs::metadata(path).unwrap())
}

/// Drain everything already queued, then stop on channel close
async fn drain(fixture: &mut Fixture) -> RelayError {
    let (sink, _) = WatchChannels::pair();
    drop(std::mem::replace(&mut fixture.sink, sink));
    fixture.relay.run().await.unwrap_err()
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_sources_watched_after_init() {
    let fixture = setup();
    assert!(fixture.relay.watcher().is_watching(&fixture.a));
    assert!(fixture.relay.registry().contains(&fixture.a));
}

#[tokio::test]
async fn test_write_event_mirrors_source() {
    let mut fixture = setup();

    fs::write(&fixture.a, "Y").unwrap();
    fixture
        .sink
        .send_event(WatchEvent::new(&fixture.a, ChangeType::Written));

    let err = drain(&mut fixture).await;
    assert!(err.to_string().contains("watch source closed"));

    assert_eq!(fs::read_to_string(&fixture.b).unwrap(), "Y");
    assert_eq!(mtime(&fixture.b), mtime(&fixture.a));
}

#[tokio::test]
async fn test_newer_destination_synced_back() {
    let mut fixture = setup();

    fs::write(&fixture.a, "Y").unwrap();
    fixture
        .sink
        .send_event(WatchEvent::new(&fixture.a, ChangeType::Written));
    drain(&mut fixture).await;

    // External edit stamped well past the recorded baseline
    fs::write(&fixture.b, "Z").unwrap();
    let baseline = fixture
        .relay
        .registry()
        .get(&fixture.a)
        .unwrap()
        .last_source_mtime;
    let later = FileTime::from_system_time(baseline + Duration::from_secs(30));
    filetime::set_file_mtime(&fixture.b, later).unwrap();

    assert_eq!(fixture.relay.sync(&fixture.a).unwrap(), SyncOutcome::Backward);
    assert_eq!(fs::read_to_string(&fixture.a).unwrap(), "Z");
    assert_eq!(mtime(&fixture.a), later);
    assert!(fixture.relay.watcher().is_watching(&fixture.a));

    let state = fixture.relay.registry().get(&fixture.a).unwrap();
    assert!(state.last_source_mtime > baseline);
}

#[tokio::test]
async fn test_watch_error_stops_loop() {
    let mut fixture = setup();

    fixture
        .sink
        .send_error(RelayError::watch("inotify queue overflow"));
    fs::write(&fixture.a, "Y").unwrap();
    fixture
        .sink
        .send_event(WatchEvent::new(&fixture.a, ChangeType::Written));

    let err = fixture.relay.run().await.unwrap_err();
    assert!(matches!(err, RelayError::Watch(ref m) if m == "inotify queue overflow"));
    assert!(!fixture.b.exists());
}

#[test]
fn test_sync_unregistered_path() {
    let mut fixture = setup();
    let before = fixture.relay.registry().get(&fixture.a).cloned();

    let stray = fixture.a.with_file_name("stray.txt");
    let err = fixture.relay.sync(&stray).unwrap_err();

    assert!(matches!(err, RelayError::Lookup(ref p) if p == &stray));
    assert_eq!(fixture.relay.registry().len(), 1);
    assert_eq!(fixture.relay.registry().get(&fixture.a).cloned(), before);
}

#[test]
fn test_second_sync_stays_forward() {
    let mut fixture = setup();

    assert_eq!(fixture.relay.sync(&fixture.a).unwrap(), SyncOutcome::Forward);
    let first = fs::read(&fixture.b).unwrap();
    assert_eq!(fixture.relay.sync(&fixture.a).unwrap(), SyncOutcome::Forward);

    assert_eq!(fs::read(&fixture.b).unwrap(), first);
    assert_eq!(mtime(&fixture.b), mtime(&fixture.a));
}

#[test]
fn test_registration_missing_source() {
    let temp = TempDir::new().unwrap();
    let (_sink, channels) = WatchChannels::pair();
    let mut relay = Relay::new(FakeWatchSource::default(), channels, Arc::new(NoopNotifier));

    let err = relay
        .register(&[Entry::new(
            temp.path().join("missing.txt"),
            temp.path().join("b.txt"),
        )])
        .unwrap_err();
    assert!(matches!(err, RelayError::Init { .. }));
    assert!(relay.registry().is_empty());
}

#[test]
fn test_destination_spelled_as_source_keeps_source_intact() {
    let temp = TempDir::new().unwrap();
    let a = temp.path().join("a.txt");
    fs::write(&a, "precious").unwrap();
    fs::create_dir(temp.path().join("sub")).unwrap();
    let alias = temp.path().join("sub").join("..").join("a.txt");

    let raw = serde_json::json!([{ "src": a, "dst": alias }]).to_string();
    let config = RelayConfig::from_json(&raw).unwrap();

    let (_sink, channels) = WatchChannels::pair();
    let mut relay = Relay::new(FakeWatchSource::default(), channels, Arc::new(NoopNotifier));
    let err = relay.register(&config.entries).unwrap_err();

    assert!(matches!(err, RelayError::Init { .. }));
    assert!(matches!(relay.sync(&a), Err(RelayError::Lookup(_))));
    assert_eq!(fs::read_to_string(&a).unwrap(), "precious");
}

#[test]
fn test_destination_older_than_baseline_is_overwritten() {
    let mut fixture = setup();
    fs::write(&fixture.b, "stale").unwrap();
    let old = SystemTime::now() - Duration::from_secs(3600);
    filetime::set_file_mtime(&fixture.b, FileTime::from_system_time(old)).unwrap();

    assert_eq!(fixture.relay.sync(&fixture.a).unwrap(), SyncOutcome::Forward);
    assert_eq!(fs::read_to_string(&fixture.b).unwrap(), "X");
}
