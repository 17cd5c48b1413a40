//! Install log persistence tests.

use gpu_setup::{Console, Journal, LogEntry, LogLevel, LogStore, PurgeOutcome};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use tempfile::TempDir;

fn store_in(dir: &TempDir) -> LogStore {
    LogStore::new(dir.path().join("gpu-setup"), "install.log")
}

#[test]
fn test_appends_are_kept_in_order() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);

    for i in 0..25 {
        store
            .append(&LogEntry::now(LogLevel::Info, &format!("step {}", i)))
            .unwrap();
    }

    let entries = store.entries().unwrap();
    assert_eq!(entries.len(), 25);
    for (i, entry) in entries.iter().enumerate() {
        assert_eq!(entry.message, format!("step {}", i));
        assert_eq!(entry.level, LogLevel::Info);
    }
}

#[test]
fn test_append_creates_store_with_modes() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    assert!(!store.exists());

    store.append(&LogEntry::now(LogLevel::Warning, "first")).unwrap();

    let dir_mode = fs::metadata(store.dir()).unwrap().permissions().mode() & 0o777;
    let file_mode = fs::metadata(store.path()).unwrap().permissions().mode() & 0o777;
    assert_eq!(dir_mode, 0o755);
    assert_eq!(file_mode, 0o644);
}

#[test]
fn test_purge_then_append_starts_fresh() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    for _ in 0..3 {
        store.append(&LogEntry::now(LogLevel::Info, "old")).unwrap();
    }

    assert_eq!(store.purge().unwrap(), PurgeOutcome::Removed);
    assert_eq!(store.purge().unwrap(), PurgeOutcome::NotFound);
    assert!(store.read_all().unwrap().is_none());

    store.append(&LogEntry::now(LogLevel::Error, "new")).unwrap();
    let entries = store.entries().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].message, "new");
    assert_eq!(entries[0].level, LogLevel::Error);
}

#[test]
fn test_tail_shorter_and_longer_than_log() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    assert!(store.read_tail(10).unwrap().is_none());

    for i in 0..4 {
        store
            .append(&LogEntry::now(LogLevel::Info, &format!("line {}", i)))
            .unwrap();
    }

    let all = store.read_tail(50).unwrap().unwrap();
    assert_eq!(all.len(), 4);

    let last_two = store.read_tail(2).unwrap().unwrap();
    assert_eq!(last_two.len(), 2);
    assert!(last_two[0].ends_with("line 2"));
    assert!(last_two[1].ends_with("line 3"));
}

#[test]
fn test_journal_writes_levels_and_counts_warnings() {
    let dir = TempDir::new().unwrap();
    let journal = Journal::new(Console::plain(), store_in(&dir));

    journal.info("starting");
    journal.warn("optional package missing");
    journal.error("fatal step failed");
    journal.success("done");

    assert_eq!(journal.warnings(), 1);
    let levels: Vec<LogLevel> = journal
        .store()
        .entries()
        .unwrap()
        .into_iter()
        .map(|e| e.level)
        .collect();
    assert_eq!(
        levels,
        vec![LogLevel::Info, LogLevel::Warning, LogLevel::Error, LogLevel::Info]
    );
}

#[test]
fn test_unwritable_store_does_not_stop_the_journal() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("not-a-dir");
    fs::write(&blocker, "file in the way").unwrap();
    let journal = Journal::new(Console::plain(), LogStore::new(&blocker, "install.log"));

    journal.info("still printed");
    journal.warn("still counted");

    assert_eq!(journal.warnings(), 1);
    assert!(!journal.record(LogLevel::Info, "dropped"));
}

#[test]
fn test_multiline_messages_stay_on_one_line() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);

    store
        .append(&LogEntry::now(LogLevel::Error, "apt failed:\nE: broken packages"))
        .unwrap();

    let content = store.read_all().unwrap().unwrap();
    assert_eq!(content.lines().count(), 1);
    assert_eq!(store.entries().unwrap().len(), 1);
}
