use super::*;
use crate::types::{Mode, RecordStatus};
use tempfile::TempDir;

fn store() -> (HistoryStore, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let store = HistoryStore::new(dir.path().join("history.json"));
    (store, dir)
}

fn record(n: usize) -> DownloadRecord {
    DownloadRecord::success(
        format!("https://example.com/watch?v={n}"),
        format!("Clip {n}"),
        format!("/downloads/Clip {n}.mp4"),
        Mode::VideoMp4,
        (n as u64) * 1024,
    )
}

#[test]
fn test_load_missing_journal_is_empty() {
    let (store, _dir) = store();
    assert!(store.load().is_empty());
}

#[test]
fn test_add_then_load_preserves_order() {
    let (store, _dir) = store();
    store.add(record(1));
    store.add(record(2));
    store.add(record(3));

    let titles: Vec<_> = store.load().into_iter().map(|r| r.title).collect();
    assert_eq!(titles, vec!["Clip 1", "Clip 2", "Clip 3"]);
}

#[test]
fn test_adding_51_records_keeps_newest_50() {
    let (store, _dir) = store();
    let added: Vec<_> = (0..51).map(record).collect();
    for r in &added {
        store.add(r.clone());
    }

    let loaded = store.load();
    assert_eq!(loaded.len(), 50);
    assert_eq!(loaded.first().unwrap().id, added[1].id, "oldest record must be evicted first");
    assert_eq!(loaded.last().unwrap().id, added[50].id);
    assert!(loaded.iter().all(|r| r.id != added[0].id));
}

#[test]
fn test_save_truncates_to_most_recent() {
    let dir = tempfile::tempdir().unwrap();
    let store = HistoryStore::with_capacity(dir.path().join("h.json"), 3);
    let records: Vec<_> = (0..5).map(record).collect();
    store.save(&records);

    let loaded = store.load();
    assert_eq!(loaded.len(), 3);
    assert_eq!(loaded[0].id, records[2].id);
    assert_eq!(loaded[2].id, records[4].id);
}

#[test]
fn test_delete_removes_matching_id() {
    let (store, _dir) = store();
    let keep = record(1);
    let gone = record(2);
    store.add(keep.clone());
    store.add(gone.clone());

    assert!(store.delete(&gone.id));
    let loaded = store.load();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].id, keep.id);
}

#[test]
fn test_delete_unknown_id_is_noop() {
    let (store, _dir) = store();
    store.add(record(1));
    store.add(record(2));

    assert!(!store.delete("does-not-exist"));
    assert_eq!(store.load().len(), 2);
}

#[test]
fn test_delete_on_missing_journal_does_not_create_it() {
    let (store, _dir) = store();
    assert!(!store.delete("anything"));
    assert!(!store.path().exists());
}

#[test]
fn test_malformed_entry_is_skipped() {
    let (store, _dir) = store();
    let good = serde_json::to_value(record(7)).unwrap();
    let journal = serde_json::json!([
        good,
        {"id": "broken", "timestamp": "yesterday", "file_size": "huge"}
    ]);
    std::fs::write(store.path(), serde_json::to_string_pretty(&journal).unwrap()).unwrap();

    let loaded = store.load();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].title, "Clip 7");
}

#[test]
fn test_entry_with_missing_fields_loads_with_defaults() {
    let (store, _dir) = store();
    let journal = serde_json::json!([{
        "id": "legacy-1",
        "timestamp": "2024-05-01T10:20:30.123456",
        "url": "https://example.com/watch?v=1",
        "filename": "a.mp4",
        "filepath": "/d/a.mp4",
        "mode": "Best Video (MP4)",
        "file_size": 5
    }]);
    std::fs::write(store.path(), journal.to_string()).unwrap();

    let loaded = store.load();
    assert_eq!(loaded.len(), 1);
    let record = &loaded[0];
    assert_eq!(record.id, "legacy-1");
    assert_eq!(record.title, "");
    assert_eq!(record.status, RecordStatus::Success);
    assert_eq!(record.file_size_bytes, 5);
    assert_eq!(record.error_message, None);
}

#[test]
fn test_entry_without_id_gets_a_fresh_one() {
    let (store, _dir) = store();
    std::fs::write(store.path(), r#"[{"title": "Old"}, {"title": "Older"}]"#).unwrap();

    let loaded = store.load();
    assert_eq!(loaded.len(), 2);
    assert_ne!(loaded[0].id, loaded[1].id);
    assert!(!loaded[0].id.is_empty());
    assert_eq!(loaded[0].mode, Mode::VideoMp4);
    assert_eq!(loaded[1].title, "Older");
}

#[test]
fn test_non_object_entries_are_skipped() {
    let (store, _dir) = store();
    let good = serde_json::to_value(record(1)).unwrap();
    let journal = serde_json::json!([42, "text", null, good]);
    std::fs::write(store.path(), journal.to_string()).unwrap();

    assert_eq!(store.load().len(), 1);
}

#[test]
fn test_corrupt_journal_is_empty() {
    let (store, _dir) = store();
    std::fs::write(store.path(), "{ not json").unwrap();
    assert!(store.load().is_empty());

    std::fs::write(store.path(), r#"{"id": "an object, not an array"}"#).unwrap();
    assert!(store.load().is_empty());
}

#[test]
fn test_add_after_corruption_recovers() {
    let (store, _dir) = store();
    std::fs::write(store.path(), "garbage").unwrap();
    store.add(record(1));
    assert_eq!(store.load().len(), 1);
}

#[test]
fn test_ids_stay_unique() {
    let (store, _dir) = store();
    let mut first = record(1);
    store.add(first.clone());
    first.title = "Renamed".into();
    store.add(first.clone());

    let loaded = store.load();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].title, "Renamed");
}

#[test]
fn test_duplicate_ids_in_journal_keep_first() {
    let (store, _dir) = store();
    let a = record(1);
    let mut b = record(2);
    b.id = a.id.clone();
    std::fs::write(
        store.path(),
        serde_json::to_string(&vec![a.clone(), b]).unwrap(),
    )
    .unwrap();

    let loaded = store.load();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].title, a.title);
}

#[test]
fn test_journal_is_pretty_printed_json_array() {
    let (store, _dir) = store();
    store.add(record(1));

    let raw = std::fs::read_to_string(store.path()).unwrap();
    assert!(raw.starts_with('['));
    assert!(raw.contains("\n  {"), "journal should be indented");
    let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let entry = &parsed[0];
    for key in [
        "id",
        "timestamp",
        "url",
        "title",
        "filename",
        "filepath",
        "mode",
        "file_size",
        "status",
        "error_message",
    ] {
        assert!(entry.get(key).is_some(), "missing key {key}");
    }
    assert!(!store.path().with_extension("json.tmp").exists());
}

#[test]
fn test_save_creates_parent_directory() {
    let dir = tempfile::tempdir().unwrap();
    let store = HistoryStore::new(dir.path().join("nested").join("deeper").join("h.json"));
    store.add(record(1));
    assert_eq!(store.load().len(), 1);
}

#[test]
fn test_write_failure_is_swallowed_by_save_but_reported_by_try_save() {
    let dir = tempfile::tempdir().unwrap();
    // The journal's parent is a regular file, so no write can succeed
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"x").unwrap();
    let store = HistoryStore::new(blocker.join("history.json"));

    store.save(&[record(1)]);
    store.add(record(2));
    assert!(store.load().is_empty());
    assert!(store.try_save(&[record(3)]).is_err());
}

#[test]
fn test_try_add_reports_write_failure() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "not a directory").unwrap();
    let store = HistoryStore::new(blocker.join("history.json"));

    assert!(store.try_add(record(1)).is_err());
    assert!(store.load().is_empty());
}

#[test]
fn test_try_add_replaces_same_id_and_keeps_capacity() {
    let dir = tempfile::tempdir().unwrap();
    let store = HistoryStore::with_capacity(dir.path().join("history.json"), 2);
    let first = record(1);
    store.try_add(first.clone()).unwrap();
    store.try_add(record(2)).unwrap();

    let mut renamed = first.clone();
    renamed.title = "Renamed".into();
    store.try_add(renamed).unwrap();

    let loaded = store.load();
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded[1].id, first.id);
    assert_eq!(loaded[1].title, "Renamed");
}

#[test]
fn test_find_and_failed_records_round_trip() {
    let (store, _dir) = store();
    let failed = DownloadRecord::failed("https://example.com/x", Mode::AudioMp3, "HTTP 403");
    store.add(failed.clone());

    let found = store.find(&failed.id).unwrap();
    assert_eq!(found.status, RecordStatus::Failed);
    assert_eq!(found.error_message.as_deref(), Some("HTTP 403"));
    assert_eq!(found.mode, Mode::AudioMp3);
    assert!(store.find("missing").is_none());
}
