#![allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]

//! Integration tests for export/import between two vaults.
//!
//! Exercises the full exchange path: export one vault's snapshot to
//! bytes, import them into another, and verify the id-keyed merge rule
//! (existing entries always win).

use tempfile::TempDir;
use upass_core::{FileStorage, ImportOutcome, MemoryStorage, VaultError, VaultStore};

fn memory_store() -> VaultStore<MemoryStorage> {
    VaultStore::load(MemoryStorage::new()).expect("load vault")
}

#[test]
fn export_then_import_into_empty_vault_copies_everything() {
    let mut source = memory_store();
    source.create("GitHub", "x").unwrap();
    source.create("gitlab", "y").unwrap();
    let payload = source.export().unwrap();

    let mut target = memory_store();
    let outcome = target.import(&payload).unwrap();

    assert_eq!(
        outcome,
        ImportOutcome {
            imported: 2,
            skipped: 0
        }
    );
    assert_eq!(target.entries(), source.entries());
}

#[test]
fn importing_own_export_is_a_no_op() {
    let mut store = memory_store();
    store.create("GitHub", "x").unwrap();
    store.create("gitlab", "y").unwrap();

    let before: Vec<String> = store.entries().iter().map(|e| e.id.clone()).collect();
    let payload = store.export().unwrap();
    let outcome = store.import(&payload).unwrap();

    assert_eq!(
        outcome,
        ImportOutcome {
            imported: 0,
            skipped: 2
        }
    );
    let after: Vec<String> = store.entries().iter().map(|e| e.id.clone()).collect();
    assert_eq!(before, after);
}

#[test]
fn merge_never_overwrites_an_existing_entry() {
    let mut store = memory_store();
    store
        .import(br#"[{"id":"1","name":"A","value":"x"}]"#)
        .unwrap();

    let outcome = store
        .import(br#"[{"id":"1","name":"B","value":"y"}]"#)
        .unwrap();

    assert_eq!(
        outcome,
        ImportOutcome {
            imported: 0,
            skipped: 1
        }
    );
    assert_eq!(store.entries()[0].name, "A");
    assert_eq!(store.entries()[0].value, "x");
}

#[test]
fn new_entries_append_after_existing_snapshot_in_input_order() {
    let mut store = memory_store();
    store.create("mine", "1").unwrap();

    store
        .import(
            br#"[
                {"id":"b","name":"theirs-2","value":"y"},
                {"id":"a","name":"theirs-1","value":"x"}
            ]"#,
        )
        .unwrap();

    let names: Vec<&str> = store.entries().iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["mine", "theirs-2", "theirs-1"]);
}

#[test]
fn import_is_rejected_when_payload_is_not_a_list() {
    let mut store = memory_store();
    store.create("GitHub", "x").unwrap();

    for payload in [
        &b"not json at all"[..],
        br#"{"id":"1","name":"A","value":"x"}"#,
        br#"[{"name":"missing id and value"}]"#,
    ] {
        let err = store.import(payload).unwrap_err();
        assert!(matches!(err, VaultError::Format(_)));
    }
    assert_eq!(store.len(), 1, "failed imports must not touch the vault");
}

#[test]
fn imported_merge_is_committed_atomically_to_disk() {
    let dir = TempDir::new().unwrap();

    let mut source = memory_store();
    source.create("GitHub", "x").unwrap();
    let payload = source.export().unwrap();

    let mut target = VaultStore::load(FileStorage::new(dir.path())).unwrap();
    target.create("gitlab", "y").unwrap();
    target.import(&payload).unwrap();

    let reloaded = VaultStore::load(FileStorage::new(dir.path())).unwrap();
    let names: Vec<&str> = reloaded.entries().iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["gitlab", "GitHub"]);
}

#[test]
fn exported_bytes_are_a_plain_json_array() {
    let mut store = memory_store();
    store.create("GitHub", "x").unwrap();

    let payload = store.export().unwrap();
    let parsed: serde_json::Value = serde_json::from_slice(&payload).unwrap();

    let records = parsed.as_array().expect("top level must be a list");
    assert_eq!(records.len(), 1);
    assert!(records[0].get("id").is_some());
    assert_eq!(records[0]["name"], "GitHub");
    assert_eq!(records[0]["value"], "x");
}
