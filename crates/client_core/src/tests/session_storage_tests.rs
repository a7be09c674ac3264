use std::{sync::Arc, thread};

use super::*;

#[test]
fn memory_storage_round_trips_items() {
    let storage = MemorySessionStorage::new();
    assert_eq!(storage.get_item("user"), None);
    storage.set_item("user", r#"{"type":"Employee","email":"a@a"}"#).expect("set");
    assert_eq!(
        storage.get_item("user").as_deref(),
        Some(r#"{"type":"Employee","email":"a@a"}"#)
    );
    storage.remove_item("user").expect("remove");
    assert_eq!(storage.get_item("user"), None);
}

#[test]
fn file_storage_persists_across_instances() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("nested").join("session.json");

    FileSessionStorage::new(&path)
        .set_item("user", "descriptor")
        .expect("set");
    assert!(path.exists());

    let reopened = FileSessionStorage::new(&path);
    assert_eq!(reopened.get_item("user").as_deref(), Some("descriptor"));

    reopened.remove_item("user").expect("remove");
    assert_eq!(FileSessionStorage::new(&path).get_item("user"), None);
}

#[test]
fn missing_file_reads_as_empty() {
    let dir = tempfile::tempdir().expect("tempdir");
    let storage = FileSessionStorage::new(dir.path().join("absent.json"));
    assert_eq!(storage.get_item("user"), None);
    storage.remove_item("user").expect("remove on empty storage");
}

#[test]
fn corrupted_file_reads_as_missing_item() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("session.json");
    fs::write(&path, "not json").expect("write");

    let storage = FileSessionStorage::new(&path);
    assert_eq!(storage.get_item("user"), None);
    assert!(storage.remove_item("user").is_err());

    storage.set_item("user", "fresh").expect("set overwrites corrupted file");
    assert_eq!(storage.get_item("user").as_deref(), Some("fresh"));
}

#[test]
fn corrupted_file_is_replaced_by_a_fresh_map() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("session.json");
    fs::write(&path, "{\"user\": ").expect("write");

    let storage = FileSessionStorage::new(&path);
    storage.set_item("lang", "fr").expect("set");

    let raw = fs::read_to_string(&path).expect("read back");
    let items: BTreeMap<String, String> = serde_json::from_str(&raw).expect("valid json");
    assert_eq!(items.len(), 1);
    assert_eq!(items.get("lang").map(String::as_str), Some("fr"));
}

#[test]
fn poisoned_memory_storage_reads_empty_and_rejects_writes() {
    let storage = Arc::new(MemorySessionStorage::new());
    storage.set_item("user", "descriptor").expect("set");

    let poisoner = storage.clone();
    let _ = thread::spawn(move || {
        let _guard = poisoner.items.lock().expect("lock");
        panic!("poison the lock");
    })
    .join();

    assert_eq!(storage.get_item("user"), None);
    assert!(matches!(
        storage.set_item("user", "other"),
        Err(SessionStorageError::Poisoned)
    ));
    assert!(matches!(
        storage.remove_item("user"),
        Err(SessionStorageError::Poisoned)
    ));
}
