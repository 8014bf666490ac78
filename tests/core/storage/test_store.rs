// Integration tests for the index store

use crate::common::acme_index;
use doctree::core::schema::{Index, Language, Library, Page, SearchKey, SCHEMA_VERSION};
use doctree::core::storage::{IndexKey, IndexStore};
use std::fs;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

fn store() -> (TempDir, IndexStore) {
    let temp = TempDir::new().unwrap();
    let store = IndexStore::new(temp.path());
    (temp, store)
}

#[test]
fn test_round_trip_preserves_tree() {
    let (_temp, store) = store();
    let cancel = CancellationToken::new();
    let index = acme_index();

    store.put(&cancel, "acme", &Language::python(), &index).unwrap();
    let loaded = store.get(&cancel, "acme", &Language::python()).unwrap();

    assert_eq!(loaded, index);
    assert_eq!(loaded.schema_version, SCHEMA_VERSION);
}

#[test]
fn test_key_isolation() {
    let (_temp, store) = store();
    let cancel = CancellationToken::new();

    let docs = Index::new(Language::markdown()).with_libraries(vec![Library::new("acme", "acme")
        .with_pages(vec![Page::new("README.md", "README", SearchKey::from(["README"]))])]);

    store.put(&cancel, "acme", &Language::python(), &acme_index()).unwrap();
    store.put(&cancel, "acme", &Language::markdown(), &docs).unwrap();
    store.put(&cancel, "other", &Language::python(), &acme_index()).unwrap();

    assert_eq!(store.get(&cancel, "acme", &Language::markdown()).unwrap(), docs);
    store.delete("other", &Language::python()).unwrap();
    assert_eq!(
        store.get(&cancel, "acme", &Language::python()).unwrap(),
        acme_index()
    );
}

#[test]
fn test_put_replaces_whole_index() {
    let (_temp, store) = store();
    let cancel = CancellationToken::new();

    store.put(&cancel, "acme", &Language::python(), &acme_index()).unwrap();
    let empty = Index::new(Language::python());
    store.put(&cancel, "acme", &Language::python(), &empty).unwrap();

    let loaded = store.get(&cancel, "acme", &Language::python()).unwrap();
    assert!(loaded.libraries.is_empty());
}

#[test]
fn test_not_found_is_distinct() {
    let (_temp, store) = store();
    let cancel = CancellationToken::new();

    let err = store.get(&cancel, "ghost", &Language::python()).unwrap_err();
    assert!(err.is_not_found());
    assert!(store
        .try_get(&cancel, "ghost", &Language::python())
        .unwrap()
        .is_none());

    // An empty index is stored and read back, not confused with absence
    store
        .put(&cancel, "ghost", &Language::python(), &Index::new(Language::python()))
        .unwrap();
    assert!(store
        .try_get(&cancel, "ghost", &Language::python())
        .unwrap()
        .is_some());
}

#[test]
fn test_newer_schema_rejected() {
    let (temp, store) = store();
    let cancel = CancellationToken::new();
    store.put(&cancel, "acme", &Language::python(), &acme_index()).unwrap();

    // Simulate a record written by a future release
    let record = temp.path().join("acme").join("python.json");
    let mut json: serde_json::Value = serde_json::from_slice(&fs::read(&record).unwrap()).unwrap();
    json["schema_version"] = serde_json::json!(SCHEMA_VERSION + 1);
    json["libraries"] = serde_json::json!("shape unknown to this reader");
    fs::write(&record, serde_json::to_vec(&json).unwrap()).unwrap();

    let err = store.get(&cancel, "acme", &Language::python()).unwrap_err();
    assert!(err.is_incompatible_schema());

    let summaries = store.summaries(&cancel).unwrap();
    assert_eq!(summaries.len(), 1);
    assert!(!summaries[0].compatible);
    assert_eq!(summaries[0].schema_version, SCHEMA_VERSION + 1);
}

#[test]
fn test_put_rejects_future_schema() {
    let (_temp, store) = store();
    let mut index = acme_index();
    index.schema_version = SCHEMA_VERSION + 1;

    let err = store
        .put(&CancellationToken::new(), "acme", &Language::python(), &index)
        .unwrap_err();
    assert!(err.is_incompatible_schema());
}

#[test]
fn test_corrupt_record_is_io_error() {
    let (temp, store) = store();
    let dir = temp.path().join("acme");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("python.json"), b"{ not json").unwrap();

    let err = store
        .get(&CancellationToken::new(), "acme", &Language::python())
        .unwrap_err();
    assert_eq!(err.kind(), doctree::ErrorKind::Io);
    assert!(err.to_string().contains("python.json"));
}

#[test]
fn test_list_ignores_strays() {
    let (temp, store) = store();
    let cancel = CancellationToken::new();
    store.put(&cancel, "beta", &Language::python(), &acme_index()).unwrap();
    store.put(&cancel, "alpha", &Language::python(), &acme_index()).unwrap();

    fs::write(temp.path().join("alpha").join(".doctree-abc.tmp"), b"partial").unwrap();
    fs::write(temp.path().join("alpha").join("notes.txt"), b"stray").unwrap();
    fs::write(temp.path().join("README"), b"stray").unwrap();

    assert_eq!(
        store.list().unwrap(),
        vec![
            IndexKey::new("alpha", Language::python()),
            IndexKey::new("beta", Language::python()),
        ]
    );
    assert_eq!(store.list_projects().unwrap(), vec!["alpha", "beta"]);
}

#[test]
fn test_project_names_are_path_safe() {
    let (temp, store) = store();
    let cancel = CancellationToken::new();
    let project = "github.com/acme/tool";

    store.put(&cancel, project, &Language::python(), &acme_index()).unwrap();

    // One directory directly under the root
    let dirs: Vec<_> = fs::read_dir(temp.path()).unwrap().collect();
    assert_eq!(dirs.len(), 1);
    assert_eq!(store.list().unwrap()[0].project, project);
    assert!(store.get(&cancel, project, &Language::python()).is_ok());

    assert!(store.put(&cancel, "..", &Language::python(), &acme_index()).is_err());
    assert!(store.put(&cancel, "", &Language::python(), &acme_index()).is_err());
}

#[test]
fn test_delete_project() {
    let (temp, store) = store();
    let cancel = CancellationToken::new();
    store.put(&cancel, "acme", &Language::python(), &acme_index()).unwrap();
    store
        .put(&cancel, "acme", &Language::markdown(), &Index::new(Language::markdown()))
        .unwrap();

    assert_eq!(store.delete_project("acme").unwrap(), 2);
    assert!(store.list().unwrap().is_empty());
    assert!(!temp.path().join("acme").exists());
    assert_eq!(store.delete_project("acme").unwrap(), 0);
}

#[test]
fn test_cancelled_put_keeps_previous() {
    let (_temp, store) = store();
    store
        .put(&CancellationToken::new(), "acme", &Language::python(), &acme_index())
        .unwrap();

    let cancel = CancellationToken::new();
    cancel.cancel();
    let err = store
        .put(&cancel, "acme", &Language::python(), &Index::new(Language::python()))
        .unwrap_err();
    assert!(err.is_cancelled());

    let loaded = store
        .get(&CancellationToken::new(), "acme", &Language::python())
        .unwrap();
    assert_eq!(loaded, acme_index());
}
