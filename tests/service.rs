use corral::core::error::CatalogError;
use corral::core::indexer::{SearchIndexer, SqliteSearchIndexer};
use corral::core::resource::{Resource, qualifiers, scopes};
use corral::core::service::ComponentService;
use corral::core::store::{CatalogStore, SelectionMode, SnapshotStatus, SqliteCatalogStore};
use serde_json::{Map, Value, json};
use std::cell::RefCell;
use std::path::Path;
use tempfile::tempdir;

fn open_store(root: &Path) -> (SqliteCatalogStore, SqliteSearchIndexer) {
    let db_path = root.join("catalog.db");
    let store = SqliteCatalogStore::new(&db_path);
    store.initialize().unwrap();
    let indexer = SqliteSearchIndexer::new(&db_path);
    (store, indexer)
}

fn params(value: Value) -> Map<String, Value> {
    value.as_object().unwrap().clone()
}

/// Records every id handed to the real indexer.
struct RecordingIndexer<'a> {
    inner: &'a SqliteSearchIndexer,
    calls: RefCell<Vec<i64>>,
}

impl SearchIndexer for RecordingIndexer<'_> {
    fn index(&self, resource_id: i64) -> Result<(), CatalogError> {
        self.calls.borrow_mut().push(resource_id);
        self.inner.index(resource_id)
    }
}

struct FailingIndexer;

impl SearchIndexer for FailingIndexer {
    fn index(&self, resource_id: i64) -> Result<(), CatalogError> {
        Err(CatalogError::NotFound(resource_id))
    }
}

#[test]
fn test_create_lifecycle() {
    let tmp = tempdir().unwrap();
    let (store, indexer) = open_store(tmp.path());
    let recording = RecordingIndexer {
        inner: &indexer,
        calls: RefCell::new(Vec::new()),
    };
    let service = ComponentService::new(&store, &recording);

    let created = service
        .create_component(
            "org.corral:core",
            "Corral Core",
            scopes::PROJECT,
            qualifiers::PROJECT,
        )
        .unwrap();
    let id = created.id.expect("store-assigned id");
    assert_eq!(created.long_name, "Corral Core");
    assert!(created.created_at.ends_with('Z'));

    // Visible through the facade with the same id.
    let found = service.find_by_key("org.corral:core").unwrap().unwrap();
    assert_eq!(found.id, Some(id));
    assert_eq!(found.long_name, "Corral Core");

    // Indexer invoked exactly once, with the new id, before create returned.
    assert_eq!(*recording.calls.borrow(), vec![id]);
    assert_eq!(indexer.search("corral core").unwrap(), vec![id]);
}

#[test]
fn test_create_duplicate_key_rejected_by_precheck() {
    let tmp = tempdir().unwrap();
    let (store, indexer) = open_store(tmp.path());
    let service = ComponentService::new(&store, &indexer);

    service
        .create_component("org.corral:a", "A", scopes::PROJECT, qualifiers::PROJECT)
        .unwrap();
    let err = service
        .create_component("org.corral:a", "A again", scopes::PROJECT, qualifiers::PROJECT)
        .unwrap_err();
    assert!(matches!(err, CatalogError::DuplicateKey(k) if k == "org.corral:a"));
}

#[test]
fn test_store_constraint_normalizes_race_to_duplicate_key() {
    let tmp = tempdir().unwrap();
    let (store, indexer) = open_store(tmp.path());
    let service = ComponentService::new(&store, &indexer);

    service
        .create_component("org.corral:raced", "First", scopes::PROJECT, qualifiers::PROJECT)
        .unwrap();
    // A racing create that passed the pre-check would hit the store with a
    // fresh insert; the UNIQUE constraint must surface the same error kind.
    let racing = Resource::new(
        "org.corral:raced",
        "Second",
        scopes::PROJECT,
        qualifiers::PROJECT,
        "1700000000Z".to_string(),
    );
    let err = store.insert_or_update(&racing).unwrap_err();
    assert!(matches!(err, CatalogError::DuplicateKey(k) if k == "org.corral:raced"));
}

#[test]
fn test_create_malformed_key_writes_nothing() {
    let tmp = tempdir().unwrap();
    let (store, indexer) = open_store(tmp.path());
    let service = ComponentService::new(&store, &indexer);

    let err = service
        .create_component("bad key", "Bad", scopes::PROJECT, qualifiers::PROJECT)
        .unwrap_err();
    assert!(matches!(err, CatalogError::MalformedKey(k) if k == "bad key"));
    assert!(store.find_by_key("bad key").unwrap().is_none());
    assert!(indexer.search("bad").unwrap().is_empty());
}

#[test]
fn test_create_indexing_failure_leaves_resource_persisted() {
    let tmp = tempdir().unwrap();
    let (store, _) = open_store(tmp.path());
    let service = ComponentService::new(&store, &FailingIndexer);

    let err = service
        .create_component("org.corral:dark", "Dark", scopes::PROJECT, qualifiers::PROJECT)
        .unwrap_err();
    assert!(matches!(err, CatalogError::IndexingFailed { .. }));
    // Degraded but persisted: the catalog row exists even though search lags.
    assert!(store.find_by_key("org.corral:dark").unwrap().is_some());
}

#[test]
fn test_update_unknown_id_writes_nothing() {
    let tmp = tempdir().unwrap();
    let (store, indexer) = open_store(tmp.path());
    let service = ComponentService::new(&store, &indexer);

    let err = service.update_component(999, "org.corral:x", "X").unwrap_err();
    assert!(matches!(err, CatalogError::NotFound(999)));
    assert!(store.find_by_key("org.corral:x").unwrap().is_none());
}

#[test]
fn test_update_malformed_key_rejected() {
    let tmp = tempdir().unwrap();
    let (store, indexer) = open_store(tmp.path());
    let service = ComponentService::new(&store, &indexer);

    let created = service
        .create_component("org.corral:keep", "Keep", scopes::PROJECT, qualifiers::PROJECT)
        .unwrap();
    let err = service
        .update_component(created.id.unwrap(), "no spaces allowed", "Keep")
        .unwrap_err();
    assert!(matches!(err, CatalogError::MalformedKey(_)));
    // Untouched.
    assert!(store.find_by_key("org.corral:keep").unwrap().is_some());
}

#[test]
fn test_update_renames_but_preserves_long_name_and_created_at() {
    let tmp = tempdir().unwrap();
    let (store, indexer) = open_store(tmp.path());
    let service = ComponentService::new(&store, &indexer);

    let created = service
        .create_component("org.corral:old", "Old Name", scopes::PROJECT, qualifiers::PROJECT)
        .unwrap();
    let id = created.id.unwrap();

    let updated = service
        .update_component(id, "org.corral:new", "New Name")
        .unwrap();
    assert_eq!(updated.key, "org.corral:new");
    assert_eq!(updated.name, "New Name");
    assert_eq!(updated.long_name, "Old Name");
    assert_eq!(updated.created_at, created.created_at);

    assert!(store.find_by_key("org.corral:old").unwrap().is_none());
    let reread = store.find_by_id(id).unwrap().unwrap();
    assert_eq!(reread, updated);
}

#[test]
fn test_update_does_not_reindex() {
    // Create indexes, update does not. Pinned on purpose: if this test ever
    // needs changing, re-indexing on rename became a deliberate decision.
    let tmp = tempdir().unwrap();
    let (store, indexer) = open_store(tmp.path());
    let service = ComponentService::new(&store, &indexer);

    let created = service
        .create_component("org.corral:r", "Original", scopes::PROJECT, qualifiers::PROJECT)
        .unwrap();
    let id = created.id.unwrap();
    service.update_component(id, "org.corral:r", "Renamed").unwrap();

    assert_eq!(indexer.search("original").unwrap(), vec![id]);
    assert!(indexer.search("renamed").unwrap().is_empty());
}

#[test]
fn test_update_onto_taken_key_is_duplicate_key() {
    let tmp = tempdir().unwrap();
    let (store, indexer) = open_store(tmp.path());
    let service = ComponentService::new(&store, &indexer);

    service
        .create_component("org.corral:one", "One", scopes::PROJECT, qualifiers::PROJECT)
        .unwrap();
    let two = service
        .create_component("org.corral:two", "Two", scopes::PROJECT, qualifiers::PROJECT)
        .unwrap();

    // The service does not re-check uniqueness on update; the store
    // constraint still reports the collision as DuplicateKey.
    let err = service
        .update_component(two.id.unwrap(), "org.corral:one", "Two")
        .unwrap_err();
    assert!(matches!(err, CatalogError::DuplicateKey(k) if k == "org.corral:one"));
}

#[test]
fn test_provisioned_ghost_and_standard_views() {
    let tmp = tempdir().unwrap();
    let (store, indexer) = open_store(tmp.path());
    let service = ComponentService::new(&store, &indexer);

    let fresh = service
        .create_component("org.corral:fresh", "Fresh", scopes::PROJECT, qualifiers::PROJECT)
        .unwrap();
    let analyzing = service
        .create_component("org.corral:run", "Running", scopes::PROJECT, qualifiers::PROJECT)
        .unwrap();
    let done = service
        .create_component("org.corral:done", "Done", scopes::PROJECT, qualifiers::PROJECT)
        .unwrap();

    store
        .record_snapshot(analyzing.id.unwrap(), SnapshotStatus::Unprocessed, false)
        .unwrap();
    store
        .record_snapshot(done.id.unwrap(), SnapshotStatus::Processed, true)
        .unwrap();

    let trk = params(json!({ "qualifiers": ["TRK"] }));

    // Provisioned: created but never analyzed, flat list.
    let provisioned = service.find_provisioned(&trk).unwrap();
    assert_eq!(provisioned, vec![fresh.clone()]);

    // Standard: only the completed, current one.
    let standard = service.find(&trk).unwrap();
    assert_eq!(standard.total_count, 1);
    assert_eq!(standard.items[0].key, "org.corral:done");

    // Including-incomplete: completed plus the one mid-analysis.
    let incomplete = service.find_including_incomplete(&trk).unwrap();
    let keys: Vec<&str> = incomplete.items.iter().map(|r| r.key.as_str()).collect();
    assert_eq!(keys, vec!["org.corral:run", "org.corral:done"]);

    // Ghosts: history but no current valid counterpart.
    let ghosts = service.find_ghosts(&trk).unwrap();
    assert_eq!(ghosts.total_count, 1);
    assert_eq!(ghosts.items[0].key, "org.corral:run");
}

#[test]
fn test_superseded_analysis_makes_a_ghost() {
    let tmp = tempdir().unwrap();
    let (store, indexer) = open_store(tmp.path());
    let service = ComponentService::new(&store, &indexer);

    let resource = service
        .create_component("org.corral:was", "Was Live", scopes::PROJECT, qualifiers::PROJECT)
        .unwrap();
    let id = resource.id.unwrap();
    store.record_snapshot(id, SnapshotStatus::Processed, true).unwrap();
    // A newer, unfinished analysis displaces the current snapshot.
    store.record_snapshot(id, SnapshotStatus::Unprocessed, true).unwrap();

    let trk = params(json!({ "qualifiers": ["TRK"] }));
    assert_eq!(service.find(&trk).unwrap().total_count, 0);
    let ghosts = service.find_ghosts(&trk).unwrap();
    assert_eq!(ghosts.items[0].id, Some(id));
}

#[test]
fn test_provisioned_ignores_paging_and_sorting() {
    let tmp = tempdir().unwrap();
    let (store, indexer) = open_store(tmp.path());
    let service = ComponentService::new(&store, &indexer);

    for i in 0..5 {
        service
            .create_component(
                &format!("org.corral:p{i}"),
                &format!("P{i}"),
                scopes::PROJECT,
                qualifiers::PROJECT,
            )
            .unwrap();
    }
    let provisioned = service
        .find_provisioned(&params(json!({
            "qualifiers": ["TRK"],
            "pageSize": 2,
            "pageIndex": 1,
            "sort": "name",
            "asc": false,
        })))
        .unwrap();
    // Every unanalyzed resource comes back, in store order.
    assert_eq!(provisioned.len(), 5);
    assert_eq!(provisioned[0].key, "org.corral:p0");
    assert_eq!(provisioned[4].key, "org.corral:p4");
}

#[test]
fn test_empty_qualifiers() {
    let tmp = tempdir().unwrap();
    let (store, indexer) = open_store(tmp.path());
    let service = ComponentService::new(&store, &indexer);

    let empty = Map::new();
    for result in [
        service.find(&empty),
        service.find_including_incomplete(&empty),
        service.find_ghosts(&empty),
    ] {
        assert!(matches!(result, Err(CatalogError::EmptyQualifierSet)));
    }
    // The non-paginating mode selects nothing instead of erroring.
    assert!(service.find_provisioned(&empty).unwrap().is_empty());
}

#[test]
fn test_search_matches_any_name_suffix() {
    let tmp = tempdir().unwrap();
    let (store, indexer) = open_store(tmp.path());
    let service = ComponentService::new(&store, &indexer);

    let created = service
        .create_component("org.corral:srv", "Gateway", scopes::PROJECT, qualifiers::PROJECT)
        .unwrap();
    let id = created.id.unwrap();

    for prefix in ["gateway", "ateway", "way", "GATE"] {
        assert_eq!(indexer.search(prefix).unwrap(), vec![id], "{prefix}");
    }
    // Below the minimum token size nothing matches.
    assert!(indexer.search("ga").unwrap().is_empty());
    assert!(indexer.search("zzz").unwrap().is_empty());
}

#[test]
fn test_search_counts_prefix_length_in_chars() {
    let tmp = tempdir().unwrap();
    let (store, indexer) = open_store(tmp.path());
    let service = ComponentService::new(&store, &indexer);

    let created = service
        .create_component("org.corral:unit", "Ångström", scopes::PROJECT, qualifiers::PROJECT)
        .unwrap();
    let id = created.id.unwrap();

    // Two chars (three bytes) is still below the minimum token size.
    assert!(indexer.search("ån").unwrap().is_empty());
    assert_eq!(indexer.search("ång").unwrap(), vec![id]);
    assert_eq!(indexer.search("ström").unwrap(), vec![id]);
}

#[test]
fn test_select_by_qualifiers_filters_on_qualifier() {
    let tmp = tempdir().unwrap();
    let (store, indexer) = open_store(tmp.path());
    let service = ComponentService::new(&store, &indexer);

    service
        .create_component("org.corral:proj", "Proj", scopes::PROJECT, qualifiers::PROJECT)
        .unwrap();
    service
        .create_component("org.corral:proj:file.rs", "file.rs", scopes::FILE, qualifiers::FILE)
        .unwrap();

    let only_trk = store
        .select_by_qualifiers(&["TRK".to_string()], SelectionMode::Provisioned)
        .unwrap();
    assert_eq!(only_trk.len(), 1);
    assert_eq!(only_trk[0].qualifier, "TRK");

    let both = store
        .select_by_qualifiers(&["TRK".to_string(), "FIL".to_string()], SelectionMode::Provisioned)
        .unwrap();
    assert_eq!(both.len(), 2);
}
