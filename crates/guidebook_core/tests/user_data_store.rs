use guidebook_core::db::{open_db, open_db_in_memory};
use guidebook_core::repo::namespace::{Namespace, NamespaceStore};
use guidebook_core::store::{KeyValueStore, StoreError, StoreResult, StoredValue};
use guidebook_core::{
    Favorite, ItemKey, ItemType, ManualClock, MemoryKvStore, RepoError, SqliteKvStore,
    UserDataRepository,
};
use std::cell::Cell;

fn repo(store: &MemoryKvStore) -> UserDataRepository<&MemoryKvStore, ManualClock> {
    UserDataRepository::new(store, ManualClock::new(1_700_000_000_000))
}

#[test]
fn add_favorite_is_idempotent() {
    let store = MemoryKvStore::new();
    let repo = repo(&store);
    let key = ItemKey::sight("kiyomizu");

    assert!(repo.add_favorite(&key).unwrap());
    let first = repo.get_favorites().unwrap();
    assert!(!repo.add_favorite(&key).unwrap());
    let second = repo.get_favorites().unwrap();

    assert_eq!(first, second);
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].item_type, ItemType::Sight);
}

#[test]
fn toggle_twice_restores_membership() {
    let store = MemoryKvStore::new();
    let repo = repo(&store);
    let sight = ItemKey::sight("1");
    let souvenir = ItemKey::souvenir("1");
    repo.add_favorite(&souvenir).unwrap();

    assert!(repo.toggle_favorite(&sight).unwrap());
    assert!(!repo.toggle_favorite(&sight).unwrap());
    assert!(!repo.is_favorite(&sight).unwrap());
    assert!(repo.is_favorite(&souvenir).unwrap());

    assert!(repo.toggle_visit(&sight).unwrap());
    assert!(!repo.toggle_visit(&sight).unwrap());
    assert!(repo.get_visits().unwrap().is_empty());
}

#[test]
fn add_visit_replaces_existing_record_in_place() {
    let store = MemoryKvStore::new();
    let repo = repo(&store);
    repo.add_visit(&ItemKey::sight("a"), None).unwrap();
    repo.add_visit(&ItemKey::sight("b"), None).unwrap();

    let updated = repo
        .add_visit(&ItemKey::sight("a"), Some("rainy but quiet".to_string()))
        .unwrap();

    let visits = repo.get_visits().unwrap();
    assert_eq!(visits.len(), 2);
    assert_eq!(visits[0].item_id, "a");
    assert_eq!(visits[0].memo.as_deref(), Some("rainy but quiet"));
    assert_eq!(visits[0].visited_at, updated.visited_at);
    assert_eq!(visits[1].item_id, "b");
}

#[test]
fn failed_write_leaves_state_unchanged() {
    let store = MemoryKvStore::new();
    let repo = repo(&store);
    repo.add_favorite(&ItemKey::sight("1")).unwrap();

    store.set_read_only(true);
    assert!(matches!(
        repo.add_favorite(&ItemKey::sight("2")),
        Err(RepoError::Store(_))
    ));
    assert!(repo.toggle_visit(&ItemKey::sight("1")).is_err());

    let favorites = repo.get_favorites().unwrap();
    assert_eq!(favorites.len(), 1);
    assert!(repo.get_visits().unwrap().is_empty());
}

#[test]
fn corrupt_payload_is_reported_not_emptied() {
    let store = MemoryKvStore::new();
    store.put_raw("favorites", "{not json");
    let repo = repo(&store);

    match repo.get_favorites() {
        Err(RepoError::InvalidData { namespace, .. }) => assert_eq!(namespace, "favorites"),
        other => panic!("unexpected result: {other:?}"),
    }
    assert!(repo.add_favorite(&ItemKey::sight("1")).is_err());
}

#[test]
fn stats_and_clear_all_cover_every_namespace() {
    let store = MemoryKvStore::new();
    let repo = repo(&store);
    repo.add_favorite(&ItemKey::sight("1")).unwrap();
    repo.add_visit(&ItemKey::sight("1"), None).unwrap();
    repo.add_visit(&ItemKey::souvenir("2"), None).unwrap();
    repo.complete_onboarding().unwrap();

    let stats = repo.stats().unwrap();
    assert_eq!(stats.total_favorites, 1);
    assert_eq!(stats.total_visits, 2);
    assert_eq!(stats.visited_sights, 1);
    assert_eq!(stats.visited_souvenirs, 1);
    assert!(repo.is_onboarding_completed().unwrap());

    repo.clear_all().unwrap();
    assert_eq!(repo.stats().unwrap(), Default::default());
    assert!(!repo.is_onboarding_completed().unwrap());
}

/// Store that lets another writer commit between the first read and write.
struct RacingStore {
    inner: MemoryKvStore,
    raced: Cell<bool>,
}

impl KeyValueStore for RacingStore {
    fn get(&self, namespace: &str) -> StoreResult<Option<StoredValue>> {
        self.inner.get(namespace)
    }

    fn set(&self, namespace: &str, payload: &[u8], expected: Option<u64>) -> StoreResult<u64> {
        if !self.raced.replace(true) {
            self.inner.put_raw(namespace, r#"[{"itemId":"other","itemType":"sight","addedAt":1}]"#);
        }
        self.inner.set(namespace, payload, expected)
    }

    fn remove(&self, namespace: &str) -> StoreResult<()> {
        self.inner.remove(namespace)
    }
}

#[test]
fn concurrent_writer_is_detected() {
    let store = RacingStore {
        inner: MemoryKvStore::new(),
        raced: Cell::new(false),
    };
    let repo = UserDataRepository::new(&store, ManualClock::new(0));

    assert!(matches!(
        repo.add_favorite(&ItemKey::sight("mine")),
        Err(RepoError::Conflict("favorites"))
    ));
    let favorites = repo.get_favorites().unwrap();
    assert_eq!(favorites.len(), 1);
    assert_eq!(favorites[0].item_id, "other");

    assert!(repo.add_favorite(&ItemKey::sight("mine")).unwrap());
    assert_eq!(repo.get_favorites().unwrap().len(), 2);
}

#[test]
fn sqlite_store_persists_across_connections() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("user_data.sqlite3");

    {
        let conn = open_db(&path).unwrap();
        let store = SqliteKvStore::try_new(&conn).unwrap();
        let repo = UserDataRepository::new(&store, ManualClock::new(10));
        repo.add_favorite(&ItemKey::souvenir("yatsuhashi")).unwrap();
        repo.add_visit(&ItemKey::sight("ginkaku"), Some("moss garden".to_string()))
            .unwrap();
    }

    let conn = open_db(&path).unwrap();
    let store = SqliteKvStore::try_new(&conn).unwrap();
    let repo = UserDataRepository::new(&store, ManualClock::new(20));
    assert!(repo.is_favorite(&ItemKey::souvenir("yatsuhashi")).unwrap());
    let visit = repo.get_visit(&ItemKey::sight("ginkaku")).unwrap().unwrap();
    assert_eq!(visit.memo.as_deref(), Some("moss garden"));
    assert_eq!(visit.visited_at, 10);
}

#[test]
fn sqlite_store_rejects_stale_versions() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteKvStore::try_new(&conn).unwrap();

    assert_eq!(store.set("plans", b"[]", None).unwrap(), 1);
    assert!(store.set("plans", b"[]", None).is_err());
    assert_eq!(store.set("plans", b"[1]", Some(1)).unwrap(), 2);
    assert!(store.set("plans", b"[2]", Some(1)).is_err());

    let stored = store.get("plans").unwrap().unwrap();
    assert_eq!(stored.payload, b"[1]".to_vec());
    assert_eq!(stored.version, 2);

    store.remove("plans").unwrap();
    assert!(store.get("plans").unwrap().is_none());
}

#[test]
fn sqlite_recreated_namespace_never_reuses_a_version() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteKvStore::try_new(&conn).unwrap();

    assert_eq!(store.set("visits", b"[1]", None).unwrap(), 1);
    store.remove("visits").unwrap();
    assert_eq!(store.set("visits", b"[99]", None).unwrap(), 2);

    assert!(matches!(
        store.set("visits", b"[1,2]", Some(1)),
        Err(StoreError::VersionConflict {
            expected: Some(1),
            actual: Some(2),
            ..
        })
    ));
    assert_eq!(store.get("visits").unwrap().unwrap().payload, b"[99]".to_vec());

    store.remove("visits").unwrap();
    store.remove("visits").unwrap();
    assert_eq!(store.set("visits", b"[]", None).unwrap(), 3);
}

#[test]
fn snapshot_from_before_clear_cannot_overwrite_new_data() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteKvStore::try_new(&conn).unwrap();
    let namespaces = NamespaceStore::new(&store);
    let repo = UserDataRepository::new(&store, ManualClock::new(5));

    repo.add_favorite(&ItemKey::sight("old")).unwrap();
    let mut stale = namespaces
        .load::<Vec<Favorite>>(Namespace::Favorites)
        .unwrap();

    repo.clear_all().unwrap();
    repo.add_favorite(&ItemKey::sight("new")).unwrap();

    stale.value.clear();
    assert!(matches!(
        namespaces.commit(Namespace::Favorites, &stale),
        Err(RepoError::Conflict("favorites"))
    ));
    let favorites = repo.get_favorites().unwrap();
    assert_eq!(favorites.len(), 1);
    assert_eq!(favorites[0].item_id, "new");
}

#[test]
fn iso_string_timestamps_are_reported_as_invalid_data() {
    let store = MemoryKvStore::new();
    store.put_raw(
        "visits",
        r#"[{"itemId":"1","itemType":"sight","visitedAt":"2024-04-01T09:00:00.000Z"}]"#,
    );
    let repo = repo(&store);

    assert!(matches!(
        repo.get_visits(),
        Err(RepoError::InvalidData {
            namespace: "visits",
            ..
        })
    ));

    repo.add_visit(&ItemKey::sight("1"), None).unwrap_err();
    repo.clear_all().unwrap();
    let visit = repo.add_visit(&ItemKey::sight("1"), None).unwrap();
    assert_eq!(visit.visited_at, 1_700_000_000_000);
}
