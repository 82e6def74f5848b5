use super::*;
use time::Duration;

fn at_ms(ms: i64) -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(ms) * 1_000_000).unwrap()
}

// =============================================================================
// MemoryStore
// =============================================================================

#[test]
fn memory_store_set_get_remove() {
    let store = MemoryStore::new();
    assert_eq!(store.get("k").unwrap(), None);

    store.set("k", "v1").unwrap();
    store.set("k", "v2").unwrap();
    assert_eq!(store.get("k").unwrap().as_deref(), Some("v2"));

    store.remove("k").unwrap();
    store.remove("k").unwrap();
    assert_eq!(store.get("k").unwrap(), None);
}

// =============================================================================
// FileStore
// =============================================================================

#[test]
fn file_store_missing_file_reads_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path().join("absent.json"));
    assert_eq!(store.get(AUTH_MARKER_KEY).unwrap(), None);
    store.remove(AUTH_MARKER_KEY).unwrap();
    assert!(!store.path().exists());
}

#[test]
fn file_store_creates_parent_dirs_and_persists_across_instances() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("storage.json");

    FileStore::new(&path).set(LAST_ROUTE_KEY, "/driver/car").unwrap();

    let reopened = FileStore::new(&path);
    assert_eq!(reopened.get(LAST_ROUTE_KEY).unwrap().as_deref(), Some("/driver/car"));
}

#[test]
fn file_store_remove_keeps_other_keys() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path().join("storage.json"));
    store.set("a", "1").unwrap();
    store.set("b", "2").unwrap();

    store.remove("a").unwrap();

    assert_eq!(store.get("a").unwrap(), None);
    assert_eq!(store.get("b").unwrap().as_deref(), Some("2"));
}

#[test]
fn file_store_empty_file_reads_empty() {
    let file = tempfile::NamedTempFile::new().unwrap();
    let store = FileStore::new(file.path());
    assert_eq!(store.get("anything").unwrap(), None);
}

#[test]
fn file_store_reports_corrupt_file() {
    let file = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(file.path(), "not json").unwrap();
    let store = FileStore::new(file.path());
    assert!(matches!(store.get("anything"), Err(StorageError::Corrupt { .. })));
}

// =============================================================================
// AUTH MARKER
// =============================================================================

#[test]
fn marker_serializes_as_expires_at_millis() {
    let marker = AuthMarker::expiring_after(at_ms(1_000), 60);
    assert_eq!(marker.expires_at, 61_000);
    assert_eq!(serde_json::to_string(&marker).unwrap(), r#"{"expiresAt":61000}"#);
}

#[test]
fn marker_validity_is_inclusive_of_expiry() {
    let marker = AuthMarker { expires_at: 5_000 };
    assert!(marker.is_valid_at(at_ms(5_000)));
    assert!(!marker.is_valid_at(at_ms(5_001)));
}

#[test]
fn read_returns_valid_marker() {
    let store = MemoryStore::new();
    let now = OffsetDateTime::now_utc();
    write_auth_marker(&store, AuthMarker::expiring_after(now, 3600));

    let marker = read_auth_marker(&store, now + Duration::minutes(30)).unwrap();
    assert!(marker.is_valid_at(now));
}

#[test]
fn read_clears_expired_marker() {
    let store = MemoryStore::new();
    let now = OffsetDateTime::now_utc();
    write_auth_marker(&store, AuthMarker::expiring_after(now, 60));

    assert_eq!(read_auth_marker(&store, now + Duration::hours(1)), None);
    assert_eq!(store.get(AUTH_MARKER_KEY).unwrap(), None);
}

#[test]
fn read_clears_unparseable_marker() {
    let store = MemoryStore::new();
    store.set(AUTH_MARKER_KEY, "true").unwrap();

    assert_eq!(read_auth_marker(&store, OffsetDateTime::now_utc()), None);
    assert_eq!(store.get(AUTH_MARKER_KEY).unwrap(), None);
}

#[test]
fn clear_marker_is_idempotent() {
    let store = MemoryStore::new();
    clear_auth_marker(&store);
    write_auth_marker(&store, AuthMarker { expires_at: 1 });
    clear_auth_marker(&store);
    clear_auth_marker(&store);
    assert_eq!(store.get(AUTH_MARKER_KEY).unwrap(), None);
}

// =============================================================================
// LAST ROUTE
// =============================================================================

#[test]
fn last_route_round_trips() {
    let store = MemoryStore::new();
    assert_eq!(read_last_route(&store), None);
    write_last_route(&store, "/admin/prices");
    assert_eq!(read_last_route(&store).as_deref(), Some("/admin/prices"));
}

#[test]
fn last_route_ignores_non_paths() {
    let store = MemoryStore::new();
    store.set(LAST_ROUTE_KEY, "https://evil.test/admin").unwrap();
    assert_eq!(read_last_route(&store), None);
}
