//! Persistent client-side storage.
//!
//! DESIGN
//! ======
//! A tiny string key-value interface, the same shape as browser local
//! storage. Two entries matter to the session layer:
//! - `isAuthenticated`: the cached auth marker `{ "expiresAt": <unix ms> }`
//! - `lastRoute`: the last authenticated path the user visited
//!
//! Storage is best-effort. Read and write failures are logged by callers and
//! treated as "absent"; they never fail an auth operation.

#[cfg(test)]
#[path = "storage_test.rs"]
mod storage_test;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

pub const AUTH_MARKER_KEY: &str = "isAuthenticated";
pub const LAST_ROUTE_KEY: &str = "lastRoute";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage I/O failed for {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("storage file {} is corrupt: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// String key-value storage that survives restarts (or not, for tests).
pub trait KeyValueStore: Send + Sync {
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

// =============================================================================
// MEMORY STORE
// =============================================================================

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.lock().unwrap_or_else(PoisonError::into_inner).get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).remove(key);
        Ok(())
    }
}

// =============================================================================
// FILE STORE
// =============================================================================

/// JSON object on disk, rewritten whole on every change.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), lock: Mutex::new(()) }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<HashMap<String, String>, StorageError> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) if text.trim().is_empty() => Ok(HashMap::new()),
            Ok(text) => serde_json::from_str(&text)
                .map_err(|source| StorageError::Corrupt { path: self.path.clone(), source }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(source) => Err(StorageError::Io { path: self.path.clone(), source }),
        }
    }

    fn save(&self, entries: &HashMap<String, String>) -> Result<(), StorageError> {
        let io_err = |source| StorageError::Io { path: self.path.clone(), source };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let text = serde_json::to_string_pretty(entries)
            .map_err(|source| StorageError::Corrupt { path: self.path.clone(), source })?;
        std::fs::write(&self.path, text).map_err(io_err)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.load()?;
        entries.insert(key.to_owned(), value.to_owned());
        self.save(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.load()?;
        if entries.remove(key).is_some() {
            self.save(&entries)?;
        }
        Ok(())
    }
}

// =============================================================================
// AUTH MARKER
// =============================================================================

/// Cached hint that a server session probably still exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthMarker {
    /// Unix time in milliseconds.
    pub expires_at: i64,
}

impl AuthMarker {
    #[must_use]
    pub fn expiring_after(now: OffsetDateTime, lifetime_secs: u64) -> Self {
        let lifetime_ms = i64::try_from(lifetime_secs.saturating_mul(1000)).unwrap_or(i64::MAX);
        Self { expires_at: unix_ms(now).saturating_add(lifetime_ms) }
    }

    #[must_use]
    pub fn is_valid_at(&self, now: OffsetDateTime) -> bool {
        unix_ms(now) <= self.expires_at
    }
}

fn unix_ms(at: OffsetDateTime) -> i64 {
    i64::try_from(at.unix_timestamp_nanos() / 1_000_000).unwrap_or(i64::MAX)
}

/// Read the marker, dropping it if it expired or cannot be parsed.
#[must_use]
pub fn read_auth_marker(store: &dyn KeyValueStore, now: OffsetDateTime) -> Option<AuthMarker> {
    let raw = match store.get(AUTH_MARKER_KEY) {
        Ok(raw) => raw?,
        Err(e) => {
            tracing::warn!(error = %e, "could not read auth marker");
            return None;
        }
    };
    match serde_json::from_str::<AuthMarker>(&raw) {
        Ok(marker) if marker.is_valid_at(now) => return Some(marker),
        Ok(marker) => tracing::debug!(expires_at = marker.expires_at, "auth marker expired"),
        Err(e) => tracing::warn!(error = %e, "discarding unreadable auth marker"),
    }
    clear_auth_marker(store);
    None
}

pub fn write_auth_marker(store: &dyn KeyValueStore, marker: AuthMarker) {
    let result = serde_json::to_string(&marker)
        .map_err(|e| e.to_string())
        .and_then(|json| store.set(AUTH_MARKER_KEY, &json).map_err(|e| e.to_string()));
    if let Err(e) = result {
        tracing::warn!(error = %e, "could not persist auth marker");
    }
}

pub fn clear_auth_marker(store: &dyn KeyValueStore) {
    if let Err(e) = store.remove(AUTH_MARKER_KEY) {
        tracing::warn!(error = %e, "could not remove auth marker");
    }
}

// =============================================================================
// LAST ROUTE
// =============================================================================

#[must_use]
pub fn read_last_route(store: &dyn KeyValueStore) -> Option<String> {
    store
        .get(LAST_ROUTE_KEY)
        .map_err(|e| tracing::warn!(error = %e, "could not read last route"))
        .ok()
        .flatten()
        .filter(|route| route.starts_with('/'))
}

pub fn write_last_route(store: &dyn KeyValueStore, route: &str) {
    if let Err(e) = store.set(LAST_ROUTE_KEY, route) {
        tracing::warn!(error = %e, route, "could not persist last route");
    }
}
