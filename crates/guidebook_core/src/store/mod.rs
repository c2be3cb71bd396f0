//! Key-value persistence port for user data.
//!
//! # Responsibility
//! - Define the injected storage contract used by user-data repositories.
//! - Provide in-memory and SQLite-backed implementations.
//!
//! # Invariants
//! - Every namespace value carries a monotonically increasing version.
//! - `set` is compare-and-set: stale writers get `VersionConflict`, never a
//!   silent overwrite.
//! - A failed `set` leaves the stored value unchanged.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod memory;
mod sqlite;

pub use memory::MemoryKvStore;
pub use sqlite::SqliteKvStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Raw namespace value with its write version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredValue {
    pub payload: Vec<u8>,
    pub version: u64,
}

/// Errors from key-value store implementations.
#[derive(Debug)]
pub enum StoreError {
    /// Underlying SQLite failure.
    Db(DbError),
    /// Compare-and-set mismatch. `None` means "absent".
    VersionConflict {
        namespace: String,
        expected: Option<u64>,
        actual: Option<u64>,
    },
    /// Storage is disabled or refuses writes.
    Unavailable(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::VersionConflict {
                namespace,
                expected,
                actual,
            } => write!(
                f,
                "version conflict in namespace `{namespace}`: expected {}, found {}",
                describe_version(*expected),
                describe_version(*actual)
            ),
            Self::Unavailable(message) => write!(f, "storage unavailable: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "user-data store requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "user-data store requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "user-data store requires column `{column}` in table `{table}`"
            ),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

fn describe_version(version: Option<u64>) -> String {
    match version {
        Some(version) => format!("v{version}"),
        None => "absent".to_string(),
    }
}

/// Namespaced byte storage with optimistic versioning.
pub trait KeyValueStore {
    /// Loads one namespace. `None` when never written or removed.
    fn get(&self, namespace: &str) -> StoreResult<Option<StoredValue>>;
    /// Writes one namespace if its current version equals `expected_version`.
    ///
    /// Returns the new version.
    fn set(
        &self,
        namespace: &str,
        payload: &[u8],
        expected_version: Option<u64>,
    ) -> StoreResult<u64>;
    /// Removes one namespace. Missing namespaces are not an error.
    fn remove(&self, namespace: &str) -> StoreResult<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &T {
    fn get(&self, namespace: &str) -> StoreResult<Option<StoredValue>> {
        (**self).get(namespace)
    }

    fn set(
        &self,
        namespace: &str,
        payload: &[u8],
        expected_version: Option<u64>,
    ) -> StoreResult<u64> {
        (**self).set(namespace, payload, expected_version)
    }

    fn remove(&self, namespace: &str) -> StoreResult<()> {
        (**self).remove(namespace)
    }
}
