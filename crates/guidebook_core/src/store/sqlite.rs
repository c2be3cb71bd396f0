//! SQLite-backed key-value store.
//!
//! # Invariants
//! - Only connections at the latest migrated schema are accepted.
//! - Version checks and writes happen in one SQL statement, so a stale writer
//!   never overwrites a newer payload.
//! - Removing a namespace records its last version in `user_data_retired`; a
//!   re-created namespace starts above it.

use super::{KeyValueStore, StoreError, StoreResult, StoredValue};
use crate::db::migrations::latest_version;
use log::warn;
use rusqlite::{params, Connection, OptionalExtension};

/// Durable store over the `user_data` table.
pub struct SqliteKvStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteKvStore<'conn> {
    /// Creates store from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        ensure_store_connection_ready(conn)?;
        Ok(Self { conn })
    }

    fn current_version(&self, namespace: &str) -> StoreResult<Option<u64>> {
        let version = self
            .conn
            .query_row(
                "SELECT version FROM user_data WHERE namespace = ?1;",
                [namespace],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(version.map(|value| value as u64))
    }

    fn conflict(&self, namespace: &str, expected: Option<u64>) -> StoreResult<u64> {
        let actual = self.current_version(namespace)?;
        warn!(
            "event=kv_set module=store status=conflict namespace={namespace} expected={expected:?} actual={actual:?}"
        );
        Err(StoreError::VersionConflict {
            namespace: namespace.to_string(),
            expected,
            actual,
        })
    }
}

impl KeyValueStore for SqliteKvStore<'_> {
    fn get(&self, namespace: &str) -> StoreResult<Option<StoredValue>> {
        let value = self
            .conn
            .query_row(
                "SELECT payload, version FROM user_data WHERE namespace = ?1;",
                [namespace],
                |row| {
                    Ok(StoredValue {
                        payload: row.get(0)?,
                        version: row.get::<_, i64>(1)? as u64,
                    })
                },
            )
            .optional()?;
        Ok(value)
    }

    fn set(
        &self,
        namespace: &str,
        payload: &[u8],
        expected_version: Option<u64>,
    ) -> StoreResult<u64> {
        match expected_version {
            None => {
                let inserted = self
                    .conn
                    .query_row(
                        "INSERT OR IGNORE INTO user_data (namespace, payload, version)
                         VALUES (
                             ?1,
                             ?2,
                             COALESCE(
                                 (SELECT version FROM user_data_retired WHERE namespace = ?1),
                                 0
                             ) + 1
                         )
                         RETURNING version;",
                        params![namespace, payload],
                        |row| row.get::<_, i64>(0),
                    )
                    .optional()?;
                match inserted {
                    Some(version) => Ok(version as u64),
                    None => self.conflict(namespace, None),
                }
            }
            Some(expected) => {
                let changed = self.conn.execute(
                    "UPDATE user_data
                     SET payload = ?2,
                         version = version + 1,
                         updated_at = (strftime('%s', 'now') * 1000)
                     WHERE namespace = ?1
                       AND version = ?3;",
                    params![namespace, payload, expected as i64],
                )?;
                if changed == 0 {
                    return self.conflict(namespace, Some(expected));
                }
                Ok(expected + 1)
            }
        }
    }

    fn remove(&self, namespace: &str) -> StoreResult<()> {
        self.conn
            .execute("DELETE FROM user_data WHERE namespace = ?1;", [namespace])?;
        Ok(())
    }
}

fn ensure_store_connection_ready(conn: &Connection) -> StoreResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(StoreError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for table in ["user_data", "user_data_retired"] {
        if !table_exists(conn, table)? {
            return Err(StoreError::MissingRequiredTable(table));
        }
    }

    for column in ["namespace", "payload", "version", "updated_at"] {
        if !table_has_column(conn, "user_data", column)? {
            return Err(StoreError::MissingRequiredColumn {
                table: "user_data",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> StoreResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> StoreResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
