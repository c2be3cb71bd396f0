//! Ordered schema steps for the user-data database.
//!
//! # Invariants
//! - Steps are listed by strictly increasing revision.
//! - All pending steps run in one transaction; `user_version` moves with them.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::{Connection, TransactionBehavior};

/// `(revision, sql)` pairs applied in order.
const STEPS: &[(u32, &str)] = &[
    (1, include_str!("0001_user_data.sql")),
    (2, include_str!("0002_retired_versions.sql")),
];

/// Newest schema revision this build writes.
pub fn latest_version() -> u32 {
    STEPS.last().map_or(0, |(revision, _)| *revision)
}

/// Brings `conn` up to [`latest_version`].
///
/// Files from a newer build are refused rather than downgraded.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let from = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    let latest = latest_version();
    if from > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from,
            latest_supported: latest,
        });
    }

    let pending: Vec<_> = STEPS.iter().filter(|(revision, _)| *revision > from).collect();
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    for (revision, sql) in &pending {
        tx.execute_batch(sql)?;
        tx.pragma_update(None, "user_version", *revision)?;
    }
    tx.commit()?;

    info!(
        "event=db_migrate module=db status=ok from_version={from} to_version={latest} steps={}",
        pending.len()
    );
    Ok(())
}
