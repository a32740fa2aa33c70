//! Delete protection for rows that consumptions point at.
//!
//! The referencing-row query and the delete share one IMMEDIATE
//! transaction, so no consumption can be inserted between the check and
//! the delete.

use rusqlite::Connection;
use tracing::info;

use dosetrack_types::models::{Consumption, Drug, Method};

use crate::repository::{self, Entity};
use crate::{Database, DbError, DbResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Referenced {
    Drug,
    Method,
}

impl Referenced {
    fn filter(self) -> &'static str {
        match self {
            Self::Drug => "owner_id = ?1 AND drug_id = ?2 ORDER BY id",
            Self::Method => "owner_id = ?1 AND method_id = ?2 ORDER BY id",
        }
    }

    fn table(self) -> &'static str {
        match self {
            Self::Drug => Drug::TABLE,
            Self::Method => Method::TABLE,
        }
    }
}

/// Consumptions of `owner_id` that reference row `id` of `kind`, oldest first.
pub fn referencing_consumptions(
    conn: &Connection,
    kind: Referenced,
    owner_id: i64,
    id: i64,
) -> DbResult<Vec<Consumption>> {
    repository::select::<Consumption, _>(conn, kind.filter(), [owner_id, id])
}

fn delete_guarded(conn: &Connection, kind: Referenced, owner_id: i64, id: i64) -> DbResult<()> {
    let blocking = referencing_consumptions(conn, kind, owner_id, id)?;
    if !blocking.is_empty() {
        info!(
            "Delete of {} {} blocked by {} consumption(s)",
            kind.table(),
            id,
            blocking.len()
        );
        return Err(DbError::Conflict(blocking));
    }

    match kind {
        Referenced::Drug => repository::remove::<Drug>(conn, owner_id, id),
        Referenced::Method => repository::remove::<Method>(conn, owner_id, id),
    }
}

impl Database {
    pub fn delete_drug(&self, owner_id: i64, id: i64) -> DbResult<()> {
        self.with_tx(|tx| delete_guarded(tx, Referenced::Drug, owner_id, id))
    }

    pub fn delete_method(&self, owner_id: i64, id: i64) -> DbResult<()> {
        self.with_tx(|tx| delete_guarded(tx, Referenced::Method, owner_id, id))
    }
}
