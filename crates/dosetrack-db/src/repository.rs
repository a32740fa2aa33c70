//! Owner-scoped row operations shared by every resource kind.
//!
//! Each function is one statement. Every statement filters on `owner_id`,
//! so a row owned by someone else behaves exactly like a missing row.

use std::iter::once;

use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, Params, Row, params, params_from_iter};

use crate::error::OptionalExt;
use crate::fields::{Assignment, FieldSpec};
use crate::{DbError, DbResult};

/// A table whose rows belong to exactly one owner.
pub trait Entity: Sized {
    const TABLE: &'static str;
    /// Select list, in the order `from_row` reads it.
    const COLUMNS: &'static str;
    /// Allow-list for create and update payloads.
    const FIELDS: &'static [FieldSpec];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;
}

pub(crate) fn insert<E: Entity>(
    conn: &Connection,
    owner_id: i64,
    assignments: &[Assignment],
) -> DbResult<i64> {
    let columns: Vec<&str> = assignments
        .iter()
        .map(|a| a.column)
        .chain(once("owner_id"))
        .collect();
    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{}", i)).collect();
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        E::TABLE,
        columns.join(", "),
        placeholders.join(", ")
    );

    let owner = SqlValue::Integer(owner_id);
    conn.execute(
        &sql,
        params_from_iter(assignments.iter().map(|a| &a.value).chain(once(&owner))),
    )?;
    Ok(conn.last_insert_rowid())
}

pub(crate) fn fetch<E: Entity>(conn: &Connection, owner_id: i64, id: i64) -> DbResult<E> {
    let sql = format!(
        "SELECT {} FROM {} WHERE id = ?1 AND owner_id = ?2",
        E::COLUMNS,
        E::TABLE
    );
    conn.query_row(&sql, params![id, owner_id], E::from_row)
        .optional()?
        .ok_or(DbError::NotFound)
}

pub(crate) fn exists<E: Entity>(conn: &Connection, owner_id: i64, id: i64) -> DbResult<bool> {
    let sql = format!("SELECT 1 FROM {} WHERE id = ?1 AND owner_id = ?2", E::TABLE);
    let found = conn
        .query_row(&sql, params![id, owner_id], |_| Ok(()))
        .optional()?;
    Ok(found.is_some())
}

/// All rows of the owner, newest id first.
pub(crate) fn fetch_all<E: Entity>(conn: &Connection, owner_id: i64) -> DbResult<Vec<E>> {
    select(conn, "owner_id = ?1 ORDER BY id DESC", [owner_id])
}

/// Rows matching a fixed `WHERE` clause. `filter` is always a literal
/// written in this crate.
pub(crate) fn select<E: Entity, P: Params>(
    conn: &Connection,
    filter: &'static str,
    params: P,
) -> DbResult<Vec<E>> {
    let sql = format!("SELECT {} FROM {} WHERE {}", E::COLUMNS, E::TABLE, filter);
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params, E::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub(crate) fn update<E: Entity>(
    conn: &Connection,
    owner_id: i64,
    id: i64,
    assignments: &[Assignment],
) -> DbResult<()> {
    let sets: Vec<String> = assignments
        .iter()
        .enumerate()
        .map(|(i, a)| format!("{} = ?{}", a.column, i + 1))
        .collect();
    let n = assignments.len();
    let sql = format!(
        "UPDATE {} SET {} WHERE id = ?{} AND owner_id = ?{}",
        E::TABLE,
        sets.join(", "),
        n + 1,
        n + 2
    );

    let keys = [SqlValue::Integer(id), SqlValue::Integer(owner_id)];
    let changed = conn.execute(
        &sql,
        params_from_iter(assignments.iter().map(|a| &a.value).chain(keys.iter())),
    )?;
    if changed == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}

pub(crate) fn remove<E: Entity>(conn: &Connection, owner_id: i64, id: i64) -> DbResult<()> {
    let sql = format!("DELETE FROM {} WHERE id = ?1 AND owner_id = ?2", E::TABLE);
    let changed = conn.execute(&sql, params![id, owner_id])?;
    if changed == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}
