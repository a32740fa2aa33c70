use rusqlite::{Connection, params};
use serde_json::{Map, Value};

use dosetrack_types::models::{Consumption, Drug, Experience, Method};

use crate::fields::{self, Assignment, Mode};
use crate::repository::{self, Entity};
use crate::{Database, DbError, DbResult, FieldIssue};

/// Every reference in `assignments` must name a row owned by `owner_id`.
/// Runs inside the insert/update transaction, so a drug or method deleted
/// concurrently cannot end up referenced.
fn check_references(conn: &Connection, owner_id: i64, assignments: &[Assignment]) -> DbResult<()> {
    let mut issues = Vec::new();

    for a in assignments {
        let Some(id) = a.as_i64() else { continue };
        let found = match a.column {
            "drug_id" => repository::exists::<Drug>(conn, owner_id, id)?,
            "method_id" => repository::exists::<Method>(conn, owner_id, id)?,
            "experience_id" => repository::exists::<Experience>(conn, owner_id, id)?,
            _ => continue,
        };
        if !found {
            issues.push(FieldIssue::new(a.column, "does not reference an owned record"));
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(DbError::Validation(issues))
    }
}

impl Database {
    pub fn create_consumption(&self, owner_id: i64, input: &Map<String, Value>) -> DbResult<i64> {
        let assignments = fields::parse(Consumption::FIELDS, input, Mode::Create)?;
        self.with_tx(|tx| {
            check_references(tx, owner_id, &assignments)?;
            repository::insert::<Consumption>(tx, owner_id, &assignments)
        })
    }

    /// The bare row. Use [`Database::consumption_view`] for the expanded form.
    pub fn get_consumption(&self, owner_id: i64, id: i64) -> DbResult<Consumption> {
        self.get_owned(owner_id, id)
    }

    pub fn update_consumption(
        &self,
        owner_id: i64,
        id: i64,
        input: &Map<String, Value>,
    ) -> DbResult<()> {
        let assignments = fields::parse(Consumption::FIELDS, input, Mode::Update)?;
        self.with_tx(|tx| {
            // Ownership of the row itself first, so a foreign id reads as
            // NotFound rather than as a reference problem.
            if !repository::exists::<Consumption>(tx, owner_id, id)? {
                return Err(DbError::NotFound);
            }
            check_references(tx, owner_id, &assignments)?;
            repository::update::<Consumption>(tx, owner_id, id, &assignments)
        })
    }

    pub fn delete_consumption(&self, owner_id: i64, id: i64) -> DbResult<()> {
        self.with_tx(|tx| {
            tx.execute(
                "DELETE FROM friends WHERE consumption_id = ?1 AND owner_id = ?2",
                params![id, owner_id],
            )?;
            repository::remove::<Consumption>(tx, owner_id, id)
        })
    }
}
