use rusqlite::types::Value as SqlValue;
use serde_json::{Map, Value};

use dosetrack_types::models::{Consumption, Friend};

use crate::fields::{self, Assignment, Mode};
use crate::repository::{self, Entity};
use crate::{Database, DbError, DbResult};

impl Database {
    pub fn create_friend(
        &self,
        owner_id: i64,
        consumption_id: i64,
        input: &Map<String, Value>,
    ) -> DbResult<i64> {
        let mut assignments = fields::parse(Friend::FIELDS, input, Mode::Create)?;
        assignments.push(Assignment::new("consumption_id", SqlValue::Integer(consumption_id)));

        self.with_tx(|tx| {
            if !repository::exists::<Consumption>(tx, owner_id, consumption_id)? {
                return Err(DbError::NotFound);
            }
            repository::insert::<Friend>(tx, owner_id, &assignments)
        })
    }

    pub fn list_friends(&self, owner_id: i64, consumption_id: i64) -> DbResult<Vec<Friend>> {
        self.with_conn(|conn| {
            if !repository::exists::<Consumption>(conn, owner_id, consumption_id)? {
                return Err(DbError::NotFound);
            }
            repository::select(
                conn,
                "owner_id = ?1 AND consumption_id = ?2 ORDER BY id",
                [owner_id, consumption_id],
            )
        })
    }

    pub fn update_friend(
        &self,
        owner_id: i64,
        id: i64,
        input: &Map<String, Value>,
    ) -> DbResult<()> {
        self.update_owned::<Friend>(owner_id, id, input)
    }

    pub fn delete_friend(&self, owner_id: i64, id: i64) -> DbResult<()> {
        self.with_conn(|conn| repository::remove::<Friend>(conn, owner_id, id))
    }
}
