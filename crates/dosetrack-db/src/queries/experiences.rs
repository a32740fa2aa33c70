use rusqlite::params;
use serde_json::{Map, Value};

use dosetrack_types::models::Experience;

use crate::repository;
use crate::{Database, DbResult};

impl Database {
    pub fn create_experience(&self, owner_id: i64, input: &Map<String, Value>) -> DbResult<i64> {
        self.create_owned::<Experience>(owner_id, input)
    }

    pub fn get_experience(&self, owner_id: i64, id: i64) -> DbResult<Experience> {
        self.get_owned(owner_id, id)
    }

    pub fn list_experiences(&self, owner_id: i64) -> DbResult<Vec<Experience>> {
        self.list_owned(owner_id)
    }

    pub fn update_experience(
        &self,
        owner_id: i64,
        id: i64,
        input: &Map<String, Value>,
    ) -> DbResult<()> {
        self.update_owned::<Experience>(owner_id, id, input)
    }

    /// Delete an experience together with the consumptions it owns and
    /// their friends.
    pub fn delete_experience(&self, owner_id: i64, id: i64) -> DbResult<()> {
        self.with_tx(|tx| {
            tx.execute(
                "DELETE FROM friends
                 WHERE owner_id = ?2
                   AND consumption_id IN
                       (SELECT id FROM consumptions WHERE experience_id = ?1 AND owner_id = ?2)",
                params![id, owner_id],
            )?;
            tx.execute(
                "DELETE FROM consumptions WHERE experience_id = ?1 AND owner_id = ?2",
                params![id, owner_id],
            )?;
            repository::remove::<Experience>(tx, owner_id, id)
        })
    }
}
