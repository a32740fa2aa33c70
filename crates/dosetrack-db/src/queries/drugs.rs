use serde_json::{Map, Value};

use dosetrack_types::models::Drug;

use crate::{Database, DbResult};

impl Database {
    pub fn create_drug(&self, owner_id: i64, input: &Map<String, Value>) -> DbResult<i64> {
        self.create_owned::<Drug>(owner_id, input)
    }

    pub fn get_drug(&self, owner_id: i64, id: i64) -> DbResult<Drug> {
        self.get_owned(owner_id, id)
    }

    pub fn update_drug(&self, owner_id: i64, id: i64, input: &Map<String, Value>) -> DbResult<()> {
        self.update_owned::<Drug>(owner_id, id, input)
    }
}
