use serde_json::{Map, Value};

use dosetrack_types::models::Method;

use crate::{Database, DbResult};

impl Database {
    pub fn create_method(&self, owner_id: i64, input: &Map<String, Value>) -> DbResult<i64> {
        self.create_owned::<Method>(owner_id, input)
    }

    pub fn get_method(&self, owner_id: i64, id: i64) -> DbResult<Method> {
        self.get_owned(owner_id, id)
    }

    pub fn list_methods(&self, owner_id: i64) -> DbResult<Vec<Method>> {
        self.list_owned(owner_id)
    }

    pub fn update_method(
        &self,
        owner_id: i64,
        id: i64,
        input: &Map<String, Value>,
    ) -> DbResult<()> {
        self.update_owned::<Method>(owner_id, id, input)
    }
}
