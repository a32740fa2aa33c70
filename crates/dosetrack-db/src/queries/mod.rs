mod consumptions;
mod drugs;
mod experiences;
mod friends;
mod methods;
mod users;

use serde_json::{Map, Value};

use crate::fields::{self, Mode};
use crate::repository::{self, Entity};
use crate::{Database, DbResult};

// Plain kinds share these; kinds with references or children add their own
// transactional steps around the same repository calls.
impl Database {
    fn create_owned<E: Entity>(&self, owner_id: i64, input: &Map<String, Value>) -> DbResult<i64> {
        let assignments = fields::parse(E::FIELDS, input, Mode::Create)?;
        self.with_conn(|conn| repository::insert::<E>(conn, owner_id, &assignments))
    }

    fn get_owned<E: Entity>(&self, owner_id: i64, id: i64) -> DbResult<E> {
        self.with_conn(|conn| repository::fetch::<E>(conn, owner_id, id))
    }

    fn list_owned<E: Entity>(&self, owner_id: i64) -> DbResult<Vec<E>> {
        self.with_conn(|conn| repository::fetch_all::<E>(conn, owner_id))
    }

    fn update_owned<E: Entity>(
        &self,
        owner_id: i64,
        id: i64,
        input: &Map<String, Value>,
    ) -> DbResult<()> {
        let assignments = fields::parse(E::FIELDS, input, Mode::Update)?;
        self.with_conn(|conn| repository::update::<E>(conn, owner_id, id, &assignments))
    }
}
