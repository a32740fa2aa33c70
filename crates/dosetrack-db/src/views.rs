//! Composite read models assembled from several owner-scoped reads.

use std::collections::HashMap;

use rusqlite::{Connection, params, params_from_iter};

use dosetrack_types::models::{
    ConsumptionView, Drug, DrugSummary, DrugUsage, Experience, ExperienceView, Friend,
    LocationCount, MethodSummary,
};

use crate::repository::{self, Entity};
use crate::{Database, DbError, DbResult};

const DEFAULT_DAYS_BACK: i64 = 30;
const DEFAULT_FAVORITE_COUNT: i64 = 5;
const SECONDS_PER_DAY: i64 = 86_400;

/// Which consumptions to expand, and in what order.
#[derive(Debug, Clone, Copy)]
enum Scope {
    One(i64),
    Experience(i64),
    All,
    Since(i64),
}

impl Scope {
    fn clause(self) -> (&'static str, Option<i64>) {
        match self {
            Self::One(id) => ("AND c.id = ?2", Some(id)),
            Self::Experience(id) => ("AND c.experience_id = ?2 ORDER BY c.date, c.id", Some(id)),
            Self::All => ("ORDER BY c.id DESC", None),
            Self::Since(ts) => ("AND c.date >= ?2 ORDER BY c.date DESC, c.id DESC", Some(ts)),
        }
    }
}

// Drug and method are joined on the consumption's own owner, which equals
// the caller's because references are checked at insert time.
fn consumption_views(
    conn: &Connection,
    owner_id: i64,
    scope: Scope,
) -> DbResult<Vec<ConsumptionView>> {
    let (clause, arg) = scope.clause();
    let sql = format!(
        "SELECT c.id, c.count, c.date, c.location, c.experience_id, c.owner_id,
                d.id, d.name, d.unit, m.id, m.name
         FROM consumptions c
         JOIN drugs d ON d.id = c.drug_id AND d.owner_id = c.owner_id
         JOIN methods m ON m.id = c.method_id AND m.owner_id = c.owner_id
         WHERE c.owner_id = ?1 {}",
        clause
    );

    let args: Vec<i64> = std::iter::once(owner_id).chain(arg).collect();
    let mut stmt = conn.prepare(&sql)?;
    let mut views = stmt
        .query_map(params_from_iter(args), |row| {
            Ok(ConsumptionView {
                id: row.get(0)?,
                count: row.get(1)?,
                date: row.get(2)?,
                location: row.get(3)?,
                experience_id: row.get(4)?,
                owner_id: row.get(5)?,
                drug: DrugSummary {
                    id: row.get(6)?,
                    name: row.get(7)?,
                    unit: row.get(8)?,
                },
                method: MethodSummary {
                    id: row.get(9)?,
                    name: row.get(10)?,
                },
                friends: Vec::new(),
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let ids: Vec<i64> = views.iter().map(|v| v.id).collect();
    let mut friends = friends_by_consumption(conn, owner_id, &ids)?;
    for view in &mut views {
        view.friends = friends.remove(&view.id).unwrap_or_default();
    }

    Ok(views)
}

/// Batch-fetch friends for a set of consumption ids.
fn friends_by_consumption(
    conn: &Connection,
    owner_id: i64,
    consumption_ids: &[i64],
) -> DbResult<HashMap<i64, Vec<Friend>>> {
    let mut grouped: HashMap<i64, Vec<Friend>> = HashMap::new();
    if consumption_ids.is_empty() {
        return Ok(grouped);
    }

    let placeholders: Vec<String> = (2..=consumption_ids.len() + 1)
        .map(|i| format!("?{}", i))
        .collect();
    let sql = format!(
        "SELECT {} FROM friends WHERE owner_id = ?1 AND consumption_id IN ({}) ORDER BY id",
        Friend::COLUMNS,
        placeholders.join(", ")
    );

    let args = std::iter::once(&owner_id).chain(consumption_ids);
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params_from_iter(args), Friend::from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    for friend in rows {
        grouped.entry(friend.consumption_id).or_default().push(friend);
    }
    Ok(grouped)
}

fn drug_usage(
    conn: &Connection,
    owner_id: i64,
    tail: &'static str,
    limit: i64,
) -> DbResult<Vec<DrugUsage>> {
    let sql = format!(
        "SELECT d.id, d.name, d.unit, d.notes, d.classification, d.family, d.rarity, d.slang,
                d.owner_id, COUNT(c.id) AS use_count
         FROM drugs d
         LEFT JOIN consumptions c ON c.drug_id = d.id AND c.owner_id = d.owner_id
         WHERE d.owner_id = ?1
         GROUP BY d.id
         {}
         LIMIT ?2",
        tail
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![owner_id, limit], |row| {
            Ok(DrugUsage {
                drug: Drug::from_row(row)?,
                use_count: row.get(9)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

impl Database {
    /// Experience with its consumptions, each expanded like
    /// [`Database::consumption_view`].
    pub fn experience_view(&self, owner_id: i64, id: i64) -> DbResult<ExperienceView> {
        self.with_conn(|conn| {
            let experience = repository::fetch::<Experience>(conn, owner_id, id)?;
            let consumptions = consumption_views(conn, owner_id, Scope::Experience(id))?;
            Ok(ExperienceView {
                experience,
                consumptions,
            })
        })
    }

    pub fn consumption_view(&self, owner_id: i64, id: i64) -> DbResult<ConsumptionView> {
        self.with_conn(|conn| {
            consumption_views(conn, owner_id, Scope::One(id))?
                .pop()
                .ok_or(DbError::NotFound)
        })
    }

    /// Every consumption of the owner, newest id first.
    pub fn list_consumptions(&self, owner_id: i64) -> DbResult<Vec<ConsumptionView>> {
        self.with_conn(|conn| consumption_views(conn, owner_id, Scope::All))
    }

    /// Consumptions within the owner's `days_back` window ending at `now`.
    pub fn recent_consumptions(&self, owner_id: i64, now: i64) -> DbResult<Vec<ConsumptionView>> {
        self.with_conn(|conn| {
            let days_back: Option<i64> = conn.query_row(
                "SELECT days_back FROM users WHERE id = ?1",
                [owner_id],
                |row| row.get(0),
            )?;
            let window = days_back
                .unwrap_or(DEFAULT_DAYS_BACK)
                .saturating_mul(SECONDS_PER_DAY);
            let since = now.saturating_sub(window);
            consumption_views(conn, owner_id, Scope::Since(since))
        })
    }

    /// Every owned drug with its consumption count, by name.
    pub fn list_drugs(&self, owner_id: i64) -> DbResult<Vec<DrugUsage>> {
        self.with_conn(|conn| drug_usage(conn, owner_id, "ORDER BY d.name, d.id", -1))
    }

    /// The owner's most used drugs, capped at their `favorite_count`.
    pub fn favorite_drugs(&self, owner_id: i64) -> DbResult<Vec<DrugUsage>> {
        self.with_conn(|conn| {
            let limit: Option<i64> = conn.query_row(
                "SELECT favorite_count FROM users WHERE id = ?1",
                [owner_id],
                |row| row.get(0),
            )?;
            drug_usage(
                conn,
                owner_id,
                "HAVING use_count > 0 ORDER BY use_count DESC, d.name, d.id",
                limit.unwrap_or(DEFAULT_FAVORITE_COUNT),
            )
        })
    }

    /// Distinct consumption locations with how often each occurs.
    pub fn location_counts(&self, owner_id: i64) -> DbResult<Vec<LocationCount>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT location, COUNT(*) FROM consumptions
                 WHERE owner_id = ?1
                 GROUP BY location
                 ORDER BY location",
            )?;
            let rows = stmt
                .query_map([owner_id], |row| {
                    Ok(LocationCount {
                        location: row.get(0)?,
                        count: row.get(1)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Scenario, obj, seed_user};
    use serde_json::json;

    #[test]
    fn experience_view_nests_reduced_consumptions() {
        let db = Database::open_in_memory().unwrap();
        let owner = seed_user(&db, "alice");
        let s = Scenario::build(&db, owner);

        let view = db.experience_view(owner, s.experience).unwrap();
        assert_eq!(view.experience.title, "My Title");
        assert_eq!(view.experience.date, 1445543583);
        assert_eq!(view.consumptions.len(), 1);

        let c = &view.consumptions[0];
        assert_eq!(c.id, s.consumption);
        assert_eq!(c.count, 2);
        assert_eq!(c.date, 1445648036);
        assert_eq!(c.location, "San Juan");
        assert_eq!(
            c.drug,
            DrugSummary {
                id: s.drug,
                name: "Phenylpiracetam".into(),
                unit: "mg".into()
            }
        );
        assert_eq!(
            c.method,
            MethodSummary {
                id: s.method,
                name: "Oral".into()
            }
        );
        assert!(c.friends.is_empty());
    }

    #[test]
    fn empty_experience_has_empty_consumptions() {
        let db = Database::open_in_memory().unwrap();
        let owner = seed_user(&db, "alice");
        let id = db
            .create_experience(owner, &obj(json!({ "title": "Quiet night", "date": 1 })))
            .unwrap();

        assert!(db.experience_view(owner, id).unwrap().consumptions.is_empty());
        assert!(matches!(db.experience_view(owner, id + 1), Err(DbError::NotFound)));
    }

    #[test]
    fn consumption_view_inlines_friends() {
        let db = Database::open_in_memory().unwrap();
        let owner = seed_user(&db, "alice");
        let s = Scenario::build(&db, owner);
        db.create_friend(owner, s.consumption, &obj(json!({ "name": "Sam" }))).unwrap();
        db.create_friend(owner, s.consumption, &obj(json!({ "name": "Alex" }))).unwrap();

        let view = db.consumption_view(owner, s.consumption).unwrap();
        let names: Vec<&str> = view.friends.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Sam", "Alex"]);

        let bob = seed_user(&db, "bob");
        assert!(matches!(db.consumption_view(bob, s.consumption), Err(DbError::NotFound)));
    }

    #[test]
    fn use_count_tracks_consumptions() {
        let db = Database::open_in_memory().unwrap();
        let owner = seed_user(&db, "alice");
        let s = Scenario::build(&db, owner);
        let second = s.add_consumption(&db, owner, "Ponce");
        db.create_drug(owner, &obj(json!({ "name": "Caffeine", "unit": "mg" }))).unwrap();

        let drugs = db.list_drugs(owner).unwrap();
        let counts: Vec<(&str, i64)> = drugs
            .iter()
            .map(|d| (d.drug.name.as_str(), d.use_count))
            .collect();
        assert_eq!(counts, vec![("Caffeine", 0), ("Phenylpiracetam", 2)]);

        db.delete_consumption(owner, second).unwrap();
        let drugs = db.list_drugs(owner).unwrap();
        assert_eq!(drugs[1].use_count, 1);
    }

    #[test]
    fn favorites_respect_profile_limit() {
        let db = Database::open_in_memory().unwrap();
        let owner = seed_user(&db, "alice");
        let s = Scenario::build(&db, owner);
        db.create_drug(owner, &obj(json!({ "name": "Unused", "unit": "mg" }))).unwrap();

        let favorites = db.favorite_drugs(owner).unwrap();
        assert_eq!(favorites.len(), 1);
        assert_eq!(favorites[0].drug.id, s.drug);

        db.update_profile(owner, &obj(json!({ "favorite_count": 0 }))).unwrap();
        assert!(db.favorite_drugs(owner).unwrap().is_empty());
    }

    #[test]
    fn locations_are_counted_in_order() {
        let db = Database::open_in_memory().unwrap();
        let owner = seed_user(&db, "alice");
        let s = Scenario::build(&db, owner);
        s.add_consumption(&db, owner, "Ponce");
        s.add_consumption(&db, owner, "San Juan");

        let locations = db.location_counts(owner).unwrap();
        assert_eq!(
            locations,
            vec![
                LocationCount { location: "Ponce".into(), count: 1 },
                LocationCount { location: "San Juan".into(), count: 2 },
            ]
        );
    }

    #[test]
    fn recent_window_uses_days_back() {
        let db = Database::open_in_memory().unwrap();
        let owner = seed_user(&db, "alice");
        let s = Scenario::build(&db, owner);
        let consumed_at = 1445648036;

        db.update_profile(owner, &obj(json!({ "days_back": 2 }))).unwrap();
        let inside = db.recent_consumptions(owner, consumed_at + SECONDS_PER_DAY).unwrap();
        assert_eq!(inside.len(), 1);
        assert_eq!(inside[0].id, s.consumption);

        let outside = db.recent_consumptions(owner, consumed_at + 3 * SECONDS_PER_DAY).unwrap();
        assert!(outside.is_empty());
    }

    #[test]
    fn huge_days_back_covers_everything() {
        let db = Database::open_in_memory().unwrap();
        let owner = seed_user(&db, "alice");
        let s = Scenario::build(&db, owner);

        db.update_profile(owner, &obj(json!({ "days_back": 200000000000000_i64 }))).unwrap();
        let recent = db.recent_consumptions(owner, 1445648046).unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].id, s.consumption);

        db.update_profile(owner, &obj(json!({ "days_back": i64::MAX }))).unwrap();
        assert_eq!(db.recent_consumptions(owner, 1445648046).unwrap().len(), 1);
    }
}
