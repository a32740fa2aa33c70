use rusqlite::types::Value as SqlValue;
use rusqlite::{ErrorCode, params, params_from_iter};
use serde_json::{Map, Value};
use tracing::debug;

use dosetrack_types::models::UserProfile;

use crate::error::OptionalExt;
use crate::fields::{self, Mode, USER_FIELDS};
use crate::models::{PROFILE_COLUMNS, UserRow, profile_from_row};
use crate::{Database, DbError, DbResult};

impl Database {
    /// Insert a user with an already-hashed secret. Returns the new id.
    pub fn create_user(&self, username: &str, password_hash: &str) -> DbResult<i64> {
        self.with_conn(|conn| {
            match conn.execute(
                "INSERT INTO users (username, password) VALUES (?1, ?2)",
                params![username, password_hash],
            ) {
                Ok(_) => Ok(conn.last_insert_rowid()),
                Err(rusqlite::Error::SqliteFailure(e, _))
                    if e.code == ErrorCode::ConstraintViolation =>
                {
                    Err(DbError::Duplicate { field: "username" })
                }
                Err(e) => Err(e.into()),
            }
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> DbResult<Option<UserRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT id, username, password FROM users WHERE username = ?1",
                [username],
                |row| {
                    Ok(UserRow {
                        id: row.get(0)?,
                        username: row.get(1)?,
                        password: row.get(2)?,
                    })
                },
            )
            .optional()
        })
    }

    pub fn get_profile(&self, user_id: i64) -> DbResult<UserProfile> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {} FROM users WHERE id = ?1", PROFILE_COLUMNS);
            conn.query_row(&sql, [user_id], profile_from_row)
                .optional()?
                .ok_or(DbError::NotFound)
        })
    }

    /// Apply custom-field changes. All-or-nothing, like every other kind.
    pub fn update_profile(&self, user_id: i64, input: &Map<String, Value>) -> DbResult<()> {
        let assignments = fields::parse(USER_FIELDS, input, Mode::Update)?;

        let sets: Vec<String> = assignments
            .iter()
            .enumerate()
            .map(|(i, a)| format!("{} = ?{}", a.column, i + 1))
            .collect();
        let sql = format!(
            "UPDATE users SET {} WHERE id = ?{}",
            sets.join(", "),
            assignments.len() + 1
        );

        let id = SqlValue::Integer(user_id);
        self.with_conn(|conn| {
            let changed = conn.execute(
                &sql,
                params_from_iter(assignments.iter().map(|a| &a.value).chain(std::iter::once(&id))),
            )?;
            if changed == 0 {
                return Err(DbError::NotFound);
            }
            debug!("Updated {} profile field(s) for user {}", assignments.len(), user_id);
            Ok(())
        })
    }
}
