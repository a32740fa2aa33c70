use dosetrack_types::models::Consumption;
use serde::Serialize;
use thiserror::Error;

/// One offending key in a create/update payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    pub field: String,
    pub problem: String,
}

impl FieldIssue {
    pub fn new(field: impl Into<String>, problem: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            problem: problem.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum DbError {
    #[error("invalid fields: {}", describe(.0))]
    Validation(Vec<FieldIssue>),

    /// Absent or owned by someone else. The two cases are never told apart.
    #[error("not found")]
    NotFound,

    /// Delete blocked by the consumptions that still reference the row.
    #[error("delete blocked by {} referencing consumption(s)", .0.len())]
    Conflict(Vec<Consumption>),

    #[error("{field} already taken")]
    Duplicate { field: &'static str },

    #[error("database error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("database lock poisoned")]
    Lock,
}

pub type DbResult<T> = Result<T, DbError>;

fn describe(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(|i| format!("{} ({})", i.field, i.problem))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Extension trait for optional query results
pub(crate) trait OptionalExt<T> {
    fn optional(self) -> DbResult<Option<T>>;
}

impl<T> OptionalExt<T> for Result<T, rusqlite::Error> {
    fn optional(self) -> DbResult<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
