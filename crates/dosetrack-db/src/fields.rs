//! Static per-kind field allow-lists.
//!
//! Payloads arrive as loose JSON objects. Every key is matched against a
//! fixed table before the store is touched, and SQL only ever names the
//! table's own `&'static str` columns, never a caller-supplied key.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;
use rusqlite::types::Value as SqlValue;
use serde_json::{Map, Value};

use crate::{DbError, DbResult, FieldIssue};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    /// Non-negative integer.
    Count,
    /// Unix seconds, as a JSON integer or a string of digits.
    Timestamp,
    /// Base64 on the wire, BLOB in the store.
    Blob,
    /// Id of another row that must belong to the same owner.
    Reference,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldSpec {
    const fn required(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: true,
        }
    }

    const fn optional(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: false,
        }
    }

    fn coerce(&self, raw: &Value) -> Result<SqlValue, &'static str> {
        if raw.is_null() {
            return if self.required {
                Err("must not be null")
            } else {
                Ok(SqlValue::Null)
            };
        }

        match self.kind {
            FieldKind::Text => match raw.as_str() {
                Some(s) if self.required && s.trim().is_empty() => Err("must not be blank"),
                Some(s) => Ok(SqlValue::Text(s.to_string())),
                None => Err("must be a string"),
            },
            FieldKind::Integer => raw.as_i64().map(SqlValue::Integer).ok_or("must be an integer"),
            FieldKind::Count => match raw.as_i64() {
                Some(n) if n >= 0 => Ok(SqlValue::Integer(n)),
                _ => Err("must be a non-negative integer"),
            },
            FieldKind::Reference => match raw.as_i64() {
                Some(n) if n > 0 => Ok(SqlValue::Integer(n)),
                _ => Err("must be a positive id"),
            },
            FieldKind::Timestamp => {
                let parsed = match raw {
                    Value::Number(n) => n.as_i64(),
                    Value::String(s) => s.trim().parse::<i64>().ok(),
                    _ => None,
                };
                parsed
                    .map(SqlValue::Integer)
                    .ok_or("must be a unix timestamp in seconds")
            }
            FieldKind::Blob => raw
                .as_str()
                .and_then(|s| B64.decode(s).ok())
                .map(SqlValue::Blob)
                .ok_or("must be base64"),
        }
    }
}

use FieldKind::*;

pub const DRUG_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("name", Text),
    FieldSpec::required("unit", Text),
    FieldSpec::optional("notes", Text),
    FieldSpec::optional("classification", Text),
    FieldSpec::optional("family", Text),
    FieldSpec::optional("rarity", Text),
    FieldSpec::optional("slang", Text),
];

pub const METHOD_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("name", Text),
    FieldSpec::optional("icon", Blob),
];

pub const EXPERIENCE_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("title", Text),
    FieldSpec::required("date", Timestamp),
    FieldSpec::optional("location", Text),
    FieldSpec::optional("notes", Text),
    FieldSpec::optional("rating", Integer),
    FieldSpec::optional("panic", Integer),
];

pub const CONSUMPTION_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("count", Count),
    FieldSpec::required("date", Timestamp),
    FieldSpec::required("location", Text),
    FieldSpec::required("drug_id", Reference),
    FieldSpec::required("method_id", Reference),
    FieldSpec::required("experience_id", Reference),
];

pub const FRIEND_FIELDS: &[FieldSpec] = &[FieldSpec::required("name", Text)];

pub const USER_FIELDS: &[FieldSpec] = &[
    FieldSpec::optional("emergency_contacts", Text),
    FieldSpec::optional("phone", Text),
    FieldSpec::optional("days_back", Count),
    FieldSpec::optional("favorite_count", Count),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Every required field must be present.
    Create,
    /// At least one field must be present.
    Update,
}

/// A validated `column = value` pair. `column` always comes from a static
/// allow-list.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub column: &'static str,
    pub value: SqlValue,
}

impl Assignment {
    pub fn new(column: &'static str, value: SqlValue) -> Self {
        Self { column, value }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self.value {
            SqlValue::Integer(n) => Some(n),
            _ => None,
        }
    }
}

/// Validate `input` against `specs`. Any unknown or malformed key rejects
/// the whole payload, with one issue per offending key.
pub fn parse(
    specs: &[FieldSpec],
    input: &Map<String, Value>,
    mode: Mode,
) -> DbResult<Vec<Assignment>> {
    if mode == Mode::Update && input.is_empty() {
        return Err(DbError::Validation(vec![FieldIssue::new(
            "*",
            "no fields supplied",
        )]));
    }

    let mut issues = Vec::new();
    let mut assignments = Vec::with_capacity(input.len());

    for (key, raw) in input {
        let Some(spec) = specs.iter().find(|s| s.name == key) else {
            issues.push(FieldIssue::new(key, "not an allowed field"));
            continue;
        };
        match spec.coerce(raw) {
            Ok(value) => assignments.push(Assignment::new(spec.name, value)),
            Err(problem) => issues.push(FieldIssue::new(key, problem)),
        }
    }

    if mode == Mode::Create {
        for spec in specs.iter().filter(|s| s.required) {
            if !input.contains_key(spec.name) {
                issues.push(FieldIssue::new(spec.name, "required"));
            }
        }
    }

    if issues.is_empty() {
        Ok(assignments)
    } else {
        Err(DbError::Validation(issues))
    }
}
