//! Row mappings. `UserRow` carries the secret digest and never leaves the
//! server; the other kinds map straight onto the shared record types.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;
use rusqlite::Row;

use dosetrack_types::models::{Consumption, Drug, Experience, Friend, Method, UserProfile};

use crate::fields::{
    CONSUMPTION_FIELDS, DRUG_FIELDS, EXPERIENCE_FIELDS, FRIEND_FIELDS, FieldSpec, METHOD_FIELDS,
};
use crate::repository::Entity;

pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub password: String,
}

pub(crate) const PROFILE_COLUMNS: &str =
    "id, username, emergency_contacts, phone, days_back, favorite_count";

pub(crate) fn profile_from_row(row: &Row<'_>) -> rusqlite::Result<UserProfile> {
    Ok(UserProfile {
        id: row.get(0)?,
        username: row.get(1)?,
        emergency_contacts: row.get(2)?,
        phone: row.get(3)?,
        days_back: row.get(4)?,
        favorite_count: row.get(5)?,
    })
}

impl Entity for Drug {
    const TABLE: &'static str = "drugs";
    const COLUMNS: &'static str =
        "id, name, unit, notes, classification, family, rarity, slang, owner_id";
    const FIELDS: &'static [FieldSpec] = DRUG_FIELDS;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Drug {
            id: row.get(0)?,
            name: row.get(1)?,
            unit: row.get(2)?,
            notes: row.get(3)?,
            classification: row.get(4)?,
            family: row.get(5)?,
            rarity: row.get(6)?,
            slang: row.get(7)?,
            owner_id: row.get(8)?,
        })
    }
}

impl Entity for Method {
    const TABLE: &'static str = "methods";
    const COLUMNS: &'static str = "id, name, icon, owner_id";
    const FIELDS: &'static [FieldSpec] = METHOD_FIELDS;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let icon: Option<Vec<u8>> = row.get(2)?;
        Ok(Method {
            id: row.get(0)?,
            name: row.get(1)?,
            icon: icon.map(|bytes| B64.encode(bytes)),
            owner_id: row.get(3)?,
        })
    }
}

impl Entity for Experience {
    const TABLE: &'static str = "experiences";
    const COLUMNS: &'static str = "id, title, date, location, notes, rating, panic, owner_id";
    const FIELDS: &'static [FieldSpec] = EXPERIENCE_FIELDS;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Experience {
            id: row.get(0)?,
            title: row.get(1)?,
            date: row.get(2)?,
            location: row.get(3)?,
            notes: row.get(4)?,
            rating: row.get(5)?,
            panic: row.get(6)?,
            owner_id: row.get(7)?,
        })
    }
}

impl Entity for Consumption {
    const TABLE: &'static str = "consumptions";
    const COLUMNS: &'static str =
        "id, count, date, location, drug_id, method_id, experience_id, owner_id";
    const FIELDS: &'static [FieldSpec] = CONSUMPTION_FIELDS;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Consumption {
            id: row.get(0)?,
            count: row.get(1)?,
            date: row.get(2)?,
            location: row.get(3)?,
            drug_id: row.get(4)?,
            method_id: row.get(5)?,
            experience_id: row.get(6)?,
            owner_id: row.get(7)?,
        })
    }
}

impl Entity for Friend {
    const TABLE: &'static str = "friends";
    const COLUMNS: &'static str = "id, name, consumption_id, owner_id";
    const FIELDS: &'static [FieldSpec] = FRIEND_FIELDS;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Friend {
            id: row.get(0)?,
            name: row.get(1)?,
            consumption_id: row.get(2)?,
            owner_id: row.get(3)?,
        })
    }
}
