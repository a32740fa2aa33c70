use rusqlite::Connection;
use tracing::info;

use crate::DbResult;

pub fn run(conn: &Connection) -> DbResult<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        // AUTOINCREMENT keeps ids from being reused after a delete.
        conn.execute_batch(
            "
            CREATE TABLE users (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                username        TEXT NOT NULL UNIQUE,
                password        TEXT NOT NULL,
                emergency_contacts TEXT,
                phone           TEXT,
                days_back       INTEGER,
                favorite_count  INTEGER,
                created_at      TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE drugs (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                name            TEXT NOT NULL,
                unit            TEXT NOT NULL,
                notes           TEXT,
                classification  TEXT,
                family          TEXT,
                rarity          TEXT,
                slang           TEXT,
                owner_id        INTEGER NOT NULL REFERENCES users(id)
            );

            CREATE INDEX idx_drugs_owner ON drugs(owner_id, name);

            CREATE TABLE methods (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                name            TEXT NOT NULL,
                icon            BLOB,
                owner_id        INTEGER NOT NULL REFERENCES users(id)
            );

            CREATE INDEX idx_methods_owner ON methods(owner_id);

            CREATE TABLE experiences (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                title           TEXT NOT NULL,
                date            INTEGER NOT NULL,
                location        TEXT,
                notes           TEXT,
                rating          INTEGER,
                panic           INTEGER,
                owner_id        INTEGER NOT NULL REFERENCES users(id)
            );

            CREATE INDEX idx_experiences_owner ON experiences(owner_id);

            CREATE TABLE consumptions (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                count           INTEGER NOT NULL,
                date            INTEGER NOT NULL,
                location        TEXT NOT NULL,
                drug_id         INTEGER NOT NULL,
                method_id       INTEGER NOT NULL,
                experience_id   INTEGER NOT NULL,
                owner_id        INTEGER NOT NULL REFERENCES users(id)
            );

            CREATE INDEX idx_consumptions_owner ON consumptions(owner_id, date);
            CREATE INDEX idx_consumptions_drug ON consumptions(drug_id);
            CREATE INDEX idx_consumptions_method ON consumptions(method_id);
            CREATE INDEX idx_consumptions_experience ON consumptions(experience_id);

            CREATE TABLE friends (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                name            TEXT NOT NULL,
                consumption_id  INTEGER NOT NULL,
                owner_id        INTEGER NOT NULL REFERENCES users(id)
            );

            CREATE INDEX idx_friends_consumption ON friends(consumption_id);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
