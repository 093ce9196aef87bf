use rusqlite::Connection;
use tracing::info;

use crate::Result;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Running migration v1 (catalog, collections, messages)");
        conn.execute_batch(
            "
            CREATE TABLE users (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                username    TEXT NOT NULL UNIQUE,
                password    TEXT NOT NULL,
                display_name TEXT,
                email       TEXT,
                avatar_url  TEXT,
                created_at  TEXT NOT NULL
            );

            CREATE TABLE pins (
                id                  INTEGER PRIMARY KEY AUTOINCREMENT,
                name                TEXT NOT NULL,
                description         TEXT,
                collection          TEXT,
                image_url           TEXT,
                category            TEXT,
                release_date        TEXT,
                is_limited_edition  INTEGER NOT NULL DEFAULT 0,
                current_value       REAL,
                created_at          TEXT NOT NULL
            );

            CREATE INDEX idx_pins_name ON pins(name);

            CREATE TABLE pin_price_history (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                pin_id      INTEGER NOT NULL REFERENCES pins(id) ON DELETE CASCADE,
                price       REAL NOT NULL,
                source      TEXT NOT NULL,
                recorded_at TEXT NOT NULL
            );

            CREATE INDEX idx_price_history_pin
                ON pin_price_history(pin_id, recorded_at);

            CREATE TABLE user_pins (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id         INTEGER NOT NULL REFERENCES users(id),
                pin_id          INTEGER NOT NULL REFERENCES pins(id) ON DELETE CASCADE,
                added_at        TEXT NOT NULL,
                notes           TEXT,
                for_trade       INTEGER NOT NULL DEFAULT 0,
                purchase_price  REAL,
                purchase_date   TEXT,
                UNIQUE(user_id, pin_id)
            );

            CREATE INDEX idx_user_pins_pin ON user_pins(pin_id);

            CREATE TABLE want_list (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id     INTEGER NOT NULL REFERENCES users(id),
                pin_id      INTEGER NOT NULL REFERENCES pins(id) ON DELETE CASCADE,
                priority    INTEGER NOT NULL DEFAULT 1,
                max_price   REAL,
                added_at    TEXT NOT NULL,
                UNIQUE(user_id, pin_id)
            );

            CREATE INDEX idx_want_list_pin ON want_list(pin_id);

            CREATE TABLE messages (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                sender_id   INTEGER NOT NULL REFERENCES users(id),
                receiver_id INTEGER NOT NULL REFERENCES users(id),
                content     TEXT NOT NULL,
                is_read     INTEGER NOT NULL DEFAULT 0,
                sent_at     TEXT NOT NULL
            );

            CREATE INDEX idx_messages_receiver
                ON messages(receiver_id, sent_at);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    if version < 2 {
        info!("Running migration v2 (admin flag, revoked tokens)");
        conn.execute_batch(
            "
            ALTER TABLE users ADD COLUMN is_admin INTEGER NOT NULL DEFAULT 0;

            CREATE TABLE revoked_tokens (
                jti         TEXT PRIMARY KEY,
                expires_at  INTEGER NOT NULL
            );

            INSERT INTO schema_version (version) VALUES (2);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
