use pinvault_types::models::User;
use rusqlite::{Connection, OptionalExtension};

use super::{USER_COLUMNS, now_ts, parse_ts, user_from_row};
use crate::models::{NewUser, UserRow};
use crate::repo::{TokenRepository, UserRepository};
use crate::{Database, Result, conflict_on_unique};

impl UserRepository for Database {
    fn create_user(&self, user: &NewUser) -> Result<User> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (username, password, display_name, email, avatar_url, is_admin, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                rusqlite::params![
                    user.username,
                    user.password_hash,
                    user.display_name,
                    user.email,
                    user.avatar_url,
                    user.is_admin,
                    now_ts(),
                ],
            )
            .map_err(|e| conflict_on_unique(e, "username already exists"))?;

            let id = conn.last_insert_rowid();
            query_user_by_id(conn, id)?.ok_or(crate::Error::NotFound("user"))
        })
    }

    fn user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        let username = username.trim();
        if username.is_empty() {
            return Ok(None);
        }
        self.with_conn(|conn| query_user_row(conn, username))
    }

    fn user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.with_conn(|conn| query_user_by_id(conn, id))
    }

    fn set_admin(&self, username: &str, is_admin: bool) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE users SET is_admin = ?2 WHERE username = ?1",
                rusqlite::params![username, is_admin],
            )?;
            Ok(changed > 0)
        })
    }
}

impl TokenRepository for Database {
    fn revoke_token(&self, jti: &str, expires_at: i64) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT OR IGNORE INTO revoked_tokens (jti, expires_at) VALUES (?1, ?2)",
                rusqlite::params![jti, expires_at],
            )?;
            Ok(())
        })
    }

    fn is_token_revoked(&self, jti: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let found: Option<i64> = conn
                .query_row("SELECT 1 FROM revoked_tokens WHERE jti = ?1", [jti], |row| {
                    row.get(0)
                })
                .optional()?;
            Ok(found.is_some())
        })
    }

    fn prune_revoked_tokens(&self, now: i64) -> Result<usize> {
        self.with_conn(|conn| {
            let removed = conn.execute("DELETE FROM revoked_tokens WHERE expires_at < ?1", [now])?;
            Ok(removed)
        })
    }
}

pub(crate) fn query_user_by_id(conn: &Connection, id: i64) -> Result<Option<User>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users u WHERE u.id = ?1");
    let user = conn
        .query_row(&sql, [id], |row| user_from_row(row, 0))
        .optional()?;
    Ok(user)
}

fn query_user_row(conn: &Connection, username: &str) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, username, password, display_name, email, avatar_url, is_admin, created_at
         FROM users WHERE username = ?1",
    )?;

    let row = stmt
        .query_row([username], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                username: row.get(1)?,
                password: row.get(2)?,
                display_name: row.get(3)?,
                email: row.get(4)?,
                avatar_url: row.get(5)?,
                is_admin: row.get(6)?,
                created_at: parse_ts(&row.get::<_, String>(7)?),
            })
        })
        .optional()?;

    Ok(row)
}
