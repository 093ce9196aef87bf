//! Database row types that never cross the API boundary as-is.

use chrono::{DateTime, Utc};
use pinvault_types::models::User;

/// Full user row including the password hash.
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub password: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            username: row.username,
            display_name: row.display_name,
            email: row.email,
            avatar_url: row.avatar_url,
            is_admin: row.is_admin,
            created_at: row.created_at,
        }
    }
}

pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    pub is_admin: bool,
}
