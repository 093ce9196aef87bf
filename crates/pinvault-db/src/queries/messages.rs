use pinvault_types::models::{Message, MessageWithSender};
use rusqlite::{Connection, OptionalExtension, Row};

use super::users::query_user_by_id;
use super::{USER_COLUMNS, now_ts, parse_ts, user_from_row};
use crate::repo::MessageRepository;
use crate::{Database, Error, Result};

impl MessageRepository for Database {
    fn send_message(&self, sender_id: i64, receiver_id: i64, content: &str) -> Result<Message> {
        self.with_conn(|conn| {
            if query_user_by_id(conn, receiver_id)?.is_none() {
                return Err(Error::NotFound("receiver"));
            }
            conn.execute(
                "INSERT INTO messages (sender_id, receiver_id, content, is_read, sent_at)
                 VALUES (?1, ?2, ?3, 0, ?4)",
                rusqlite::params![sender_id, receiver_id, content, now_ts()],
            )?;
            query_message(conn, conn.last_insert_rowid())
        })
    }

    fn messages_for_user(&self, user_id: i64) -> Result<Vec<MessageWithSender>> {
        // JOIN users to fetch the sender in a single query
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT m.id, m.sender_id, m.receiver_id, m.content, m.is_read, m.sent_at, {USER_COLUMNS}
                 FROM messages m
                 JOIN users u ON u.id = m.sender_id
                 WHERE m.receiver_id = ?1
                 ORDER BY m.sent_at DESC, m.id DESC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([user_id], |row| {
                    Ok(MessageWithSender {
                        message: message_from_row(row)?,
                        sender: user_from_row(row, 6)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    fn message(&self, id: i64) -> Result<Message> {
        self.with_conn(|conn| query_message(conn, id))
    }

    fn mark_read(&self, id: i64) -> Result<Message> {
        self.with_conn(|conn| {
            let changed = conn.execute("UPDATE messages SET is_read = 1 WHERE id = ?1", [id])?;
            if changed == 0 {
                return Err(Error::NotFound("message"));
            }
            query_message(conn, id)
        })
    }
}

fn message_from_row(row: &Row<'_>) -> rusqlite::Result<Message> {
    Ok(Message {
        id: row.get(0)?,
        sender_id: row.get(1)?,
        receiver_id: row.get(2)?,
        content: row.get(3)?,
        is_read: row.get(4)?,
        sent_at: parse_ts(&row.get::<_, String>(5)?),
    })
}

fn query_message(conn: &Connection, id: i64) -> Result<Message> {
    conn.query_row(
        "SELECT id, sender_id, receiver_id, content, is_read, sent_at FROM messages WHERE id = ?1",
        [id],
        message_from_row,
    )
    .optional()?
    .ok_or(Error::NotFound("message"))
}
