mod catalog;
mod collections;
mod messages;
mod users;

pub(crate) use catalog::{insert_pin, insert_price};

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use pinvault_types::models::{Pin, User};
use rusqlite::Row;
use tracing::warn;

pub(crate) const PIN_COLUMNS: &str = "p.id, p.name, p.description, p.collection, p.image_url, \
     p.category, p.release_date, p.is_limited_edition, p.current_value, p.created_at";

pub(crate) const USER_COLUMNS: &str =
    "u.id, u.username, u.display_name, u.email, u.avatar_url, u.is_admin, u.created_at";

pub(crate) fn format_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn now_ts() -> String {
    format_ts(Utc::now())
}

/// Timestamps are written as RFC 3339, but rows inserted by hand through the
/// sqlite shell use `datetime('now')` ("YYYY-MM-DD HH:MM:SS", UTC).
pub(crate) fn parse_ts(raw: &str) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc()))
        .unwrap_or_else(|e| {
            warn!("Corrupt timestamp '{}': {}", raw, e);
            DateTime::default()
        })
}

pub(crate) fn parse_date(raw: Option<String>) -> Option<NaiveDate> {
    raw.and_then(|d| match NaiveDate::parse_from_str(&d, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(e) => {
            warn!("Corrupt date '{}': {}", d, e);
            None
        }
    })
}

pub(crate) fn format_date(date: Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.format("%Y-%m-%d").to_string())
}

/// Reads the ten `PIN_COLUMNS` starting at column `start`.
pub(crate) fn pin_from_row(row: &Row<'_>, start: usize) -> rusqlite::Result<Pin> {
    Ok(Pin {
        id: row.get(start)?,
        name: row.get(start + 1)?,
        description: row.get(start + 2)?,
        collection: row.get(start + 3)?,
        image_url: row.get(start + 4)?,
        category: row.get(start + 5)?,
        release_date: row.get(start + 6)?,
        is_limited_edition: row.get(start + 7)?,
        current_value: row.get(start + 8)?,
        created_at: parse_ts(&row.get::<_, String>(start + 9)?),
    })
}

/// Reads the seven `USER_COLUMNS` starting at column `start`.
pub(crate) fn user_from_row(row: &Row<'_>, start: usize) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(start)?,
        username: row.get(start + 1)?,
        display_name: row.get(start + 2)?,
        email: row.get(start + 3)?,
        avatar_url: row.get(start + 4)?,
        is_admin: row.get(start + 5)?,
        created_at: parse_ts(&row.get::<_, String>(start + 6)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rfc3339_and_sqlite_timestamps() {
        let written = format_ts(Utc::now());
        assert_ne!(parse_ts(&written), DateTime::<Utc>::default());

        let sqlite = parse_ts("2024-03-01 12:30:00");
        assert_eq!(format_ts(sqlite), "2024-03-01T12:30:00.000000Z");
    }

    #[test]
    fn corrupt_timestamp_falls_back_to_epoch() {
        assert_eq!(parse_ts("yesterday"), DateTime::<Utc>::default());
    }

    #[test]
    fn date_roundtrip_through_text() {
        let date = NaiveDate::from_ymd_opt(2023, 2, 14);
        assert_eq!(parse_date(format_date(date)), date);
        assert_eq!(parse_date(Some("14/02/2023".to_string())), None);
    }
}
