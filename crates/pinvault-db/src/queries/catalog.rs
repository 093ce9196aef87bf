use pinvault_types::models::{NewPin, Pin, PinStats, PriceHistoryEntry};
use rusqlite::{Connection, OptionalExtension};

use super::{PIN_COLUMNS, now_ts, parse_ts, pin_from_row};
use crate::repo::CatalogRepository;
use crate::{Database, Error, Result};

impl CatalogRepository for Database {
    fn list_pins(&self) -> Result<Vec<Pin>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {PIN_COLUMNS} FROM pins p ORDER BY p.id");
            let mut stmt = conn.prepare(&sql)?;
            let pins = stmt
                .query_map([], |row| pin_from_row(row, 0))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(pins)
        })
    }

    fn pin(&self, id: i64) -> Result<Pin> {
        self.with_conn(|conn| query_pin(conn, id))
    }

    fn find_pin_by_name(&self, name: &str) -> Result<Option<Pin>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {PIN_COLUMNS} FROM pins p WHERE p.name = ?1 ORDER BY p.id LIMIT 1");
            let pin = conn
                .query_row(&sql, [name], |row| pin_from_row(row, 0))
                .optional()?;
            Ok(pin)
        })
    }

    fn create_pin(&self, pin: &NewPin) -> Result<Pin> {
        self.with_conn(|conn| insert_pin(conn, pin))
    }

    fn update_pin_value(&self, id: i64, value: f64) -> Result<Pin> {
        self.with_conn(|conn| {
            set_value(conn, id, value)?;
            query_pin(conn, id)
        })
    }

    fn append_price(&self, pin_id: i64, price: f64, source: &str) -> Result<PriceHistoryEntry> {
        self.with_conn(|conn| {
            ensure_pin(conn, pin_id)?;
            insert_price(conn, pin_id, price, source, &now_ts())
        })
    }

    fn record_price(&self, pin_id: i64, price: f64, source: &str) -> Result<Pin> {
        self.with_tx(|tx| {
            set_value(tx, pin_id, price)?;
            insert_price(tx, pin_id, price, source, &now_ts())?;
            query_pin(tx, pin_id)
        })
    }

    fn import_pin(&self, pin: &NewPin, source: &str) -> Result<Pin> {
        self.with_tx(|tx| {
            let created = insert_pin(tx, pin)?;
            if let Some(value) = created.current_value.filter(|v| *v > 0.0) {
                insert_price(tx, created.id, value, source, &now_ts())?;
            }
            Ok(created)
        })
    }

    fn price_history(&self, pin_id: i64) -> Result<Vec<PriceHistoryEntry>> {
        self.with_conn(|conn| {
            ensure_pin(conn, pin_id)?;
            let mut stmt = conn.prepare(
                "SELECT id, pin_id, price, source, recorded_at
                 FROM pin_price_history
                 WHERE pin_id = ?1
                 ORDER BY recorded_at ASC, id ASC",
            )?;
            let rows = stmt
                .query_map([pin_id], |row| {
                    Ok(PriceHistoryEntry {
                        id: row.get(0)?,
                        pin_id: row.get(1)?,
                        price: row.get(2)?,
                        source: row.get(3)?,
                        recorded_at: parse_ts(&row.get::<_, String>(4)?),
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    fn pin_stats(&self, pin_id: i64) -> Result<PinStats> {
        self.with_conn(|conn| {
            ensure_pin(conn, pin_id)?;
            let (have_count, want_count) = conn.query_row(
                "SELECT
                    (SELECT COUNT(*) FROM user_pins WHERE pin_id = ?1),
                    (SELECT COUNT(*) FROM want_list WHERE pin_id = ?1)",
                [pin_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )?;
            Ok(PinStats {
                have_count,
                want_count,
            })
        })
    }
}

pub(crate) fn query_pin(conn: &Connection, id: i64) -> Result<Pin> {
    let sql = format!("SELECT {PIN_COLUMNS} FROM pins p WHERE p.id = ?1");
    conn.query_row(&sql, [id], |row| pin_from_row(row, 0))
        .optional()?
        .ok_or(Error::NotFound("pin"))
}

pub(crate) fn ensure_pin(conn: &Connection, id: i64) -> Result<()> {
    let found: Option<i64> = conn
        .query_row("SELECT id FROM pins WHERE id = ?1", [id], |row| row.get(0))
        .optional()?;
    found.map(|_| ()).ok_or(Error::NotFound("pin"))
}

pub(crate) fn insert_pin(conn: &Connection, pin: &NewPin) -> Result<Pin> {
    conn.execute(
        "INSERT INTO pins (name, description, collection, image_url, category, release_date,
                           is_limited_edition, current_value, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        rusqlite::params![
            pin.name,
            pin.description,
            pin.collection,
            pin.image_url,
            pin.category,
            pin.release_date,
            pin.is_limited_edition,
            pin.current_value,
            now_ts(),
        ],
    )?;
    query_pin(conn, conn.last_insert_rowid())
}

pub(crate) fn insert_price(
    conn: &Connection,
    pin_id: i64,
    price: f64,
    source: &str,
    recorded_at: &str,
) -> Result<PriceHistoryEntry> {
    conn.execute(
        "INSERT INTO pin_price_history (pin_id, price, source, recorded_at) VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![pin_id, price, source, recorded_at],
    )?;
    Ok(PriceHistoryEntry {
        id: conn.last_insert_rowid(),
        pin_id,
        price,
        source: source.to_string(),
        recorded_at: parse_ts(recorded_at),
    })
}

fn set_value(conn: &Connection, id: i64, value: f64) -> Result<()> {
    let changed = conn.execute(
        "UPDATE pins SET current_value = ?2 WHERE id = ?1",
        rusqlite::params![id, value],
    )?;
    if changed == 0 {
        return Err(Error::NotFound("pin"));
    }
    Ok(())
}
