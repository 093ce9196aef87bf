use pinvault_types::models::{
    CollectionChanges, CollectionEntry, CollectionItem, NewCollectionEntry, NewWantListEntry,
    WantListChanges, WantListEntry, WantListItem,
};
use rusqlite::{Connection, OptionalExtension, Row};

use super::catalog::ensure_pin;
use super::{PIN_COLUMNS, format_date, now_ts, parse_date, parse_ts, pin_from_row};
use crate::repo::{CollectionRepository, WantListRepository};
use crate::{Database, Error, Result, conflict_on_unique};

const COLLECTION_COLUMNS: &str = "up.id, up.user_id, up.pin_id, up.added_at, up.notes, \
     up.for_trade, up.purchase_price, up.purchase_date";

const WANT_COLUMNS: &str = "w.id, w.user_id, w.pin_id, w.priority, w.max_price, w.added_at";

impl CollectionRepository for Database {
    fn list_collection(&self, user_id: i64) -> Result<Vec<CollectionItem>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {COLLECTION_COLUMNS}, {PIN_COLUMNS}
                 FROM user_pins up
                 JOIN pins p ON p.id = up.pin_id
                 WHERE up.user_id = ?1
                 ORDER BY up.added_at, up.id"
            );
            let mut stmt = conn.prepare(&sql)?;
            let items = stmt
                .query_map([user_id], |row| {
                    Ok(CollectionItem {
                        entry: collection_from_row(row)?,
                        pin: pin_from_row(row, 8)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(items)
        })
    }

    fn add_to_collection(&self, user_id: i64, entry: &NewCollectionEntry) -> Result<CollectionEntry> {
        self.with_conn(|conn| {
            ensure_pin(conn, entry.pin_id)?;
            conn.execute(
                "INSERT INTO user_pins (user_id, pin_id, added_at, notes, for_trade, purchase_price, purchase_date)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                rusqlite::params![
                    user_id,
                    entry.pin_id,
                    now_ts(),
                    entry.notes,
                    entry.for_trade,
                    entry.purchase_price,
                    format_date(entry.purchase_date),
                ],
            )
            .map_err(|e| conflict_on_unique(e, "pin is already in your collection"))?;
            query_collection_entry(conn, user_id, entry.pin_id)
        })
    }

    fn update_collection_entry(
        &self,
        user_id: i64,
        entry_id: i64,
        changes: &CollectionChanges,
    ) -> Result<CollectionEntry> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE user_pins SET
                    notes = COALESCE(?3, notes),
                    for_trade = COALESCE(?4, for_trade),
                    purchase_price = COALESCE(?5, purchase_price),
                    purchase_date = COALESCE(?6, purchase_date)
                 WHERE user_id = ?1 AND id = ?2",
                rusqlite::params![
                    user_id,
                    entry_id,
                    changes.notes,
                    changes.for_trade,
                    changes.purchase_price,
                    format_date(changes.purchase_date),
                ],
            )?;
            if changed == 0 {
                return Err(Error::NotFound("collection entry"));
            }
            collection_entry_by_id(conn, user_id, entry_id)
        })
    }

    fn remove_from_collection(&self, user_id: i64, pin_id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let removed = conn.execute(
                "DELETE FROM user_pins WHERE user_id = ?1 AND pin_id = ?2",
                [user_id, pin_id],
            )?;
            Ok(removed > 0)
        })
    }
}

impl WantListRepository for Database {
    fn list_want_list(&self, user_id: i64) -> Result<Vec<WantListItem>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {WANT_COLUMNS}, {PIN_COLUMNS}
                 FROM want_list w
                 JOIN pins p ON p.id = w.pin_id
                 WHERE w.user_id = ?1
                 ORDER BY w.added_at, w.id"
            );
            let mut stmt = conn.prepare(&sql)?;
            let items = stmt
                .query_map([user_id], |row| {
                    Ok(WantListItem {
                        entry: want_from_row(row)?,
                        pin: pin_from_row(row, 6)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(items)
        })
    }

    fn add_to_want_list(&self, user_id: i64, entry: &NewWantListEntry) -> Result<WantListEntry> {
        self.with_conn(|conn| {
            ensure_pin(conn, entry.pin_id)?;
            conn.execute(
                "INSERT INTO want_list (user_id, pin_id, priority, max_price, added_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![user_id, entry.pin_id, entry.priority, entry.max_price, now_ts()],
            )
            .map_err(|e| conflict_on_unique(e, "pin is already on your want list"))?;
            query_want_entry(conn, user_id, entry.pin_id)
        })
    }

    fn update_want_list_entry(
        &self,
        user_id: i64,
        entry_id: i64,
        changes: &WantListChanges,
    ) -> Result<WantListEntry> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE want_list SET
                    priority = COALESCE(?3, priority),
                    max_price = COALESCE(?4, max_price)
                 WHERE user_id = ?1 AND id = ?2",
                rusqlite::params![user_id, entry_id, changes.priority, changes.max_price],
            )?;
            if changed == 0 {
                return Err(Error::NotFound("want list entry"));
            }
            want_entry_by_id(conn, user_id, entry_id)
        })
    }

    fn remove_from_want_list(&self, user_id: i64, pin_id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let removed = conn.execute(
                "DELETE FROM want_list WHERE user_id = ?1 AND pin_id = ?2",
                [user_id, pin_id],
            )?;
            Ok(removed > 0)
        })
    }
}

fn collection_from_row(row: &Row<'_>) -> rusqlite::Result<CollectionEntry> {
    Ok(CollectionEntry {
        id: row.get(0)?,
        user_id: row.get(1)?,
        pin_id: row.get(2)?,
        added_at: parse_ts(&row.get::<_, String>(3)?),
        notes: row.get(4)?,
        for_trade: row.get(5)?,
        purchase_price: row.get(6)?,
        purchase_date: parse_date(row.get(7)?),
    })
}

fn want_from_row(row: &Row<'_>) -> rusqlite::Result<WantListEntry> {
    Ok(WantListEntry {
        id: row.get(0)?,
        user_id: row.get(1)?,
        pin_id: row.get(2)?,
        priority: row.get(3)?,
        max_price: row.get(4)?,
        added_at: parse_ts(&row.get::<_, String>(5)?),
    })
}

fn query_collection_entry(conn: &Connection, user_id: i64, pin_id: i64) -> Result<CollectionEntry> {
    let sql = format!("SELECT {COLLECTION_COLUMNS} FROM user_pins up WHERE up.user_id = ?1 AND up.pin_id = ?2");
    conn.query_row(&sql, [user_id, pin_id], collection_from_row)
        .optional()?
        .ok_or(Error::NotFound("collection entry"))
}

fn query_want_entry(conn: &Connection, user_id: i64, pin_id: i64) -> Result<WantListEntry> {
    let sql = format!("SELECT {WANT_COLUMNS} FROM want_list w WHERE w.user_id = ?1 AND w.pin_id = ?2");
    conn.query_row(&sql, [user_id, pin_id], want_from_row)
        .optional()?
        .ok_or(Error::NotFound("want list entry"))
}

fn collection_entry_by_id(conn: &Connection, user_id: i64, entry_id: i64) -> Result<CollectionEntry> {
    let sql = format!("SELECT {COLLECTION_COLUMNS} FROM user_pins up WHERE up.user_id = ?1 AND up.id = ?2");
    conn.query_row(&sql, [user_id, entry_id], collection_from_row)
        .optional()?
        .ok_or(Error::NotFound("collection entry"))
}

fn want_entry_by_id(conn: &Connection, user_id: i64, entry_id: i64) -> Result<WantListEntry> {
    let sql = format!("SELECT {WANT_COLUMNS} FROM want_list w WHERE w.user_id = ?1 AND w.id = ?2");
    conn.query_row(&sql, [user_id, entry_id], want_from_row)
        .optional()?
        .ok_or(Error::NotFound("want list entry"))
}
