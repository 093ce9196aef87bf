//! Storage contracts, one per entity. `Database` implements all of them on
//! SQLite; handlers and tests only rely on these signatures.

use pinvault_types::models::{
    CollectionChanges, CollectionEntry, CollectionItem, Message, MessageWithSender, NewCollectionEntry,
    NewPin, NewWantListEntry, Pin, PinStats, PriceHistoryEntry, User, WantListChanges,
    WantListEntry, WantListItem,
};

use crate::Result;
use crate::models::{NewUser, UserRow};

pub trait UserRepository {
    /// Fails with `Conflict` when the username is taken.
    fn create_user(&self, user: &NewUser) -> Result<User>;
    fn user_by_username(&self, username: &str) -> Result<Option<UserRow>>;
    fn user_by_id(&self, id: i64) -> Result<Option<User>>;
    /// Returns false when no user has that name.
    fn set_admin(&self, username: &str, is_admin: bool) -> Result<bool>;
}

pub trait TokenRepository {
    fn revoke_token(&self, jti: &str, expires_at: i64) -> Result<()>;
    fn is_token_revoked(&self, jti: &str) -> Result<bool>;
    /// Drops revocations whose token would have expired anyway.
    fn prune_revoked_tokens(&self, now: i64) -> Result<usize>;
}

pub trait CatalogRepository {
    fn list_pins(&self) -> Result<Vec<Pin>>;
    fn pin(&self, id: i64) -> Result<Pin>;
    fn find_pin_by_name(&self, name: &str) -> Result<Option<Pin>>;
    fn create_pin(&self, pin: &NewPin) -> Result<Pin>;
    fn update_pin_value(&self, id: i64, value: f64) -> Result<Pin>;
    fn append_price(&self, pin_id: i64, price: f64, source: &str) -> Result<PriceHistoryEntry>;
    /// Sets the current value and appends the matching history row atomically.
    fn record_price(&self, pin_id: i64, price: f64, source: &str) -> Result<Pin>;
    /// Creates a pin and, when it carries a value, its first history row.
    fn import_pin(&self, pin: &NewPin, source: &str) -> Result<Pin>;
    fn price_history(&self, pin_id: i64) -> Result<Vec<PriceHistoryEntry>>;
    fn pin_stats(&self, pin_id: i64) -> Result<PinStats>;
}

pub trait CollectionRepository {
    fn list_collection(&self, user_id: i64) -> Result<Vec<CollectionItem>>;
    /// Fails with `NotFound` for an unknown pin, `Conflict` for a duplicate.
    fn add_to_collection(&self, user_id: i64, entry: &NewCollectionEntry) -> Result<CollectionEntry>;
    /// Updates the caller's entry by its own id. Fields left `None` are kept.
    fn update_collection_entry(
        &self,
        user_id: i64,
        entry_id: i64,
        changes: &CollectionChanges,
    ) -> Result<CollectionEntry>;
    /// Returns whether a row was deleted.
    fn remove_from_collection(&self, user_id: i64, pin_id: i64) -> Result<bool>;
}

pub trait WantListRepository {
    fn list_want_list(&self, user_id: i64) -> Result<Vec<WantListItem>>;
    fn add_to_want_list(&self, user_id: i64, entry: &NewWantListEntry) -> Result<WantListEntry>;
    fn update_want_list_entry(
        &self,
        user_id: i64,
        entry_id: i64,
        changes: &WantListChanges,
    ) -> Result<WantListEntry>;
    fn remove_from_want_list(&self, user_id: i64, pin_id: i64) -> Result<bool>;
}

pub trait MessageRepository {
    fn send_message(&self, sender_id: i64, receiver_id: i64, content: &str) -> Result<Message>;
    /// Messages received by `user_id`, newest first.
    fn messages_for_user(&self, user_id: i64) -> Result<Vec<MessageWithSender>>;
    fn message(&self, id: i64) -> Result<Message>;
    fn mark_read(&self, id: i64) -> Result<Message>;
}
