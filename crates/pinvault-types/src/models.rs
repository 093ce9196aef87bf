use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Public view of an account. The password hash never leaves pinvault-db.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub username: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

/// A catalog item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pin {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub collection: Option<String>,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub release_date: Option<String>,
    pub is_limited_edition: bool,
    /// Last known market value. `None` until a price has been recorded.
    pub current_value: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// Fields for a pin that has not been stored yet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewPin {
    pub name: String,
    pub description: Option<String>,
    pub collection: Option<String>,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub release_date: Option<String>,
    pub is_limited_edition: bool,
    pub current_value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceHistoryEntry {
    pub id: i64,
    pub pin_id: i64,
    pub price: f64,
    pub source: String,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PinStats {
    pub have_count: i64,
    pub want_count: i64,
}

// -- Collection --

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionEntry {
    pub id: i64,
    pub user_id: i64,
    pub pin_id: i64,
    pub added_at: DateTime<Utc>,
    pub notes: Option<String>,
    pub for_trade: bool,
    pub purchase_price: Option<f64>,
    pub purchase_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewCollectionEntry {
    pub pin_id: i64,
    pub notes: Option<String>,
    pub for_trade: bool,
    pub purchase_price: Option<f64>,
    pub purchase_date: Option<NaiveDate>,
}

/// Partial update of a collection entry; `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectionChanges {
    pub notes: Option<String>,
    pub for_trade: Option<bool>,
    pub purchase_price: Option<f64>,
    pub purchase_date: Option<NaiveDate>,
}

/// A collection entry joined with its pin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionItem {
    #[serde(flatten)]
    pub entry: CollectionEntry,
    pub pin: Pin,
}

// -- Want list --

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WantListEntry {
    pub id: i64,
    pub user_id: i64,
    pub pin_id: i64,
    pub priority: i32,
    pub max_price: Option<f64>,
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewWantListEntry {
    pub pin_id: i64,
    pub priority: i32,
    pub max_price: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WantListChanges {
    pub priority: Option<i32>,
    pub max_price: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WantListItem {
    #[serde(flatten)]
    pub entry: WantListEntry,
    pub pin: Pin,
}

// -- Messages --

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: i64,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub content: String,
    pub is_read: bool,
    pub sent_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageWithSender {
    #[serde(flatten)]
    pub message: Message,
    pub sender: User,
}
