use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{
    CollectionChanges, NewCollectionEntry, NewPin, NewWantListEntry, Pin, User, WantListChanges,
};
use crate::validation::{FieldErrors, Validate, char_len_between, is_http_url, is_non_negative};

// -- JWT Claims --

/// Bearer token claims. `jti` lets a single token be revoked at logout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub username: String,
    pub jti: Uuid,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
}

impl Validate for RegisterRequest {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.check(
            char_len_between(&self.username, 3, 64),
            "username",
            "must be between 3 and 64 characters",
        );
        errors.check(
            self.username
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-')),
            "username",
            "may only contain letters, digits, '_', '.' and '-'",
        );
        errors.check(
            self.password.chars().count() >= 6,
            "password",
            "must be at least 6 characters",
        );
        errors.check(
            self.email.as_deref().is_none_or(|e| e.is_empty() || e.contains('@')),
            "email",
            "must be a valid email address",
        );
        errors.check(
            is_http_url(non_empty(&self.avatar_url)),
            "avatarUrl",
            "must be an http(s) URL",
        );
        errors.into_result()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.check(!self.username.trim().is_empty(), "username", "is required");
        errors.check(!self.password.is_empty(), "password", "is required");
        errors.into_result()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}

// -- Pins --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreatePinRequest {
    pub name: String,
    pub description: Option<String>,
    pub collection: Option<String>,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub release_date: Option<String>,
    #[serde(default)]
    pub is_limited_edition: bool,
    pub current_value: Option<f64>,
}

impl Validate for CreatePinRequest {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.check(
            char_len_between(self.name.trim(), 1, 200),
            "name",
            "must be between 1 and 200 characters",
        );
        errors.check(
            is_non_negative(self.current_value),
            "currentValue",
            "must be a non-negative number",
        );
        errors.check(
            is_http_url(non_empty(&self.image_url)),
            "imageUrl",
            "must be an http(s) URL",
        );
        errors.check(
            non_empty(&self.release_date)
                .is_none_or(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").is_ok()),
            "releaseDate",
            "must be a date formatted YYYY-MM-DD",
        );
        errors.into_result()
    }
}

impl From<CreatePinRequest> for NewPin {
    fn from(req: CreatePinRequest) -> Self {
        NewPin {
            name: req.name.trim().to_string(),
            description: blank_to_none(req.description),
            collection: blank_to_none(req.collection),
            image_url: blank_to_none(req.image_url),
            category: blank_to_none(req.category),
            release_date: blank_to_none(req.release_date),
            is_limited_edition: req.is_limited_edition,
            current_value: req.current_value,
        }
    }
}

// -- Collection --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AddToCollectionRequest {
    pub pin_id: i64,
    pub notes: Option<String>,
    #[serde(default)]
    pub for_trade: bool,
    pub purchase_price: Option<f64>,
    pub purchase_date: Option<NaiveDate>,
}

impl Validate for AddToCollectionRequest {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.check(self.pin_id > 0, "pinId", "must be a positive id");
        errors.check(
            is_non_negative(self.purchase_price),
            "purchasePrice",
            "must be a non-negative number",
        );
        errors.check(
            self.notes.as_deref().is_none_or(|n| n.chars().count() <= 2000),
            "notes",
            "must be at most 2000 characters",
        );
        errors.into_result()
    }
}

impl From<AddToCollectionRequest> for NewCollectionEntry {
    fn from(req: AddToCollectionRequest) -> Self {
        NewCollectionEntry {
            pin_id: req.pin_id,
            notes: blank_to_none(req.notes),
            for_trade: req.for_trade,
            purchase_price: req.purchase_price,
            purchase_date: req.purchase_date,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateCollectionRequest {
    pub notes: Option<String>,
    pub for_trade: Option<bool>,
    pub purchase_price: Option<f64>,
    pub purchase_date: Option<NaiveDate>,
}

impl Validate for UpdateCollectionRequest {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.check(
            is_non_negative(self.purchase_price),
            "purchasePrice",
            "must be a non-negative number",
        );
        errors.check(
            self.notes.as_deref().is_none_or(|n| n.chars().count() <= 2000),
            "notes",
            "must be at most 2000 characters",
        );
        errors.into_result()
    }
}

impl From<UpdateCollectionRequest> for CollectionChanges {
    fn from(req: UpdateCollectionRequest) -> Self {
        CollectionChanges {
            notes: req.notes,
            for_trade: req.for_trade,
            purchase_price: req.purchase_price,
            purchase_date: req.purchase_date,
        }
    }
}

// -- Want list --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AddToWantListRequest {
    pub pin_id: i64,
    pub priority: Option<i32>,
    pub max_price: Option<f64>,
}

impl Validate for AddToWantListRequest {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.check(self.pin_id > 0, "pinId", "must be a positive id");
        errors.check(
            self.priority.is_none_or(|p| (1..=5).contains(&p)),
            "priority",
            "must be between 1 and 5",
        );
        errors.check(
            is_non_negative(self.max_price),
            "maxPrice",
            "must be a non-negative number",
        );
        errors.into_result()
    }
}

impl From<AddToWantListRequest> for NewWantListEntry {
    fn from(req: AddToWantListRequest) -> Self {
        NewWantListEntry {
            pin_id: req.pin_id,
            priority: req.priority.unwrap_or(1),
            max_price: req.max_price,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateWantListRequest {
    pub priority: Option<i32>,
    pub max_price: Option<f64>,
}

impl Validate for UpdateWantListRequest {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.check(
            self.priority.is_none_or(|p| (1..=5).contains(&p)),
            "priority",
            "must be between 1 and 5",
        );
        errors.check(
            is_non_negative(self.max_price),
            "maxPrice",
            "must be a non-negative number",
        );
        errors.into_result()
    }
}

impl From<UpdateWantListRequest> for WantListChanges {
    fn from(req: UpdateWantListRequest) -> Self {
        WantListChanges {
            priority: req.priority,
            max_price: req.max_price,
        }
    }
}

// -- Messages --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SendMessageRequest {
    pub receiver_id: i64,
    pub content: String,
}

impl Validate for SendMessageRequest {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.check(self.receiver_id > 0, "receiverId", "must be a positive id");
        errors.check(
            char_len_between(self.content.trim(), 1, 2000),
            "content",
            "must be between 1 and 2000 characters",
        );
        errors.into_result()
    }
}

// -- Marketplace --

#[derive(Debug, Deserialize)]
pub struct MarketSearchQuery {
    #[serde(default)]
    pub q: String,
    pub limit: Option<u32>,
}

impl Validate for MarketSearchQuery {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.check(!self.q.trim().is_empty(), "q", "is required");
        errors.check(
            self.limit.is_none_or(|l| (1..=200).contains(&l)),
            "limit",
            "must be between 1 and 200",
        );
        errors.into_result()
    }
}

/// Listing prices arrive either as the vendor's decimal string or as a number.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PriceValue {
    Number(f64),
    Text(String),
}

impl PriceValue {
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            PriceValue::Number(n) => Some(*n),
            PriceValue::Text(s) => s.trim().parse::<f64>().ok(),
        };
        value.filter(|v| v.is_finite())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ImportPinRequest {
    pub name: String,
    pub image_url: Option<String>,
    pub price: Option<PriceValue>,
    pub collection: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
}

impl Validate for ImportPinRequest {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.check(
            char_len_between(self.name.trim(), 1, 200),
            "name",
            "must be between 1 and 200 characters",
        );
        errors.check(
            self.price
                .as_ref()
                .is_none_or(|p| p.as_f64().is_some_and(|v| v >= 0.0)),
            "price",
            "must be a non-negative number",
        );
        errors.check(
            is_http_url(non_empty(&self.image_url)),
            "imageUrl",
            "must be an http(s) URL",
        );
        errors.into_result()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CachePinsResponse {
    pub pins: Vec<Pin>,
    pub skipped: usize,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReseedResponse {
    pub success: bool,
    pub pin_count: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

pub fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
