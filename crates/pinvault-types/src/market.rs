use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Price as reported by the marketplace. The value stays a string because
/// the vendor sends decimals as strings and some listings carry junk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Money {
    pub value: String,
    pub currency: String,
}

impl Money {
    /// Parsed amount, `None` when the value is not a finite number.
    pub fn amount(&self) -> Option<f64> {
        self.value
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
    }
}

/// A marketplace listing mapped to our own shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemSummary {
    pub id: String,
    pub title: String,
    pub price: Option<Money>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub additional_images: Vec<String>,
    /// Listing end date as sent by the vendor (RFC 3339 when present).
    pub end_date: Option<String>,
    pub item_web_url: Option<String>,
    pub condition: Option<String>,
}

impl ItemSummary {
    pub fn amount(&self) -> Option<f64> {
        self.price.as_ref().and_then(Money::amount)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    pub total: u64,
    pub items: Vec<ItemSummary>,
}

/// One point of a live (not persisted) price series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricePoint {
    pub date: DateTime<Utc>,
    pub price: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn money(value: &str) -> Money {
        Money {
            value: value.to_string(),
            currency: "USD".to_string(),
        }
    }

    #[test]
    fn amount_parses_decimal_strings() {
        assert_eq!(money("12.50").amount(), Some(12.5));
        assert_eq!(money(" 7 ").amount(), Some(7.0));
    }

    #[test]
    fn amount_rejects_junk() {
        assert_eq!(money("n/a").amount(), None);
        assert_eq!(money("").amount(), None);
        assert_eq!(money("NaN").amount(), None);
        assert_eq!(money("inf").amount(), None);
    }
}
