//! Naive price signals from sold listings: a plain mean and a dated point list.
//! No dedup, outlier rejection or weighting.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use pinvault_types::market::{ItemSummary, PricePoint};

use crate::Marketplace;

pub const AVERAGE_SAMPLE: u32 = 20;
pub const HISTORY_SAMPLE: u32 = 30;

const SOLD_ONLY: (&str, &str) = ("filter", "soldItems:true");

#[derive(Clone)]
pub struct PriceAggregator {
    market: Arc<dyn Marketplace>,
}

impl PriceAggregator {
    pub fn new(market: Arc<dyn Marketplace>) -> Self {
        Self { market }
    }

    /// Mean sold price for `title`. 0.0 means no signal, not free.
    pub async fn average_price(&self, title: &str) -> f64 {
        let items = self.market.search(title, AVERAGE_SAMPLE, &[SOLD_ONLY]).await;
        mean_price(&items)
    }

    /// Sold prices for `title`, oldest first.
    pub async fn price_history(&self, title: &str) -> Vec<PricePoint> {
        let items = self.market.search(title, HISTORY_SAMPLE, &[SOLD_ONLY]).await;
        history_points(items)
    }
}

/// Arithmetic mean over the prices that parse as finite numbers.
/// Listings whose price does not parse are dropped from both the sum and the count.
pub fn mean_price(items: &[ItemSummary]) -> f64 {
    let prices: Vec<f64> = items.iter().filter_map(ItemSummary::amount).collect();
    if prices.is_empty() {
        return 0.0;
    }
    prices.iter().sum::<f64>() / prices.len() as f64
}

/// Keeps items with a parseable end date and price, sorted ascending by date.
pub fn history_points(items: Vec<ItemSummary>) -> Vec<PricePoint> {
    let mut points: Vec<PricePoint> = items
        .into_iter()
        .filter_map(|item| {
            let price = item.amount()?;
            let date = DateTime::parse_from_rfc3339(item.end_date.as_deref()?)
                .ok()?
                .with_timezone(&Utc);
            Some(PricePoint { date, price })
        })
        .collect();
    points.sort_by_key(|p| p.date);
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinvault_types::market::Money;

    fn item(price: &str, end_date: Option<&str>) -> ItemSummary {
        ItemSummary {
            id: format!("item-{price}"),
            title: "Disney Pin".to_string(),
            price: Some(Money {
                value: price.to_string(),
                currency: "USD".to_string(),
            }),
            image_url: None,
            additional_images: Vec::new(),
            end_date: end_date.map(str::to_string),
            item_web_url: None,
            condition: None,
        }
    }

    #[test]
    fn mean_of_three_prices() {
        let items = [item("10", None), item("20", None), item("30", None)];
        assert_eq!(mean_price(&items), 20.0);
    }

    #[test]
    fn mean_of_nothing_is_zero() {
        assert_eq!(mean_price(&[]), 0.0);
    }

    #[test]
    fn mean_skips_unparseable_prices() {
        let mut missing = item("0", None);
        missing.price = None;
        let items = [item("10", None), item("n/a", None), missing, item("30", None)];
        assert_eq!(mean_price(&items), 20.0);

        assert_eq!(mean_price(&[item("free", None)]), 0.0);
    }

    #[test]
    fn history_is_sorted_and_filtered() {
        let items = vec![
            item("30", Some("2024-03-03T00:00:00Z")),
            item("10", Some("2024-03-01T00:00:00Z")),
            item("99", None),
            item("bad", Some("2024-03-02T00:00:00Z")),
            item("20", Some("not a date")),
            item("15", Some("2024-03-02T12:00:00.000Z")),
        ];
        let points = history_points(items);

        let prices: Vec<f64> = points.iter().map(|p| p.price).collect();
        assert_eq!(prices, vec![10.0, 15.0, 30.0]);
        assert!(points.windows(2).all(|w| w[0].date <= w[1].date));
    }

    #[test]
    fn history_keeps_vendor_order_for_equal_dates() {
        let items = vec![
            item("1", Some("2024-03-01T00:00:00Z")),
            item("2", Some("2024-03-01T00:00:00Z")),
        ];
        let prices: Vec<f64> = history_points(items).iter().map(|p| p.price).collect();
        assert_eq!(prices, vec![1.0, 2.0]);
    }
}
