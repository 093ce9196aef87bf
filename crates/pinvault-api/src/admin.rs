//! Catalog maintenance: reseeding and importing marketplace listings as pins.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::info;

use pinvault_db::CatalogRepository;
use pinvault_market::classify::classify;
use pinvault_types::api::{
    CachePinsResponse, ImportPinRequest, MarketSearchQuery, ReseedResponse, blank_to_none,
};
use pinvault_types::market::{ItemSummary, SearchPage};
use pinvault_types::models::NewPin;

use crate::auth::AppState;
use crate::error::ApiResult;
use crate::extract::{ValidJson, ValidQuery};
use crate::pins::MARKET_SOURCE;
use crate::run_db;

const DEFAULT_SEARCH_LIMIT: u32 = 20;

pub async fn reseed_database(State(state): State<AppState>) -> ApiResult<Json<ReseedResponse>> {
    let pin_count = run_db(&state, |db| db.reseed()).await?;
    info!("Admin reseed restored {} pins", pin_count);
    Ok(Json(ReseedResponse {
        success: true,
        pin_count,
    }))
}

/// Browses active listings. An unavailable marketplace yields an empty page.
pub async fn search(
    State(state): State<AppState>,
    ValidQuery(query): ValidQuery<MarketSearchQuery>,
) -> ApiResult<Json<SearchPage>> {
    let items = state
        .market
        .browse(&query.q, query.limit.unwrap_or(DEFAULT_SEARCH_LIMIT))
        .await;
    Ok(Json(SearchPage {
        total: items.len() as u64,
        items,
    }))
}

/// Imports every browsed listing whose title is not already a pin.
pub async fn cache_pins(
    State(state): State<AppState>,
    ValidQuery(query): ValidQuery<MarketSearchQuery>,
) -> ApiResult<Json<CachePinsResponse>> {
    let items = state
        .market
        .browse(&query.q, query.limit.unwrap_or(DEFAULT_SEARCH_LIMIT))
        .await;

    let response = run_db(&state, move |db| {
        let mut pins = Vec::new();
        let mut skipped = 0;
        for item in items {
            let title = item.title.trim();
            if title.is_empty() || db.find_pin_by_name(title)?.is_some() {
                skipped += 1;
                continue;
            }
            pins.push(db.import_pin(&listing_pin(&item), MARKET_SOURCE)?);
        }
        Ok(CachePinsResponse { pins, skipped })
    })
    .await?;

    info!(
        "Cached {} pins for '{}' ({} skipped)",
        response.pins.len(),
        query.q,
        response.skipped
    );
    Ok(Json(response))
}

pub async fn import_pin(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<ImportPinRequest>,
) -> ApiResult<impl IntoResponse> {
    let new_pin = import_request_pin(req);
    let pin = run_db(&state, move |db| db.import_pin(&new_pin, MARKET_SOURCE)).await?;
    info!("Imported pin {} ({})", pin.id, pin.name);
    Ok((StatusCode::CREATED, Json(pin)))
}

fn listing_pin(item: &ItemSummary) -> NewPin {
    let name = item.title.trim().to_string();
    let class = classify(&name);
    NewPin {
        description: Some(default_description(&name)),
        collection: Some(class.collection.to_string()),
        category: Some(class.category.to_string()),
        image_url: item.image_url.clone(),
        current_value: item.amount().filter(|v| *v >= 0.0),
        name,
        ..Default::default()
    }
}

fn import_request_pin(req: ImportPinRequest) -> NewPin {
    let name = req.name.trim().to_string();
    let class = classify(&name);
    NewPin {
        description: Some(
            blank_to_none(req.description).unwrap_or_else(|| default_description(&name)),
        ),
        collection: Some(
            blank_to_none(req.collection).unwrap_or_else(|| class.collection.to_string()),
        ),
        category: Some(blank_to_none(req.category).unwrap_or_else(|| class.category.to_string())),
        image_url: blank_to_none(req.image_url),
        current_value: req.price.and_then(|p| p.as_f64()),
        name,
        ..Default::default()
    }
}

fn default_description(title: &str) -> String {
    format!("Authentic Disney Pin: {title}")
}
