use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::{debug, info};

use pinvault_db::CatalogRepository;
use pinvault_types::api::CreatePinRequest;
use pinvault_types::market::PricePoint;
use pinvault_types::models::{NewPin, Pin, PinStats, PriceHistoryEntry};

use crate::auth::AppState;
use crate::error::ApiResult;
use crate::extract::ValidJson;
use crate::run_db;

/// Source label stored with marketplace-derived history rows.
pub const MARKET_SOURCE: &str = "eBay";

pub async fn list_pins(State(state): State<AppState>) -> ApiResult<Json<Vec<Pin>>> {
    Ok(Json(run_db(&state, |db| db.list_pins()).await?))
}

pub async fn get_pin(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Json<Pin>> {
    Ok(Json(run_db(&state, move |db| db.pin(id)).await?))
}

pub async fn create_pin(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<CreatePinRequest>,
) -> ApiResult<impl IntoResponse> {
    let new_pin = NewPin::from(req);
    let pin = run_db(&state, move |db| db.create_pin(&new_pin)).await?;
    info!("Created pin {} ({})", pin.id, pin.name);
    Ok((StatusCode::CREATED, Json(pin)))
}

pub async fn pin_stats(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Json<PinStats>> {
    Ok(Json(run_db(&state, move |db| db.pin_stats(id)).await?))
}

pub async fn price_history(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Vec<PriceHistoryEntry>>> {
    Ok(Json(run_db(&state, move |db| db.price_history(id)).await?))
}

/// Refreshes the pin's value from recent sold listings and persists it with a
/// history row. With no usable listings the pin is returned unchanged.
pub async fn refresh_price(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Json<Pin>> {
    let pin = run_db(&state, move |db| db.pin(id)).await?;

    let average = state.prices.average_price(&pin.name).await;
    if average <= 0.0 {
        debug!("No market signal for pin {}", id);
        return Ok(Json(pin));
    }

    let price = round_cents(average);
    let pin = run_db(&state, move |db| db.record_price(id, price, MARKET_SOURCE)).await?;
    info!("Pin {} valued at {:.2} from sold listings", id, price);
    Ok(Json(pin))
}

/// Live sold-listing series for the pin. Not persisted.
pub async fn live_price_history(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Vec<PricePoint>>> {
    let pin = run_db(&state, move |db| db.pin(id)).await?;
    Ok(Json(state.prices.price_history(&pin.name).await))
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
