pub mod admin;
pub mod auth;
pub mod collection;
pub mod error;
pub mod extract;
pub mod messages;
pub mod middleware;
pub mod pins;

use axum::{
    Json, Router, middleware as axum_middleware,
    routing::{get, patch, post},
};
use serde_json::{Value, json};
use tracing::error;

use pinvault_db::Database;

use crate::auth::AppState;
use crate::error::{ApiError, ApiResult};
use crate::middleware::{require_admin, require_auth};

/// Every route the server exposes, without transport layers (CORS, tracing).
pub fn app_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/api/health", get(health))
        .route("/api/register", post(auth::register))
        .route("/api/login", post(auth::login))
        .route("/api/pins", get(pins::list_pins))
        .route("/api/pins/{id}", get(pins::get_pin))
        .route("/api/pins/{id}/stats", get(pins::pin_stats))
        .route("/api/pins/{id}/price-history", get(pins::price_history))
        .route("/api/pins/{id}/ebay-price", get(pins::refresh_price))
        .route("/api/pins/{id}/ebay-price-history", get(pins::live_price_history));

    let protected_routes = Router::new()
        .route("/api/logout", post(auth::logout))
        .route("/api/user", get(auth::me))
        .route("/api/pins", post(pins::create_pin))
        .route(
            "/api/user/pins",
            get(collection::list_collection).post(collection::add_to_collection),
        )
        // PATCH takes the entry id, DELETE the pin id.
        .route(
            "/api/user/pins/{id}",
            patch(collection::update_collection_entry).delete(collection::remove_from_collection),
        )
        .route(
            "/api/user/wantlist",
            get(collection::list_want_list).post(collection::add_to_want_list),
        )
        .route(
            "/api/user/wantlist/{id}",
            patch(collection::update_want_list_entry).delete(collection::remove_from_want_list),
        )
        .route(
            "/api/messages",
            get(messages::list_messages).post(messages::send_message),
        )
        .route("/api/messages/{id}/read", patch(messages::mark_read))
        .layer(axum_middleware::from_fn_with_state(state.clone(), require_auth));

    // Layers run outside-in: authenticate first, then check the admin flag.
    let admin_routes = Router::new()
        .route("/api/admin/reseed-database", post(admin::reseed_database))
        .route("/api/admin/import-pin-from-ebay", post(admin::import_pin))
        .route("/api/ebay/search", get(admin::search))
        .route("/api/ebay/cache-pins", get(admin::cache_pins))
        .layer(axum_middleware::from_fn_with_state(state.clone(), require_admin))
        .layer(axum_middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(admin_routes)
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Runs a blocking database call off the async runtime.
pub(crate) async fn run_db<F, T>(state: &AppState, f: F) -> ApiResult<T>
where
    F: FnOnce(&Database) -> pinvault_db::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(e.into())
        })?
        .map_err(ApiError::from)
}
