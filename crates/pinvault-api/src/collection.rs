use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use pinvault_db::{CollectionRepository, WantListRepository};
use pinvault_types::api::{
    AddToCollectionRequest, AddToWantListRequest, Claims, SuccessResponse, UpdateCollectionRequest,
    UpdateWantListRequest,
};
use pinvault_types::models::{
    CollectionChanges, CollectionEntry, CollectionItem, NewCollectionEntry, NewWantListEntry,
    WantListChanges, WantListEntry, WantListItem,
};

use crate::auth::AppState;
use crate::error::ApiResult;
use crate::extract::ValidJson;
use crate::run_db;

// -- Collection --

pub async fn list_collection(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Json<Vec<CollectionItem>>> {
    Ok(Json(run_db(&state, move |db| db.list_collection(claims.sub)).await?))
}

pub async fn add_to_collection(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ValidJson(req): ValidJson<AddToCollectionRequest>,
) -> ApiResult<impl IntoResponse> {
    let entry = NewCollectionEntry::from(req);
    let created: CollectionEntry =
        run_db(&state, move |db| db.add_to_collection(claims.sub, &entry)).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Patches the caller's collection entry, addressed by entry id.
pub async fn update_collection_entry(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(entry_id): Path<i64>,
    ValidJson(req): ValidJson<UpdateCollectionRequest>,
) -> ApiResult<Json<CollectionEntry>> {
    let changes = CollectionChanges::from(req);
    let entry = run_db(&state, move |db| {
        db.update_collection_entry(claims.sub, entry_id, &changes)
    })
    .await?;
    Ok(Json(entry))
}

pub async fn remove_from_collection(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(pin_id): Path<i64>,
) -> ApiResult<Json<SuccessResponse>> {
    run_db(&state, move |db| db.remove_from_collection(claims.sub, pin_id)).await?;
    Ok(Json(SuccessResponse { success: true }))
}

// -- Want list --

pub async fn list_want_list(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Json<Vec<WantListItem>>> {
    Ok(Json(run_db(&state, move |db| db.list_want_list(claims.sub)).await?))
}

pub async fn add_to_want_list(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ValidJson(req): ValidJson<AddToWantListRequest>,
) -> ApiResult<impl IntoResponse> {
    let entry = NewWantListEntry::from(req);
    let created: WantListEntry =
        run_db(&state, move |db| db.add_to_want_list(claims.sub, &entry)).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_want_list_entry(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(entry_id): Path<i64>,
    ValidJson(req): ValidJson<UpdateWantListRequest>,
) -> ApiResult<Json<WantListEntry>> {
    let changes = WantListChanges::from(req);
    let entry = run_db(&state, move |db| {
        db.update_want_list_entry(claims.sub, entry_id, &changes)
    })
    .await?;
    Ok(Json(entry))
}

pub async fn remove_from_want_list(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(pin_id): Path<i64>,
) -> ApiResult<Json<SuccessResponse>> {
    run_db(&state, move |db| db.remove_from_want_list(claims.sub, pin_id)).await?;
    Ok(Json(SuccessResponse { success: true }))
}
