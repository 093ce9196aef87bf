use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::debug;

use pinvault_db::MessageRepository;
use pinvault_types::api::{Claims, SendMessageRequest};
use pinvault_types::models::{Message, MessageWithSender};

use crate::auth::AppState;
use crate::error::{ApiError, ApiResult};
use crate::extract::ValidJson;
use crate::run_db;

/// Messages received by the caller, newest first, each with its sender.
pub async fn list_messages(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Json<Vec<MessageWithSender>>> {
    Ok(Json(run_db(&state, move |db| db.messages_for_user(claims.sub)).await?))
}

pub async fn send_message(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ValidJson(req): ValidJson<SendMessageRequest>,
) -> ApiResult<impl IntoResponse> {
    let content = req.content.trim().to_string();
    let message = run_db(&state, move |db| {
        db.send_message(claims.sub, req.receiver_id, &content)
    })
    .await?;
    debug!("Message {} from {} to {}", message.id, message.sender_id, message.receiver_id);
    Ok((StatusCode::CREATED, Json(message)))
}

/// Only the receiver may mark a message read. Repeating the call is a no-op.
pub async fn mark_read(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Message>> {
    let message = run_db(&state, move |db| db.message(id)).await?;
    if message.receiver_id != claims.sub {
        return Err(ApiError::Forbidden("only the receiver can mark a message as read"));
    }
    if message.is_read {
        return Ok(Json(message));
    }
    Ok(Json(run_db(&state, move |db| db.mark_read(id)).await?))
}
