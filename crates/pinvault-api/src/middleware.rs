use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
    typed_header::TypedHeaderRejection,
};

use pinvault_db::{TokenRepository, UserRepository};
use pinvault_types::api::Claims;

use crate::auth::{AppState, decode_token};
use crate::error::{ApiError, ApiResult};
use crate::run_db;

/// Validates the bearer JWT, rejects revoked tokens and stores the claims
/// in request extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    bearer: Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>,
    mut req: Request,
    next: Next,
) -> ApiResult<Response> {
    // Missing and malformed headers are both a 401.
    let TypedHeader(Authorization(bearer)) = bearer.map_err(|_| ApiError::Unauthenticated)?;
    let claims = decode_token(&state.jwt_secret, bearer.token()).ok_or(ApiError::Unauthenticated)?;

    let jti = claims.jti.to_string();
    if run_db(&state, move |db| db.is_token_revoked(&jti)).await? {
        return Err(ApiError::Unauthenticated);
    }

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Must run after `require_auth`. Loads the caller and checks the admin flag.
pub async fn require_admin(State(state): State<AppState>, req: Request, next: Next) -> ApiResult<Response> {
    let user_id = req
        .extensions()
        .get::<Claims>()
        .map(|c| c.sub)
        .ok_or(ApiError::Unauthenticated)?;

    let user = run_db(&state, move |db| db.user_by_id(user_id))
        .await?
        .ok_or(ApiError::Unauthenticated)?;
    if !user.is_admin {
        return Err(ApiError::Forbidden("admin access required"));
    }

    Ok(next.run(req).await)
}
