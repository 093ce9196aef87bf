use std::sync::Arc;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tracing::info;
use uuid::Uuid;

use pinvault_db::models::NewUser;
use pinvault_db::{Database, TokenRepository, UserRepository};
use pinvault_market::{Marketplace, PriceAggregator};
use pinvault_types::api::{
    AuthResponse, Claims, LoginRequest, RegisterRequest, SuccessResponse, blank_to_none,
};
use pinvault_types::models::User;

use crate::error::{ApiError, ApiResult};
use crate::extract::ValidJson;
use crate::run_db;

const TOKEN_LIFETIME_DAYS: i64 = 30;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub market: Arc<dyn Marketplace>,
    pub prices: PriceAggregator,
    pub jwt_secret: String,
}

impl AppStateInner {
    pub fn new(db: Database, market: Arc<dyn Marketplace>, jwt_secret: String) -> AppState {
        Arc::new(Self {
            db,
            prices: PriceAggregator::new(market.clone()),
            market,
            jwt_secret,
        })
    }
}

pub async fn register(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    // Hash password with Argon2id
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("hash password: {e}"))?
        .to_string();

    let user = run_db(&state, move |db| {
        db.create_user(&NewUser {
            username: req.username,
            password_hash,
            display_name: blank_to_none(req.display_name),
            email: blank_to_none(req.email),
            avatar_url: blank_to_none(req.avatar_url),
            // Admin rights are only granted at start-up, never by registering.
            is_admin: false,
        })
    })
    .await?;

    info!("Registered user {}", user.username);

    let token = create_token(&state.jwt_secret, &user)?;
    Ok((StatusCode::CREATED, Json(AuthResponse { user, token })))
}

pub async fn login(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let username = req.username.clone();
    let row = run_db(&state, move |db| db.user_by_username(&username))
        .await?
        .ok_or(ApiError::Unauthenticated)?;

    // Verify password
    let parsed_hash =
        PasswordHash::new(&row.password).map_err(|e| anyhow::anyhow!("stored hash: {e}"))?;
    Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .map_err(|_| ApiError::Unauthenticated)?;

    let user = User::from(row);
    let token = create_token(&state.jwt_secret, &user)?;
    Ok(Json(AuthResponse { user, token }))
}

/// Revokes the presented token. It stays on the deny list until it would have expired.
pub async fn logout(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Json<SuccessResponse>> {
    let jti = claims.jti.to_string();
    let expires_at = claims.exp as i64;
    run_db(&state, move |db| db.revoke_token(&jti, expires_at)).await?;
    Ok(Json(SuccessResponse { success: true }))
}

pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Json<User>> {
    let user = run_db(&state, move |db| db.user_by_id(claims.sub))
        .await?
        .ok_or(ApiError::Unauthenticated)?;
    Ok(Json(user))
}

pub fn create_token(secret: &str, user: &User) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user.id,
        username: user.username.clone(),
        jti: Uuid::new_v4(),
        exp: (chrono::Utc::now() + chrono::Duration::days(TOKEN_LIFETIME_DAYS)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

pub fn decode_token(secret: &str, token: &str) -> Option<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .ok()
    .map(|data| data.claims)
}
