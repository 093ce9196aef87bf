//! OAuth bearer token for the marketplace, cached until shortly before it expires.
//!
//! The cache does not coalesce refreshes: the lock is released before the
//! token endpoint is called, so callers racing on an expired token may each
//! fetch a new one. The endpoint is idempotent and the last writer wins.

use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::MarketError;

/// Subtracted from the vendor-reported lifetime before a token is considered stale.
pub const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Longest lifetime honoured for a token, whatever the vendor reports.
pub const MAX_LIFETIME: Duration = Duration::from_secs(24 * 60 * 60);

const OAUTH_SCOPE: &str = "https://api.ebay.com/oauth/api_scope";

#[derive(Debug, Clone)]
pub struct AccessToken {
    pub value: String,
    pub expires_in: Duration,
}

#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn fetch(&self) -> Result<AccessToken, MarketError>;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

struct CachedToken {
    value: String,
    expires_at: Instant,
}

pub struct TokenCache<S, C = SystemClock> {
    source: S,
    clock: C,
    slot: Mutex<Option<CachedToken>>,
}

impl<S: TokenSource> TokenCache<S, SystemClock> {
    pub fn new(source: S) -> Self {
        Self::with_clock(source, SystemClock)
    }
}

impl<S: TokenSource, C: Clock> TokenCache<S, C> {
    pub fn with_clock(source: S, clock: C) -> Self {
        Self {
            source,
            clock,
            slot: Mutex::new(None),
        }
    }

    /// Returns the cached token, or fetches a new one if none is held or it has expired.
    pub async fn get_token(&self) -> Result<String, MarketError> {
        if let Some(token) = self.cached(self.clock.now()) {
            return Ok(token);
        }

        debug!("Refreshing marketplace access token");
        let fresh = self.source.fetch().await?;
        let lifetime = fresh.expires_in.min(MAX_LIFETIME).saturating_sub(EXPIRY_MARGIN);

        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = self.clock.now().checked_add(lifetime).map(|expires_at| CachedToken {
            value: fresh.value.clone(),
            expires_at,
        });
        Ok(fresh.value)
    }

    /// Drops the held token so the next call fetches a new one.
    pub fn invalidate(&self) {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner).take();
    }

    fn cached(&self, now: Instant) -> Option<String> {
        let slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        slot.as_ref()
            .filter(|t| now < t.expires_at)
            .map(|t| t.value.clone())
    }
}

/// Client-credentials grant against the vendor's identity endpoint.
pub struct OAuthTokenSource {
    http: Client,
    token_url: String,
    app_id: String,
    cert_id: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

impl OAuthTokenSource {
    pub fn new(http: Client, auth_base: &str, app_id: String, cert_id: String) -> Self {
        Self {
            http,
            token_url: format!("{}/identity/v1/oauth2/token", auth_base.trim_end_matches('/')),
            app_id,
            cert_id,
        }
    }
}

#[async_trait]
impl TokenSource for OAuthTokenSource {
    async fn fetch(&self) -> Result<AccessToken, MarketError> {
        if self.app_id.is_empty() || self.cert_id.is_empty() {
            return Err(MarketError::Auth("credentials are not configured".into()));
        }

        let response = self
            .http
            .post(&self.token_url)
            .basic_auth(&self.app_id, Some(&self.cert_id))
            .form(&[("grant_type", "client_credentials"), ("scope", OAUTH_SCOPE)])
            .send()
            .await
            .map_err(|e| MarketError::Auth(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MarketError::Auth(format!("token endpoint returned {status}")));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| MarketError::Auth(e.to_string()))?;

        Ok(AccessToken {
            value: body.access_token,
            expires_in: Duration::from_secs(body.expires_in),
        })
    }
}
