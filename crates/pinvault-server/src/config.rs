use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use pinvault_market::{MarketConfig, MarketEnv};
use tracing::warn;

pub const DEV_JWT_SECRET: &str = "dev-secret-change-me";

/// Placeholder JWT secrets that must not be used outside development.
const PLACEHOLDER_SECRETS: &[&str] = &["", "change-me-to-a-random-string", DEV_JWT_SECRET];

#[derive(Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub jwt_secret: String,
    /// Existing account promoted to admin at start-up. Unset means nobody is promoted.
    pub admin_username: Option<String>,
    pub seed: bool,
    pub market: MarketConfig,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup, so tests need not touch the process environment.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let port = var("PINVAULT_PORT", "3000")
            .parse::<u16>()
            .context("PINVAULT_PORT must be a port number")?;

        let mut jwt_secret = var("PINVAULT_JWT_SECRET", "");
        if PLACEHOLDER_SECRETS.contains(&jwt_secret.trim()) {
            warn!("PINVAULT_JWT_SECRET is unset or a placeholder; using the development secret");
            jwt_secret = DEV_JWT_SECRET.to_string();
        }

        let seed = parse_bool(&var("PINVAULT_SEED", "true"))
            .context("PINVAULT_SEED must be true or false")?;

        let env = MarketEnv::from_name(&var("EBAY_ENV", "sandbox"));
        let mut market = MarketConfig::new(env, var("EBAY_APP_ID", ""), var("EBAY_CERT_ID", ""));
        if let Some(id) = lookup("EBAY_MARKETPLACE_ID") {
            market.marketplace_id = id;
        }
        if let Some(base) = lookup("EBAY_API_BASE") {
            market.api_base = base;
        }
        if let Some(base) = lookup("EBAY_AUTH_BASE") {
            market.auth_base = base;
        }

        Ok(Self {
            host: var("PINVAULT_HOST", "0.0.0.0"),
            port,
            db_path: var("PINVAULT_DB_PATH", "pinvault.db").into(),
            jwt_secret,
            admin_username: lookup("PINVAULT_ADMIN_USERNAME")
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty()),
            seed,
            market,
        })
    }

    pub fn addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
