use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use pinvault_types::market::{ItemSummary, Money, SearchPage};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::token::{Clock, OAuthTokenSource, SystemClock, TokenCache, TokenSource};
use crate::{MarketError, Marketplace};

pub const SANDBOX_BASE_URL: &str = "https://api.sandbox.ebay.com";
pub const PRODUCTION_BASE_URL: &str = "https://api.ebay.com";

const SOLD_SEARCH_PATH: &str = "/buy/marketplace_insights/v1_beta/item_sales/search";
const BROWSE_PATH: &str = "/buy/browse/v1/item_summary/search";
const MARKETPLACE_HEADER: &str = "X-EBAY-C-MARKETPLACE-ID";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MarketEnv {
    #[default]
    Sandbox,
    Production,
}

impl MarketEnv {
    /// Anything other than "production" selects the sandbox.
    pub fn from_name(name: &str) -> Self {
        if name.trim().eq_ignore_ascii_case("production") {
            Self::Production
        } else {
            Self::Sandbox
        }
    }

    pub fn base_url(self) -> &'static str {
        match self {
            Self::Sandbox => SANDBOX_BASE_URL,
            Self::Production => PRODUCTION_BASE_URL,
        }
    }
}

#[derive(Clone)]
pub struct MarketConfig {
    pub app_id: String,
    pub cert_id: String,
    pub api_base: String,
    pub auth_base: String,
    pub marketplace_id: String,
    /// Prepended to every query so results stay inside the pin category.
    pub qualifier: String,
    pub category_id: String,
}

impl MarketConfig {
    pub fn new(env: MarketEnv, app_id: String, cert_id: String) -> Self {
        Self {
            app_id,
            cert_id,
            api_base: env.base_url().to_string(),
            auth_base: env.base_url().to_string(),
            marketplace_id: "EBAY_US".to_string(),
            qualifier: "Disney Pin".to_string(),
            category_id: "50310".to_string(),
        }
    }

    pub fn has_credentials(&self) -> bool {
        !self.app_id.is_empty() && !self.cert_id.is_empty()
    }

    fn qualified(&self, query: &str) -> String {
        let query = query.trim();
        if self.qualifier.is_empty() {
            query.to_string()
        } else {
            format!("{} {}", self.qualifier, query)
        }
    }
}

impl fmt::Debug for MarketConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarketConfig")
            .field("app_id", &self.app_id)
            .field("cert_id", &"<redacted>")
            .field("api_base", &self.api_base)
            .field("auth_base", &self.auth_base)
            .field("marketplace_id", &self.marketplace_id)
            .field("qualifier", &self.qualifier)
            .field("category_id", &self.category_id)
            .finish()
    }
}

/// HTTP client for the vendor's sold-listings and browse searches.
pub struct MarketplaceClient<S = OAuthTokenSource, C = SystemClock> {
    http: Client,
    config: MarketConfig,
    tokens: TokenCache<S, C>,
}

impl MarketplaceClient {
    /// Builds the production client: reqwest with a 30 s timeout and the OAuth token source.
    pub fn from_config(config: MarketConfig) -> Result<Self, MarketError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        let source = OAuthTokenSource::new(
            http.clone(),
            &config.auth_base,
            config.app_id.clone(),
            config.cert_id.clone(),
        );
        Ok(Self::with_tokens(http, config, TokenCache::new(source)))
    }
}

impl<S: TokenSource, C: Clock> MarketplaceClient<S, C> {
    pub fn with_tokens(http: Client, config: MarketConfig, tokens: TokenCache<S, C>) -> Self {
        Self {
            http,
            config,
            tokens,
        }
    }

    /// Sold-listings search. `filters` are appended as extra query parameters.
    pub async fn try_search(
        &self,
        query: &str,
        limit: u32,
        filters: &[(&str, &str)],
    ) -> Result<SearchPage, MarketError> {
        let mut params = vec![
            ("q", self.config.qualified(query)),
            ("limit", limit.to_string()),
            ("category_ids", self.config.category_id.clone()),
        ];
        params.extend(filters.iter().map(|(k, v)| (*k, (*v).to_string())));
        self.get(SOLD_SEARCH_PATH, &params).await
    }

    /// Active-listings search, with extended image fields.
    pub async fn try_browse(&self, terms: &str, limit: u32) -> Result<SearchPage, MarketError> {
        let params = [
            ("q", self.config.qualified(terms)),
            ("limit", limit.to_string()),
            ("category_ids", self.config.category_id.clone()),
            ("fieldgroups", "EXTENDED".to_string()),
        ];
        self.get(BROWSE_PATH, &params).await
    }

    async fn get(&self, path: &str, params: &[(&str, String)]) -> Result<SearchPage, MarketError> {
        let token = self.tokens.get_token().await?;
        let url = format!("{}{}", self.config.api_base.trim_end_matches('/'), path);

        let response = self
            .http
            .get(&url)
            .query(params)
            .bearer_auth(token)
            .header(MARKETPLACE_HEADER, &self.config.marketplace_id)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            // Token revoked or rotated upstream; fetch a new one next time.
            self.tokens.invalidate();
        }
        if !status.is_success() {
            return Err(MarketError::Status(status));
        }

        let body = response.bytes().await?;
        let page: VendorSearchResponse =
            serde_json::from_slice(&body).map_err(|e| MarketError::Decode(e.to_string()))?;
        debug!("Marketplace {} returned {} items", path, page.item_summaries.len());
        Ok(page.into())
    }
}

#[async_trait]
impl<S: TokenSource, C: Clock> Marketplace for MarketplaceClient<S, C> {
    async fn search(&self, query: &str, limit: u32, filters: &[(&str, &str)]) -> Vec<ItemSummary> {
        match self.try_search(query, limit, filters).await {
            Ok(page) => page.items,
            Err(e) => {
                warn!("Marketplace search for '{}' failed: {}", query, e);
                Vec::new()
            }
        }
    }

    async fn browse(&self, terms: &str, limit: u32) -> Vec<ItemSummary> {
        match self.try_browse(terms, limit).await {
            Ok(page) => page.items,
            Err(e) => {
                warn!("Marketplace browse for '{}' failed: {}", terms, e);
                Vec::new()
            }
        }
    }
}

// -- Vendor wire format --

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VendorSearchResponse {
    #[serde(default)]
    total: u64,
    #[serde(default)]
    item_summaries: Vec<VendorItem>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VendorItem {
    item_id: String,
    #[serde(default)]
    title: String,
    price: Option<VendorMoney>,
    image: Option<VendorImage>,
    #[serde(default)]
    thumbnail_images: Vec<VendorImage>,
    #[serde(default)]
    additional_images: Vec<VendorImageRef>,
    item_end_date: Option<String>,
    item_web_url: Option<String>,
    condition: Option<String>,
}

#[derive(Deserialize)]
struct VendorMoney {
    value: String,
    #[serde(default)]
    currency: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VendorImage {
    image_url: String,
}

/// Browse results send image objects, older payloads send bare URLs.
#[derive(Deserialize)]
#[serde(untagged)]
enum VendorImageRef {
    Url(String),
    Image(VendorImage),
}

impl From<VendorSearchResponse> for SearchPage {
    fn from(page: VendorSearchResponse) -> Self {
        SearchPage {
            total: page.total,
            items: page.item_summaries.into_iter().map(ItemSummary::from).collect(),
        }
    }
}

impl From<VendorItem> for ItemSummary {
    fn from(item: VendorItem) -> Self {
        let image_url = item
            .image
            .map(|i| i.image_url)
            .or_else(|| item.thumbnail_images.into_iter().next().map(|i| i.image_url));

        ItemSummary {
            id: item.item_id,
            title: item.title,
            price: item.price.map(|p| Money {
                value: p.value,
                currency: p.currency,
            }),
            image_url,
            additional_images: item
                .additional_images
                .into_iter()
                .map(|r| match r {
                    VendorImageRef::Url(url) => url,
                    VendorImageRef::Image(img) => img.image_url,
                })
                .collect(),
            end_date: item.item_end_date,
            item_web_url: item.item_web_url,
            condition: item.condition,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_name_defaults_to_sandbox() {
        assert_eq!(MarketEnv::from_name("production"), MarketEnv::Production);
        assert_eq!(MarketEnv::from_name(" Production "), MarketEnv::Production);
        assert_eq!(MarketEnv::from_name("staging"), MarketEnv::Sandbox);
        assert_eq!(MarketEnv::from_name(""), MarketEnv::Sandbox);
    }

    #[test]
    fn query_gets_category_qualifier() {
        let mut config = MarketConfig::new(MarketEnv::Sandbox, "id".into(), "cert".into());
        assert_eq!(config.qualified("  Stitch "), "Disney Pin Stitch");
        config.qualifier.clear();
        assert_eq!(config.qualified("Stitch"), "Stitch");
    }

    #[test]
    fn debug_output_hides_cert_id() {
        let config = MarketConfig::new(MarketEnv::Sandbox, "app".into(), "s3cret".into());
        assert!(!format!("{config:?}").contains("s3cret"));
    }

    #[test]
    fn maps_vendor_items() {
        let raw = r#"{
            "total": 2,
            "itemSummaries": [
                {
                    "itemId": "v1|1|0",
                    "title": "Disney Pin Stitch",
                    "price": {"value": "12.50", "currency": "USD"},
                    "thumbnailImages": [{"imageUrl": "https://img/thumb.jpg"}],
                    "additionalImages": [{"imageUrl": "https://img/a.jpg"}, "https://img/b.jpg"],
                    "itemEndDate": "2024-05-01T10:00:00.000Z",
                    "condition": "New"
                },
                {
                    "itemId": "v1|2|0",
                    "title": "Disney Pin Jafar",
                    "image": {"imageUrl": "https://img/main.jpg"},
                    "thumbnailImages": [{"imageUrl": "https://img/ignored.jpg"}]
                }
            ]
        }"#;
        let page: SearchPage = serde_json::from_str::<VendorSearchResponse>(raw).unwrap().into();

        assert_eq!(page.total, 2);
        let first = &page.items[0];
        assert_eq!(first.id, "v1|1|0");
        assert_eq!(first.amount(), Some(12.5));
        assert_eq!(first.image_url.as_deref(), Some("https://img/thumb.jpg"));
        assert_eq!(first.additional_images, vec!["https://img/a.jpg", "https://img/b.jpg"]);
        assert_eq!(first.end_date.as_deref(), Some("2024-05-01T10:00:00.000Z"));

        let second = &page.items[1];
        assert_eq!(second.price, None);
        assert_eq!(second.image_url.as_deref(), Some("https://img/main.jpg"));
    }

    #[test]
    fn empty_vendor_body_is_an_empty_page() {
        let page: SearchPage = serde_json::from_str::<VendorSearchResponse>("{}").unwrap().into();
        assert_eq!(page, SearchPage::default());
    }
}
