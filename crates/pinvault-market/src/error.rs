use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum MarketError {
    #[error("marketplace authentication failed: {0}")]
    Auth(String),
    #[error("marketplace request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("marketplace returned {0}")]
    Status(StatusCode),
    #[error("unexpected marketplace response: {0}")]
    Decode(String),
}
