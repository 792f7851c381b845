use super::trade::TradeEvent;
use crate::error::Result;
use async_trait::async_trait;

/// Status and body of an HTTP reply, as seen by the gateway layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

/// Posts a raw request body and hands back whatever the server answered.
///
/// Implementations must not interpret the status code; non-200 handling
/// belongs to the gateway layer.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn post(&self, url: &str, body: String) -> Result<HttpReply>;
}

/// Produces alphanumeric nonces of the requested length.
pub trait NonceSource: Send + Sync {
    fn nonce(&self, len: usize) -> String;
}

pub type HttpClientBox = Box<dyn HttpClient>;
pub type NonceSourceBox = Box<dyn NonceSource>;

pub type CallbackError = Box<dyn std::error::Error + Send + Sync>;
pub type CallbackResult = std::result::Result<bool, CallbackError>;

/// Receives the outcome of a processed notification.
///
/// Returning `Ok(true)` acknowledges a paid trade; anything else asks the
/// gateway to retry delivery.
pub trait TradeCallback {
    fn on_trade(&self, event: &TradeEvent) -> CallbackResult;
}

impl<F> TradeCallback for F
where
    F: Fn(&TradeEvent) -> CallbackResult,
{
    fn on_trade(&self, event: &TradeEvent) -> CallbackResult {
        self(event)
    }
}
