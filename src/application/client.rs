use super::gateway::Gateway;
use super::notification::NotificationProcessor;
use super::request_builder::TradeRequestBuilder;
use crate::config::GatewayConfig;
use crate::domain::ports::{HttpClientBox, NonceSourceBox, TradeCallback};
use crate::domain::signature::Signer;
use crate::domain::trade::{Acknowledgement, OrderRequest, TradeResult};
use crate::error::Result;
use crate::infrastructure::http::ReqwestHttpClient;
use crate::infrastructure::nonce::OsNonceSource;
use std::sync::Arc;

/// The main entry point for merchants.
///
/// `PaymentClient` places unified orders and handles trade notifications for
/// a single merchant configuration. It holds no mutable state, so one
/// instance can serve concurrent tasks.
pub struct PaymentClient {
    config: Arc<GatewayConfig>,
    builder: TradeRequestBuilder,
    gateway: Gateway,
    notifications: NotificationProcessor,
}

impl PaymentClient {
    /// Creates a client with explicit transport and nonce adapters.
    ///
    /// # Arguments
    ///
    /// * `config` - Validated merchant configuration.
    /// * `http` - Transport used to reach the gateway.
    /// * `nonce` - Source of per-request nonces.
    pub fn new(config: GatewayConfig, http: HttpClientBox, nonce: NonceSourceBox) -> Result<Self> {
        config.validate()?;
        let config = Arc::new(config);
        let signer = Signer::new(config.key.clone());

        Ok(Self {
            builder: TradeRequestBuilder::new(Arc::clone(&config), signer.clone(), nonce),
            gateway: Gateway::new(config.endpoint.clone(), http, signer.clone()),
            notifications: NotificationProcessor::new(signer),
            config,
        })
    }

    /// Creates a client talking HTTPS to the configured endpoint.
    pub fn from_config(config: GatewayConfig) -> Result<Self> {
        let http = ReqwestHttpClient::new(config.timeout())?;
        Self::new(config, Box::new(http), Box::new(OsNonceSource))
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Places a unified order and returns the prepay details.
    pub async fn place_order(&self, order: &OrderRequest) -> Result<TradeResult> {
        let request = self.builder.build(order)?;
        self.gateway.submit(&request).await
    }

    /// Handles a raw notification body; reply to the gateway with the returned
    /// acknowledgement.
    pub fn trade_updated<C>(&self, body: &str, callback: &C) -> Result<Acknowledgement>
    where
        C: TradeCallback + ?Sized,
    {
        self.notifications.process_raw(body, callback)
    }
}
