//! Merchant configuration.
//!
//! Loaded once from TOML and owned by the client for its whole lifetime:
//!
//! ```toml
//! mch_id = "755437000006"
//! sub_appid = "wx1234567890"
//! key = "9d101c97133837e13dde2d32a5054abb"
//! notify_url = "https://shop.example/pay/notify"
//! ```

use crate::domain::signature::SigningKey;
use crate::error::{GatewayError, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Unified-order endpoint of the gateway.
pub const DEFAULT_ENDPOINT: &str = "https://pay.swiftpass.cn/pay/gateway";
pub const DEFAULT_VERSION: &str = "2.0";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Merchant (commercial tenant) id.
    pub mch_id: String,
    /// App id of the WeChat official account or mini-program.
    #[serde(default)]
    pub sub_appid: String,
    #[serde(default = "default_version")]
    pub version: String,
    pub key: SigningKey,
    pub notify_url: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_version() -> String {
    DEFAULT_VERSION.to_string()
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl GatewayConfig {
    pub fn new(
        mch_id: impl Into<String>,
        sub_appid: impl Into<String>,
        key: SigningKey,
        notify_url: impl Into<String>,
    ) -> Self {
        Self {
            mch_id: mch_id.into(),
            sub_appid: sub_appid.into(),
            version: default_version(),
            key,
            notify_url: notify_url.into(),
            endpoint: default_endpoint(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Parses and validates a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(contents).map_err(|e| Self::error(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> Result<()> {
        if self.mch_id.trim().is_empty() {
            return Err(Self::error("mch_id must not be empty"));
        }
        if self.key.is_empty() {
            return Err(Self::error("key must not be empty"));
        }
        url::Url::parse(&self.endpoint)
            .map_err(|e| Self::error(format!("endpoint `{}`: {e}", self.endpoint)))?;
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn error(message: impl Into<String>) -> GatewayError {
        GatewayError::Config(message.into())
    }
}
