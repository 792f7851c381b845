use crate::config::GatewayConfig;
use crate::domain::params::{ParameterSet, is_param_name};
use crate::domain::ports::NonceSourceBox;
use crate::domain::signature::{SIGN_FIELD, Signer};
use crate::domain::trade::OrderRequest;
use crate::error::{GatewayError, Result};
use std::sync::Arc;
use tracing::debug;

pub const CHARSET: &str = "UTF-8";
pub const SERVICE: &str = "pay.weixin.jspay";
/// Credit cards are accepted ("1" would refuse them).
pub const LIMIT_CREDIT_PAY: &str = "0";
/// Ask for the raw JS payment payload in `pay_info`.
pub const IS_RAW: &str = "1";
pub const NONCE_LEN: usize = 32;

/// Turns caller orders into signed unified-order parameter sets.
pub struct TradeRequestBuilder {
    config: Arc<GatewayConfig>,
    signer: Signer,
    nonce: NonceSourceBox,
}

impl TradeRequestBuilder {
    pub fn new(config: Arc<GatewayConfig>, signer: Signer, nonce: NonceSourceBox) -> Self {
        Self {
            config,
            signer,
            nonce,
        }
    }

    /// Builds a fresh request. Each call draws a new nonce.
    ///
    /// Fails when an extra parameter name is not an identifier.
    pub fn build(&self, order: &OrderRequest) -> Result<ParameterSet> {
        let mut params = ParameterSet::new();

        for (key, value) in &order.extra {
            if !is_param_name(key) {
                return Err(GatewayError::Validation(format!(
                    "`{key}` is not a valid parameter name"
                )));
            }
            params.insert(key.as_str(), value.as_str());
        }
        params.insert("out_trade_no", order.out_trade_no.as_str());
        params.insert("total_fee", order.total_fee.minor_units() as i64);
        params.insert("body", order.body.as_str());
        params.insert("mch_create_ip", order.mch_create_ip.as_str());
        params.insert_opt("attach", order.attach.as_deref());
        if let Some(window) = &order.time_window {
            params.insert("time_start", window.time_start.as_str());
            params.insert("time_expire", window.time_expire.as_str());
        }
        params.insert_opt("sub_openid", order.sub_openid.as_deref());
        params.insert_opt(
            "is_minipg",
            order.mini_program.map(|flag| if flag { "1" } else { "0" }),
        );

        // Fixed fields win over anything the caller passed under the same name.
        params.insert("mch_id", self.config.mch_id.as_str());
        params.insert("sub_appid", self.config.sub_appid.as_str());
        params.insert("version", self.config.version.as_str());
        params.insert("charset", CHARSET);
        params.insert("nonce_str", self.nonce.nonce(NONCE_LEN));
        params.insert("service", SERVICE);
        params.insert("limit_credit_pay", LIMIT_CREDIT_PAY);
        params.insert("notify_url", self.config.notify_url.as_str());
        params.insert("is_raw", IS_RAW);

        params.strip_empty();
        let sign = self.signer.sign(&params);
        params.insert(SIGN_FIELD, sign);

        debug!(
            out_trade_no = %order.out_trade_no,
            fields = params.len(),
            "built unified order request"
        );
        Ok(params)
    }
}
