use super::is_zero_status;
use crate::domain::params::ParameterSet;
use crate::domain::ports::HttpClientBox;
use crate::domain::signature::Signer;
use crate::domain::trade::TradeResult;
use crate::error::{GatewayError, Result};
use crate::interfaces::xml;
use tracing::{debug, warn};

/// Posts signed requests to the gateway and interprets its replies.
pub struct Gateway {
    endpoint: String,
    http: HttpClientBox,
    signer: Signer,
}

impl Gateway {
    pub fn new(endpoint: impl Into<String>, http: HttpClientBox, signer: Signer) -> Self {
        Self {
            endpoint: endpoint.into(),
            http,
            signer,
        }
    }

    /// Submits a signed request.
    ///
    /// A successful reply is only trusted once its own signature checks out.
    /// Gateway-side failures come back as a non-zero `TradeResult::code`,
    /// not as an error.
    pub async fn submit(&self, request: &ParameterSet) -> Result<TradeResult> {
        let reply = self.http.post(&self.endpoint, xml::encode(request)).await?;
        if reply.status != 200 {
            warn!(status = reply.status, "gateway rejected request");
            return Err(GatewayError::Transport {
                status: reply.status,
                body: reply.body,
            });
        }

        let response = xml::decode(&reply.body).map_err(|e| {
            GatewayError::Protocol(format!("{e}; response body: {}", reply.body))
        })?;
        let Some(status) = response.text("status") else {
            return Err(GatewayError::Protocol(format!(
                "response has no status field: {}",
                reply.body
            )));
        };
        let message = response.text("message");

        if !is_zero_status(&status) {
            debug!(status = %status, message = ?message, "gateway declined order");
            return Ok(TradeResult {
                code: status,
                message,
                pay_info: None,
                token_id: None,
            });
        }

        self.signer.verify(&response)?;
        debug!("gateway accepted order");

        Ok(TradeResult {
            code: "0".to_string(),
            message,
            pay_info: response.text("pay_info"),
            token_id: response.text("token_id"),
        })
    }
}
