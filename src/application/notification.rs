//! Processing of asynchronous trade notifications pushed by the gateway.
//!
//! A notification is walked through a fixed sequence of checks: outer
//! `status`, `result_code`, `pay_result`, then the signature. Business
//! failures are reported to the callback and acknowledged with `failure`;
//! a bad signature is an error and the callback never hears about it.

use super::is_zero_status;
use crate::domain::params::ParameterSet;
use crate::domain::ports::TradeCallback;
use crate::domain::signature::Signer;
use crate::domain::trade::{Acknowledgement, ErrorInfo, Fee, TradeEvent, TradeUpdate};
use crate::error::{GatewayError, Result};
use crate::interfaces::{form, xml};
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, info, warn};

/// Error code reported to the callback when a verified notification lacks
/// trade fields or carries an unreadable amount.
pub const MALFORMED_TRADE: &str = "MALFORMED_TRADE";

pub struct NotificationProcessor {
    signer: Signer,
}

impl NotificationProcessor {
    pub fn new(signer: Signer) -> Self {
        Self { signer }
    }

    /// Parses a raw notification body, XML first and URL-encoded form second.
    pub fn normalize(body: &str) -> Result<ParameterSet> {
        match xml::decode(body) {
            Ok(params) => Ok(params),
            Err(xml_err) => {
                debug!(error = %xml_err, "notification is not XML, trying form encoding");
                form::decode(body).map_err(|form_err| {
                    warn!(xml = %xml_err, form = %form_err, "unreadable notification body");
                    GatewayError::Format
                })
            }
        }
    }

    pub fn process_raw<C>(&self, body: &str, callback: &C) -> Result<Acknowledgement>
    where
        C: TradeCallback + ?Sized,
    {
        let notification = Self::normalize(body)?;
        self.process(&notification, callback)
    }

    /// Runs one notification to a terminal acknowledgement.
    ///
    /// The callback is invoked exactly once unless an error is returned.
    pub fn process<C>(&self, notification: &ParameterSet, callback: &C) -> Result<Acknowledgement>
    where
        C: TradeCallback + ?Sized,
    {
        if let Some(status) = notification.text("status")
            && !is_zero_status(&status)
        {
            let error = ErrorInfo {
                code: status,
                message: notification.text("message"),
            };
            return Ok(Self::reject(callback, error));
        }

        if let Some(result_code) = notification.text("result_code")
            && !is_zero_status(&result_code)
        {
            let code = notification
                .text("err_code")
                .filter(|code| !code.is_empty())
                .unwrap_or(result_code);
            let error = ErrorInfo {
                code,
                message: notification.text("message"),
            };
            return Ok(Self::reject(callback, error));
        }

        if let Some(pay_result) = notification.text("pay_result")
            && !is_zero_status(&pay_result)
        {
            let error = ErrorInfo {
                code: pay_result,
                message: notification.text("pay_info"),
            };
            return Ok(Self::reject(callback, error));
        }

        self.signer.verify(notification)?;

        let trade = match trade_update(notification) {
            Ok(trade) => trade,
            Err(message) => {
                warn!(%message, "signed notification cannot be mapped to a trade");
                let error = ErrorInfo {
                    code: MALFORMED_TRADE.to_string(),
                    message: Some(message),
                };
                return Ok(Self::reject(callback, error));
            }
        };
        info!(
            out_trade_no = %trade.out_trade_no,
            transaction_id = %trade.transaction_id,
            fee = trade.fee.minor_units(),
            "trade paid"
        );

        if deliver(callback, &TradeEvent::Paid(trade)) {
            Ok(Acknowledgement::Success)
        } else {
            Ok(Acknowledgement::Failure)
        }
    }

    fn reject<C>(callback: &C, error: ErrorInfo) -> Acknowledgement
    where
        C: TradeCallback + ?Sized,
    {
        debug!(code = %error.code, message = ?error.message, "trade notification reports failure");
        deliver(callback, &TradeEvent::Failed(error));
        Acknowledgement::Failure
    }
}

/// Invokes the callback and reports whether it acknowledged.
///
/// Errors and panics raised by the callback are logged and discarded; they
/// count as a refusal.
fn deliver<C>(callback: &C, event: &TradeEvent) -> bool
where
    C: TradeCallback + ?Sized,
{
    match panic::catch_unwind(AssertUnwindSafe(|| callback.on_trade(event))) {
        Ok(Ok(acknowledged)) => acknowledged,
        Ok(Err(e)) => {
            warn!(error = %e, "trade callback failed");
            false
        }
        Err(_) => {
            warn!("trade callback panicked");
            false
        }
    }
}

fn trade_update(notification: &ParameterSet) -> std::result::Result<TradeUpdate, String> {
    let field = |name: &str| {
        notification
            .text(name)
            .ok_or_else(|| format!("paid notification has no `{name}` field"))
    };

    let total_fee = field("total_fee")?;
    let fee = total_fee
        .trim()
        .parse::<u64>()
        .ok()
        .and_then(|units| Fee::new(units).ok())
        .ok_or_else(|| format!("total_fee `{total_fee}` is not an amount"))?;

    Ok(TradeUpdate {
        code: "0".to_string(),
        mch_id: field("mch_id")?,
        trade_type: field("trade_type")?,
        transaction_id: field("transaction_id")?,
        out_trade_no: field("out_trade_no")?,
        fee,
        paid_at: field("time_end")?,
    })
}
