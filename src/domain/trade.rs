use crate::error::{GatewayError, Result};
use chrono::{DateTime, Duration, FixedOffset, Offset, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";
/// The gateway reads order timestamps as China Standard Time.
const GATEWAY_UTC_OFFSET_SECS: i32 = 8 * 3600;

/// A positive amount in minor currency units (fen).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Fee(u64);

impl Fee {
    pub fn new(minor_units: u64) -> Result<Self> {
        if minor_units > 0 && i64::try_from(minor_units).is_ok() {
            Ok(Self(minor_units))
        } else {
            Err(GatewayError::Validation(format!(
                "fee must be a positive amount of minor units, got {minor_units}"
            )))
        }
    }

    /// Converts a major-unit amount (yuan) with at most two decimals.
    pub fn from_major(amount: Decimal) -> Result<Self> {
        if amount.normalize().scale() > 2 {
            return Err(GatewayError::Validation(format!(
                "amount {amount} has more than two decimal places"
            )));
        }
        let minor = (amount * Decimal::ONE_HUNDRED)
            .trunc()
            .to_u64()
            .ok_or_else(|| GatewayError::Validation(format!("amount {amount} is out of range")))?;
        Self::new(minor)
    }

    pub fn minor_units(&self) -> u64 {
        self.0
    }

    pub fn to_major(&self) -> Decimal {
        Decimal::new(self.0 as i64, 2)
    }
}

/// Validity window of an order, in the gateway's `yyyyMMddHHmmss` format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeWindow {
    pub time_start: String,
    pub time_expire: String,
}

impl TimeWindow {
    pub fn new(time_start: impl Into<String>, time_expire: impl Into<String>) -> Self {
        Self {
            time_start: time_start.into(),
            time_expire: time_expire.into(),
        }
    }

    /// A window opening at `start` and closing `minutes` later.
    pub fn starting_at<Tz: TimeZone>(start: DateTime<Tz>, minutes: i64) -> Self
    where
        Tz::Offset: fmt::Display,
    {
        let expire = start.clone() + Duration::minutes(minutes);
        Self::new(
            start.format(TIMESTAMP_FORMAT).to_string(),
            expire.format(TIMESTAMP_FORMAT).to_string(),
        )
    }

    /// A window opening at `now`, written in the gateway's UTC+8 clock
    /// whatever the host timezone.
    pub fn in_gateway_time(now: DateTime<Utc>, minutes: i64) -> Self {
        let gateway_tz =
            FixedOffset::east_opt(GATEWAY_UTC_OFFSET_SECS).unwrap_or_else(|| Utc.fix());
        Self::starting_at(now.with_timezone(&gateway_tz), minutes)
    }
}

/// Caller-supplied fields of a unified order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRequest {
    pub out_trade_no: String,
    pub total_fee: Fee,
    pub body: String,
    pub mch_create_ip: String,
    pub attach: Option<String>,
    pub time_window: Option<TimeWindow>,
    pub sub_openid: Option<String>,
    pub mini_program: Option<bool>,
    /// Additional gateway parameters passed through as-is (e.g. `goods_tag`).
    pub extra: BTreeMap<String, String>,
}

impl OrderRequest {
    pub fn new(
        out_trade_no: impl Into<String>,
        total_fee: Fee,
        body: impl Into<String>,
        mch_create_ip: impl Into<String>,
    ) -> Self {
        Self {
            out_trade_no: out_trade_no.into(),
            total_fee,
            body: body.into(),
            mch_create_ip: mch_create_ip.into(),
            attach: None,
            time_window: None,
            sub_openid: None,
            mini_program: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn attach(mut self, attach: impl Into<String>) -> Self {
        self.attach = Some(attach.into());
        self
    }

    pub fn time_window(mut self, window: TimeWindow) -> Self {
        self.time_window = Some(window);
        self
    }

    pub fn sub_openid(mut self, openid: impl Into<String>) -> Self {
        self.sub_openid = Some(openid.into());
        self
    }

    pub fn mini_program(mut self, is_mini_program: bool) -> Self {
        self.mini_program = Some(is_mini_program);
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// Outcome of a unified-order call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TradeResult {
    /// `"0"` on success, otherwise the gateway status.
    pub code: String,
    pub message: Option<String>,
    pub pay_info: Option<String>,
    pub token_id: Option<String>,
}

impl TradeResult {
    pub fn is_success(&self) -> bool {
        self.code == "0"
    }
}

/// A verified, successful payment reported by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TradeUpdate {
    pub code: String,
    pub mch_id: String,
    pub trade_type: String,
    pub transaction_id: String,
    pub out_trade_no: String,
    pub fee: Fee,
    /// Payment completion time, `yyyyMMddHHmmss`.
    pub paid_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorInfo {
    pub code: String,
    pub message: Option<String>,
}

/// What a trade callback is told about one notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum TradeEvent {
    Paid(TradeUpdate),
    Failed(ErrorInfo),
}

/// Literal body the gateway expects in reply to a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acknowledgement {
    Success,
    Failure,
}

impl Acknowledgement {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
        }
    }
}

impl fmt::Display for Acknowledgement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_fee_must_be_positive() {
        assert!(Fee::new(0).is_err());
        assert!(Fee::new(u64::MAX).is_err());
        assert_eq!(Fee::new(1).unwrap().minor_units(), 1);
    }

    #[test]
    fn test_fee_from_major_units() {
        assert_eq!(Fee::from_major(dec!(0.01)).unwrap().minor_units(), 1);
        assert_eq!(Fee::from_major(dec!(12.50)).unwrap().minor_units(), 1250);
        assert_eq!(Fee::from_major(dec!(3)).unwrap().minor_units(), 300);
        assert!(Fee::from_major(dec!(0.001)).is_err());
        assert!(Fee::from_major(dec!(-1)).is_err());
    }

    #[test]
    fn test_fee_to_major_units() {
        assert_eq!(Fee::new(1250).unwrap().to_major(), dec!(12.50));
    }

    #[test]
    fn test_time_window_format() {
        let start = FixedOffset::east_opt(8 * 3600)
            .unwrap()
            .with_ymd_and_hms(2023, 1, 1, 11, 55, 0)
            .unwrap();
        let window = TimeWindow::starting_at(start, 10);

        assert_eq!(window.time_start, "20230101115500");
        assert_eq!(window.time_expire, "20230101120500");
    }

    #[test]
    fn test_time_window_uses_gateway_clock() {
        let now = Utc.with_ymd_and_hms(2023, 1, 1, 3, 55, 0).unwrap();
        let window = TimeWindow::in_gateway_time(now, 10);

        assert_eq!(window.time_start, "20230101115500");
        assert_eq!(window.time_expire, "20230101120500");
    }

    #[test]
    fn test_acknowledgement_literals() {
        assert_eq!(Acknowledgement::Success.to_string(), "success");
        assert_eq!(Acknowledgement::Failure.to_string(), "failure");
    }

    #[test]
    fn test_order_builder_methods() {
        let order = OrderRequest::new("O1", Fee::new(100).unwrap(), "book", "8.8.8.8")
            .attach("memo")
            .mini_program(true)
            .with_param("goods_tag", "promo");

        assert_eq!(order.attach.as_deref(), Some("memo"));
        assert_eq!(order.mini_program, Some(true));
        assert_eq!(order.extra.get("goods_tag").map(String::as_str), Some("promo"));
        assert!(order.sub_openid.is_none());
    }
}
