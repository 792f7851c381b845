//! Application layer: the components a merchant integration drives.
//!
//! `TradeRequestBuilder` prepares signed orders, `Gateway` submits them and
//! `NotificationProcessor` handles the asynchronous callbacks. `PaymentClient`
//! wires the three together around one configuration.

pub mod client;
pub mod gateway;
pub mod notification;
pub mod request_builder;

/// Gateway status fields are numeric strings; anything that is not zero,
/// including unparsable text, is a failure.
pub(crate) fn is_zero_status(value: &str) -> bool {
    value.trim().parse::<i64>() == Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_status_detection() {
        assert!(is_zero_status("0"));
        assert!(is_zero_status(" 00 "));
        assert!(!is_zero_status("400"));
        assert!(!is_zero_status("SUCCESS"));
        assert!(!is_zero_status(""));
    }
}
