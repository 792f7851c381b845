#![allow(dead_code)]

use jspay::config::GatewayConfig;
use jspay::domain::params::ParameterSet;
use jspay::domain::signature::{SIGN_FIELD, Signer, SigningKey};
use std::path::{Path, PathBuf};

pub const KEY: &str = "9d101c97133837e13dde2d32a5054abb";
pub const MCH_ID: &str = "755437000006";

pub fn signer() -> Signer {
    Signer::new(SigningKey::new(KEY))
}

pub fn config(endpoint: &str) -> GatewayConfig {
    GatewayConfig::new(
        MCH_ID,
        "wx2421b1c4370ec43b",
        SigningKey::new(KEY),
        "https://shop.example/pay/notify",
    )
    .with_endpoint(endpoint)
}

/// Builds a parameter set and signs it with the test key.
pub fn signed(fields: &[(&str, &str)]) -> ParameterSet {
    let mut params: ParameterSet = fields.iter().copied().collect();
    let sign = signer().sign(&params);
    params.insert(SIGN_FIELD, sign);
    params
}

pub fn paid_fields() -> Vec<(&'static str, &'static str)> {
    vec![
        ("status", "0"),
        ("result_code", "0"),
        ("pay_result", "0"),
        ("mch_id", "M1"),
        ("trade_type", "JSAPI"),
        ("transaction_id", "T1"),
        ("out_trade_no", "O1"),
        ("total_fee", "100"),
        ("time_end", "20230101120000"),
    ]
}

pub fn paid_notification() -> ParameterSet {
    signed(&paid_fields())
}

/// Writes a merchant config file into `dir` and returns its path.
pub fn write_config(dir: &Path) -> PathBuf {
    let path = dir.join("jspay.toml");
    std::fs::write(
        &path,
        format!(
            "mch_id = \"{MCH_ID}\"\nkey = \"{KEY}\"\nnotify_url = \"https://shop.example/pay/notify\"\n"
        ),
    )
    .expect("failed to write config");
    path
}
