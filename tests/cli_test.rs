use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use jspay::domain::signature::SIGN_FIELD;
use jspay::interfaces::xml;
use predicates::prelude::*;
use std::process::Command;

mod common;

#[test]
fn test_notify_acknowledges_paid_trade() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let config = common::write_config(dir.path());
    let notification = dir.path().join("notify.xml");
    std::fs::write(&notification, xml::encode(&common::paid_notification()))?;

    let mut cmd = Command::new(cargo_bin!("jspay"));
    cmd.arg("notify").arg("--config").arg(&config).arg(&notification);

    cmd.assert()
        .success()
        .stdout(predicate::str::diff("success\n"))
        .stderr(predicate::str::contains(r#""event":"paid""#))
        .stderr(predicate::str::contains(r#""out_trade_no":"O1""#));

    Ok(())
}

#[test]
fn test_notify_reports_failed_status() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let config = common::write_config(dir.path());
    let notification = dir.path().join("notify.txt");
    std::fs::write(&notification, "status=400&message=bad%20request")?;

    let mut cmd = Command::new(cargo_bin!("jspay"));
    cmd.arg("notify").arg("--config").arg(&config).arg(&notification);

    cmd.assert()
        .success()
        .stdout(predicate::str::diff("failure\n"))
        .stderr(predicate::str::contains(r#""code":"400""#));

    Ok(())
}

#[test]
fn test_notify_rejects_forged_signature() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let config = common::write_config(dir.path());
    let mut forged = common::paid_notification();
    forged.insert("total_fee", "1");
    let notification = dir.path().join("notify.xml");
    std::fs::write(&notification, xml::encode(&forged))?;

    let mut cmd = Command::new(cargo_bin!("jspay"));
    cmd.arg("notify").arg("--config").arg(&config).arg(&notification);

    cmd.assert()
        .failure()
        .stdout(predicate::str::contains("success").not())
        .stderr(predicate::str::contains("signature verification failed"));

    Ok(())
}

#[test]
fn test_sign_ignores_existing_signature() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let config = common::write_config(dir.path());
    let params = common::paid_notification();
    let expected = params.text(SIGN_FIELD).unwrap_or_default();
    let input = dir.path().join("params.xml");
    std::fs::write(&input, xml::encode(&params))?;

    let mut cmd = Command::new(cargo_bin!("jspay"));
    cmd.arg("sign").arg("--config").arg(&config).arg(&input);

    cmd.assert()
        .success()
        .stdout(predicate::str::diff(format!("{expected}\n")));

    Ok(())
}

#[test]
fn test_missing_config_fails() {
    let mut cmd = Command::new(cargo_bin!("jspay"));
    cmd.arg("sign").arg("--config").arg("does/not/exist.toml");

    cmd.assert().failure();
}
