//! Command-line behaviour of the `quotex` binary.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const QUOTE_CSV: &str = "Quote 118,,,\n\
    Part Number,Description,Quantity,Unit Price\n\
    SRV-1,Rack server 2U,2,4500\n\
    CAB-7,Patch cord 2m,10,\n";

/// `quotex` with its user config directory pointed into `dir`.
fn quotex(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("quotex").unwrap();
    cmd.env("XDG_CONFIG_HOME", dir.path()).env("HOME", dir.path());
    cmd
}

fn write(dir: &Path, name: &str, content: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path.display().to_string()
}

#[test]
fn help_lists_subcommands() {
    let dir = TempDir::new().unwrap();
    quotex(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("extract").and(predicate::str::contains("config")));
}

#[test]
fn extract_csv_as_json() {
    let dir = TempDir::new().unwrap();
    let csv = write(dir.path(), "quote.csv", QUOTE_CSV);

    let output = quotex(&dir).args(["extract", &csv]).output().unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let products = report["products"].as_array().unwrap();
    assert_eq!(products.len(), 2);
    assert_eq!(products[0]["sku"], "SRV-1");
    assert_eq!(products[0]["unit_price"], "4500");
    assert_eq!(products[1]["sku"], "CAB-7");
    assert_eq!(products[1]["unit_price"], "0");
    assert_eq!(report["documents"][0]["kind"], "csv");
}

#[test]
fn extract_csv_output_file() {
    let dir = TempDir::new().unwrap();
    let csv = write(dir.path(), "quote.csv", QUOTE_CSV);
    let out = dir.path().join("products.csv");

    quotex(&dir)
        .args(["extract", &csv, "-f", "csv", "-o"])
        .arg(&out)
        .assert()
        .success()
        .stderr(predicate::str::contains("2 products written"));

    let written = fs::read_to_string(&out).unwrap();
    let mut lines = written.lines();
    assert_eq!(
        lines.next(),
        Some("sku,description,quantity,unit_price,total_price,source,sources,category,source_file")
    );
    assert!(lines.next().unwrap().starts_with("SRV-1,Rack server 2U,2,4500,9000,excel,excel"));
}

#[test]
fn email_body_merges_with_spreadsheet() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a.csv", QUOTE_CSV);
    let body = write(
        dir.path(),
        "body.txt",
        "Please add:\nSKU | Description | Qty\nsrv 1 | Rack server 2U | 1\n",
    );
    let pattern = format!("{}/*.csv", dir.path().display());

    quotex(&dir)
        .args(["extract", &pattern, "--email-body", &body, "-f", "text"])
        .assert()
        .success()
        .stdout(predicate::str::contains("SRV-1").and(predicate::str::contains("    3 x 4500")));
}

#[test]
fn nothing_valid_fails() {
    let dir = TempDir::new().unwrap();
    let body = write(dir.path(), "body.txt", "Thanks, talk soon.");

    quotex(&dir)
        .args(["extract", "--email-body", &body])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no valid products"));
}

#[test]
fn missing_and_unsupported_inputs_fail() {
    let dir = TempDir::new().unwrap();
    quotex(&dir)
        .args(["extract", "does-not-exist.xlsx"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));

    let msg = write(dir.path(), "mail.msg", "binary");
    quotex(&dir)
        .args(["extract", &msg])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported document format"));
}

#[test]
fn config_init_refuses_to_overwrite() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cfg").join("config.json");

    quotex(&dir)
        .args(["config", "init", "--output"])
        .arg(&path)
        .assert()
        .success();
    assert!(path.exists());

    quotex(&dir)
        .args(["config", "init", "--output"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    quotex(&dir)
        .args(["config", "init", "--force", "--output"])
        .arg(&path)
        .assert()
        .success();
}

#[test]
fn config_set_then_get() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json").display().to_string();

    quotex(&dir)
        .args(["--config", &path, "config", "set", "extraction.price_floor", "250"])
        .assert()
        .success();
    quotex(&dir)
        .args(["--config", &path, "config", "get", "extraction.price_floor"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"250\""));

    quotex(&dir)
        .args(["--config", &path, "config", "set", "extraction.no_such_key", "1"])
        .assert()
        .failure();
    quotex(&dir)
        .args(["--config", &path, "config", "set", "extraction.lookahead_rows", "many"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid value"));
}

#[test]
fn explicit_config_must_exist_for_extract() {
    let dir = TempDir::new().unwrap();
    let csv = write(dir.path(), "quote.csv", QUOTE_CSV);

    quotex(&dir)
        .args(["--config", "missing.json", "extract", &csv])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read config"));
}
