//! CLI integration tests
//!
//! Runs the `carta-captable` binary directly with assert_cmd.

#![allow(deprecated)] // Command::cargo_bin deprecation - no stable replacement yet

mod common;

use assert_cmd::Command;
use common::*;
use predicates::prelude::*;
use tempfile::TempDir;

fn cli() -> Command {
    let mut cmd = Command::cargo_bin("carta-captable").unwrap();
    cmd.env_remove("CARTA_CAPTABLE_CONFIG").env_remove("RUST_LOG");
    cmd
}

// ═══════════════════════════════════════════════════════════════════════════
// HELP AND VERSION TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_cli_help() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("carta-captable"))
        .stdout(predicate::str::contains("COMMANDS"));
}

#[test]
fn test_cli_version() {
    cli()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("carta-captable"));
}

#[test]
fn test_transform_help_shows_layout() {
    cli()
        .args(["transform", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Other Investors"));
}

// ═══════════════════════════════════════════════════════════════════════════
// TRANSFORM
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_transform_prints_summary() {
    let dir = TempDir::new().unwrap();
    let fixture = ExportFixture::new("Acme").with_holders(descending_holders(11));
    let (export, template) = write_inputs(dir.path(), &fixture);

    cli()
        .arg("transform")
        .arg(&export)
        .arg(&template)
        .assert()
        .success()
        .stdout(predicate::str::contains("Transformation complete"))
        .stdout(predicate::str::contains("Acme_Cap_Table_20240331.xlsx"));

    assert!(dir.path().join("Acme_Cap_Table_20240331.xlsx").exists());
}

#[test]
fn test_transform_json_to_output_dir() {
    let dir = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let fixture = ExportFixture::new("Acme").with_holders(descending_holders(11));
    let (export, template) = write_inputs(dir.path(), &fixture);

    let output = cli()
        .arg("transform")
        .arg(&export)
        .arg(&template)
        .arg("-o")
        .arg(out.path())
        .arg("--json")
        .output()
        .unwrap();
    assert!(output.status.success());

    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["investors_processed"], 11);
    assert_eq!(summary["top_investors"], 9);
    assert_eq!(summary["other_investors"], 2);
    assert_eq!(summary["as_of_date"], "2024-03-31");
    assert!(out.path().join("Acme_Cap_Table_20240331.xlsx").exists());
}

#[test]
fn test_transform_missing_export_fails() {
    let dir = TempDir::new().unwrap();
    let template = dir.path().join("template.xlsx");
    write_template(&template);

    cli()
        .arg("transform")
        .arg(dir.path().join("missing.xlsx"))
        .arg(&template)
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing.xlsx"));
}

#[test]
fn test_transform_with_config_file() {
    let dir = TempDir::new().unwrap();
    let fixture = ExportFixture::new("Acme").with_holders(descending_holders(3));
    let (export, template) = write_inputs(dir.path(), &fixture);
    let config = dir.path().join("layout.yaml");
    std::fs::write(&config, "template:\n  raw_sheet_name: Export Copy\n").unwrap();

    cli()
        .arg("--config")
        .arg(&config)
        .arg("transform")
        .arg(&export)
        .arg(&template)
        .assert()
        .success()
        .stdout(predicate::str::contains("Export Copy"));
}

// ═══════════════════════════════════════════════════════════════════════════
// INSPECT / INIT-TEMPLATE / CONFIG
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_inspect_lists_holders() {
    let dir = TempDir::new().unwrap();
    let export = dir.path().join("export.xlsx");
    ExportFixture::new("Acme")
        .with_holders(descending_holders(10))
        .write(&export);

    cli()
        .arg("inspect")
        .arg(&export)
        .assert()
        .success()
        .stdout(predicate::str::contains("Investor 01"))
        .stdout(predicate::str::contains("Investor 10"))
        .stdout(predicate::str::contains("Series Seed Preferred (SS) Units"));

    // Inspect never writes anything
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn test_inspect_json() {
    let dir = TempDir::new().unwrap();
    let export = dir.path().join("export.xlsx");
    ExportFixture::new("Acme")
        .with_holders(descending_holders(2))
        .write(&export);

    let output = cli().arg("inspect").arg(&export).arg("--json").output().unwrap();
    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed["company_name"], "Acme");
    assert_eq!(parsed["header_row_index"], 3);
    assert_eq!(parsed["stakeholders"].as_array().map(Vec::len), Some(2));
}

#[test]
fn test_init_template_then_transform() {
    let dir = TempDir::new().unwrap();
    let template = dir.path().join("starter.xlsx");
    let export = dir.path().join("export.xlsx");
    ExportFixture::new("Acme")
        .with_holders(descending_holders(2))
        .write(&export);

    cli()
        .arg("init-template")
        .arg(&template)
        .assert()
        .success()
        .stdout(predicate::str::contains("Template written"));
    assert!(template.exists());

    cli().arg("transform").arg(&export).arg(&template).assert().success();
}

#[test]
fn test_config_prints_defaults() {
    cli()
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("sheet_name: Detailed Cap"))
        .stdout(predicate::str::contains("raw_sheet_name: Carta Raw"))
        .stdout(predicate::str::contains("top_investor_count: 9"));
}

#[test]
fn test_invalid_config_rejected() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("layout.yaml");
    std::fs::write(&config, "template:\n  company_cell: nowhere\n").unwrap();

    cli().arg("--config").arg(&config).arg("config").assert().failure();
}
