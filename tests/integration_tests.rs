//! Integration tests for the mortarlab CLI
//!
//! These tests exercise the CLI commands end-to-end using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// A mortarlab command isolated from the user's configuration
fn mortarlab(tmp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("mortarlab").unwrap();
    cmd.current_dir(tmp.path())
        .env("HOME", tmp.path())
        .env("XDG_CONFIG_HOME", tmp.path().join(".config"))
        .env_remove("MORTARLAB_PRODUCT")
        .env_remove("MORTARLAB_FORMAT")
        .env_remove("RUST_LOG");
    cmd
}

fn workspace() -> TempDir {
    TempDir::new().unwrap()
}

// ============================================================================
// CLI Basic Tests
// ============================================================================

#[test]
fn test_help_displays() {
    let tmp = workspace();
    mortarlab(&tmp)
        .arg("-h")
        .assert()
        .success()
        .stdout(predicate::str::contains("Mortar laboratory test calculator"));

    mortarlab(&tmp)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Computes laboratory test results"));
}

#[test]
fn test_version_displays() {
    let tmp = workspace();
    mortarlab(&tmp)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("mortarlab"));
}

#[test]
fn test_products_lists_all_lines() {
    let tmp = workspace();
    mortarlab(&tmp)
        .args(["products", "-f", "tsv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("basecoat\tBasecoat\t10"))
        .stdout(predicate::str::contains("graute\tGraute\t4"))
        .stdout(predicate::str::contains("revestimento"));
}

// ============================================================================
// Requisites and resolver
// ============================================================================

#[test]
fn test_reqs_lists_sequence() {
    let tmp = workspace();
    mortarlab(&tmp)
        .args(["reqs", "graute", "-f", "tsv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1\tDENSIDADE NO ESTADO FRESCO"))
        .stdout(predicate::str::contains("cylindrical-compressive"))
        .stdout(predicate::str::contains("4\tVARIAÇÃO DE MASSA"));
}

#[test]
fn test_reqs_after_prints_next() {
    let tmp = workspace();
    mortarlab(&tmp)
        .args(["reqs", "graute", "--after", "cylindrical-compressive", "-f", "tsv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("dimensional-variation"))
        .stdout(predicate::str::contains("Graute::variacao-dimensional"))
        .stdout(predicate::str::contains("fresh-density").not());
}

#[test]
fn test_reqs_after_last_prints_nothing() {
    let tmp = workspace();
    mortarlab(&tmp)
        .args(["reqs", "graute", "--after", "mass-variation"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_reqs_without_product_fails() {
    let tmp = workspace();
    mortarlab(&tmp)
        .arg("reqs")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no product line given"));
}

#[test]
fn test_resolve_requisite_text() {
    let tmp = workspace();
    mortarlab(&tmp)
        .args(["resolve", "graute", "COMPRESSÃO (MPa)", "-f", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"test\": \"cylindrical-compressive\""));

    mortarlab(&tmp)
        .args(["resolve", "basecoat", "RETENÇÃO DE ÁGUA (%)", "-f", "tsv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("water-retention-paste"));
}

#[test]
fn test_resolve_unknown_requisite() {
    let tmp = workspace();
    mortarlab(&tmp)
        .args(["resolve", "rejunte", "ABRASÃO", "-f", "tsv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("not-implemented"));
}

// ============================================================================
// Limits and fields
// ============================================================================

#[test]
fn test_limits_for_product_marks_overrides() {
    let tmp = workspace();
    mortarlab(&tmp)
        .args(["limits", "graute", "-f", "tsv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("reference_length\t130.43\tmm\tproduct"))
        .stdout(predicate::str::contains("adhesion_min_specimens\t6\tCPs\tdefault"));
}

#[test]
fn test_limits_matrix_without_product() {
    let tmp = workspace();
    mortarlab(&tmp)
        .args(["limits", "-f", "md"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Revestimento"))
        .stdout(predicate::str::contains("130.43*"));
}

#[test]
fn test_fields_lists_schema() {
    let tmp = workspace();
    mortarlab(&tmp)
        .args(["fields", "rejunte", "manual-adhesion", "-f", "tsv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("diameter"))
        .stdout(predicate::str::contains("cp13"));
}

#[test]
fn test_fields_unknown_test_fails() {
    let tmp = workspace();
    mortarlab(&tmp)
        .args(["fields", "rejunte", "abrasion"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no calculator"));
}

// ============================================================================
// Calculations
// ============================================================================

#[test]
fn test_calc_water_retention_ratio() {
    let tmp = workspace();
    mortarlab(&tmp)
        .args([
            "calc",
            "rejunte",
            "water-retention-ratio",
            "--set",
            "rr=80",
            "--set",
            "rt=100",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("80.00"))
        .stdout(predicate::str::contains("accepted"));
}

#[test]
fn test_calc_flexural_quiet_prints_final_mean() {
    let tmp = workspace();
    mortarlab(&tmp)
        .args([
            "calc", "basecoat", "flexural", "-s", "cp1=5", "-s", "cp2=5,2", "-s", "cp3=4.5", "-q",
        ])
        .assert()
        .success()
        .stdout("5.10\n");
}

#[test]
fn test_calc_json_output() {
    let tmp = workspace();
    mortarlab(&tmp)
        .args([
            "calc",
            "basecoat",
            "FLEXÃO 4x4x16 (MPa) - ABNT NBR 13279:2005",
            "--set",
            "cp1=5.0",
            "--set",
            "cp2=5.2",
            "--set",
            "cp3=4.5",
            "-f",
            "json",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"verdict\": \"accepted\""))
        .stdout(predicate::str::contains("\"status\": \"excluded\""));
}

#[test]
fn test_calc_repeat_test_is_success() {
    let tmp = workspace();
    mortarlab(&tmp)
        .args([
            "calc", "basecoat", "flexural", "--set", "cp1=3", "--set", "cp2=5", "--set", "cp3=7",
            "-f", "tsv",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("repeat_test"));
}

#[test]
fn test_calc_input_file_then_set() {
    let tmp = workspace();
    let input = tmp.path().join("readings.yaml");
    fs::write(&input, "rr: 50\nrt: 100\n").unwrap();

    mortarlab(&tmp)
        .args(["calc", "revestimento", "water-retention-ratio", "--input"])
        .arg(&input)
        .args(["--set", "rr=90", "-q"])
        .assert()
        .success()
        .stdout("90.00\n");
}

#[test]
fn test_calc_input_fault_exits_non_zero() {
    let tmp = workspace();
    mortarlab(&tmp)
        .args([
            "calc",
            "rejunte",
            "water-retention-ratio",
            "--set",
            "rr=80",
            "--set",
            "rt=0",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("rt must not be zero"));
}

#[test]
fn test_calc_unknown_field_fails() {
    let tmp = workspace();
    mortarlab(&tmp)
        .args(["calc", "rejunte", "flexural", "--set", "cp9=5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown field 'cp9'"));
}

#[test]
fn test_calc_malformed_set_fails() {
    let tmp = workspace();
    mortarlab(&tmp)
        .args(["calc", "rejunte", "flexural", "--set", "cp1"])
        .assert()
        .failure();
}

#[test]
fn test_calc_not_implemented_requisite() {
    let tmp = workspace();
    mortarlab(&tmp)
        .args(["calc", "graute", "ABRASÃO", "-f", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("not_implemented"));
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_project_config_sets_product_and_limits() {
    let tmp = workspace();
    fs::write(
        tmp.path().join(".mortarlab.yaml"),
        "product: graute\nlimits:\n  graute:\n    reference_length: 125\n",
    )
    .unwrap();

    mortarlab(&tmp)
        .args(["limits", "-f", "tsv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("reference_length\t125\tmm\tproduct"));
}

#[test]
fn test_explicit_config_default_format() {
    let tmp = workspace();
    let config = tmp.path().join("lab.yaml");
    fs::write(&config, "default_format: json\n").unwrap();

    mortarlab(&tmp)
        .args(["products", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"product\": \"basecoat\""));
}

#[test]
fn test_invalid_config_reports_error() {
    let tmp = workspace();
    fs::write(
        tmp.path().join(".mortarlab.yaml"),
        "limits:\n  default:\n    reference_length: -5\n",
    )
    .unwrap();

    mortarlab(&tmp)
        .arg("products")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid threshold table"));
}

#[test]
fn test_env_product_override() {
    let tmp = workspace();
    mortarlab(&tmp)
        .env("MORTARLAB_PRODUCT", "rejunte")
        .args(["reqs", "-f", "tsv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Rejunte::"));
}

// ============================================================================
// Completions
// ============================================================================

#[test]
fn test_completions_bash() {
    let tmp = workspace();
    mortarlab(&tmp)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("mortarlab"));
}
