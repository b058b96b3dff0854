//! Command-line behavior of the facturx-attach binary

mod common;

use common::{write_icc, write_pdf, write_xml};
use facturx_attach::pdf::inspect_facturx;
use std::process::Command;
use tempfile::TempDir;

fn facturx_attach() -> Command {
    Command::new(env!("CARGO_BIN_EXE_facturx-attach"))
}

#[test]
fn test_too_few_arguments_prints_usage_and_exits_1() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let input = write_pdf(temp_dir.path(), "invoice.pdf", 1);
    let xml = write_xml(temp_dir.path());
    let output = temp_dir.path().join("out.pdf");

    let result = facturx_attach()
        .arg(&input)
        .arg(&xml)
        .arg(&output)
        .output()
        .expect("Failed to run facturx-attach");

    assert_eq!(result.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("Usage"), "stderr should show usage: {}", stderr);
    assert!(!output.exists(), "No file should be written on a usage error");
}

#[test]
fn test_no_arguments_exits_1() {
    let result = facturx_attach().output().expect("Failed to run facturx-attach");
    assert_eq!(result.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&result.stderr).contains("Usage"));
}

#[test]
fn test_help_exits_0() {
    let result = facturx_attach().arg("--help").output().expect("Failed to run facturx-attach");
    assert_eq!(result.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&result.stdout).contains("facturx-attach"));
}

#[test]
fn test_attach_and_check() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let input = write_pdf(temp_dir.path(), "invoice.pdf", 3);
    let xml = write_xml(temp_dir.path());
    let icc = write_icc(temp_dir.path());
    let output = temp_dir.path().join("out.pdf");

    let result = facturx_attach()
        .arg(&input)
        .arg(&xml)
        .arg(&output)
        .arg(&icc)
        .args(["--xmp", "en16931", "--check"])
        .output()
        .expect("Failed to run facturx-attach");

    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(result.status.success(), "facturx-attach failed: {}", stderr);
    assert!(stderr.contains("Check passed"), "unexpected stderr: {}", stderr);

    let report = inspect_facturx(&output).expect("Failed to inspect output");
    assert_eq!(report.page_count, 3);
    assert!(report.has_metadata);
    report.verify("facturx.xml").expect("Factur-X invariants violated");
}

#[test]
fn test_missing_icc_fails_without_output() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let input = write_pdf(temp_dir.path(), "invoice.pdf", 1);
    let xml = write_xml(temp_dir.path());
    let output = temp_dir.path().join("out.pdf");

    let result = facturx_attach()
        .arg(&input)
        .arg(&xml)
        .arg(&output)
        .arg(temp_dir.path().join("missing.icc"))
        .output()
        .expect("Failed to run facturx-attach");

    assert!(!result.status.success());
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("File not found"), "unexpected stderr: {}", stderr);
    assert!(!output.exists(), "No output should be written on failure");
}

#[test]
fn test_bad_relationship_is_usage_error() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let output = temp_dir.path().join("out.pdf");

    let result = facturx_attach()
        .args(["in.pdf", "invoice.xml"])
        .arg(&output)
        .args(["sRGB.icc", "--relationship", "invoice"])
        .output()
        .expect("Failed to run facturx-attach");

    assert_eq!(result.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&result.stderr).contains("AFRelationship"));
    assert!(!output.exists());
}
