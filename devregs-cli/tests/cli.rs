//! run the built `devregs` binary against small input files
use std::io::Write;
use std::process::{Command, Output};

const SAMPLE: &str = "\
# clock controller
CCM_CCR     0x020c4000
:OSCNT:0-7
:COSC_EN:12
CCM_CCDR    0x020c4004
CCM_CSR     0x020c4008.w
:REF_EN_B:0
CCM_CSR2    0x020c400c
:COSC_EN:12
:OSCNT:7-0
0x020c4010  BROKEN
";

fn write_input(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(contents.as_bytes())
        .expect("Failed to write temp file");
    file
}

fn devregs(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_devregs"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to run devregs")
}

#[test]
fn test_text_report() {
    let input = write_input(SAMPLE);
    let path = input.path().to_str().unwrap();
    let output = devregs(&[path]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(stdout.starts_with(&format!("{}: 11 lines", path)));
    assert!(stdout.contains("lines: 11 total, 1 comment, 4 register, 5 field, 1 parse error"));
    assert!(stdout.contains("fields: 3 names, 3 unique, 2 duplicates"));
    assert!(stdout.contains("registers: 4 addresses, 4 unique, 0 duplicates"));
    assert!(stdout.contains("field sets: 2 hashes, 2 unique, 1 duplicates"));
    assert!(stdout.contains("/fs0\t\t#usage 2\n\t:OSCNT:0-7\n\t:COSC_EN:12\n"));
    assert!(stdout.contains("0X020C4008.W\n\t:REF_EN_B:0\n"));
    assert_eq!(stdout.matches("\t:fs0/").count(), 2);

    // diagnostics go to stderr
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("line 11"), "stderr: {}", stderr);
}

#[test]
fn test_summary_only() {
    let input = write_input(SAMPLE);
    let output = devregs(&["--summary", input.path().to_str().unwrap()]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("field sets: 2 hashes, 2 unique, 1 duplicates"));
    assert!(!stdout.contains("CCM_CCR"));
}

#[test]
fn test_json_report() {
    let input = write_input(SAMPLE);
    let output = devregs(&["--json", "-q", input.path().to_str().unwrap()]);

    assert!(output.status.success());
    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be valid JSON");

    assert_eq!(json["lines"]["total"], 11);
    assert_eq!(json["registers"]["unique"], 4);
    assert_eq!(json["shared_field_sets"][0]["usage"], 2);
    assert_eq!(json["addresses"][2]["registers"][0]["width"], "W");
    assert_eq!(json["diagnostics"][0]["kind"], "malformed");
    assert!(output.stderr.is_empty());
}

#[test]
fn test_missing_input_fails() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let missing = dir.path().join("nope.txt");
    let output = devregs(&[missing.to_str().unwrap()]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to read file"), "stderr: {}", stderr);
}
