//! Integration tests: run the `whence` binary end to end.

use std::process::{Command, Output};

fn whence(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_whence"))
        .args(args)
        .env("NO_COLOR", "1")
        .env_remove("WHENCE_LOG")
        .output()
        .expect("failed to run whence")
}

#[test]
fn test_version_exits_zero() {
    let out = whence(&["--version"]);
    assert_eq!(out.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.starts_with("whence "), "{stdout}");
}

#[test]
fn test_unknown_option_is_bad_invocation() {
    let out = whence(&["--frobnicate", "x"]);
    assert_eq!(out.status.code(), Some(4));
}

#[test]
fn test_no_files_is_bad_invocation() {
    let out = whence(&[]);
    assert_eq!(out.status.code(), Some(4));
}

#[test]
fn test_missing_file_reports_no_file() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.bin");
    let missing = missing.to_str().unwrap();

    let out = whence(&[missing]);
    assert_eq!(out.status.code(), Some(2));
    assert!(out.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.starts_with(&format!("{missing}: ")), "{stderr}");
}

#[test]
fn test_json_output_keys_every_file() {
    let dir = tempfile::tempdir().unwrap();
    let plain = dir.path().join("plain.txt");
    std::fs::write(&plain, b"hello").unwrap();
    let missing = dir.path().join("missing.txt");
    let plain = plain.to_str().unwrap();
    let missing = missing.to_str().unwrap();

    let out = whence(&["--json", plain, missing]);
    assert_eq!(out.status.code(), Some(2));

    let json: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    let files = json.as_object().unwrap();
    assert_eq!(files.len(), 2);
    assert!(files[plain].get("error").is_none());
    assert!(files[missing]["error"].is_string());
}
