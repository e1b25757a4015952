//! Tests for the `get-licenses` binary: output lines and exit codes.

mod support;

use license_retriever::test_utils::{MIT_LICENSE, gzip, tar_archive};
use rstest::rstest;
use std::process::{Command, Output};
use support::{Route, StubServer};

fn get_licenses(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_get-licenses"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("run get-licenses")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn mit_server() -> StubServer {
    let artifact = gzip(&tar_archive(&[("pkg-1.0/LICENSE", MIT_LICENSE.as_bytes())]));
    StubServer::start(vec![Route::ok("/pkg-1.0.tgz", artifact)])
}

#[test]
fn prints_output_line_and_confirmation() {
    let server = mit_server();

    let output = get_licenses(&[
        "--dependency-name",
        "pkg",
        "--url",
        &server.url("/pkg-1.0.tgz"),
    ]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(
        stdout(&output),
        "::set-output name=licenses::[MIT MIT-0]\nLicenses found!\n"
    );
}

#[test]
fn json_flag_prints_a_report() {
    let server = mit_server();

    let output = get_licenses(&[
        "--dependency-name",
        "pkg",
        "--url",
        &server.url("/pkg-1.0.tgz"),
        "--json",
    ]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout is JSON");
    assert_eq!(report["dependency"], "pkg");
    assert_eq!(report["licenses"], serde_json::json!(["MIT", "MIT-0"]));
    assert_eq!(
        report["source_sha256"].as_str().map(str::len),
        Some(64)
    );
}

#[rstest]
#[case::no_flags(&[], "--dependency-name")]
#[case::no_url(&["--dependency-name", "pkg"], "--url")]
#[case::no_name(&["--url", "http://127.0.0.1:9/pkg.tgz"], "--dependency-name")]
fn missing_flags_exit_with_an_error(#[case] args: &[&str], #[case] flag: &str) {
    let output = get_licenses(args);

    assert_eq!(output.status.code(), Some(1));
    assert!(
        stderr(&output).contains(&format!("Error: missing required flag {flag}")),
        "stderr: {}",
        stderr(&output)
    );
    assert!(stdout(&output).is_empty());
}

#[test]
fn bad_status_exits_with_the_url_and_code() {
    let server = StubServer::start(vec![Route::status("/bad-url", 400)]);
    let url = server.url("/bad-url");

    let output = get_licenses(&["--dependency-name", "pkg", "--url", &url, "-q"]);

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        stderr(&output),
        format!("Error: failed to query url {url} with: status code 400\n")
    );
}

#[test]
fn skipped_dependency_prints_the_notice() {
    let server = StubServer::start(Vec::new());

    let output = get_licenses(&[
        "--dependency-name",
        "CAAPM",
        "--url",
        &server.url("/caapm.tgz"),
    ]);

    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.starts_with("Skipping license retrieval for CAAPM\n"));
    assert!(text.ends_with("::set-output name=licenses::[]\n"));
    assert_eq!(server.hits(), 0);
}

#[test]
fn invalid_config_is_reported() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = dir.path().join("retriever.toml");
    std::fs::write(&config, "[scan]\nconfidence_threshold = 2.0\n").expect("write config");
    let config = config.to_str().expect("UTF-8 path").to_owned();

    let output = get_licenses(&[
        "--dependency-name",
        "pkg",
        "--url",
        "http://127.0.0.1:9/pkg.tgz",
        "--config",
        &config,
    ]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Error: invalid configuration: scan.confidence_threshold"));
}
