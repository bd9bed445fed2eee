//! CLI tests for `mcfn explain`.

mod common;

use common::{mcfn, stdout_json};

#[test]
fn explain_known_code_json_returns_explanation() {
    let output = mcfn()
        .args(["explain", "MCF1201", "--output", "json"])
        .output()
        .expect("run explain command");

    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["id"], "MCF1201");
    assert!(json["explanation"].is_string());
}

#[test]
fn explain_unknown_code_json_returns_null_explanation() {
    let output = mcfn()
        .args(["explain", "MCF9999", "--output", "json"])
        .output()
        .expect("run explain command");

    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["id"], "MCF9999");
    assert!(json["explanation"].is_null());
}

#[test]
fn explain_pretty_shows_human_readable_text() {
    let output = mcfn()
        .args(["explain", "MCF1303", "--output", "pretty"])
        .output()
        .expect("run explain command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("MCF1303") && stdout.contains(':'),
        "unexpected output: {stdout}"
    );
}
