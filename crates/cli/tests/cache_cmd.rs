//! CLI tests for `mcfn cache`.

mod common;

use common::{Workspace, mcfn, stdout_json};

#[test]
fn write_then_read_and_analyze_from_cache() {
    let ws = Workspace::new();
    let cache = ws.path().join("cache").to_string_lossy().to_string();

    let output = mcfn()
        .args(["cache", "write", &ws.data(), "--dir", &cache, "--output", "json"])
        .output()
        .expect("run cache write");
    assert!(
        output.status.success(),
        "stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(stdout_json(&output)["status"], "cache written");
    assert!(ws.path().join("cache/commands.json").is_file());
    assert!(ws.path().join("cache/registries.json").is_file());

    let output = mcfn()
        .args(["cache", "read", "--dir", &cache, "--output", "json"])
        .output()
        .expect("run cache read");
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["commands"], 4);
    assert_eq!(json["registries"], 1);
    assert_eq!(json["version"], "1.20.4");

    let file = ws.function("main", "give @p gold\n");
    let output = mcfn()
        .args(["check", &file, "--data", &cache, "--output", "json"])
        .output()
        .expect("run check");
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stdout_json(&output)["diagnostics"][0]["id"], "MCF1204");
}

#[test]
fn cache_dir_comes_from_config() {
    let ws = Workspace::new();
    let cache = ws.path().join("from-config");
    let config = ws.loose(
        "mcfn.json",
        &serde_json::json!({ "cache_dir": cache }).to_string(),
    );

    let output = mcfn()
        .args(["cache", "write", &ws.data(), "--config", &config, "--output", "json"])
        .output()
        .expect("run cache write");
    assert!(output.status.success());
    assert!(cache.join("commands.json").is_file());

    let file = ws.function("main", "say hi\n");
    let output = mcfn()
        .args(["check", &file, "--config", &config, "--output", "json"])
        .output()
        .expect("run check");
    assert!(output.status.success());
}

#[test]
fn reading_an_empty_directory_fails() {
    let ws = Workspace::new();
    let output = mcfn()
        .args(["cache", "read", "--dir", &ws.path().to_string_lossy()])
        .output()
        .expect("run cache read");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to read cache"), "stderr={stderr}");
}
