//! CLI integration tests.
//!
//! These tests run the actual smartsearch binary via std::process::Command
//! and check its human and JSON output.

use serde_json::Value;
use std::path::PathBuf;
use std::process::{Command, Output};

fn smartsearch(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_smartsearch"))
        .args(args)
        .env_remove("SMARTSEARCH_LOG")
        .output()
        .expect("failed to run smartsearch")
}

fn json_output(args: &[&str]) -> Value {
    let mut all = vec!["--output", "json"];
    all.extend_from_slice(args);
    let output = smartsearch(&all);
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(stdout.trim()).unwrap_or_else(|e| {
        panic!("invalid JSON ({}): {}", e, stdout);
    })
}

fn write_fixture(name: &str, content: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "smartsearch_fixture_{}_{}.json",
        name,
        std::process::id()
    ));
    std::fs::write(&path, content).expect("write fixture");
    path
}

#[test]
fn test_generate_json() {
    let value = json_output(&["generate", "--query", "go parse"]);
    assert_eq!(value["tool"], "smartsearch");
    assert_eq!(value["partial"], false);

    let data = &value["data"];
    assert_eq!(data["total_count"], 2);
    let alternatives = data["branches"][0]["alternatives"].as_array().unwrap();
    assert_eq!(alternatives[0]["query"], "lang:Go parse");
    assert_eq!(alternatives[0]["description"], "apply language filter for pattern");
    assert_eq!(alternatives[1]["query"], "go AND parse");
}

#[test]
fn test_generate_human() {
    let output = smartsearch(&["generate", "--query", "go parse"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("total: 2"), "stdout: {}", stdout);
    assert!(stdout.contains("lang:Go parse"));
}

#[test]
fn test_generate_limit_truncates() {
    let value = json_output(&["generate", "--query", "go parse", "--limit", "1"]);
    let branch = &value["data"]["branches"][0];
    assert_eq!(branch["alternatives"].as_array().unwrap().len(), 1);
    assert_eq!(branch["truncated"], true);
}

#[test]
fn test_generate_diff_clamp_flag() {
    let clamped = json_output(&["generate", "--query", "type:diff go parse"]);
    assert_eq!(clamped["data"]["total_count"], 0);

    let unclamped = json_output(&["generate", "--query", "type:diff go parse", "--no-diff-clamp"]);
    assert_eq!(
        unclamped["data"]["branches"][0]["alternatives"][0]["query"],
        "type:diff lang:Go parse"
    );
}

#[test]
fn test_parse_json() {
    let value = json_output(&["parse", "--query", "repo:a x or repo:b y"]);
    let plan = value["data"]["plan"].as_array().unwrap();
    assert_eq!(plan.len(), 2);
    assert_eq!(plan[0]["query"], "repo:a x");
    assert_eq!(plan[1]["query"], "repo:b y");
}

#[test]
fn test_rules_against_query() {
    let value = json_output(&["rules", "--query", "go parse"]);
    let narrow = value["data"]["narrow"].as_array().unwrap();
    let lang = narrow
        .iter()
        .find(|r| r["description"] == "apply language filter for pattern")
        .unwrap();
    assert_eq!(lang["applies"], true);
    assert_eq!(lang["result"], "lang:Go parse");
    let unquote = narrow
        .iter()
        .find(|r| r["description"] == "unquote patterns")
        .unwrap();
    assert_eq!(unquote["applies"], false);
}

#[test]
fn test_rules_catalog() {
    let value = json_output(&["rules"]);
    assert!(value["data"]["query"].is_null());
    assert_eq!(value["data"]["widen"].as_array().unwrap().len(), 2);
}

#[test]
fn test_invalid_query_error_json() {
    let output = smartsearch(&["--output", "json", "parse", "--query", "type:bogus x"]);
    assert_eq!(output.status.code(), Some(1));
    let value: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["data"]["code"], "SMS-E001");
    assert_eq!(value["data"]["error"], "error");
    assert!(value["data"]["remediation"].is_string());
}

#[test]
fn test_empty_query_error_human() {
    let output = smartsearch(&["generate", "--query", "  "]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("SMS-E002"), "stderr: {}", stderr);
    assert!(stderr.contains("Hint:"));
}

#[test]
fn test_replay_proposes_queries() {
    let fixture = write_fixture(
        "propose",
        r#"{"results": {
            "lang:Go parse": [{"repository": "github.com/a/b", "path": "main.go", "line_number": 3, "preview": "parse()"}]
        }}"#,
    );
    let value = json_output(&[
        "replay",
        "--query",
        "go parse",
        "--fixture",
        fixture.to_str().unwrap(),
    ]);
    let data = &value["data"];
    assert_eq!(data["total_count"], 1);
    assert_eq!(data["results"][0]["path"], "main.go");
    assert_eq!(data["results"][0]["match_id"].as_str().unwrap().len(), 16);
    assert_eq!(
        data["proposed_queries"][0]["description"],
        "apply language filter for pattern (1 result)"
    );
    assert_eq!(data["proposed_queries"][0]["pattern_type"], "lucky");
    let _ = std::fs::remove_file(fixture);
}

#[test]
fn test_replay_initial_results_skip_generation() {
    let fixture = write_fixture(
        "initial",
        r#"{"results": {
            "go parse": [{"repository": "r", "path": "a.go", "line_number": 1, "preview": ""}],
            "lang:Go parse": [{"repository": "r", "path": "b.go", "line_number": 1, "preview": ""}]
        }}"#,
    );
    let value = json_output(&[
        "replay",
        "--query",
        "go   parse",
        "--fixture",
        fixture.to_str().unwrap(),
    ]);
    assert_eq!(value["data"]["total_count"], 1);
    assert!(value["data"]["proposed_queries"].as_array().unwrap().is_empty());
    let _ = std::fs::remove_file(fixture);
}

#[test]
fn test_replay_missing_fixture() {
    let output = smartsearch(&[
        "--output",
        "json",
        "replay",
        "--query",
        "go parse",
        "--fixture",
        "/nonexistent/smartsearch/fixture.json",
    ]);
    assert_eq!(output.status.code(), Some(1));
    let value: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["data"]["code"], "SMS-E902");
}
