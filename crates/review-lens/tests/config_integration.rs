//! Configuration integration tests.
//!
//! These tests verify config discovery, format parsing, and precedence
//! from an end-to-end perspective using the compiled binary. Tests use
//! `info --json` to assert actual config values, not just process success.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use tempfile::TempDir;

/// Returns a Command configured to run our binary.
#[allow(deprecated)]
fn cmd() -> Command {
    Command::cargo_bin(env!("CARGO_PKG_NAME")).unwrap()
}

/// Run `info --json` from a directory and parse the JSON output.
fn info_json(dir: &std::path::Path) -> Value {
    let output = cmd()
        .args(["-C", dir.to_str().unwrap(), "info", "--json"])
        .output()
        .expect("failed to run command");
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("invalid JSON output")
}

// =============================================================================
// Config File Discovery
// =============================================================================

#[test]
fn runs_without_config_file() {
    let tmp = TempDir::new().unwrap();
    let json = info_json(tmp.path());

    assert_eq!(
        json["config"]["log_level"], "info",
        "should use default log level"
    );
    assert_eq!(json["config"]["header_offset"], 5);
    assert_eq!(json["config"]["score_marker"], "总安排打分");
    assert!(
        json["config"]["config_file"].is_null(),
        "no config file should be reported"
    );
}

#[test]
fn discovers_dotfile_config_in_current_dir() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join(".review-lens.toml"), r#"log_level = "debug""#).unwrap();

    let json = info_json(tmp.path());

    assert_eq!(json["config"]["log_level"], "debug");
    let reported = json["config"]["config_file"].as_str().unwrap();
    assert!(
        reported.ends_with(".review-lens.toml"),
        "should report dotfile: {reported}"
    );
}

#[test]
fn discovers_short_name_config() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("review.toml"), "top_n = 8\n").unwrap();

    let json = info_json(tmp.path());
    assert_eq!(json["config"]["top_n"], 8);
}

#[test]
fn discovers_config_in_parent_directory() {
    let tmp = TempDir::new().unwrap();
    let sub_dir = tmp.path().join("exports").join("2024");
    fs::create_dir_all(&sub_dir).unwrap();

    fs::write(tmp.path().join(".review-lens.toml"), r#"log_level = "debug""#).unwrap();

    let json = info_json(&sub_dir);

    assert_eq!(json["config"]["log_level"], "debug");
    assert!(
        json["config"]["config_file"].as_str().is_some(),
        "should find parent config"
    );
}

#[test]
fn regular_name_overrides_dotfile() {
    let tmp = TempDir::new().unwrap();

    fs::write(tmp.path().join(".review-lens.toml"), r#"log_level = "debug""#).unwrap();
    fs::write(tmp.path().join("review-lens.toml"), r#"log_level = "error""#).unwrap();

    let json = info_json(tmp.path());

    assert_eq!(
        json["config"]["log_level"], "error",
        "regular file should override dotfile"
    );
}

// =============================================================================
// Config Format Parsing
// =============================================================================

#[test]
fn parses_yaml_config() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join(".review-lens.yaml"),
        "segmenter: unicode\nlow_score_threshold: 2.5\n",
    )
    .unwrap();

    let json = info_json(tmp.path());
    assert_eq!(json["config"]["segmenter"], "unicode");
    assert_eq!(json["config"]["low_score_threshold"], 2.5);
}

#[test]
fn parses_json_config() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join(".review-lens.json"),
        r#"{"log_level": "error", "stop_words": ["导游", "行程"]}"#,
    )
    .unwrap();

    let json = info_json(tmp.path());
    assert_eq!(json["config"]["log_level"], "error");
    assert_eq!(json["config"]["stop_words"], 2);
}

#[test]
fn disable_input_limit_is_reported() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join(".review-lens.toml"), "disable_input_limit = true\n").unwrap();

    let json = info_json(tmp.path());
    assert!(json["config"]["max_input_bytes"].is_null());
}

// =============================================================================
// Config Precedence
// =============================================================================

#[test]
fn closer_config_takes_precedence() {
    let tmp = TempDir::new().unwrap();
    let sub_dir = tmp.path().join("project");
    fs::create_dir_all(&sub_dir).unwrap();

    fs::write(tmp.path().join(".review-lens.toml"), r#"log_level = "error""#).unwrap();
    fs::write(sub_dir.join(".review-lens.toml"), r#"log_level = "debug""#).unwrap();

    let json = info_json(&sub_dir);

    assert_eq!(
        json["config"]["log_level"], "debug",
        "closer config should win"
    );
}

#[test]
fn explicit_config_overrides_discovered() {
    let tmp = TempDir::new().unwrap();

    fs::write(tmp.path().join(".review-lens.toml"), r#"log_level = "debug""#).unwrap();

    let explicit = tmp.path().join("override.toml");
    fs::write(&explicit, r#"log_level = "error""#).unwrap();

    let output = cmd()
        .args([
            "-C",
            tmp.path().to_str().unwrap(),
            "--config",
            explicit.to_str().unwrap(),
            "info",
            "--json",
        ])
        .output()
        .expect("failed to run command");
    assert!(output.status.success());

    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        json["config"]["log_level"], "error",
        "--config should override discovered config"
    );
    let reported = json["config"]["config_file"].as_str().unwrap();
    assert!(
        reported.ends_with("override.toml"),
        "--config path should be reported: {reported}"
    );
}

#[test]
fn env_var_overrides_config_file() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join(".review-lens.toml"), "top_n = 8\n").unwrap();

    let output = cmd()
        .env("REVIEW_LENS_TOP_N", "12")
        .args(["-C", tmp.path().to_str().unwrap(), "info", "--json"])
        .output()
        .expect("failed to run command");
    assert!(output.status.success());

    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["config"]["top_n"], 12);
}

// =============================================================================
// Config Drives Analysis
// =============================================================================

#[test]
fn table_layout_comes_from_config() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join(".review-lens.toml"),
        "header_offset = 0\nscore_marker = \"评分\"\nsegmenter = \"unicode\"\nstop_words = [\"导游\"]\n",
    )
    .unwrap();
    fs::write(
        tmp.path().join("reviews.csv"),
        "评论,评分\n导游 很差,1\n导游 很差 退款,2\n",
    )
    .unwrap();

    let output = cmd()
        .args(["-C", tmp.path().to_str().unwrap(), "analyze", "reviews.csv", "--json"])
        .output()
        .expect("failed to run command");
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["stats"]["low_score_reviews"], 2);
    assert_eq!(json["scopes"][0]["top_words"][0]["word"], "很差");
    assert_eq!(json["scopes"][0]["top_words"][0]["count"], 2);
}

// =============================================================================
// Error Cases
// =============================================================================

#[test]
fn invalid_toml_config_shows_error() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join(".review-lens.toml"),
        "this is not valid toml [[[",
    )
    .unwrap();

    cmd()
        .args(["-C", tmp.path().to_str().unwrap(), "info"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration").or(predicate::str::contains("config")));
}

#[test]
fn invalid_segmenter_shows_error() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join(".review-lens.toml"), "segmenter = \"whitespace\"\n").unwrap();

    cmd()
        .args(["-C", tmp.path().to_str().unwrap(), "info"])
        .assert()
        .failure();
}

#[test]
fn unknown_config_field_is_ignored() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join(".review-lens.toml"),
        "log_level = \"info\"\nunknown_field = \"should be ignored\"\n",
    )
    .unwrap();

    let json = info_json(tmp.path());
    assert_eq!(json["config"]["log_level"], "info");
}

// =============================================================================
// Boundary Marker Tests
// =============================================================================

#[test]
fn git_boundary_stops_config_search() {
    let tmp = TempDir::new().unwrap();

    let parent = tmp.path().join("parent");
    let repo = parent.join("repo");
    let src = repo.join("src");
    fs::create_dir_all(&src).unwrap();

    fs::write(parent.join(".review-lens.toml"), r#"log_level = "error""#).unwrap();
    fs::create_dir(repo.join(".git")).unwrap();

    let json = info_json(&src);

    assert_eq!(
        json["config"]["log_level"], "info",
        "should use default, boundary stops search"
    );
    assert!(
        json["config"]["config_file"].is_null(),
        "should not find config beyond boundary"
    );
}
