use std::fs;
use std::path::PathBuf;
use std::process::Command;

fn recollate_cmd() -> Command {
    Command::new(env!("CARGO_BIN_EXE_recollate"))
}

fn fixture_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("recollate-cli-{}", std::process::id()));
    fs::create_dir_all(&dir).expect("failed to create fixture dir");
    dir
}

fn write_fixture(name: &str, contents: &str) -> String {
    let path = fixture_dir().join(name);
    fs::write(&path, contents).expect("failed to write fixture");
    path.to_string_lossy().into_owned()
}

const TABLE_JSON: &str = r#"{
  "language": "la",
  "witnesses": [
    {
      "siglum": "A",
      "cells": [
        { "kind": "word", "text": "the" },
        { "kind": "word", "text": "quick" },
        { "kind": "word", "text": "fox" }
      ]
    }
  ]
}"#;

#[test]
fn unchanged_text_exits_0() {
    let table = write_fixture("unchanged.json", TABLE_JSON);
    let output = recollate_cmd()
        .args(["reconcile", &table, "A", "--text", "the quick fox"])
        .output()
        .expect("failed to run recollate");

    assert!(
        output.status.success(),
        "unchanged text should exit 0: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("No changes found."), "stdout: {}", stdout);
}

#[test]
fn changed_text_exits_1() {
    let table = write_fixture("changed.json", TABLE_JSON);
    let output = recollate_cmd()
        .args(["reconcile", &table, "A", "--text", "the quick brown fox"])
        .output()
        .expect("failed to run recollate");

    assert_eq!(
        output.status.code(),
        Some(1),
        "changed text should exit 1: stdout={}, stderr={}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("Insert \"brown\" after column 1"),
        "stdout: {}",
        stdout
    );
}

#[test]
fn json_format_emits_tagged_changes() {
    let table = write_fixture("json_format.json", TABLE_JSON);
    let output = recollate_cmd()
        .args([
            "reconcile",
            &table,
            "A",
            "--text",
            "the quick brown fox",
            "--format",
            "json",
        ])
        .output()
        .expect("failed to run recollate");

    assert_eq!(output.status.code(), Some(1));
    let parsed: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be valid JSON");
    assert_eq!(parsed["complete"], serde_json::Value::Bool(true));
    assert_eq!(parsed["changes"][0]["op"], "insert");
    assert_eq!(parsed["changes"][0]["after"], 1);
    assert_eq!(parsed["changes"][0]["token"]["text"], "brown");
}

#[test]
fn apply_writes_an_updated_table() {
    let table = write_fixture("apply_in.json", TABLE_JSON);
    let updated = fixture_dir()
        .join("apply_out.json")
        .to_string_lossy()
        .into_owned();

    let output = recollate_cmd()
        .args([
            "reconcile",
            &table,
            "A",
            "--text",
            "the quick brown fox",
            "--apply",
            "--output",
            &updated,
        ])
        .output()
        .expect("failed to run recollate");
    assert_eq!(output.status.code(), Some(1));

    let parsed: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(&updated).expect("updated table should exist"),
    )
    .expect("updated table should be valid JSON");
    let cells = parsed["witnesses"][0]["cells"]
        .as_array()
        .expect("cells array");
    assert_eq!(cells.len(), 4);
    assert_eq!(cells[2]["text"], "brown");

    // Running again against the updated table finds nothing to do.
    let output = recollate_cmd()
        .args(["reconcile", &updated, "A", "--text", "the quick brown fox"])
        .output()
        .expect("failed to run recollate");
    assert!(
        output.status.success(),
        "reconciled table should be up to date: {}",
        String::from_utf8_lossy(&output.stdout)
    );
}

#[test]
fn unknown_witness_exits_2() {
    let table = write_fixture("unknown_witness.json", TABLE_JSON);
    let output = recollate_cmd()
        .args(["reconcile", &table, "Z", "--text", "whatever"])
        .output()
        .expect("failed to run recollate");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("not found"), "stderr: {}", stderr);
}

#[test]
fn malformed_table_exits_2() {
    let table = write_fixture("malformed.json", "this is not json");
    let output = recollate_cmd()
        .args(["reconcile", &table, "A", "--text", "whatever"])
        .output()
        .expect("failed to run recollate");

    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn text_from_file_and_inline_conflict() {
    let table = write_fixture("conflict.json", TABLE_JSON);
    let text_file = write_fixture("conflict.txt", "the quick fox");
    let output = recollate_cmd()
        .args(["reconcile", &table, "A", &text_file, "--text", "the quick fox"])
        .output()
        .expect("failed to run recollate");

    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn tokens_command_lists_tokens() {
    let output = recollate_cmd()
        .args(["tokens", "--text", "dixit deus."])
        .output()
        .expect("failed to run recollate");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("word"), "stdout: {}", stdout);
    assert!(stdout.contains("punctuation"), "stdout: {}", stdout);
    assert!(stdout.contains("3 tokens"), "stdout: {}", stdout);
}

#[test]
fn tokens_json_round_trips() {
    let output = recollate_cmd()
        .args(["tokens", "--text", "in principio", "--format", "json"])
        .output()
        .expect("failed to run recollate");

    assert!(output.status.success());
    let parsed: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be valid JSON");
    let tokens = parsed.as_array().expect("token array");
    assert_eq!(tokens[0]["kind"], "word");
    assert_eq!(tokens[0]["text"], "in");
}

#[test]
fn info_shows_table_shape() {
    let table = write_fixture("info.json", TABLE_JSON);
    let output = recollate_cmd()
        .args(["info", &table])
        .output()
        .expect("failed to run recollate");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Language: la"), "stdout: {}", stdout);
    assert!(stdout.contains("Columns: 3"), "stdout: {}", stdout);
    assert!(stdout.contains("\"A\": 3 readings"), "stdout: {}", stdout);
}
