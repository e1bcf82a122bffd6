// SPDX-FileCopyrightText: 2026 BrowserOS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests for the `browseros` binary.
//!
//! Each test runs the real binary in its own temp directory with the
//! environment scrubbed, so no user config or `BROWSEROS_*` variable leaks in.

use std::path::Path;
use std::process::{Command, Output};

use serde_json::Value;

fn browseros(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_browseros"))
        .args(args)
        .current_dir(dir)
        .env_remove("BROWSEROS_CHAT_MEMORY_ID")
        .env_remove("BROWSEROS_CHAT_MEMORY_PATH")
        .env_remove("BROWSEROS_CHAT_MEMORY_MAX_TOKENS")
        .env_remove("BROWSEROS_LOG_LEVEL")
        .env("XDG_CONFIG_HOME", dir.join("xdg"))
        .env("RUST_LOG", "error")
        .output()
        .expect("failed to run browseros binary")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn show_json(dir: &Path, extra: &[&str]) -> Vec<Value> {
    let mut args = extra.to_vec();
    args.extend(["show", "--json"]);
    let output = browseros(dir, &args);
    assert!(output.status.success(), "show failed: {output:?}");
    serde_json::from_slice::<Vec<Value>>(&output.stdout).unwrap()
}

// ---- Append and show ----

#[test]
fn append_then_show_round_trips_through_database() {
    let dir = tempfile::tempdir().unwrap();

    let messages = [
        ("system", "System prompt"),
        ("human", "Hello world"),
        ("ai", "Hi there!"),
    ];
    for (role, content) in messages {
        let output = browseros(dir.path(), &["append", "--role", role, content]);
        assert!(output.status.success(), "append failed: {output:?}");
    }

    let entries = show_json(dir.path(), &[]);
    let roles: Vec<&str> = entries.iter().map(|e| e["role"].as_str().unwrap()).collect();
    assert_eq!(roles, ["system", "human", "ai"]);
    assert_eq!(entries[1]["content"], "Hello world");
    assert!(dir.path().join("chat_memory.sqlite").exists());
}

#[test]
fn structured_content_is_shown_as_json() {
    let dir = tempfile::tempdir().unwrap();
    let output = browseros(
        dir.path(),
        &["append", "--json", r#"[{"type":"text","text":"look"}]"#],
    );
    assert!(output.status.success(), "append failed: {output:?}");

    let entries = show_json(dir.path(), &[]);
    assert_eq!(entries[0]["content"][0]["text"], "look");
}

#[test]
fn invalid_json_content_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let output = browseros(dir.path(), &["append", "--json", "{nope"]);
    assert!(!output.status.success());
    assert!(show_json(dir.path(), &[]).is_empty());
}

// ---- Conversation selection ----

#[test]
fn conversations_are_isolated_by_flag() {
    let dir = tempfile::tempdir().unwrap();
    browseros(dir.path(), &["--conversation", "A", "append", "only in A"]);

    assert_eq!(show_json(dir.path(), &["--conversation", "A"]).len(), 1);
    assert!(show_json(dir.path(), &["--conversation", "B"]).is_empty());
}

#[test]
fn config_file_in_working_directory_is_honored() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("browseros.toml"),
        "[chat_memory]\nconversation_id = \"from-file\"\ndatabase_path = \"data/chat.sqlite\"\n",
    )
    .unwrap();

    browseros(dir.path(), &["append", "hello"]);
    assert!(dir.path().join("data/chat.sqlite").exists());

    let output = browseros(dir.path(), &["list", "--json"]);
    let listed: Vec<Value> = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["id"], "from-file");
    assert_eq!(listed[0]["messageCount"], 1);
}

#[test]
fn unknown_config_key_fails_with_suggestion() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("browseros.toml"),
        "[chat_memory]\nmax_tokns = 10\n",
    )
    .unwrap();

    let output = browseros(dir.path(), &["show"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("max_tokens"), "stderr: {stderr}");
}

// ---- Clear and status ----

#[test]
fn clear_empties_conversation() {
    let dir = tempfile::tempdir().unwrap();
    browseros(dir.path(), &["append", "one"]);
    browseros(dir.path(), &["append", "two"]);

    let output = browseros(dir.path(), &["clear"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("cleared 2 message(s)"));
    assert!(show_json(dir.path(), &[]).is_empty());
}

#[test]
fn status_reports_durable_backend() {
    let dir = tempfile::tempdir().unwrap();
    browseros(dir.path(), &["append", "hi"]);

    let output = browseros(dir.path(), &["status", "--json"]);
    assert!(output.status.success());
    let status: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(status["backend"], "sqlite");
    assert_eq!(status["available"], true);
    assert_eq!(status["health"], "healthy");
    assert_eq!(status["messages"], 1);
    assert_eq!(status["conversations"], 1);
    assert!(status["last_updated"].as_str().unwrap().ends_with("UTC"));

    let output = browseros(
        dir.path(),
        &["--conversation", "unwritten", "status", "--json"],
    );
    let status: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(status["messages"], 0);
    assert!(status["last_updated"].is_null());
}

#[test]
fn append_refuses_when_database_cannot_be_opened() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("blocker"), b"file").unwrap();

    let output = browseros(
        dir.path(),
        &["--database", "blocker/chat.sqlite", "append", "lost"],
    );
    assert!(!output.status.success());

    let output = browseros(
        dir.path(),
        &["--database", "blocker/chat.sqlite", "status", "--json"],
    );
    assert!(output.status.success());
    let status: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(status["available"], false);
    assert!(status["last_updated"].is_null());
}
