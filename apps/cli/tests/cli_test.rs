//! Integration tests for the `precis` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

/// Command isolated from the user's config files and model environment.
fn precis(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("precis").unwrap();
    cmd.current_dir(home)
        .env("HOME", home)
        .env("NO_COLOR", "1")
        .env_remove("API_BASE_URL")
        .env_remove("API_KEY")
        .env_remove("API_MODEL")
        .env_remove("SUMMARIZE_API_BASE_URL");
    cmd
}

fn write_results(dir: &TempDir, count: usize) -> std::path::PathBuf {
    let results: Vec<serde_json::Value> = (1..=count)
        .map(|n| {
            serde_json::json!({
                "title": format!("Result {n}"),
                "link": format!("https://docs{n}.example.org/page"),
                "snippet": format!("Snippet for result number {n}"),
            })
        })
        .collect();
    let path = dir.path().join("results.json");
    std::fs::write(&path, serde_json::to_string(&results).unwrap()).unwrap();
    path
}

#[test]
fn test_results_first_page() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_results(&temp_dir, 5);

    precis(temp_dir.path())
        .arg("results")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("docs1.example.org"))
        .stdout(predicate::str::contains("docs3.example.org"))
        .stdout(predicate::str::contains("docs4.example.org").not())
        .stdout(predicate::str::contains("View 2 more"));
}

#[test]
fn test_results_all() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_results(&temp_dir, 5);

    precis(temp_dir.path())
        .arg("results")
        .arg(&path)
        .arg("--all")
        .assert()
        .success()
        .stdout(predicate::str::contains("docs5.example.org"))
        .stdout(predicate::str::contains("View").not());
}

#[test]
fn test_results_missing_file() {
    let temp_dir = TempDir::new().unwrap();

    precis(temp_dir.path())
        .arg("results")
        .arg("does-not-exist.json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read results file"));
}

#[test]
fn test_ask_with_mock_provider_prints_history_json() {
    let temp_dir = TempDir::new().unwrap();

    let assert = precis(temp_dir.path())
        .args(["--provider", "mock", "ask", "What is on https://example.com?", "--json"])
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    let history: serde_json::Value = serde_json::from_str(&stdout).expect("history should be JSON");
    let messages = history.as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["role"], "user");
    assert_eq!(messages[1]["role"], "assistant");
    assert!(stdout.contains("Mock answer from the offline model."));
}

#[test]
fn test_ask_streams_answer() {
    let temp_dir = TempDir::new().unwrap();

    precis(temp_dir.path())
        .args(["ask", "hello"])
        .env("API_MODEL", "offline")
        .arg("--provider")
        .arg("mock")
        .assert()
        .success()
        .stdout(predicate::str::contains("Mock answer from the offline model."));
}

#[test]
fn test_unknown_provider_fails() {
    let temp_dir = TempDir::new().unwrap();

    precis(temp_dir.path())
        .args(["--provider", "carrier-pigeon", "ask", "hi"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid model configuration"));
}

#[test]
fn test_local_config_file_is_applied() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join(".precisrc"), "[model]\nprovider = \"mock\"\n").unwrap();

    precis(temp_dir.path())
        .args(["ask", "hi"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Mock answer"));
}

#[test]
fn test_chat_saves_history() {
    let temp_dir = TempDir::new().unwrap();
    let history_path = temp_dir.path().join("history.json");

    precis(temp_dir.path())
        .args(["--provider", "mock", "chat", "--history"])
        .arg(&history_path)
        .write_stdin("hello there\nexit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Goodbye!"));

    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&history_path).unwrap()).unwrap();
    assert_eq!(saved.as_array().unwrap().len(), 2);
}
