//! Basic CLI E2E tests.
//!
//! Each test drives the compiled binary against its own data directory.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use serde_json::Value;
use tempfile::TempDir;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(data_dir: &Path, args: &[&str]) -> (String, String, i32) {
    run_cli_with_input(data_dir, args, "")
}

fn run_cli_with_input(data_dir: &Path, args: &[&str], input: &str) -> (String, String, i32) {
    let mut child = Command::new(env!("CARGO_BIN_EXE_coinrate"))
        .args(args)
        .env("COINRATE_DATA_DIR", data_dir)
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to execute CLI command");
    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(input.as_bytes())
        .expect("Failed to write stdin");
    let output = child.wait_with_output().expect("Failed to wait for CLI");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);
    (stdout, stderr, code)
}

fn run_json(data_dir: &Path, args: &[&str]) -> Value {
    let (stdout, stderr, code) = run_cli(data_dir, args);
    assert_eq!(code, 0, "{args:?} failed: {stderr}");
    serde_json::from_str(&stdout).expect("Failed to parse JSON output")
}

fn save_run(data_dir: &Path, coins: &str, character: &str, skill: &str) -> Value {
    run_json(data_dir, &["calc", "--coins", coins, "--time", "01:00", "--plain"]);
    run_json(
        data_dir,
        &["entry", "save", "--character", character, "--skill", skill],
    )
}

#[test]
fn test_calc_with_coin_bonus() {
    let dir = TempDir::new().unwrap();
    let out = run_json(
        dir.path(),
        &["calc", "--coins", "10000", "--time", "02:00", "--item", "coin-bonus"],
    );
    assert_eq!(out["items"], serde_json::json!(["coin-bonus"]));
    assert_eq!(out["result"]["cpm"].as_f64(), Some(6175.0));
    assert_eq!(out["result"]["total_minutes"].as_f64(), Some(2.0));
}

#[test]
fn test_calc_bonus_order_override() {
    let dir = TempDir::new().unwrap();
    let out = run_json(
        dir.path(),
        &[
            "calc", "--coins", "10000", "--time", "02:00", "--item", "coin_bonus",
            "--order", "bonus_then_deduct",
        ],
    );
    assert_eq!(out["result"]["cpm"].as_f64(), Some(6250.0));
}

#[test]
fn test_calc_uses_default_items() {
    let dir = TempDir::new().unwrap();
    let out = run_json(dir.path(), &["calc", "--coins", "10000", "--time", "01:00"]);
    assert_eq!(out["items"], serde_json::json!(["coin-bonus", "five-to-four"]));
}

#[test]
fn test_calc_without_time_fails() {
    let dir = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["calc", "--coins", "100"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"), "{stderr}");
}

#[test]
fn test_calc_zero_time_prints_infinite_rate() {
    let dir = TempDir::new().unwrap();
    let out = run_json(
        dir.path(),
        &["calc", "--coins", "1000", "--time", "00:00", "--plain"],
    );
    assert_eq!(out["result"]["cpm"], "Infinity");
    assert_eq!(out["result"]["per_hour"], "Infinity");
    assert_eq!(out["result"]["total_minutes"].as_f64(), Some(0.0));

    let out = run_json(dir.path(), &["calc", "--coins", "1000", "--time", "xx", "--plain"]);
    assert_eq!(out["result"]["cpm"], "NaN");

    let (_, _, code) = run_cli(dir.path(), &["entry", "save", "--character", "Mario"]);
    assert_eq!(code, 1);
}

#[test]
fn test_clear_local_needs_upload() {
    let dir = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(
        dir.path(),
        &["remote", "sign-in", "--email", "a@b.c", "--password", "pw", "--clear-local"],
    );
    assert_eq!(code, 2);
    assert!(stderr.contains("--upload"), "{stderr}");
}

#[test]
fn test_save_requires_calculation() {
    let dir = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["entry", "save", "--character", "Mario"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("calculate a result before saving"), "{stderr}");
}

#[test]
fn test_save_list_and_rank() {
    let dir = TempDir::new().unwrap();
    let saved = save_run(dir.path(), "3000", "Mario", "3");
    assert_eq!(saved["type"], "entry_saved");
    assert_eq!(saved["entry"]["character"], "Mario");
    save_run(dir.path(), "5000", "Mario", "3");
    save_run(dir.path(), "6000", "Luigi", "2");

    let list = run_json(dir.path(), &["entry", "list"]);
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 3);
    assert_eq!(list[0]["character"], "Luigi");

    let ranking = run_json(dir.path(), &["ranking"]);
    assert_eq!(ranking[0]["character"], "Luigi");
    assert_eq!(ranking[1]["character"], "Mario");
    assert_eq!(ranking[1]["count"], 2);
    assert_eq!(ranking[1]["average_cpm"].as_f64(), Some(4000.0));
}

#[test]
fn test_delete_unknown_entry_is_noop() {
    let dir = TempDir::new().unwrap();
    save_run(dir.path(), "3000", "Mario", "3");
    let (_, stderr, code) = run_cli(dir.path(), &["entry", "delete", "1", "--yes"]);
    assert_eq!(code, 0);
    assert!(stderr.contains("no entry"));
    let list = run_json(dir.path(), &["entry", "list"]);
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[test]
fn test_delete_entry() {
    let dir = TempDir::new().unwrap();
    let saved = save_run(dir.path(), "3000", "Mario", "3");
    let ts = saved["entry"]["ts"].as_i64().unwrap().to_string();
    let deleted = run_json(dir.path(), &["entry", "delete", &ts, "--yes"]);
    assert_eq!(deleted["type"], "entry_deleted");
    let list = run_json(dir.path(), &["entry", "list"]);
    assert!(list.as_array().unwrap().is_empty());
}

#[test]
fn test_clear_asks_first() {
    let dir = TempDir::new().unwrap();
    save_run(dir.path(), "3000", "Mario", "3");

    let (_, stderr, code) = run_cli_with_input(dir.path(), &["entry", "clear"], "n\n");
    assert_eq!(code, 0);
    assert!(stderr.contains("cancelled"));
    assert_eq!(run_json(dir.path(), &["entry", "list"]).as_array().unwrap().len(), 1);

    let (stdout, _, code) = run_cli_with_input(dir.path(), &["entry", "clear"], "y\n");
    assert_eq!(code, 0);
    assert!(stdout.contains("entries_cleared"));
    assert!(run_json(dir.path(), &["entry", "list"]).as_array().unwrap().is_empty());
}

#[test]
fn test_stopwatch_lifecycle() {
    let dir = TempDir::new().unwrap();
    let status = run_json(dir.path(), &["stopwatch", "status"]);
    assert_eq!(status["state"], "stopped");
    assert_eq!(status["display"], "00:00");

    let started = run_json(dir.path(), &["stopwatch", "start"]);
    assert_eq!(started["type"], "stopwatch_started");
    assert_eq!(run_json(dir.path(), &["stopwatch", "status"])["state"], "running");

    let paused = run_json(dir.path(), &["stopwatch", "pause"]);
    assert_eq!(paused["type"], "stopwatch_paused");

    let reset = run_json(dir.path(), &["stopwatch", "reset"]);
    assert_eq!(reset["type"], "stopwatch_reset");
    assert_eq!(run_json(dir.path(), &["stopwatch", "status"])["state"], "stopped");
}

#[test]
fn test_stopwatch_apply_feeds_calc() {
    let dir = TempDir::new().unwrap();
    let applied = run_json(dir.path(), &["stopwatch", "apply"]);
    assert_eq!(applied["time"], "00:00");
    let out = run_json(dir.path(), &["calc", "--coins", "100", "--plain"]);
    assert_eq!(out["time"], "00:00");
}

#[test]
fn test_export_then_import() {
    let source = TempDir::new().unwrap();
    save_run(source.path(), "3000", "Mario", "3");
    save_run(source.path(), "4000", "Peach", "5");
    let file = source.path().join("export.json");
    let file_arg = file.to_str().unwrap();
    let (stdout, _, code) = run_cli(source.path(), &["data", "export", "--out", file_arg]);
    assert_eq!(code, 0);
    assert!(stdout.contains("exported 2 entries"));

    let target = TempDir::new().unwrap();
    let merged = run_json(target.path(), &["data", "import", file_arg, "--yes"]);
    assert_eq!(merged["type"], "entries_merged");
    assert_eq!(merged["total"], 2);
    assert_eq!(
        run_json(target.path(), &["entry", "list"]),
        run_json(source.path(), &["entry", "list"])
    );
}

#[test]
fn test_import_rejects_non_array() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("bad.json");
    std::fs::write(&file, r#"{"character":"A"}"#).unwrap();
    let (_, stderr, code) =
        run_cli(dir.path(), &["data", "import", file.to_str().unwrap(), "--yes"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("JSON array"), "{stderr}");
}

#[test]
fn test_config_get_set() {
    let dir = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["config", "get", "calculator.bonus_order"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "deduct_then_bonus");

    let (_, _, code) = run_cli(dir.path(), &["config", "set", "stopwatch.tick_ms", "50"]);
    assert_eq!(code, 0);
    let (stdout, _, _) = run_cli(dir.path(), &["config", "get", "stopwatch.tick_ms"]);
    assert_eq!(stdout.trim(), "50");

    let (_, stderr, code) = run_cli(dir.path(), &["config", "set", "no.such.key", "1"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("Unknown configuration key"), "{stderr}");
}

#[test]
fn test_enforced_skill_range() {
    let dir = TempDir::new().unwrap();
    run_cli(dir.path(), &["config", "set", "validation.enforce_skill_range", "true"]);
    run_json(dir.path(), &["calc", "--coins", "1000", "--time", "01:00"]);
    let (_, stderr, code) =
        run_cli(dir.path(), &["entry", "save", "--character", "Mario", "--skill", "9"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("outside 1..=6"), "{stderr}");
}

#[test]
fn test_remote_without_backend() {
    let dir = TempDir::new().unwrap();
    let status = run_json(dir.path(), &["remote", "status"]);
    assert_eq!(status["signed_in"], false);
    assert!(status["remote"].is_null());

    let (_, stderr, code) = run_cli(dir.path(), &["remote", "pull"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("not configured"), "{stderr}");
}

#[test]
fn test_completions() {
    let dir = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["completions", "bash"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("coinrate"));
}
