//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run and verify outputs. They use the
//! development config directory so a real user config is never touched.

use std::io::Write;
use std::process::{Command, Stdio};

fn cli() -> Command {
    let mut cmd = Command::new("cargo");
    cmd.args(["run", "-q", "-p", "pomoflow-cli", "--"])
        .env("POMOFLOW_ENV", "dev")
        .env("RUST_LOG", "off");
    cmd
}

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(args: &[&str]) -> (String, String, i32) {
    let output = cli()
        .args(args)
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

/// Run the worker with `input` on stdin and return its stdout lines.
fn run_worker(input: &str) -> (Vec<serde_json::Value>, i32) {
    run_worker_bytes(input.as_bytes())
}

fn run_worker_bytes(input: &[u8]) -> (Vec<serde_json::Value>, i32) {
    let mut child = cli()
        .arg("worker")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("Failed to spawn worker");

    child
        .stdin
        .take()
        .unwrap()
        .write_all(input)
        .unwrap();

    let output = child.wait_with_output().unwrap();
    let ticks = String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|line| serde_json::from_str(line).expect("tick is JSON"))
        .collect();
    (ticks, output.status.code().unwrap_or(-1))
}

fn tick_seconds(tick: &serde_json::Value) -> i64 {
    assert_eq!(tick["type"], "tick");
    tick["seconds"].as_i64().unwrap()
}

#[test]
fn test_worker_runs_countdown_to_completion() {
    let (ticks, code) = run_worker("{\"command\":\"start\",\"seconds\":1}\n");
    assert_eq!(code, 0);
    assert!(ticks.len() >= 3, "too few ticks: {ticks:?}");
    assert_eq!(tick_seconds(&ticks[0]), 1);
    assert_eq!(tick_seconds(ticks.last().unwrap()), -1);
}

#[test]
fn test_worker_ignores_malformed_messages() {
    let (ticks, code) = run_worker("garbage\n{\"command\":\"pause\"}\n{\"command\":\"start\"}\n");
    assert_eq!(code, 0);
    assert!(ticks.is_empty(), "unexpected ticks: {ticks:?}");
}

#[test]
fn test_worker_skips_non_utf8_lines() {
    let mut input = b"\xff\xfe\n".to_vec();
    input.extend_from_slice(b"{\"command\":\"start\",\"seconds\":600}\n{\"command\":\"stop\"}\n");
    let (ticks, code) = run_worker_bytes(&input);
    assert_eq!(code, 0);
    assert_eq!(ticks.len(), 1);
    assert_eq!(tick_seconds(&ticks[0]), 600);
}

#[test]
fn test_worker_stop_ends_without_tick() {
    let (ticks, code) = run_worker(
        "{\"command\":\"start\",\"seconds\":600}\n{\"command\":\"stop\"}\n",
    );
    assert_eq!(code, 0);
    assert_eq!(ticks.len(), 1);
    assert_eq!(tick_seconds(&ticks[0]), 600);
}

#[test]
fn test_countdown_json() {
    let (stdout, _, code) = run_cli(&["countdown", "1", "--json"]);
    assert_eq!(code, 0);
    let first = stdout.lines().next().unwrap();
    assert_eq!(first, r#"{"type":"tick","seconds":1}"#);
    assert_eq!(
        stdout.lines().last().unwrap(),
        r#"{"type":"tick","seconds":-1}"#
    );
}

#[test]
fn test_countdown_human() {
    let (stdout, _, code) = run_cli(&["countdown", "0"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("countdown ends at"));
    assert!(stdout.contains("00:00"));
    assert!(stdout.contains("-00:01"));
}

#[test]
fn test_countdown_rejects_non_number() {
    let (_, _, code) = run_cli(&["countdown", "soon"]);
    assert_ne!(code, 0);
}

#[test]
fn test_config_list_json() {
    let (stdout, _, code) = run_cli(&["config", "list"]);
    assert_eq!(code, 0);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert!(parsed["timer"]["tick_interval_ms"].is_u64());
    assert!(parsed["logging"]["level"].is_string());
}

#[test]
fn test_config_get_unknown_key_fails() {
    let (_, stderr, code) = run_cli(&["config", "get", "timer.nope"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("unknown key"));
}

#[test]
fn test_config_set_rejects_zero_interval() {
    let (_, _, code) = run_cli(&["config", "set", "timer.tick_interval_ms", "0"]);
    assert_eq!(code, 1);
}

#[test]
fn test_completions_bash() {
    let (stdout, _, code) = run_cli(&["completions", "bash"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("pomoflow-cli"));
}
