//! Integration tests for command-line modes and flags

#[path = "common/mod.rs"]
mod common;
use common::bashlite;
use predicates::prelude::*;
use std::fs;
use std::time::Duration;

#[test]
fn test_command_mode() {
    bashlite()
        .args(["-c", "echo hi | tr a-z A-Z"])
        .assert()
        .success()
        .stdout("HI\n");
}

#[test]
fn test_command_mode_status() {
    bashlite().args(["-c", "false"]).assert().code(1);
    bashlite().args(["-c", "exit"]).assert().code(0);
    bashlite().args(["-c", "|"]).assert().code(2);
}

#[test]
fn test_command_mode_joins_remaining_args() {
    bashlite()
        .args(["-c", "echo", "a", "|", "cat"])
        .assert()
        .success()
        .stdout("a\n");
}

#[test]
fn test_script_mode_has_no_prompt() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("run.sh");
    fs::write(&script, "echo one\ncd /\npwd\nhistory\n").unwrap();

    bashlite()
        .arg(&script)
        .assert()
        .success()
        .stdout("one\n/\n1: echo one\n2: cd /\n3: pwd\n4: history\n");
}

#[test]
fn test_script_mode_exit_status() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("fail.sh");
    fs::write(&script, "echo one\nfalse\n").unwrap();
    bashlite().arg(&script).assert().code(1);

    fs::write(&script, "false\nexit\nfalse\n").unwrap();
    bashlite().arg(&script).assert().code(0);
}

#[test]
fn test_missing_script() {
    bashlite()
        .arg("/bashlite/no/such/script")
        .assert()
        .code(127)
        .stderr(predicate::str::contains("/bashlite/no/such/script"));
}

#[test]
fn test_unknown_option() {
    bashlite()
        .arg("--login")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown option: --login"));
}

#[test]
fn test_invalid_history_size() {
    bashlite()
        .args(["--history-size", "none"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid history size"));
}

#[test]
fn test_help() {
    bashlite()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("USAGE"))
        .stdout(predicate::str::contains("--sequential"));
}

#[test]
fn test_version() {
    bashlite()
        .arg("-V")
        .assert()
        .success()
        .stdout(format!("bashlite {}\n", env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_sequential_staging_blocks_on_output_larger_than_pipe_buffer() {
    // The first stage fills the channel and waits for a reader that is
    // never started, so the shell has to be killed.
    bashlite()
        .args(["--sequential", "-c", "seq 1 200000 | wc -l"])
        .timeout(Duration::from_secs(3))
        .assert()
        .interrupted();
}

#[test]
fn test_concurrent_staging_drains_large_output() {
    bashlite()
        .args(["-c", "seq 1 200000 | wc -l"])
        .timeout(Duration::from_secs(30))
        .assert()
        .success()
        .stdout(predicate::str::contains("200000"));
}
