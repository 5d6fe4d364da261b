//! Common test utilities for bashlite integration tests

use assert_cmd::Command;

/// The bashlite binary with a clean, predictable environment
pub fn bashlite() -> Command {
    let mut cmd = Command::cargo_bin("bashlite").unwrap();
    cmd.env("LC_ALL", "C");
    cmd
}

/// Feed `input` to an interactive session and return (stdout, stderr, exit code)
#[allow(dead_code)]
pub fn session(args: &[&str], input: &str) -> (String, String, i32) {
    let output = bashlite().args(args).write_stdin(input).output().unwrap();
    (
        String::from_utf8_lossy(&output.stdout).into_owned(),
        String::from_utf8_lossy(&output.stderr).into_owned(),
        output.status.code().unwrap_or(-1),
    )
}
