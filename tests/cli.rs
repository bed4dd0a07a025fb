//! End-to-end tests of the `cli-e2e` binary itself.

#![cfg(unix)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::{TempDir, tempdir};

fn cli_e2e() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_cli-e2e"));
    cmd.env("LC_ALL", "en_US.UTF-8")
        .env_remove("TESTMODE")
        .env_remove("RUST_LOG");
    cmd
}

fn fixtures(files: &[(&str, &str)]) -> TempDir {
    let dir = tempdir().unwrap();
    for (name, content) in files {
        let path = dir.path().join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }
    dir
}

fn arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn passing_suite_exits_zero() {
    let dir = fixtures(&[
        ("account/get.sh", "{{.Bin}} account get\n"),
        ("account/get.txt", "account get\n"),
    ]);

    cli_e2e()
        .args(["--bin", "echo", "--mode", "e2e", "--no-color", arg(dir.path())])
        .assert()
        .success()
        .stdout(predicate::str::contains("[OK]"))
        .stdout(predicate::str::contains("account/get"))
        .stdout(predicate::str::contains("Failed: 0"));
}

#[test]
fn failing_case_exits_one_and_shows_diff() {
    let dir = fixtures(&[
        ("a.sh", "{{.Bin}} one"),
        ("a.txt", "one"),
        ("b.sh", "{{.Bin}} two"),
        ("b.txt", "three"),
    ]);

    cli_e2e()
        .args(["--bin", "echo", "--mode", "e2e", "--no-color", arg(dir.path())])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("[OK] a"))
        .stdout(predicate::str::contains("[FAIL] b"))
        .stdout(predicate::str::contains("echo two"))
        .stdout(predicate::str::contains("three"));
}

#[test]
fn integration_mode_appends_stub_url() {
    let dir = fixtures(&[
        ("get.json", "{}"),
        ("get.sh", "{{.Bin}} account get"),
        ("get.txt", "account get"),
    ]);

    // echo prints the injected flag, so the output cannot match
    cli_e2e()
        .args(["--bin", "echo", "--no-color", arg(dir.path())])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("account get -u http://127.0.0.1:"));
}

#[test]
fn testmode_env_selects_end_to_end() {
    let dir = fixtures(&[("get.sh", "{{.Bin}} account get"), ("get.txt", "account get")]);

    cli_e2e()
        .env("TESTMODE", "end-to-end")
        .args(["--bin", "echo", arg(dir.path())])
        .assert()
        .success();
}

#[test]
fn unsupported_fixture_aborts_before_running() {
    let dir = fixtures(&[
        ("get.sh", "{{.Bin}} account get"),
        ("get.txt", "account get"),
        ("notes.md", "nope"),
    ]);

    cli_e2e()
        .args(["--bin", "echo", "--mode", "e2e", arg(dir.path())])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("[OK]").not())
        .stderr(predicate::str::contains(".md"));
}

#[test]
fn empty_command_aborts_before_running() {
    let dir = fixtures(&[("a.sh", "{{.Bin}} x"), ("a.txt", "x"), ("orphan.txt", "x")]);

    cli_e2e()
        .args(["--bin", "echo", "--mode", "e2e", arg(dir.path())])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("orphan"));
}

#[test]
fn list_prints_tests_and_exits() {
    let dir = fixtures(&[
        ("account/get.sh", "{{.Bin}} account get"),
        ("account/get.txt", "x"),
        ("droplet/list.sh", "{{.Bin}} compute droplet list"),
        ("droplet/list.txt", "x"),
    ]);

    cli_e2e()
        .args(["-t", "list", arg(dir.path())])
        .assert()
        .success()
        .stdout(predicate::str::contains("1: account/get"))
        .stdout(predicate::str::contains("2: droplet/list"));
}

#[test]
fn select_runs_only_the_chosen_test() {
    let dir = fixtures(&[
        ("a.sh", "{{.Bin}} one"),
        ("a.txt", "one"),
        ("b.sh", "{{.Bin}} two"),
        ("b.txt", "wrong"),
    ]);

    cli_e2e()
        .args(["--bin", "echo", "--mode", "e2e", "-t", "a", arg(dir.path())])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total: 1"));

    cli_e2e()
        .args(["--bin", "echo", "--mode", "e2e", "-t", "nope", arg(dir.path())])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("1: a"));
}

#[test]
fn config_file_supplies_settings() {
    let dir = fixtures(&[
        ("suite/get.sh", "{{.Bin}} account get"),
        ("suite/get.txt", "account get"),
        ("e2e.yaml", "Bin: echo\nFixtures: suite\nMode: e2e\nTimeout: 5\n"),
    ]);

    cli_e2e()
        .args(["--config", arg(&dir.path().join("e2e.yaml"))])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total: 1"));
}

#[test]
fn missing_fixture_directory_is_a_usage_error() {
    cli_e2e().assert().code(2);
}

#[test]
fn empty_fixture_directory_is_an_empty_passing_suite() {
    let dir = tempdir().unwrap();

    cli_e2e()
        .args(["--bin", "echo", "--no-color", arg(dir.path())])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total: 0"));
}

#[test]
fn timeout_option_reaches_the_launcher() {
    let dir = fixtures(&[("slow.sh", "{{.Bin}} 5"), ("slow.txt", "")]);

    cli_e2e()
        .args(["--bin", "sleep", "--mode", "e2e", "--timeout", "1", "--no-color", arg(dir.path())])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("timed out after 1 s"));
}
