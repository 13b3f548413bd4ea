//! Integration tests for the walrus command-line interface.

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;

fn fixture(name: &str) -> String {
    format!("{}/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

fn walrus() -> Command {
    Command::cargo_bin("walrus").unwrap()
}

// ============================================================================
// run
// ============================================================================

#[test]
fn run_prints_program_output() {
    let assert = walrus().arg("run").arg(fixture("fib.wal")).assert();
    assert
        .success()
        .stdout(predicate::str::starts_with("fib(0) = 0\nfib(1) = 1\n"))
        .stdout(predicate::str::contains("fib(7) = 13\n"));
}

#[test]
fn run_structs() {
    let assert = walrus().arg("run").arg(fixture("structs.wal")).assert();
    assert.success().stdout("origin: 11, 2\n");
}

#[test]
fn run_runtime_error() {
    let assert = walrus().arg("run").arg(fixture("division.wal")).assert();
    assert
        .code(1)
        .stderr(predicate::str::contains("[E205]"))
        .stderr(predicate::str::contains("division by zero is forbidden"))
        .stderr(predicate::str::contains("division.wal:3:9"))
        .stderr(predicate::str::contains("print(a / b);"))
        .stderr(predicate::str::contains("could not run"));
}

#[test]
fn run_json_diagnostics() {
    let assert = walrus()
        .arg("run")
        .arg(fixture("division.wal"))
        .arg("--format")
        .arg("json")
        .assert();
    assert
        .code(1)
        .stdout(predicate::str::contains("\"status\""))
        .stdout(predicate::str::contains("\"code\": \"E205\""));
}

#[test]
fn run_fancy_report() {
    let assert = walrus()
        .arg("run")
        .arg(fixture("division.wal"))
        .arg("--format")
        .arg("fancy")
        .assert();
    assert
        .code(1)
        .stderr(predicate::str::contains("E205"))
        .stderr(predicate::str::contains("division by zero is forbidden"));
}

#[test]
fn run_with_warning_still_runs() {
    let assert = walrus().arg("run").arg(fixture("warning.wal")).assert();
    assert
        .success()
        .stdout("3\n")
        .stderr(predicate::str::contains("[W001]"))
        .stderr(predicate::str::contains("unknown type `integer`"));
}

#[test]
fn run_reads_config_next_to_script() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("deep.wal");
    fs::copy(fixture("recursion.wal"), &script).unwrap();
    fs::write(dir.path().join("walrus.toml"), "[interpreter]\nmax_call_depth = 16\n").unwrap();

    let assert = walrus().arg("run").arg(&script).assert();
    assert
        .code(1)
        .stderr(predicate::str::contains("[E215]"))
        .stderr(predicate::str::contains("limit of 16"));
}

#[test]
fn run_recursion_at_deepest_accepted_depth() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("countdown.wal");
    fs::write(
        &script,
        "fn f(n: i64) -> i64 { if n == 0 { ret 0; } ret f(n - 1); }\nprint(f(1000));\n",
    )
    .unwrap();
    fs::write(dir.path().join("walrus.toml"), "[interpreter]\nmax_call_depth = 1024\n").unwrap();

    let assert = walrus().arg("run").arg(&script).assert();
    assert.success().stdout("0\n");
}

#[test]
fn run_rejects_call_depth_beyond_limit() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("deep.wal");
    fs::copy(fixture("recursion.wal"), &script).unwrap();
    fs::write(dir.path().join("walrus.toml"), "[interpreter]\nmax_call_depth = 100000\n").unwrap();

    let assert = walrus().arg("run").arg(&script).assert();
    assert
        .code(2)
        .stderr(predicate::str::contains("must be between 1 and 1024"));
}

#[test]
fn verbose_logs_command_phases() {
    let assert = walrus()
        .env_remove("RUST_LOG")
        .arg("-v")
        .arg("run")
        .arg(fixture("structs.wal"))
        .assert();
    assert
        .success()
        .stdout("origin: 11, 2\n")
        .stderr(predicate::str::contains("dispatching"))
        .stderr(predicate::str::contains("starting interpreter"));
}

#[test]
fn run_explicit_config_disables_builtin() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("custom.toml");
    fs::write(&config, "[builtins]\ndisabled = [\"print\"]\n").unwrap();

    let assert = walrus()
        .arg("run")
        .arg(fixture("structs.wal"))
        .arg("--config")
        .arg(&config)
        .assert();
    assert
        .code(1)
        .stderr(predicate::str::contains("`print` is not declared"));
}

#[test]
fn run_malformed_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("bad.toml");
    fs::write(&config, "[interpreter\n").unwrap();

    let assert = walrus()
        .arg("run")
        .arg(fixture("fib.wal"))
        .arg("--config")
        .arg(&config)
        .assert();
    assert.code(2).stderr(predicate::str::contains("failed to parse"));
}

#[test]
fn run_missing_file() {
    let assert = walrus().arg("run").arg("does-not-exist.wal").assert();
    assert
        .code(2)
        .stderr(predicate::str::contains("Failed to read file"));
}

// ============================================================================
// check / parse / tokens
// ============================================================================

#[test]
fn check_valid_file() {
    let assert = walrus().arg("check").arg(fixture("fib.wal")).assert();
    assert
        .success()
        .stdout(predicate::str::contains("validated successfully"));
}

#[test]
fn check_syntax_error() {
    let assert = walrus().arg("check").arg(fixture("syntax_error.wal")).assert();
    assert
        .code(1)
        .stdout(predicate::str::contains("[E109]"))
        .stdout(predicate::str::contains("`x` needs a value after `:=`"))
        .stdout(predicate::str::contains("help:"))
        .stderr(predicate::str::contains("1 previous error"));
}

#[test]
fn check_does_not_run() {
    let assert = walrus().arg("check").arg(fixture("division.wal")).assert();
    assert
        .success()
        .stdout(predicate::str::contains("division by zero").not());
}

#[test]
fn check_reports_warnings() {
    let assert = walrus().arg("check").arg(fixture("warning.wal")).assert();
    assert
        .success()
        .stdout(predicate::str::contains("validated with 1 warning"));
}

#[test]
fn parse_prints_ast_json() {
    let assert = walrus().arg("parse").arg(fixture("structs.wal")).assert();
    assert
        .success()
        .stdout(predicate::str::contains("\"module_name\": \"structs\""))
        .stdout(predicate::str::contains("StructDecl"));
}

#[test]
fn tokens_lists_token_stream() {
    let assert = walrus().arg("tokens").arg(fixture("division.wal")).assert();
    assert
        .success()
        .stdout(predicate::str::contains("Identifier(a)"))
        .stdout(predicate::str::contains("Number(10)"))
        .stdout(predicate::str::contains("Eof"));
}
