//! CLI end-to-end tests: spawn the `pasc` binary and check stdout, stderr,
//! and exit status.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

/// Path to the fixtures directory.
fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

fn pasc() -> Command {
    Command::new(env!("CARGO_BIN_EXE_pasc"))
}

#[test]
fn test_cli_help() {
    pasc()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"));
}

#[test]
fn test_cli_version() {
    pasc()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("pasc"));
}

#[test]
fn test_cli_no_arguments_is_usage_error() {
    // Bad arguments exit 2 (clap's convention, shared with I/O errors).
    pasc().assert().failure().code(2);
}

#[test]
fn test_cli_missing_input_file() {
    pasc()
        .arg("no_such_file.pas")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("no_such_file.pas"));
}

#[test]
fn test_cli_compiles_to_stdout() {
    pasc()
        .arg(fixtures_dir().join("arithmetic.pas"))
        .assert()
        .success()
        .stdout(predicate::str::contains("main:"))
        .stdout(predicate::str::contains("t0 = x + y"))
        .stdout(predicate::str::contains("halt"));
}

#[test]
fn test_cli_writes_output_file() {
    let temp_dir = TempDir::new().expect("temp dir should be creatable");
    let output_path = temp_dir.path().join("arithmetic.tac");

    pasc()
        .arg(fixtures_dir().join("arithmetic.pas"))
        .arg("-o")
        .arg(&output_path)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let tac = std::fs::read_to_string(&output_path).expect("output file should exist");
    assert_eq!(tac, "main:\nx = 10\ny = 20\nt0 = x + y\nz = t0\nhalt\n");
}

#[test]
fn test_cli_verbose_phase_markers() {
    pasc()
        .arg(fixtures_dir().join("sum_loop.pas"))
        .arg("-v")
        .assert()
        .success()
        .stderr(predicate::str::contains("-- Lexing --"))
        .stderr(predicate::str::contains("-- Parsing --"))
        .stderr(predicate::str::contains("-- Semantic Analysis --"))
        .stderr(predicate::str::contains("-- Code Generation --"));
}

#[test]
fn test_cli_semantic_error_exits_one() {
    pasc()
        .arg(fixtures_dir().join("type_error.pas"))
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Semantic Error: Type mismatch"));
}

#[test]
fn test_cli_syntax_error_exits_one() {
    let temp_dir = TempDir::new().expect("temp dir should be creatable");
    let input = temp_dir.path().join("broken.pas");
    std::fs::write(&input, "program P begin end.").expect("fixture should be writable");

    pasc()
        .arg(&input)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Syntax Error: expected ';'"));
}

#[test]
fn test_cli_lexical_error_exits_one() {
    let temp_dir = TempDir::new().expect("temp dir should be creatable");
    let input = temp_dir.path().join("stray.pas");
    std::fs::write(&input, "program P; begin x := # end.").expect("fixture should be writable");

    pasc()
        .arg(&input)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Unexpected character '#'"));
}

#[test]
fn test_cli_output_is_deterministic() {
    let run = || {
        pasc()
            .arg(fixtures_dir().join("sum_loop.pas"))
            .output()
            .expect("binary should run")
    };
    let first = run();
    let second = run();
    assert!(first.status.success());
    assert_eq!(first.stdout, second.stdout);
}
