//! Integration tests driving the `indentc` binary end to end through its
//! CLI surface: exit codes, `--dump-ast`, `--interpret` fast failure, and
//! `-o -` vs. a real output file.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

fn indentc() -> Command {
    Command::new(env!("CARGO_BIN_EXE_indentc"))
}

fn source_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp source file");
    write!(file, "{contents}").expect("write temp source file");
    file
}

#[test]
fn compiles_a_simple_return_to_stdout() {
    let src = source_file("return 10\n");
    indentc()
        .arg(src.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(".global main"))
        .stdout(predicate::str::contains("mov $10, %eax"));
}

#[test]
fn dash_o_dash_writes_to_stdout_explicitly() {
    let src = source_file("return 1\n");
    indentc()
        .arg(src.path())
        .arg("-o")
        .arg("-")
        .assert()
        .success()
        .stdout(predicate::str::contains("main:"));
}

#[test]
fn dump_ast_mode_prints_the_tree_without_assembly() {
    let src = source_file("return 1 + 2\n");
    indentc()
        .arg("--dump-ast")
        .arg(src.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("FunctionDefinition main()"))
        .stdout(predicate::str::contains("BinaryOperator Add"))
        .stdout(predicate::str::contains(".global").not());
}

#[test]
fn interpret_mode_fails_fast_with_not_implemented() {
    let src = source_file("return 1\n");
    indentc()
        .arg("--interpret")
        .arg(src.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("not implemented"));
}

#[test]
fn conflicting_mode_flags_are_rejected() {
    let src = source_file("return 1\n");
    indentc()
        .arg("--compile")
        .arg("--dump-ast")
        .arg(src.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("mutually exclusive"));
}

#[test]
fn compiles_to_an_output_file() {
    let src = source_file("return 42\n");
    let out = NamedTempFile::new().expect("create temp output file");
    indentc()
        .arg(src.path())
        .arg("-o")
        .arg(out.path())
        .assert()
        .success();

    let written = std::fs::read_to_string(out.path()).expect("read generated assembly");
    assert!(written.contains("mov $42, %eax"));
}

#[test]
fn missing_input_file_is_a_usage_error() {
    indentc()
        .arg("--compile")
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing required input file"));
}

#[test]
fn lexical_error_surfaces_a_nonzero_exit_and_position() {
    let src = source_file("return @\n");
    indentc()
        .arg(src.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 1"));
}

#[test]
fn undefined_variable_is_a_parse_error() {
    let src = source_file("return y\n");
    indentc()
        .arg(src.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("undefined variable"));
}

#[test]
fn while_loop_lowers_with_both_loop_labels() {
    let src = source_file("i = 0\nwhile i < 5:\n    i = i + 1\nreturn i\n");
    indentc()
        .arg(src.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("loop_start_"))
        .stdout(predicate::str::contains("loop_end_"));
}
