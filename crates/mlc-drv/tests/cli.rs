//! End-to-end tests driving the `mlc` binary itself, per the CLI surface:
//! a positional source path, `--verbose`/--no-opt/--repl flags, exit code
//! `0` on success and `1` on any compile or runtime error.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

fn mlc_bin() -> Command {
    Command::cargo_bin("mlc").unwrap()
}

fn source_file(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".nc").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn help_lists_the_flags() {
    mlc_bin()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--verbose").and(predicate::str::contains("--repl")));
}

#[test]
fn recursive_factorial_prints_120() {
    let file = source_file(
        "function int factorial(int n) { \
            if (n <= 1) { return 1; } \
            return n * factorial(n - 1); \
         } \
         int r = factorial(5); print(r);",
    );

    mlc_bin()
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("120"));
}

#[test]
fn while_loop_prints_each_iteration() {
    let file = source_file("int i = 1; while (i <= 3) { print(i); i = i + 1; }");

    mlc_bin()
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::eq("1 2 3 "));
}

#[test]
fn array_sum_prints_60() {
    let file = source_file(
        "int[] a = [10, 20, 30]; \
         int s = 0; int i = 0; \
         while (i < len(a)) { s = s + a[i]; i = i + 1; } \
         print(s);",
    );

    mlc_bin().arg(file.path()).assert().success().stdout(predicate::eq("60 "));
}

#[test]
fn verbose_flag_dumps_the_optimized_single_assign() {
    let file = source_file("int x = 2 + 3 * 4; print(x);");

    mlc_bin()
        .arg(file.path())
        .arg("--verbose")
        .assert()
        .success()
        .stderr(predicate::str::contains("= 14"));
}

#[test]
fn no_opt_flag_skips_constant_folding_in_the_dump() {
    let file = source_file("int x = 2 + 3 * 4; print(x);");

    mlc_bin()
        .arg(file.path())
        .arg("--verbose")
        .arg("--no-opt")
        .assert()
        .success()
        .stderr(predicate::str::contains("+").and(predicate::str::contains("*")));
}

#[test]
fn type_error_exits_with_code_1() {
    let file = source_file("int x = true;");

    mlc_bin()
        .arg(file.path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("semantic error").and(predicate::str::contains("bool")));
}

#[test]
fn runtime_error_exits_with_code_1() {
    let file = source_file("int[] a = [1]; print(a[5]);");

    mlc_bin()
        .arg(file.path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Array index out of bounds: 5"));
}

#[test]
fn missing_source_file_is_an_error_outside_repl_mode() {
    mlc_bin().assert().failure();
}
