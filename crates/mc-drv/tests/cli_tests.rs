//! End-to-end CLI tests (§6.3, §8 scenarios S1-S6).
//!
//! Each scenario writes its source to a temp file and drives the `mc`
//! binary through `assert_cmd`, the same trio (`assert_cmd` + `predicates`
//! + `tempfile`) the teacher's own driver tests use.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn write_source(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("write fixture source");
    path
}

fn mc() -> Command {
    Command::cargo_bin("mc").expect("built `mc` binary")
}

#[test]
fn s1_smallest_valid_program_emits_ir() {
    let dir = TempDir::new().unwrap();
    let src = write_source(&dir, "s1.m", ": main () : i32 { return 0; }\n");

    mc().arg("--emit-ll").arg(&src).assert().success();

    let ir = fs::read_to_string(src.with_extension("ll")).unwrap();
    assert!(ir.contains("define i32 @main"));
    assert!(ir.contains("ret i32 0"));
}

#[test]
fn s2_widening_on_return_sign_extends() {
    let dir = TempDir::new().unwrap();
    let src = write_source(&dir, "s2.m", ": f () : i64 { return 1; }\n");

    mc().arg("--emit-ll").arg(&src).assert().success();

    let ir = fs::read_to_string(src.with_extension("ll")).unwrap();
    assert!(ir.contains("define i64 @f"));
    assert!(ir.contains("sext"));
}

#[test]
fn s3_branching_produces_then_else_endif_blocks() {
    let dir = TempDir::new().unwrap();
    let src = write_source(
        &dir,
        "s3.m",
        ": abs (x : i32) : i32 {\n  if (x < 0) { return -x; } else { return x; }\n}\n",
    );

    mc().arg("--emit-ll").arg("--O0").arg(&src).assert().success();

    let ir = fs::read_to_string(src.with_extension("ll")).unwrap();
    assert!(ir.contains("then"));
    assert!(ir.contains("else"));
    assert!(ir.contains("endif"));
}

#[test]
fn s4_while_loop_branches_back_to_its_condition() {
    let dir = TempDir::new().unwrap();
    let src = write_source(
        &dir,
        "s4.m",
        ": sum_to (n : i32) : i32 {\n  s : i32 = 0;\n  i : i32 = 0;\n  while (i < n) { s = s + i; i = i + 1; }\n  return s;\n}\n",
    );

    mc().arg("--emit-ll").arg("--O0").arg(&src).assert().success();

    let ir = fs::read_to_string(src.with_extension("ll")).unwrap();
    assert!(ir.contains("whilecond"));
    assert!(ir.contains("whilebody"));
    assert!(ir.contains("whileend"));
}

#[test]
fn s5_undefined_symbol_fails_compilation() {
    let dir = TempDir::new().unwrap();
    let src = write_source(&dir, "s5.m", ": main () : void { y = 1; }\n");

    mc().arg(&src)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("undefined symbol"));
}

#[test]
fn s6_arity_mismatch_fails_compilation() {
    let dir = TempDir::new().unwrap();
    let src = write_source(
        &dir,
        "s6.m",
        ": f (x : i32) : i32 { return x; }\n: main () : void { f(1, 2); }\n",
    );

    mc().arg(&src)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("wrong argument count"));
}

#[test]
fn unknown_option_is_a_usage_error() {
    let dir = TempDir::new().unwrap();
    let src = write_source(&dir, "ok.m", ": main () : i32 { return 0; }\n");

    mc().arg("--bogus").arg(&src).assert().failure().code(1);
}

#[test]
fn missing_input_file_is_a_usage_error() {
    mc().assert().failure().code(1);
}

#[test]
fn emit_o_writes_an_object_file() {
    let dir = TempDir::new().unwrap();
    let src = write_source(&dir, "obj.m", ": main () : i32 { return 0; }\n");

    mc().arg("--emit-o").arg(&src).assert().success();

    assert!(src.with_extension("o").exists());
}
