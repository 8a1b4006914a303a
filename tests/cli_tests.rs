mod common;

use common::{publication_zip, CATALOG};
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn run(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_artikelstamm-deductible"))
        .current_dir(dir)
        .env_remove("ARTIKELSTAMM_DEDUCTIBLE_CONFIG")
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("failed to run binary")
}

fn workspace(rows: &[&[&str]]) -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("artikelstamm.xml"), CATALOG).unwrap();
    fs::write(dir.path().join("publication.zip"), publication_zip(rows)).unwrap();
    dir
}

fn legacy_args<'a>(percentage: &'a str) -> Vec<&'a str> {
    vec![
        "-as", "artikelstamm.xml", "-zip", "publication.zip", "-pl", "list.xlsx", "-w", "0",
        "-gcn", "0", "-pcn", "1", "-p", percentage,
    ]
}

#[test]
fn test_legacy_invocation_patches_catalog() {
    let dir = workspace(&[&["7680612345678", "yes"]]);

    let output = run(dir.path(), &legacy_args("100"));

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let patched = fs::read_to_string(dir.path().join("artikelstamm.xml")).unwrap();
    assert!(patched.contains(
        "<DSCR>Dafalgan Tabl 500 mg 16 Stk</DSCR>\n\t\t\t<DEDUCTIBLE>100</DEDUCTIBLE>"
    ));
    assert!(patched.contains("<DSCR>Not on the list</DSCR>\n\t\t\t<DEDUCTIBLE>10</DEDUCTIBLE>"));
}

#[test]
fn test_verbose_flag_is_accepted() {
    let dir = workspace(&[&["7680612345678", "yes"]]);
    let mut args = legacy_args("40");
    args.push("-V");

    let output = run(dir.path(), &args);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
}

#[test]
fn test_thirteen_arguments_is_usage_error() {
    let dir = workspace(&[&["7680612345678", "yes"]]);
    let mut args = legacy_args("100");
    args.pop();

    let output = run(dir.path(), &args);

    assert_eq!(output.status.code(), Some(2));
    let untouched = fs::read_to_string(dir.path().join("artikelstamm.xml")).unwrap();
    assert_eq!(untouched, CATALOG);
}

#[test]
fn test_non_numeric_percentage_is_usage_error() {
    let dir = workspace(&[&["7680612345678", "yes"]]);

    let output = run(dir.path(), &legacy_args("abc"));

    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_long_options_are_accepted() {
    let dir = workspace(&[&["7680612345678", "yes"]]);

    let output = run(
        dir.path(),
        &[
            "--catalog", "artikelstamm.xml", "--archive", "publication.zip", "--entry",
            "list.xlsx", "--worksheet", "0", "--gtin-column", "0", "--flag-column", "1",
            "--percentage", "40",
        ],
    );

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let patched = fs::read_to_string(dir.path().join("artikelstamm.xml")).unwrap();
    assert!(patched.contains("<DEDUCTIBLE>40</DEDUCTIBLE>"));
}

#[test]
fn test_missing_catalog_exits_with_io_code() {
    let dir = workspace(&[&["7680612345678", "yes"]]);
    fs::remove_file(dir.path().join("artikelstamm.xml")).unwrap();

    let output = run(dir.path(), &legacy_args("100"));

    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn test_settings_file_from_environment() {
    let dir = workspace(&[&["7680612345678", "yes"]]);
    fs::write(dir.path().join("settings.toml"), "[catalog]\nrewrite_unchanged = true\n").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_artikelstamm-deductible"))
        .current_dir(dir.path())
        .env("ARTIKELSTAMM_DEDUCTIBLE_CONFIG", dir.path().join("settings.toml"))
        .args(legacy_args("10"))
        .output()
        .expect("failed to run binary");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
}

#[test]
fn test_invalid_settings_file_is_usage_error() {
    let dir = workspace(&[&["7680612345678", "yes"]]);
    fs::write(dir.path().join("settings.toml"), "[scanner\nheader_rows = ").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_artikelstamm-deductible"))
        .current_dir(dir.path())
        .env("ARTIKELSTAMM_DEDUCTIBLE_CONFIG", dir.path().join("settings.toml"))
        .args(legacy_args("10"))
        .output()
        .expect("failed to run binary");

    assert_eq!(output.status.code(), Some(2));
}
