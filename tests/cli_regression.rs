// Regression tests for the kisexp binary: output shapes, exit codes and
// miette diagnostics.
// Requires: assert_cmd, predicates, tempfile crates in [dev-dependencies]

mod common;

use std::fs;

use assert_cmd::Command;
use predicates::{prelude::PredicateBooleanExt, str::contains};

use common::{fixture_path, RESISTOR};

fn kisexp() -> Command {
    Command::cargo_bin("kisexp").unwrap()
}

#[test]
fn check_passes_on_a_canonical_file() {
    kisexp()
        .arg("check")
        .arg(fixture_path("resistor.kicad_sym"))
        .assert()
        .success()
        .stdout(contains("round trip ok"));
}

#[test]
fn check_fails_with_a_diff_when_layout_differs() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("squashed.kicad_sym");
    fs::write(&file, "(kicad_symbol_lib (version 1) (symbol \"R\" (in_bom yes)))").unwrap();

    kisexp()
        .arg("check")
        .arg(&file)
        .assert()
        .code(1)
        .stdout(contains("round trip differs").and(contains("+  (symbol \"R\" (in_bom yes)")));
}

#[test]
fn format_writes_the_layout_to_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("flat.kicad_sym");
    let output = dir.path().join("pretty.kicad_sym");
    let flat = RESISTOR.split_whitespace().collect::<Vec<_>>().join(" ");
    fs::write(&input, flat).unwrap();

    kisexp().arg("format").arg(&input).arg("-o").arg(&output).assert().success();
    assert_eq!(fs::read_to_string(&output).unwrap(), RESISTOR);
}

#[test]
fn format_flat_prints_a_single_line() {
    kisexp()
        .args(["format", "--flat"])
        .arg(fixture_path("resistor.kicad_sym"))
        .assert()
        .success()
        .stdout(contains("(kicad_symbol_lib (version 20211014)").and(contains("\n  ").not()));
}

#[test]
fn find_prints_each_match() {
    kisexp()
        .arg("find")
        .arg(fixture_path("resistor.kicad_sym"))
        .arg("/kicad_symbol_lib/symbol/symbol/pin/number")
        .arg("--flat")
        .assert()
        .success()
        .stdout(
            contains("kicad_symbol_lib/symbol/symbol/pin/number")
                .and(contains("\n(number \"1\" (effects (font (size 1.27 1.27))))\n")),
        );
}

#[test]
fn paths_lists_distinct_paths() {
    kisexp()
        .arg("paths")
        .arg(fixture_path("resistor.kicad_sym"))
        .assert()
        .success()
        .stdout(contains("kicad_symbol_lib\nkicad_symbol_lib/generator\nkicad_symbol_lib/symbol\n"));
}

#[test]
fn schema_walks_directories_by_extension() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.kicad_sym"), RESISTOR).unwrap();
    fs::write(dir.path().join("b.kicad_sym"), RESISTOR).unwrap();
    fs::write(dir.path().join("notes.txt"), "not an s-expression").unwrap();

    kisexp()
        .arg("schema")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(contains("  kicad_symbol_lib #2 {Node/.../Node}\n"));
}

#[test]
fn custom_layout_profile_is_applied() {
    let dir = tempfile::tempdir().unwrap();
    let layout = dir.path().join("layout.yaml");
    fs::write(&layout, "openers: []\nclosers: []\nprefix: []\nround2: [at]\n").unwrap();

    kisexp()
        .arg("format")
        .arg(fixture_path("resistor.kicad_sym"))
        .arg("--layout")
        .arg(&layout)
        .assert()
        .success()
        .stdout(contains("(at 2.03 0.00 90) (effects"));
}

#[test]
fn cli_reports_miette_diagnostics_on_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let bad_file = dir.path().join("bad.kicad_sym");
    fs::write(&bad_file, "(kicad_symbol_lib (version 1)" /* missing closing paren */).unwrap();

    kisexp()
        .arg("dump")
        .arg(&bad_file)
        .assert()
        .failure()
        .stderr(contains("kisexp::parse").or(contains("help:")));
}

#[test]
fn cli_reports_missing_files() {
    kisexp()
        .arg("dump")
        .arg("does/not/exist.kicad_sym")
        .assert()
        .failure()
        .stderr(contains("kisexp::io"));
}
