//! End-to-end tests for the `stachegen` binary

use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

/// Command isolated from the caller's config files and environment
fn stachegen(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_stachegen"));
    cmd.current_dir(dir)
        .env("HOME", dir)
        .env("XDG_CONFIG_HOME", dir.join(".config"))
        .env("NO_COLOR", "1")
        .env_remove("STACHEGEN_LANG")
        .env_remove("STACHEGEN_GO_PACKAGE")
        .env_remove("STACHEGEN_GO_RUNTIME")
        .env_remove("STACHEGEN_EXTENSION");
    cmd
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_compiles_file_to_js() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("page.mustache"), "{{>row}}\n").unwrap();
    fs::write(dir.path().join("row.mustache"), "<li>{{name}}</li>\n").unwrap();

    let output = stachegen(dir.path())
        .args(["--lang", "js", "page.mustache"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", stderr(&output));
    let js = stdout(&output);
    assert!(js.starts_with("// Code generated by stachegen. DO NOT EDIT.\n"));
    assert!(js.contains("function p0(s,b,n)"));
    assert!(js.contains("export default function(data)"));
}

#[test]
fn test_compiles_file_to_go_with_package() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("user_card.mustache"), "{{name}}").unwrap();

    let output = stachegen(dir.path())
        .args(["-l", "go", "--go-package", "views", "user_card.mustache"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", stderr(&output));
    let go = stdout(&output);
    assert!(go.contains("package views\n"));
    assert!(go.contains("func UserCard(buf *bytes.Buffer, data any) {"));
}

#[test]
fn test_reads_standard_input() {
    let dir = TempDir::new().unwrap();
    let mut child = stachegen(dir.path())
        .args(["--lang", "go"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"Hello {{who}}\n")
        .unwrap();
    let output = child.wait_with_output().unwrap();
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("func Stdin(buf *bytes.Buffer, data any) {"));
}

#[test]
fn test_writes_output_file() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.mustache"), "x").unwrap();

    let output = stachegen(dir.path())
        .args(["--lang", "js", "-o", "a.js", "a.mustache"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).is_empty());
    assert!(fs::read_to_string(dir.path().join("a.js"))
        .unwrap()
        .contains("x+='x'"));
}

#[test]
fn test_project_config_supplies_language() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("stachegen.toml"),
        "lang = \"go\"\ngo_package = \"site\"\n",
    )
    .unwrap();
    fs::write(dir.path().join("t.mustache"), "x").unwrap();

    let output = stachegen(dir.path()).arg("t.mustache").output().unwrap();
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("package site\n"));
}

#[test]
fn test_environment_overrides_project_config() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("stachegen.toml"), "lang = \"go\"\n").unwrap();
    fs::write(dir.path().join("t.mustache"), "x").unwrap();

    let output = stachegen(dir.path())
        .env("STACHEGEN_LANG", "js")
        .arg("t.mustache")
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("export default function(data)"));
}

#[test]
fn test_missing_language_fails() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("t.mustache"), "x").unwrap();

    let output = stachegen(dir.path()).arg("t.mustache").output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("stachegen: no target language given"));
    assert!(stdout(&output).is_empty());
}

#[test]
fn test_parse_error_reports_line() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("bad.mustache"), "ok\n{{#a}}\n{{/b}}\n").unwrap();

    let output = stachegen(dir.path())
        .args(["--lang", "go", "bad.mustache"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("3: mismatched {{/b}} (last opened a on line 2)"));
}

#[test]
fn test_bad_partial_is_named() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("t.mustache"), "{{>broken}}").unwrap();
    fs::write(dir.path().join("broken.mustache"), "{{#x}}").unwrap();

    let output = stachegen(dir.path())
        .args(["--lang", "js", "t.mustache"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("partial broken: 1: unclosed x"));
}

#[test]
fn test_show_config() {
    let dir = TempDir::new().unwrap();
    let output = stachegen(dir.path())
        .args(["--show-config", "--go-runtime", "example.com/m"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", stderr(&output));
    let shown = stdout(&output);
    assert!(shown.contains("go_package = \"main\""));
    assert!(shown.contains("go_runtime = \"example.com/m\""));
    assert!(shown.contains("extension = \"mustache\""));
}
