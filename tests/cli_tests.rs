#![cfg(unix)]

mod common;

use assert_cmd::Command;
use common::*;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Writes the fake-tool configuration next to (not inside) the repository
fn write_rc(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("debtcloset.toml");
    let text = toml::to_string(&fake_config()).unwrap();
    std::fs::write(&path, text).unwrap();
    path
}

fn debtcloset(repo: &Path, rc: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("debtcloset").unwrap();
    cmd.args(args)
        .arg(repo)
        .arg("--config")
        .arg(rc)
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_lists_commands() {
    Command::cargo_bin("debtcloset")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("exclude"))
        .stdout(predicate::str::contains("clear"))
        .stdout(predicate::str::contains("show"));
}

#[test]
fn test_exclude_terminal_report() {
    let repo = failing_repo(PYPROJECT);
    let settings = TempDir::new().unwrap();
    let rc = write_rc(&settings);

    debtcloset(repo.path(), &rc, &["exclude"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Exclusion Report"))
        .stdout(predicate::str::contains("src/module1.py"))
        .stdout(predicate::str::contains("src/module2.py"));

    assert!(read_pyproject(repo.path()).contains("exclude = [\n    \"src/module1.py\","));
}

#[test]
fn test_exclude_json_with_required() {
    let repo = failing_repo(PYPROJECT);
    let settings = TempDir::new().unwrap();
    let rc = write_rc(&settings);

    let output = debtcloset(repo.path(), &rc, &["exclude", "--format", "json"])
        .args(["--require", "src/module1.py", "--require", "legacy/*"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        report["exclusions"],
        serde_json::json!(["legacy/*", "src/module1.py", "src/module2.py"])
    );
    assert_eq!(report["discovered"], serde_json::json!(["src/module2.py"]));
}

#[test]
fn test_exclude_markdown_to_file() {
    let repo = failing_repo(PYPROJECT);
    let settings = TempDir::new().unwrap();
    let rc = write_rc(&settings);
    let out = settings.path().join("report.md");

    debtcloset(repo.path(), &rc, &["exclude", "--format", "markdown"])
        .arg("--output")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Report written to"));

    let markdown = std::fs::read_to_string(out).unwrap();
    assert!(markdown.contains("| `src/module2.py` | failing | new |"));
}

#[test]
fn test_show_and_clear() {
    let repo = failing_repo(PYPROJECT);
    let settings = TempDir::new().unwrap();
    let rc = write_rc(&settings);

    debtcloset(repo.path(), &rc, &["exclude"]).assert().success();

    debtcloset(repo.path(), &rc, &["show"])
        .assert()
        .success()
        .stdout("src/module1.py\nsrc/module2.py\n");

    debtcloset(repo.path(), &rc, &["clear"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 2 exclusion(s) from [tool.pyright]"));

    assert_eq!(read_pyproject(repo.path()), PYPROJECT);

    debtcloset(repo.path(), &rc, &["show"])
        .assert()
        .success()
        .stdout("");
}

#[test]
fn test_ruff_tool_flag() {
    let repo = TempDir::new().unwrap();
    write(repo.path(), "pyproject.toml", "[tool.ruff]\n");
    write(repo.path(), "a.py", "import os  # lint error\n");
    let settings = TempDir::new().unwrap();
    let rc = write_rc(&settings);

    debtcloset(repo.path(), &rc, &["exclude", "--tool", "ruff"])
        .assert()
        .success();

    debtcloset(repo.path(), &rc, &["show", "--tool", "ruff"])
        .assert()
        .success()
        .stdout("a.py\n");
}

#[test]
fn test_missing_pyproject_fails() {
    let repo = TempDir::new().unwrap();
    let settings = TempDir::new().unwrap();
    let rc = write_rc(&settings);

    debtcloset(repo.path(), &rc, &["exclude"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not find"));

    debtcloset(repo.path(), &rc, &["clear"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not find"));
}
