//! Tests for error handling, exit codes and suggestions.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn kiln(cwd: &TempDir, modules: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("kiln").unwrap();
    cmd.current_dir(cwd.path())
        .env("KILN_MODULES_DIR", modules.path())
        .env("XDG_CONFIG_HOME", cwd.path())
        .env("HOME", cwd.path())
        .env("NO_COLOR", "1");
    cmd
}

#[test]
fn test_error_no_modules_found() {
    let cwd = TempDir::new().unwrap();
    let empty = TempDir::new().unwrap();

    kiln(&cwd, &empty)
        .arg("list")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("No modules found"))
        .stderr(predicate::str::contains("KILN_MODULES_DIR"));
}

#[test]
fn test_error_explicit_config_missing() {
    let cwd = TempDir::new().unwrap();
    let modules = TempDir::new().unwrap();

    kiln(&cwd, &modules)
        .args(["--config", "nope.toml", "config", "list"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Configuration error"));
}

#[test]
fn test_error_malformed_local_config() {
    let cwd = TempDir::new().unwrap();
    let modules = TempDir::new().unwrap();
    std::fs::write(cwd.path().join(".kiln.toml"), "[project\nlayout = ").unwrap();

    kiln(&cwd, &modules)
        .args(["config", "path"])
        .assert()
        .code(4);
}

#[test]
fn test_error_unknown_config_key() {
    let cwd = TempDir::new().unwrap();
    let modules = TempDir::new().unwrap();

    kiln(&cwd, &modules)
        .args(["config", "get", "project.colour"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Unknown config key"));
}

#[test]
fn test_error_conflicting_flags() {
    let cwd = TempDir::new().unwrap();
    let modules = TempDir::new().unwrap();

    kiln(&cwd, &modules)
        .args(["--quiet", "--verbose", "list"])
        .assert()
        .code(2);
}

#[test]
fn test_error_verbose_shows_no_hint() {
    let cwd = TempDir::new().unwrap();
    let empty = TempDir::new().unwrap();

    kiln(&cwd, &empty)
        .args(["-v", "list"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Use -v / --verbose").not());
}
