//! Tests for error handling, suggestions and exit codes.

use std::{fs, path::Path};

use assert_cmd::{Command, cargo::cargo_bin_cmd};
use predicates::prelude::*;
use tempfile::TempDir;

/// A `kiln` command whose config points at `dir/templates`.
fn kiln(dir: &Path) -> Command {
    let templates = dir.join("templates");
    fs::create_dir_all(&templates).unwrap();
    let config = dir.join("kiln.toml");
    if !config.exists() {
        fs::write(
            &config,
            format!("config_version = 2\nuser_templates_dir = '{}'\n", templates.display()),
        )
        .unwrap();
    }

    let mut cmd = cargo_bin_cmd!("kiln");
    cmd.current_dir(dir)
        .env_remove("RUST_LOG")
        .env_remove("KILN_TEMPLATE")
        .env_remove("KILN_TEMPLATES_DIR")
        .arg("--config")
        .arg(config);
    cmd
}

fn write_template(dir: &Path, name: &str, meta: &str) {
    let root = dir.join("templates").join(name);
    fs::create_dir_all(root.join("skeleton")).unwrap();
    fs::write(root.join("skeleton").join(format!("{name}.txt")), name).unwrap();
    fs::write(root.join("meta.yaml"), meta).unwrap();
}

#[test]
fn test_error_invalid_package_name() {
    let temp = TempDir::new().unwrap();

    kiln(temp.path())
        .args(["new", ".hidden"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid package name"));
}

#[test]
fn test_error_unknown_template() {
    let temp = TempDir::new().unwrap();

    kiln(temp.path())
        .args(["new", "widget", "--template", "nope"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("No template named 'nope' found"))
        .stderr(predicate::str::contains("kiln list"));

    assert!(!temp.path().join("widget").exists());
}

#[test]
fn test_error_missing_include() {
    let temp = TempDir::new().unwrap();
    write_template(temp.path(), "app", "includes: [ghost]\n");

    kiln(temp.path())
        .args(["new", "widget", "--template", "app"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("ghost"));

    // Resolution fails before anything is written.
    assert!(!temp.path().join("widget").exists());
}

#[test]
fn test_error_circular_include() {
    let temp = TempDir::new().unwrap();
    write_template(temp.path(), "a", "includes: [b]\n");
    write_template(temp.path(), "b", "includes: [a]\n");

    kiln(temp.path())
        .args(["new", "widget", "--template", "a"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Circular include: a -> b -> a"));

    assert!(!temp.path().join("widget").exists());
}

#[test]
fn test_error_malformed_meta() {
    let temp = TempDir::new().unwrap();
    write_template(temp.path(), "broken", "includes: [unclosed\n");

    kiln(temp.path())
        .args(["new", "widget", "--template", "broken"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("broken"));
}

#[test]
fn test_error_undefined_content_variable() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("templates").join("strict");
    fs::create_dir_all(root.join("skeleton")).unwrap();
    fs::write(root.join("skeleton").join("a.txt"), "first\n").unwrap();
    fs::write(root.join("skeleton").join("b.txt.erb"), "<%= nobody %>\n").unwrap();

    kiln(temp.path())
        .args(["new", "widget", "--template", "strict"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nobody"))
        // Earlier files were already written.
        .stdout(predicate::str::contains("Partial output may remain"));
}

#[test]
fn test_error_malformed_config() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("kiln.toml"), "default_template = [oops").unwrap();

    kiln(temp.path())
        .arg("list")
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Configuration error"));
}

#[test]
fn test_error_unknown_config_key() {
    let temp = TempDir::new().unwrap();

    kiln(temp.path())
        .args(["config", "get", "colour"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Unknown config key: 'colour'"));
}

#[test]
fn test_error_malformed_var() {
    let temp = TempDir::new().unwrap();

    kiln(temp.path())
        .args(["new", "widget", "--var", "author"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("KEY=VALUE"));
}

#[test]
fn test_error_conflicting_collision_flags() {
    let temp = TempDir::new().unwrap();

    kiln(temp.path())
        .args(["new", "widget", "--yes", "--no-clobber"])
        .assert()
        .code(2);
}

#[test]
fn test_verbose_shows_cause_chain() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("kiln.toml"), "default_template = [oops").unwrap();

    kiln(temp.path())
        .args(["-v", "list"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Use -v").not());
}
