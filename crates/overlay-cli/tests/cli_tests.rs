//! Tests for the overlay binary.
//!
//! These tests exercise the actual compiled binary using assert_cmd.

use assert_cmd::Command;
use overlay_test_utils::TestConfigDir;
use predicates::prelude::*;

/// A Command for the overlay binary, isolated from the caller's environment.
fn overlay_cmd(dir: &TestConfigDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("overlay"));
    cmd.env_remove("OVERLAY_ENV")
        .env_remove("RUST_ENV")
        .env_remove("OVERLAY_HOSTNAME")
        .env_remove("HOSTNAME")
        .env_remove("RUST_LOG")
        .env("OVERLAY_CONFIG_PATH", dir.root());
    cmd
}

fn app_dir() -> TestConfigDir {
    let mut dir = TestConfigDir::new();
    dir.write("app.yml", "db:\n  host: localhost\n  port: 5432\nservers: [a, b]\n");
    dir.write("app_local.yml", "db:\n  host: db.local\n");
    dir.write("app_production.yml", "db:\n  host: db.prod\n");
    dir
}

#[test]
fn help_output() {
    let dir = TestConfigDir::new();
    overlay_cmd(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("layered"));
}

#[test]
fn no_command_shows_help_hint() {
    let dir = TestConfigDir::new();
    overlay_cmd(&dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("overlay --help"));
}

#[test]
fn get_applies_local_overlay() {
    let dir = app_dir();
    overlay_cmd(&dir)
        .args(["get", "app", "db", "host"])
        .assert()
        .success()
        .stdout("db.local\n");
}

#[test]
fn get_environment_overlay_from_flag() {
    let dir = app_dir();
    overlay_cmd(&dir)
        .args(["get", "app", "db", "host", "--env", "production"])
        .assert()
        .success()
        .stdout("db.prod\n");
}

#[test]
fn get_environment_overlay_from_env_var() {
    let dir = app_dir();
    overlay_cmd(&dir)
        .env("OVERLAY_ENV", "production")
        .args(["get", "app", "db", "host"])
        .assert()
        .success()
        .stdout("db.prod\n");
}

#[test]
fn get_sequence_index_as_json() {
    let dir = app_dir();
    overlay_cmd(&dir)
        .args(["get", "app", "servers", "0", "--format", "json"])
        .assert()
        .success()
        .stdout("\"a\"\n");
}

#[test]
fn get_missing_value_fails() {
    let dir = app_dir();
    overlay_cmd(&dir)
        .args(["get", "app", "nope"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("error"))
        .stderr(predicate::str::contains("app:nope"));
}

#[test]
fn dump_json() {
    let dir = app_dir();
    let output = overlay_cmd(&dir)
        .args(["dump", "app", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["db"]["host"], "db.local");
    assert_eq!(value["db"]["port"], 5432);
}

#[test]
fn dump_reports_parse_error_with_path() {
    let mut dir = TestConfigDir::new();
    dir.write("broken.yml", "a: [unclosed\n");
    overlay_cmd(&dir)
        .args(["dump", "broken"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("broken.yml"));
}

#[test]
fn dump_rendered_template() {
    let mut dir = TestConfigDir::new();
    dir.write(
        "tpl.yml",
        "# OVERLAY_CONFIG: TEMPLATE\nname: {{ config_name }}\nfrom: {{ env('OVERLAY_TEST_VALUE', 'fallback') }}\n",
    );
    overlay_cmd(&dir)
        .env("OVERLAY_TEST_VALUE", "from-env")
        .args(["dump", "tpl"])
        .assert()
        .success()
        .stdout(predicate::str::contains("name: tpl"))
        .stdout(predicate::str::contains("from: from-env"));
}

#[test]
fn files_lists_candidates() {
    let dir = app_dir();
    overlay_cmd(&dir)
        .args(["files", "app", "--existing"])
        .assert()
        .success()
        .stdout(predicate::str::contains("app.yml"))
        .stdout(predicate::str::contains("app_local.yml"))
        .stdout(predicate::str::contains("app_production.yml").not());
}

#[test]
fn files_without_search_path_hints() {
    let dir = TestConfigDir::new();
    overlay_cmd(&dir)
        .env_remove("OVERLAY_CONFIG_PATH")
        .args(["files", "app"])
        .assert()
        .success()
        .stdout(predicate::str::contains("OVERLAY_CONFIG_PATH"));
}

#[test]
fn toml_extension() {
    let mut dir = TestConfigDir::new();
    dir.write("svc.toml", "[server]\nport = 8080\n");
    overlay_cmd(&dir)
        .args(["get", "svc", "server", "port", "--ext", "toml"])
        .assert()
        .success()
        .stdout("8080\n");
}

#[test]
fn watch_zero_count_prints_once() {
    let dir = app_dir();
    overlay_cmd(&dir)
        .args(["watch", "app", "--count", "0", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"db.local\""));
}
