//! Integration tests for the sql-advisor binary.

use std::io::Write;

use assert_cmd::{Command, cargo::cargo_bin_cmd};
use predicates::prelude::*;
use tempfile::NamedTempFile;

fn cmd() -> Command {
    let mut cmd = cargo_bin_cmd!("sql-advisor");
    cmd.env_remove("RUST_LOG")
        .env_remove("SQL_ADVISOR_CONFIG")
        .env_remove("SQL_ADVISOR_IGNORE")
        .env_remove("SQL_ADVISOR_DIALECT")
        .env_remove("SQL_ADVISOR_LOG");
    cmd
}

#[test]
fn test_warning_exit_code() {
    cmd()
        .args([
            "advise",
            "--sql",
            "select * from users where id = 1",
            "--no-color"
        ])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("COL.001"))
        .stdout(predicate::str::contains("select * from users where id = ?"));
}

#[test]
fn test_syntax_error_exit_code() {
    cmd()
        .args(["advise", "--sql", "select * from", "--no-color"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("1 error(s)"));
}

#[test]
fn test_comment_only_is_clean() {
    cmd()
        .args(["advise", "--sql", "-- nothing to see", "-f", "json"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("[]"));
}

#[test]
fn test_ignore_flag_suppresses_rule() {
    cmd()
        .args([
            "advise",
            "--sql",
            "select * from users where id = 1",
            "--ignore",
            "COL.*",
            "-f",
            "json"
        ])
        .assert()
        .stdout(predicate::str::contains("COL.001").not());
}

#[test]
fn test_queries_file_json() {
    let mut queries = NamedTempFile::new().unwrap();
    writeln!(queries, "select * from t where id = 1;").unwrap();
    writeln!(queries, "-- comment only;").unwrap();
    writeln!(queries, "delete from t;").unwrap();

    let output = cmd()
        .args(["advise", "-q", queries.path().to_str().unwrap(), "-f", "json"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let items = value.as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert!(items[1]["heuristic_suggest"]["CLA.014"].is_object());
}

#[test]
fn test_jsonl_from_stdin() {
    let input = concat!(
        "{\"schema\": \"db\", \"sql\": \"select id from t where id = 1\"}\n",
        "{\"sql\": \"select * from t where id = 2\", \"ignore_rules\": [\"COL.001\"]}\n"
    );
    let output = cmd()
        .args(["advise", "-q", "-", "--input", "jsonl", "-f", "json"])
        .write_stdin(input)
        .output()
        .unwrap();
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let items = value.as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert!(items[1]["heuristic_suggest"].get("COL.001").is_none());
}

#[test]
fn test_invalid_jsonl_is_fatal() {
    cmd()
        .args(["advise", "-q", "-", "--input", "jsonl"])
        .write_stdin("not json\n")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_missing_input_is_fatal() {
    cmd()
        .args(["advise"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_missing_queries_file() {
    cmd()
        .args(["advise", "-q", "/nonexistent/queries.sql"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_config_file_ignore() {
    let mut config = NamedTempFile::new().unwrap();
    writeln!(config, "[rules]\nignore = [\"COL.001\"]").unwrap();
    cmd()
        .args([
            "--config",
            config.path().to_str().unwrap(),
            "advise",
            "--sql",
            "select * from users where id = 1",
            "-f",
            "json"
        ])
        .assert()
        .stdout(predicate::str::contains("COL.001").not());
}

#[test]
fn test_invalid_config_is_fatal() {
    let mut config = NamedTempFile::new().unwrap();
    writeln!(config, "[rules]\nignore = [\"NOPE.001\"]").unwrap();
    cmd()
        .args([
            "advise",
            "--sql",
            "select 1",
            "--config",
            config.path().to_str().unwrap()
        ])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_config_from_env() {
    let mut config = NamedTempFile::new().unwrap();
    writeln!(config, "[rules]\nignore = [\"COL.001\"]").unwrap();
    cmd()
        .env("SQL_ADVISOR_CONFIG", config.path())
        .args(["advise", "--sql", "select * from users where id = 1", "-f", "json"])
        .assert()
        .stdout(predicate::str::contains("COL.001").not());
}

#[test]
fn test_rules_listing() {
    cmd()
        .args(["rules", "--no-color"])
        .assert()
        .success()
        .stdout(predicate::str::contains("COL.001"))
        .stdout(predicate::str::contains("Avoid SELECT *"));
}

#[test]
fn test_rules_yaml() {
    cmd()
        .args(["rules", "-f", "yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("id: COL.001"));
}

#[test]
fn test_version() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("sql-advisor"));
}
