//! Binary smoke tests.

use assert_cmd::Command;
use predicates::prelude::*;

fn reana_client() -> Command {
    let mut cmd = Command::cargo_bin("reana-client").expect("binary");
    cmd.env_remove("REANA_SERVER_URL")
        .env_remove("REANA_ACCESS_TOKEN")
        .env_remove("REANA_WORKON");
    cmd
}

#[test]
fn version_prints_the_package_version() {
    reana_client()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn help_lists_the_command_groups() {
    reana_client()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Command groups:"))
        .stdout(predicate::str::contains("Secret management:"))
        .stdout(predicate::str::contains("quota-show"));
}

#[test]
fn completion_emits_a_bash_script() {
    reana_client()
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("reana-client"));
}

#[test]
fn completion_rejects_unknown_shells() {
    reana_client().args(["completion", "tcsh"]).assert().failure();
}

#[test]
fn ping_without_configuration_fails_with_an_error() {
    reana_client()
        .arg("ping")
        .assert()
        .failure()
        .stderr(predicate::str::contains("ERROR:"));
}

#[test]
fn status_without_workflow_fails_with_an_error() {
    reana_client()
        .args(["--server-url", "https://localhost:30443", "-t", "token", "status"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("REANA_WORKON"));
}

#[test]
fn unknown_command_fails_with_usage() {
    reana_client().arg("bogus-command").assert().failure();
}
