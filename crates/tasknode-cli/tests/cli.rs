use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn help_lists_commands() {
    Command::cargo_bin("tasknode")
        .expect("Binary exists")
        .arg("help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Available Commands")
                .and(predicate::str::contains("submit"))
                .and(predicate::str::contains("logout")),
        );
}

#[test]
fn submit_without_script_is_rejected() {
    Command::cargo_bin("tasknode")
        .expect("Binary exists")
        .arg("submit")
        .assert()
        .failure()
        .stderr(predicate::str::contains("<SCRIPT>"));
}

#[test]
fn unknown_command_is_rejected() {
    Command::cargo_bin("tasknode")
        .expect("Binary exists")
        .arg("deploy-everything")
        .assert()
        .failure();
}
