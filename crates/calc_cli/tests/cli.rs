use assert_cmd::Command;
use predicates::prelude::*;

fn scicalc() -> Command {
    let mut cmd = Command::cargo_bin("scicalc").unwrap();
    // Keep config and history reads out of the repo checkout
    cmd.current_dir(std::env::temp_dir());
    cmd
}

#[test]
fn one_shot_arithmetic() {
    scicalc()
        .args(["-e", "2 + 3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("5"));
}

#[test]
fn one_shot_symbolic_result() {
    scicalc()
        .args(["-e", "x + x"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 * x"));
}

#[test]
fn angle_flag_changes_trig() {
    scicalc()
        .args(["--angle", "deg", "-e", "sin(90)"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1"));
}

#[test]
fn rational_mode_keeps_fractions() {
    scicalc()
        .args(["--numeric-mode", "rational", "-e", "1/3 + 1/6"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1/2"));
}

#[test]
fn parse_errors_are_reported_not_fatal() {
    scicalc()
        .args(["-e", "2 +* 3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ParseError"));
}

#[test]
fn derivative_one_shot() {
    scicalc()
        .args(["-e", "derivative(\"x^2\")"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 * x"));
}
