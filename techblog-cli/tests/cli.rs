use assert_cmd::Command;
use predicates::prelude::*;

fn cmd() -> Command {
    Command::cargo_bin("techblog-cli").unwrap()
}

#[test]
fn help_lists_top_level_commands() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("login"))
        .stdout(predicate::str::contains("post"))
        .stdout(predicate::str::contains("comment"))
        .stdout(predicate::str::contains("admin"));
}

#[test]
fn whoami_without_session_reports_logged_out() {
    let dir = tempfile::tempdir().unwrap();

    cmd()
        .args(["--session-dir"])
        .arg(dir.path())
        .arg("whoami")
        .assert()
        .success()
        .stdout(predicate::str::contains("Not logged in"));
}

#[test]
fn logout_without_session_succeeds() {
    let dir = tempfile::tempdir().unwrap();

    cmd()
        .args(["--session-dir"])
        .arg(dir.path())
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged out"));
}

#[test]
fn admin_commands_are_guarded_locally() {
    let dir = tempfile::tempdir().unwrap();

    // No session: the guard denies before any network traffic.
    cmd()
        .args(["--session-dir"])
        .arg(dir.path())
        .args(["admin", "dashboard"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Please login first"));
}

#[test]
fn comment_mutations_require_login_locally() {
    let dir = tempfile::tempdir().unwrap();

    // No session: denied before any network traffic.
    cmd()
        .args(["--session-dir"])
        .arg(dir.path())
        .args(["comment", "delete", "c1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Please login first"));

    cmd()
        .args(["--session-dir"])
        .arg(dir.path())
        .args(["post", "create", "--title", "t", "--content", "c"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Please login first"));
}

#[test]
fn admin_guard_redirects_non_admin_home() {
    let dir = tempfile::tempdir().unwrap();

    // Seed a regular-user session the way the file store writes it.
    std::fs::write(
        dir.path().join("auth_user.json"),
        r#"{"id":"u1","name":"Alice","email":"alice@example.com","role":"USER"}"#,
    )
    .unwrap();
    std::fs::write(dir.path().join("auth_token"), "tok-abc").unwrap();

    cmd()
        .args(["--session-dir"])
        .arg(dir.path())
        .args(["admin", "users"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Admin access required"));
}
