#![allow(clippy::unwrap_used)]
#![allow(missing_docs)]

use assert_cmd::cargo_bin_cmd;
use predicates::prelude::predicate;

#[test]
fn test_version() {
    // Arrange & Act & Assert
    let mut cmd = cargo_bin_cmd!("kinoview");
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("rev:"));
}

#[test]
fn test_auth_login_help() {
    // Arrange & Act & Assert
    let mut cmd = cargo_bin_cmd!("kinoview");
    cmd.args(["auth", "login", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--email"))
        .stdout(predicate::str::contains("--password"));
}

#[test]
fn test_auth_signup_missing_email() {
    // Arrange & Act & Assert
    let mut cmd = cargo_bin_cmd!("kinoview");
    cmd.args(["auth", "signup", "--password", "secret1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--email"));
}

#[test]
fn test_auth_status_requires_api_key() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();

    // Act & Assert
    let mut cmd = cargo_bin_cmd!("kinoview");
    cmd.env_remove("FIREBASE_API_KEY")
        .args(["--dir", dir.path().to_str().unwrap(), "auth", "status"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("FIREBASE_API_KEY"));
}

#[test]
fn test_tmdb_trending_requires_token() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();

    // Act & Assert
    let mut cmd = cargo_bin_cmd!("kinoview");
    cmd.env_remove("TMDB_API_TOKEN")
        .args(["--dir", dir.path().to_str().unwrap(), "tmdb", "trending"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("TMDB_API_TOKEN"));
}

#[test]
fn test_tmdb_trending_rejects_unknown_window() {
    // Arrange & Act & Assert
    let mut cmd = cargo_bin_cmd!("kinoview");
    cmd.args(["tmdb", "trending", "--window", "month"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--window"));
}

#[test]
fn test_tmdb_details_missing_id() {
    // Arrange & Act & Assert
    let mut cmd = cargo_bin_cmd!("kinoview");
    cmd.args(["tmdb", "details", "--kind", "movie"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--id"));
}

#[test]
fn test_tmdb_discover_help() {
    // Arrange & Act & Assert
    let mut cmd = cargo_bin_cmd!("kinoview");
    cmd.args(["tmdb", "discover", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--genre"));
}

#[test]
fn test_watchlist_list_requires_sign_in() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();

    // Act & Assert
    let mut cmd = cargo_bin_cmd!("kinoview");
    cmd.args(["--dir", dir.path().to_str().unwrap(), "watchlist", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Войдите, чтобы просмотреть свой список",
        ));
}

#[test]
fn test_watchlist_remove_requires_sign_in() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();

    // Act & Assert
    let mut cmd = cargo_bin_cmd!("kinoview");
    cmd.args([
        "--dir",
        dir.path().to_str().unwrap(),
        "watchlist",
        "remove",
        "--id",
        "603",
    ])
    .assert()
    .failure()
    .stderr(predicate::str::contains("Войдите"));
}

#[test]
fn test_player_sources_rejects_unknown_catalog() {
    // Arrange & Act & Assert
    let mut cmd = cargo_bin_cmd!("kinoview");
    cmd.args([
        "player", "sources", "--kind", "movie", "--id", "603", "--catalog", "bogus",
    ])
    .assert()
    .failure()
    .stderr(predicate::str::contains("unknown player catalog"));
}

#[test]
fn test_player_catalog_defaults_to_multi() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();

    // Act & Assert
    let mut cmd = cargo_bin_cmd!("kinoview");
    cmd.args(["--dir", dir.path().to_str().unwrap(), "player", "catalog"])
        .assert()
        .success()
        .stdout(predicate::str::contains("* multi"));
}

#[test]
fn test_player_catalog_saves_choice() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();
    let dir_arg = dir.path().to_str().unwrap();

    // Act
    let mut set = cargo_bin_cmd!("kinoview");
    set.args(["--dir", dir_arg, "player", "catalog", "russian-voice"])
        .assert()
        .success();

    // Assert
    let config = std::fs::read_to_string(dir.path().join("config.toml")).unwrap();
    assert!(config.contains("russian-voice"));
    let mut show = cargo_bin_cmd!("kinoview");
    show.args(["--dir", dir_arg, "player", "catalog"])
        .assert()
        .success()
        .stdout(predicate::str::contains("* russian-voice"));
}

#[test]
fn test_browse_logs_to_file_not_stdout() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();

    // Act & Assert
    let mut cmd = cargo_bin_cmd!("kinoview");
    cmd.env_remove("TMDB_API_TOKEN")
        .env("RUST_LOG", "debug")
        .args(["--dir", dir.path().to_str().unwrap(), "browse"])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("TMDB_API_TOKEN"));
    assert!(dir.path().join("kinoview.log").exists());
}

#[test]
fn test_cli_commands_log_to_stdout() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();

    // Act & Assert
    let mut cmd = cargo_bin_cmd!("kinoview");
    cmd.args(["--dir", dir.path().to_str().unwrap(), "player", "catalog"])
        .assert()
        .success()
        .stdout(predicate::str::contains("multi"));
    assert!(!dir.path().join("kinoview.log").exists());
}
