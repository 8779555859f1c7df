use std::path::PathBuf;

use assert_cmd::Command;

fn config_dir(name: &str, base: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("bookstore-cli-{name}-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("base.toml"), base).unwrap();
    dir
}

fn bookstore() -> Command {
    let mut cmd = Command::cargo_bin("bookstore-cli").unwrap();
    cmd.env_remove("BOOKSTORE_ENV")
        .env_remove("BOOKSTORE_CONFIG_DIR")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn config_prints_effective_settings_without_secrets() {
    let dir = config_dir(
        "config",
        r#"
        [server]
        port = 9191

        [auth]
        jwt_secret = "do-not-print-me"
        "#,
    );

    let output = bookstore()
        .args(["config", "--config-dir"])
        .arg(&dir)
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("server.port            = 9191"));
    assert!(stdout.contains("environment            = local"));
    assert!(!stdout.contains("do-not-print-me"));
}

#[test]
fn unknown_environment_fails() {
    let dir = config_dir("badenv", "");
    bookstore()
        .args(["config", "--env", "moon", "--config-dir"])
        .arg(&dir)
        .assert()
        .failure();
}

#[test]
fn production_with_development_secret_is_refused() {
    let dir = config_dir("prod", "");
    bookstore()
        .args(["config", "--env", "production", "--config-dir"])
        .arg(&dir)
        .assert()
        .failure();
}
