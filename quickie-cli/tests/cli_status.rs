use std::path::Path;
use std::process::{Command, Output};

fn quickie(config_dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_quickie"))
        .env_clear()
        .current_dir(config_dir)
        .env("LOG_FORMAT", "json")
        .env("QUICKIE__CACHE__BACKEND", "memory")
        .env(
            "QUICKIE__LOGGING__DIR",
            config_dir.join("logs").to_string_lossy().to_string(),
        )
        .arg("--config-dir")
        .arg(config_dir)
        .args(args)
        .output()
        .expect("run quickie binary")
}

#[test]
fn init_writes_default_config() {
    let dir = tempfile::tempdir().unwrap();

    let output = quickie(dir.path(), &["init"]);
    assert!(output.status.success(), "{output:?}");

    let content = std::fs::read_to_string(dir.path().join("config.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(value["server"]["port"], 8000);
    assert_eq!(value["session"]["cookie_name"], "session_id");
    assert_eq!(value["cache"]["backend"], "redis");

    // Second run leaves the file alone
    std::fs::write(dir.path().join("config.json"), "{\"server\":{\"port\":9001}}").unwrap();
    let output = quickie(dir.path(), &["init"]);
    assert!(output.status.success());
    let content = std::fs::read_to_string(dir.path().join("config.json")).unwrap();
    assert!(content.contains("9001"));
}

#[test]
fn status_reports_config_and_emits_json_logs() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("config.json"),
        r#"{"model":{"model":"gemini-test-model"},"server":{"port":9123}}"#,
    )
    .unwrap();

    let output = quickie(dir.path(), &["status"]);
    assert!(output.status.success(), "{output:?}");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Model: gemini-test-model"));
    assert!(stdout.contains("Listen: 0.0.0.0:9123"));
    assert!(stdout.contains("Backend: memory"));
    assert!(stdout.contains("Status: reachable"));
    assert!(stdout.contains("API key: not configured"));

    let loaded = stdout
        .lines()
        .filter(|line| line.starts_with('{'))
        .filter_map(|line| serde_json::from_str::<serde_json::Value>(line).ok())
        .any(|entry| entry["fields"]["message"] == "Loaded configuration");
    assert!(loaded, "missing JSON log line in:\n{stdout}");
}

#[test]
fn invalid_config_fails_before_starting() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("config.json"),
        r#"{"cors":{"mode":"restrictive"}}"#,
    )
    .unwrap();

    let output = quickie(dir.path(), &["status"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("allowed_origin"), "{stderr}");
}
