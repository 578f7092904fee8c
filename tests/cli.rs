//! Binary-level tests. None of these reach the network.

use assert_cmd::Command;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// `redsync` isolated from the user's config, state and environment.
fn redsync(temp_dir: &Path) -> Command {
    let config = temp_dir.join("config.json");
    if !config.exists() {
        fs::write(&config, "{}").unwrap();
    }

    let mut cmd = Command::cargo_bin("redsync").unwrap();
    for var in [
        "REDSYNC_ACCOUNT",
        "REDSYNC_WORKSPACE",
        "REDSYNC_ENDPOINT",
        "REDSYNC_TOKEN",
        "REDSYNC_BATCH_SIZE",
        "REDSYNC_STATE_DIR",
        "REDSYNC_CONFIG",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd.arg("--state-dir")
        .arg(temp_dir.join("state"))
        .arg("--config")
        .arg(config);
    cmd
}

fn stderr_json(output: &std::process::Output) -> serde_json::Value {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let line = stderr.lines().last().unwrap_or_default();
    serde_json::from_str(line).unwrap()
}

#[test]
fn test_version() {
    let temp_dir = TempDir::new().unwrap();
    let output = redsync(temp_dir.path()).arg("version").output().unwrap();

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    assert!(json["checkpoints"].as_str().unwrap().ends_with("checkpoints.json"));
}

#[test]
fn test_checkpoint_list_empty_state() {
    let temp_dir = TempDir::new().unwrap();
    let output = redsync(temp_dir.path())
        .args(["checkpoint", "list"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["count"], 0);
    assert!(!temp_dir.path().join("state").exists(), "listing must not create state");
}

#[test]
fn test_checkpoint_list_and_clear() {
    let temp_dir = TempDir::new().unwrap();
    let state = temp_dir.path().join("state");
    fs::create_dir_all(&state).unwrap();
    fs::write(
        state.join("checkpoints.json"),
        r#"{"imports":{"abc":{"counter":2}},"deletes":{"def":{"counter":1}}}"#,
    )
    .unwrap();

    let output = redsync(temp_dir.path())
        .args(["checkpoint", "list"])
        .output()
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["count"], 2);
    assert_eq!(json["checkpoints"][0]["fingerprint"], "abc");
    assert_eq!(json["checkpoints"][0]["committed_batch_count"], 2);

    redsync(temp_dir.path())
        .args(["checkpoint", "clear", "--kind", "import", "--fingerprint", "abc"])
        .assert()
        .success();

    let output = redsync(temp_dir.path())
        .args(["checkpoint", "clear", "--kind", "import", "--fingerprint", "abc"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4));

    let output = redsync(temp_dir.path())
        .args(["checkpoint", "clear", "--all"])
        .output()
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["cleared"], 1);
}

#[test]
fn test_missing_file_is_read_error() {
    let temp_dir = TempDir::new().unwrap();
    let output = redsync(temp_dir.path())
        .args(["import", "no-such-file.json", "--account", "a", "--workspace", "w"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(3));
    assert_eq!(stderr_json(&output)["error"]["code"], "READ_ERROR");
}

#[test]
fn test_invalid_record_is_validation_error() {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("redirects.json");
    fs::write(&file, r#"[{"from":"/ok","to":"/new"},{"from":"no-slash","to":"/x"}]"#).unwrap();

    let output = redsync(temp_dir.path())
        .arg("import")
        .arg(&file)
        .args(["--account", "a", "--workspace", "w", "--endpoint", "http://127.0.0.1:9"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(4));
    assert_eq!(stderr_json(&output)["error"]["code"], "VALIDATION_ERROR");
    assert!(!temp_dir.path().join("state").exists(), "nothing runs before validation passes");
}

#[test]
fn test_missing_account_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("redirects.json");
    fs::write(&file, "[]").unwrap();

    let output = redsync(temp_dir.path()).arg("status").arg(&file).output().unwrap();

    assert_eq!(output.status.code(), Some(4));
}

#[test]
fn test_status_without_checkpoint() {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("redirects.jsonl");
    fs::write(&file, "{\"from\":\"/a\",\"to\":\"/b\"}\n{\"from\":\"/c\",\"to\":\"/d\"}\n").unwrap();

    let output = redsync(temp_dir.path())
        .arg("status")
        .arg(&file)
        .args(["--account", "a", "--workspace", "w", "--batch-size", "1"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["records"], 2);
    assert_eq!(json["kinds"][0]["kind"], "import");
    assert_eq!(json["kinds"][0]["total_batches"], 2);
    assert!(json["kinds"][0]["committed"].is_null());
}

#[test]
fn test_completions() {
    let temp_dir = TempDir::new().unwrap();
    let output = redsync(temp_dir.path()).args(["completions", "bash"]).output().unwrap();

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("redsync"));
}
