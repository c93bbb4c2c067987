use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use tempfile::TempDir;

fn offline_cmd(dir: &TempDir) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("veggie-lens");
    cmd.current_dir(dir.path())
        .env("VEGGIE_LENS__CLASSIFIER__PROVIDER", "stub")
        .env("VEGGIE_LENS__RECOMMENDATION__PROVIDER", "stub")
        .env("VEGGIE_LENS__SERVER__UPLOAD_DIR", dir.path().join("uploads"));
    cmd
}

#[test]
fn config_init_writes_example_file() {
    let dir = TempDir::new().expect("temp dir");
    let config_path = dir.path().join("config.toml");

    let mut cmd = cargo_bin_cmd!("veggie-lens");
    cmd.args(["config", "init", "--path"])
        .arg(&config_path)
        .assert()
        .success();

    let content = fs::read_to_string(&config_path).expect("read config");
    assert!(content.contains("[recommendation]"));
    assert!(content.contains("provider = \"auto\""));

    let mut again = cargo_bin_cmd!("veggie-lens");
    again
        .args(["config", "init", "--path"])
        .arg(&config_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
}

#[test]
fn predict_outputs_valid_json() {
    let dir = TempDir::new().expect("temp dir");
    let image = dir.path().join("wortel.jpg");
    fs::write(&image, [0xFF_u8; 128]).expect("write image");

    let output = offline_cmd(&dir)
        .args(["predict", "--json", "--image"])
        .arg(&image)
        .output()
        .expect("run predict");

    assert!(output.status.success());

    let json: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(json["prediction"]["predicted_class"], "Carrot");
    assert_eq!(json["recommendation"]["recipes"][0], "Sup Wortel Kentang");
    assert!(json["recommendation"]["storageTips"].is_string());
    assert!(json["id"].is_string());

    let stored = fs::read_dir(dir.path().join("uploads"))
        .expect("uploads dir")
        .count();
    assert_eq!(stored, 1);
}

#[test]
fn predict_rejects_unsupported_file() {
    let dir = TempDir::new().expect("temp dir");
    let image = dir.path().join("notes.txt");
    fs::write(&image, "not an image").expect("write file");

    offline_cmd(&dir)
        .args(["predict", "--image"])
        .arg(&image)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Prediction failed"));
}

#[test]
fn predict_missing_file_fails() {
    let dir = TempDir::new().expect("temp dir");

    offline_cmd(&dir)
        .args(["predict", "--image", "missing.jpg"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read image"));
}

#[test]
fn doctor_outputs_json_report() {
    let dir = TempDir::new().expect("temp dir");

    let output = offline_cmd(&dir)
        .args(["doctor", "--json"])
        .output()
        .expect("run doctor");

    assert!(output.status.success());

    let json: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(json["config"]["status"], "ok");
    assert_eq!(json["classifier"]["status"], "warn");
    assert_eq!(json["overall"], "warn");
}

#[test]
fn doctor_fails_on_unknown_provider() {
    let dir = TempDir::new().expect("temp dir");

    offline_cmd(&dir)
        .env("VEGGIE_LENS__RECOMMENDATION__PROVIDER", "gemini")
        .arg("doctor")
        .assert()
        .failure()
        .stdout(predicate::str::contains("Unknown recommendation provider"));
}
