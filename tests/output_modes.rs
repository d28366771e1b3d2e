use assert_cmd::Command;
use serde_json::Value;

const CHARSET: &str =
    "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789!@#$%^&*()_+-=[]{}|;:,.<>?";

fn keynest(config_dir: &tempfile::TempDir) -> Command {
    let mut cmd = Command::cargo_bin("keynest").expect("binary exists");
    cmd.env("KEYNEST_CONFIG", config_dir.path().join("config.toml"))
        .env_remove("KEYNEST_MASTER_PASSWORD")
        .env_remove("KEYNEST_LOG");
    cmd
}

fn stdout_json(output: &std::process::Output) -> Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout).expect("valid json")
}

#[test]
fn password_json_mode_wraps_value_and_meta() {
    let dir = tempfile::tempdir().expect("temp dir");
    let output = keynest(&dir)
        .args(["password", "--json"])
        .output()
        .expect("password json output");

    assert!(output.status.success());
    let json = stdout_json(&output);

    let value = json
        .get("value")
        .and_then(Value::as_str)
        .expect("value field as string");
    assert_eq!(value.len(), 16, "default password length");
    assert!(value.chars().all(|c| CHARSET.contains(c)));

    let meta = json.get("meta").expect("meta field");
    assert_eq!(meta.get("kind").and_then(Value::as_str), Some("password"));
    assert_eq!(meta.get("sampling").and_then(Value::as_str), Some("modulo"));
    assert!(meta.get("entropy_bits").and_then(Value::as_f64).unwrap() > 100.0);
}

#[test]
fn password_quiet_mode_prints_raw_value() {
    let dir = tempfile::tempdir().expect("temp dir");
    let output = keynest(&dir)
        .args(["password", "--quiet", "--length", "40"])
        .output()
        .expect("password quiet output");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert_eq!(stdout.lines().count(), 1, "expected a single-line output");
    let line = stdout.trim_end_matches(&['\n', '\r'][..]);
    assert_eq!(line.chars().count(), 40);
}

#[test]
fn successive_passwords_differ() {
    let dir = tempfile::tempdir().expect("temp dir");
    let first = keynest(&dir).args(["password", "-q"]).output().expect("first");
    let second = keynest(&dir).args(["password", "-q"]).output().expect("second");
    assert_ne!(first.stdout, second.stdout);
}

#[test]
fn rejection_sampling_respects_length_and_charset() {
    let dir = tempfile::tempdir().expect("temp dir");
    let output = keynest(&dir)
        .args(["password", "--sampling", "rejection", "--length", "64", "--json"])
        .output()
        .expect("password output");

    assert!(output.status.success());
    let json = stdout_json(&output);
    let value = json["value"].as_str().expect("value");
    assert_eq!(value.len(), 64);
    assert!(value.chars().all(|c| CHARSET.contains(c)));
    assert_eq!(json["meta"]["sampling"], "rejection");
}

#[test]
#[cfg(any(debug_assertions, feature = "dev-seed"))]
fn dev_seed_makes_output_reproducible() {
    let dir = tempfile::tempdir().expect("temp dir");
    let run = || {
        keynest(&dir)
            .args(["password", "-q", "--dev-seed", "7"])
            .output()
            .expect("seeded output")
    };

    let first = run();
    let second = run();
    assert!(first.status.success());
    assert_eq!(first.stdout, second.stdout);
    assert!(String::from_utf8_lossy(&first.stderr).contains("WARNING: Using dev seed"));
}

#[test]
fn configured_length_becomes_default() {
    let dir = tempfile::tempdir().expect("temp dir");
    keynest(&dir)
        .args(["config", "set", "--length", "24"])
        .assert()
        .success();

    let output = keynest(&dir)
        .args(["password", "-q"])
        .output()
        .expect("password output");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim_end().chars().count(), 24);
}
