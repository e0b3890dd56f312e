//! CLI tests for et-core against real extension directories.
//!
//! Verifies stdout payloads, exit codes and that the username never reaches
//! stdout or stderr.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const USERNAME: &str = "usernameToAnonymize";

/// Get a Command for the et-core binary with a hermetic environment.
fn et_core(config_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("et-core").expect("et-core binary should exist");
    cmd.env_remove("ET_SETTINGS")
        .env_remove("ET_EXTENSION_DIR")
        .env_remove("ET_LOG_FILTER")
        .env("ET_CONFIG_DIR", config_dir.path())
        .env("ET_LOG", "debug");
    cmd
}

fn extension_with_key(content: &str) -> TempDir {
    let dir = TempDir::new().expect("tempdir");
    fs::create_dir_all(dir.path().join("resources")).unwrap();
    fs::write(dir.path().join("resources").join("TELEMETRY_KEY"), content).unwrap();
    dir
}

/// Directory `<tmp>/home/usernameToAnonymize`, the way account names show up
/// in real paths.
fn home_of_user(root: &TempDir) -> std::path::PathBuf {
    let home = root.path().join("home").join(USERNAME);
    fs::create_dir_all(&home).unwrap();
    home
}

fn stack_trace() -> String {
    format!(
        "Error: ENOENT: no such file or directory, scandir 'test'\n\
         \tat Object.readdirSync (fs.js:795:3)\n\
         \tat activate (C:\\Users\\{u}folder1\\folder2\\someFile.js:46:12)\n\
         \tat processTicksAndRejections (/Users/{u}/folder2/someFile.js:85:5)\n",
        u = USERNAME
    )
}

mod anonymize {
    use super::*;

    #[test]
    fn stdin_is_anonymized() {
        let cfg = TempDir::new().unwrap();
        et_core(&cfg)
            .args(["anonymize", "--username", USERNAME])
            .write_stdin(stack_trace())
            .assert()
            .success()
            .stdout(predicate::str::contains(USERNAME).not())
            .stdout(predicate::str::contains("\tat Object.readdirSync (fs.js:795:3)\n"))
            .stdout(predicate::str::contains("C:\\Users\\<anonymized>folder1"))
            .stderr(predicate::str::contains(USERNAME).not());
    }

    #[test]
    fn file_input_with_custom_marker() {
        let cfg = TempDir::new().unwrap();
        fs::write(cfg.path().join("settings.json"), r#"{"marker": "[user]"}"#).unwrap();
        let log = cfg.path().join("error.log");
        fs::write(&log, stack_trace()).unwrap();

        et_core(&cfg)
            .args(["anonymize", "--username", USERNAME, "--input"])
            .arg(&log)
            .assert()
            .success()
            .stdout(predicate::str::contains("/Users/[user]/folder2"));
    }

    #[test]
    fn missing_input_file_is_io_error() {
        let cfg = TempDir::new().unwrap();
        et_core(&cfg)
            .args(["anonymize", "--username", "x", "--input", "/no/such/error.log"])
            .assert()
            .code(12)
            .stderr(predicate::str::contains("failed to read input"));
    }

    #[test]
    fn invalid_utf8_input_is_anonymized() {
        let cfg = TempDir::new().unwrap();
        let log = cfg.path().join("error.log");
        let mut bytes = b"at /home/".to_vec();
        bytes.extend_from_slice(USERNAME.as_bytes());
        bytes.extend_from_slice(b"/a.js \xff\xfe tail\n");
        fs::write(&log, bytes).unwrap();

        et_core(&cfg)
            .args(["anonymize", "--username", USERNAME, "--input"])
            .arg(&log)
            .assert()
            .success()
            .stdout(predicate::str::contains("at /home/<anonymized>/a.js"))
            .stdout(predicate::str::contains("\u{FFFD}"))
            .stdout(predicate::str::contains(" tail\n"))
            .stdout(predicate::str::contains(USERNAME).not());
    }

    #[test]
    fn invalid_utf8_stdin_is_anonymized() {
        let cfg = TempDir::new().unwrap();
        let mut bytes = USERNAME.as_bytes().to_vec();
        bytes.push(0xc3);
        et_core(&cfg)
            .args(["anonymize", "--username", USERNAME])
            .write_stdin(bytes)
            .assert()
            .success()
            .stdout("<anonymized>\u{FFFD}");
    }

    #[test]
    fn empty_username_is_identity() {
        let cfg = TempDir::new().unwrap();
        et_core(&cfg)
            .args(["anonymize", "--username", ""])
            .write_stdin(stack_trace())
            .assert()
            .success()
            .stdout(stack_trace());
    }
}

mod key {
    use super::*;

    #[test]
    fn valid_key_is_reported_without_value() {
        let cfg = TempDir::new().unwrap();
        let ext = extension_with_key("secret-key-id\n");

        let output = et_core(&cfg)
            .arg("--extension-dir")
            .arg(ext.path())
            .arg("key")
            .output()
            .unwrap();
        assert!(output.status.success());

        let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(json["valid"], true);
        assert_eq!(json["encoding"], "plain");
        assert!(json.get("key").is_none());
    }

    #[test]
    fn show_prints_key() {
        let cfg = TempDir::new().unwrap();
        let ext = extension_with_key("secret-key-id");

        et_core(&cfg)
            .arg("--extension-dir")
            .arg(ext.path())
            .args(["key", "--show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"key\": \"secret-key-id\""));
    }

    #[test]
    fn key_encoding_flag_overrides_settings() {
        let cfg = TempDir::new().unwrap();
        // "secret-key-id"
        let ext = extension_with_key("c2VjcmV0LWtleS1pZA==");

        et_core(&cfg)
            .arg("--extension-dir")
            .arg(ext.path())
            .args(["--key-encoding", "base64", "key", "--show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"encoding\": \"base64\""))
            .stdout(predicate::str::contains("\"key\": \"secret-key-id\""));
    }

    #[test]
    fn unknown_key_encoding_is_rejected() {
        let cfg = TempDir::new().unwrap();
        et_core(&cfg)
            .args(["--key-encoding", "rot13", "key"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("unknown key encoding"));
    }

    #[test]
    fn missing_key_reports_sentinel() {
        let cfg = TempDir::new().unwrap();
        let ext = TempDir::new().unwrap();

        et_core(&cfg)
            .arg("--extension-dir")
            .arg(ext.path())
            .args(["key", "--show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"valid\": false"))
            .stdout(predicate::str::contains("INVALID_INSTRUMENTATION_KEY"));
    }
}

mod report {
    use super::*;

    #[test]
    fn report_contains_anonymized_log_and_key() {
        let cfg = TempDir::new().unwrap();
        let ext = extension_with_key("secret-key-id");

        let output = et_core(&cfg)
            .arg("--extension-dir")
            .arg(ext.path())
            .args(["report", "--username", USERNAME])
            .write_stdin(stack_trace())
            .output()
            .unwrap();
        assert!(output.status.success());

        let stdout = String::from_utf8(output.stdout).unwrap();
        assert!(!stdout.contains(USERNAME));

        let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
        assert_eq!(json["instrumentation_key"], "secret-key-id");
        assert_eq!(json["key_valid"], true);
        assert_eq!(json["redacted_occurrences"], 2);
        assert!(json["report_id"].as_str().unwrap().starts_with("rpt-"));
    }

    #[test]
    fn jsonl_logs_stay_on_stderr() {
        let cfg = TempDir::new().unwrap();
        let ext = TempDir::new().unwrap();

        let output = et_core(&cfg)
            .arg("--extension-dir")
            .arg(ext.path())
            .args(["--log-format", "jsonl", "report", "--username", USERNAME])
            .write_stdin(stack_trace())
            .output()
            .unwrap();
        assert!(output.status.success());

        let stdout: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(stdout["key_valid"], false);

        let stderr = String::from_utf8(output.stderr).unwrap();
        assert!(!stderr.contains(USERNAME));
        for line in stderr.lines().filter(|l| !l.trim().is_empty()) {
            assert!(
                serde_json::from_str::<serde_json::Value>(line).is_ok(),
                "non-JSON log line: {}",
                line
            );
        }
    }
}

mod logging {
    use super::*;

    const LEVELS: [&str; 5] = ["TRACE", "DEBUG", "INFO", "WARN", "ERROR"];

    #[test]
    fn no_timestamps_starts_lines_with_level() {
        let cfg = TempDir::new().unwrap();
        let output = et_core(&cfg)
            .args(["--no-timestamps", "anonymize", "--username", USERNAME])
            .write_stdin(stack_trace())
            .output()
            .unwrap();
        assert!(output.status.success());

        let stderr = String::from_utf8(output.stderr).unwrap();
        assert!(stderr.contains("anonymized exception log"));
        for line in stderr.lines().filter(|l| !l.trim().is_empty()) {
            let first = line.split_whitespace().next().unwrap_or_default();
            assert!(LEVELS.contains(&first), "line without leading level: {}", line);
        }
    }

    #[test]
    fn timestamps_by_default() {
        let cfg = TempDir::new().unwrap();
        let output = et_core(&cfg)
            .args(["anonymize", "--username", USERNAME])
            .write_stdin(stack_trace())
            .output()
            .unwrap();
        assert!(output.status.success());

        let stderr = String::from_utf8(output.stderr).unwrap();
        let line = stderr
            .lines()
            .find(|l| l.contains("anonymized exception log"))
            .expect("info line");
        let first = line.split_whitespace().next().unwrap_or_default();
        assert!(!LEVELS.contains(&first), "expected a timestamp: {}", line);
    }
}

/// Account names inside paths must not reach stderr, whether they appear in
/// log fields or in error messages.
mod stderr_privacy {
    use super::*;

    #[test]
    fn missing_input_under_home_dir() {
        let cfg = TempDir::new().unwrap();
        let missing = home_of_user(&cfg).join("missing.log");

        et_core(&cfg)
            .env("ET_USERNAME", USERNAME)
            .args(["-v", "anonymize", "--input"])
            .arg(&missing)
            .assert()
            .code(12)
            .stderr(predicate::str::contains("failed to read input"))
            .stderr(predicate::str::contains("home/<anonymized>/missing.log"))
            .stderr(predicate::str::contains(USERNAME).not());
    }

    #[test]
    fn input_under_home_dir_with_verbose_logging() {
        let cfg = TempDir::new().unwrap();
        let log = home_of_user(&cfg).join("error.log");
        fs::write(&log, stack_trace()).unwrap();

        et_core(&cfg)
            .env("ET_USERNAME", USERNAME)
            .args(["-vv", "report", "--input"])
            .arg(&log)
            .assert()
            .success()
            .stdout(predicate::str::contains(USERNAME).not())
            .stderr(predicate::str::contains("reading exception log"))
            .stderr(predicate::str::contains(USERNAME).not());
    }

    #[test]
    fn explicit_username_is_also_stripped() {
        let cfg = TempDir::new().unwrap();
        let missing = home_of_user(&cfg).join("missing.log");

        et_core(&cfg)
            .env("ET_USERNAME", "someoneElse")
            .args(["anonymize", "--username", USERNAME, "--input"])
            .arg(&missing)
            .assert()
            .code(12)
            .stderr(predicate::str::contains(USERNAME).not());
    }

    #[test]
    fn extension_dir_under_home_dir_jsonl() {
        let cfg = TempDir::new().unwrap();
        let ext = home_of_user(&cfg).join(".vscode").join("ext");
        fs::create_dir_all(ext.join("resources")).unwrap();
        fs::write(ext.join("resources").join("TELEMETRY_KEY"), "k-1").unwrap();

        let output = et_core(&cfg)
            .env("ET_USERNAME", USERNAME)
            .arg("--extension-dir")
            .arg(&ext)
            .args(["-v", "--log-format", "jsonl", "key"])
            .output()
            .unwrap();
        assert!(output.status.success());

        let stderr = String::from_utf8(output.stderr).unwrap();
        assert!(stderr.contains("resolved telemetry key"));
        assert!(!stderr.contains(USERNAME), "username on stderr: {}", stderr);
        for line in stderr.lines().filter(|l| !l.trim().is_empty()) {
            assert!(
                serde_json::from_str::<serde_json::Value>(line).is_ok(),
                "non-JSON log line: {}",
                line
            );
        }
    }

    #[test]
    fn settings_error_under_home_dir() {
        let cfg = TempDir::new().unwrap();
        let settings = home_of_user(&cfg).join("settings.json");
        fs::write(&settings, "not json").unwrap();

        et_core(&cfg)
            .env("ET_USERNAME", USERNAME)
            .arg("--settings")
            .arg(&settings)
            .arg("config")
            .assert()
            .code(11)
            .stderr(predicate::str::contains("failed to parse"))
            .stderr(predicate::str::contains(USERNAME).not());
    }
}

mod config {
    use super::*;

    #[test]
    fn defaults_from_config_dir() {
        let cfg = TempDir::new().unwrap();
        fs::write(cfg.path().join("settings.json"), "{}").unwrap();

        et_core(&cfg)
            .arg("config")
            .assert()
            .success()
            .stdout(predicate::str::contains("\"source\": \"environment variable\""))
            .stdout(predicate::str::contains("\"marker\": \"<anonymized>\""));
    }

    #[test]
    fn invalid_settings_exit_code() {
        let cfg = TempDir::new().unwrap();
        let bad = cfg.path().join("bad.json");
        fs::write(&bad, r#"{"key_path": "/etc/TELEMETRY_KEY"}"#).unwrap();

        et_core(&cfg)
            .arg("--settings")
            .arg(&bad)
            .arg("config")
            .assert()
            .code(11)
            .stderr(predicate::str::contains("invalid settings"));
    }

    #[test]
    fn key_path_outside_extension_is_rejected() {
        let cfg = TempDir::new().unwrap();
        fs::write(
            cfg.path().join("settings.json"),
            r#"{"key_path": "../../TELEMETRY_KEY"}"#,
        )
        .unwrap();

        et_core(&cfg)
            .arg("config")
            .assert()
            .code(11)
            .stderr(predicate::str::contains("inside the extension root"));
    }

    #[test]
    fn unknown_command_fails() {
        let cfg = TempDir::new().unwrap();
        et_core(&cfg)
            .arg("nonexistent-command")
            .assert()
            .failure()
            .stderr(predicate::str::contains("error"));
    }
}
