//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run against a throwaway data directory
//! and verify outputs.

use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(data_dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new("cargo")
        .args(["run", "-q", "-p", "pomodesk-cli", "--"])
        .arg("--data-dir")
        .arg(data_dir)
        .args(args)
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

#[test]
fn test_config_list_has_full_schema() {
    let dir = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["config", "list"]);
    assert_eq!(code, 0, "config list failed");

    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    for key in ["work_time_minutes", "break_time_minutes", "theme", "auto_start_break"] {
        assert!(json.get(key).is_some(), "missing {key}");
    }
    assert!(dir.path().join("config.json").exists());
}

#[test]
fn test_config_set_then_get() {
    let dir = TempDir::new().unwrap();
    let (_, _, code) = run_cli(dir.path(), &["config", "set", "work_time_minutes", "45"]);
    assert_eq!(code, 0, "config set failed");

    let (stdout, _, code) = run_cli(dir.path(), &["config", "get", "work_time_minutes"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "45");
}

#[test]
fn test_config_set_rejects_invalid_value() {
    let dir = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["config", "set", "break_time_minutes", "0"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("break_time_minutes"));
}

#[test]
fn test_theme_list_seeds_builtins() {
    let dir = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["theme", "list"]);
    assert_eq!(code, 0, "theme list failed");
    for key in ["dark", "light", "blue"] {
        assert!(stdout.contains(key), "missing {key} in {stdout}");
    }
}

#[test]
fn test_theme_delete_dark_fails() {
    let dir = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["theme", "delete", "dark"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("cannot be deleted"));
    assert!(dir.path().join("themes").join("dark.json").exists());
}

#[test]
fn test_theme_import_missing_font_time() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("plain.json");
    std::fs::write(
        &source,
        r##"{"name": "Plain", "bg_primary": "#000", "fg_primary": "#fff"}"##,
    )
    .unwrap();

    let (_, stderr, code) = run_cli(dir.path(), &["theme", "import", source.to_str().unwrap()]);
    assert_ne!(code, 0);
    assert!(stderr.contains("font_time"));
}

#[test]
fn test_theme_export_and_use() {
    let dir = TempDir::new().unwrap();
    let destination = dir.path().join("exported.json");
    let (_, _, code) = run_cli(
        dir.path(),
        &["theme", "export", "blue", destination.to_str().unwrap()],
    );
    assert_eq!(code, 0, "theme export failed");
    assert!(destination.exists());

    let (_, _, code) = run_cli(dir.path(), &["theme", "use", "blue"]);
    assert_eq!(code, 0);
    let (stdout, _, _) = run_cli(dir.path(), &["config", "get", "theme"]);
    assert_eq!(stdout.trim(), "blue");
}

#[test]
fn test_deleting_active_theme_switches_to_dark() {
    let dir = TempDir::new().unwrap();
    let (_, _, code) = run_cli(dir.path(), &["theme", "use", "blue"]);
    assert_eq!(code, 0);

    let (_, _, code) = run_cli(dir.path(), &["theme", "delete", "blue"]);
    assert_eq!(code, 0, "theme delete failed");
    let (stdout, _, _) = run_cli(dir.path(), &["config", "get", "theme"]);
    assert_eq!(stdout.trim(), "dark");

    let (stdout, _, _) = run_cli(dir.path(), &["theme", "list"]);
    assert!(stdout.lines().any(|l| l.starts_with("* dark")), "{stdout}");
}

#[test]
fn test_stats_show_json_on_empty_history() {
    let dir = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["stats", "show", "--json"]);
    assert_eq!(code, 0, "stats show failed");

    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["stats"]["total_sessions"], 0);
    assert_eq!(json["recent"].as_array().unwrap().len(), 0);
}

#[test]
fn test_stats_show_reads_history() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("pomodoro_history.json"),
        r#"[
            {"date": "2024-03-09 09:00:00", "type": "Work", "duration_seconds": 1500},
            {"date": "2024-03-09 09:25:00", "type": "Break", "duration_seconds": 300}
        ]"#,
    )
    .unwrap();

    let (stdout, _, code) = run_cli(dir.path(), &["stats", "show"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Sessions:   2"));
    assert!(stdout.contains("2024-03-09 09:25 | Break | 5 min"));

    let (_, _, code) = run_cli(dir.path(), &["stats", "clear"]);
    assert_eq!(code, 0);
    let (stdout, _, _) = run_cli(dir.path(), &["stats", "show", "--json"]);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["stats"]["total_sessions"], 0);
}
