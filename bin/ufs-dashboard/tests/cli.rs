//! ---
//! ufs_section: "15-testing-qa-runbook"
//! ufs_subsection: "integration-tests"
//! ufs_type: "source"
//! ufs_scope: "code"
//! ufs_description: "Command-line tests for the headless dashboard host."
//! ufs_version: "v0.1.0"
//! ufs_owner: "tbd"
//! ---
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Output;

use assert_cmd::Command;
use tempfile::{tempdir, TempDir};

struct Workspace {
    dir: TempDir,
    config: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let config = root.join("dashboard.toml");
        let contents = format!(
            r#"
[logging]
directory = "{logs}"
format = "pretty"

[simulation]
speed = 50
samples = 6

[profile]
store_path = "{store}"

[report]
directory = "{reports}"
"#,
            logs = toml_path(&root.join("logs")),
            store = toml_path(&root.join("local-storage.json")),
            reports = toml_path(&root.join("reports")),
        );
        fs::write(&config, contents).unwrap();
        Self { dir, config }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("ufs-dashboard").unwrap();
        cmd.env_remove("UFS_LOG")
            .env_remove("RUST_LOG")
            .env_remove("UFS_CONFIG")
            .arg("--config")
            .arg(&self.config);
        cmd
    }

    fn onboard(&self) {
        self.command()
            .args(["onboard", "--name", "Ada", "--location", "Lagos"])
            .assert()
            .success();
    }
}

fn toml_path(path: &Path) -> String {
    path.display().to_string().replace('\\', "/")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn log_file_contents(dir: &Path) -> String {
    fs::read_dir(dir)
        .unwrap()
        .flatten()
        .filter(|entry| entry.file_name().to_string_lossy().starts_with("ufs-dashboard.log"))
        .map(|entry| fs::read_to_string(entry.path()).unwrap())
        .collect()
}

fn looks_like_log_line(line: &str) -> bool {
    let line = line.trim_start();
    ["TRACE ", "DEBUG ", "INFO ", "WARN ", "ERROR "]
        .iter()
        .any(|level| line.starts_with(level))
        || line.contains("\"level\":")
}

#[test]
fn landing_asks_for_onboarding_first() {
    let ws = Workspace::new();
    let output = ws.command().output().unwrap();
    assert!(output.status.success());
    assert!(stdout(&output).contains("ufs-dashboard onboard"));
}

#[test]
fn onboarding_rejects_short_name() {
    let ws = Workspace::new();
    let output = ws
        .command()
        .args(["onboard", "--name", "A", "--location", "Lagos"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Name must be at least 2 characters."));
    assert!(!ws.path().join("local-storage.json").exists());
}

#[test]
fn onboarding_stores_profile_under_known_key() {
    let ws = Workspace::new();
    ws.command()
        .args([
            "onboard",
            "--name",
            "Ada",
            "--location",
            "Lagos",
            "--crop-type",
            "herbs",
        ])
        .assert()
        .success();

    let raw = fs::read_to_string(ws.path().join("local-storage.json")).unwrap();
    let record: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let stored = record["farmingSimulationUser"].as_str().unwrap();
    let profile: serde_json::Value = serde_json::from_str(stored).unwrap();
    assert_eq!(profile["name"], "Ada");
    assert_eq!(profile["cropType"], "herbs");

    let output = ws.command().arg("profile").output().unwrap();
    assert!(stdout(&output).contains("Crop: Herbs (Basil, Mint, Cilantro)"));
}

#[test]
fn run_without_profile_is_refused() {
    let ws = Workspace::new();
    let output = ws.command().args(["run", "--ready"]).output().unwrap();
    assert!(!output.status.success());
    assert!(stderr(&output).contains("no usable farmer profile"));
}

#[test]
fn run_without_required_actuators_is_refused() {
    let ws = Workspace::new();
    ws.onboard();
    let output = ws
        .command()
        .args(["run", "--actuator", "water-pump"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Grow lights must be turned on before starting simulation"));
    assert!(!ws.path().join("reports").exists());
}

#[test]
fn run_plays_to_completion_and_downloads_report() {
    let ws = Workspace::new();
    ws.onboard();
    let timing = ws.path().join("timing.json");
    let output = ws
        .command()
        .args(["run", "--ready", "--timing-json"])
        .arg(&timing)
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let out = stdout(&output);
    assert!(out.contains("Welcome back, Ada!"));
    assert!(out.contains("Status: completed"));

    let report = ws.path().join("reports/farming-simulation-report.txt");
    let text = fs::read_to_string(&report).unwrap();
    assert!(text.starts_with("Smart Urban Farming System - Simulation Report"));
    assert!(out.contains("Report written to"));
    assert!(timing.exists());
}

#[test]
fn verbose_run_keeps_logs_off_stdout() {
    let ws = Workspace::new();
    ws.onboard();
    let output = ws
        .command()
        .args(["--verbose", "run", "--ready", "--no-report"])
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let out = stdout(&output);
    assert!(out.contains("Status: completed"));
    for line in out.lines() {
        assert!(!looks_like_log_line(line), "log line on stdout: {line}");
    }
    assert!(stderr(&output).contains("DEBUG"));
    assert!(log_file_contents(&ws.path().join("logs")).contains("configuration loaded"));
}

#[test]
fn quiet_run_prints_no_info_logs() {
    let ws = Workspace::new();
    ws.onboard();
    let output = ws
        .command()
        .args(["run", "--ready", "--no-report"])
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(!stderr(&output).contains("configuration loaded"));
    assert!(!stdout(&output).contains("configuration loaded"));
}

#[test]
fn run_can_skip_report() {
    let ws = Workspace::new();
    ws.onboard();
    ws.command()
        .args(["run", "--ready", "--no-report"])
        .assert()
        .success();
    assert!(!ws.path().join("reports").exists());
}

#[test]
fn unsupported_speed_is_rejected_by_parser() {
    let ws = Workspace::new();
    ws.onboard();
    let output = ws
        .command()
        .args(["run", "--ready", "--speed", "3"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(stderr(&output).contains("speed must be one of"));
}

#[test]
fn export_series_writes_csv() {
    let ws = Workspace::new();
    let target = ws.path().join("series.csv");
    ws.command()
        .args(["export-series", "--samples", "4", "--output"])
        .arg(&target)
        .assert()
        .success();
    let csv = fs::read_to_string(&target).unwrap();
    assert_eq!(csv.lines().count(), 5);
}
