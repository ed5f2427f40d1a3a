use std::fs;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use stubmap::commands::{run_export, run_export_with_cancel, ExportArgs};
use tempfile::tempdir;

const LISTING: &str = r#"[
    {"name": "entry", "entry": "0x00100000", "size": 64},
    {"name": "memcpy", "entry": "0x00100040", "size": 32},
    {"name": "memcpy", "entry": "0x00100080", "size": 32},
    {"name": "FUN_001000c0", "entry": "0x001000c0", "size": 8, "thunk_target": "0x00100100"},
    {"name": "printf", "entry": "0x00100100", "end": "0x00100180"},
    {"name": "_fini", "entry": "0x00100200", "size": 16},
    {"name": "update_player", "entry": "0x00100300", "size": 128}
]"#;

fn write_listing(dir: &Path) -> String {
    let path = dir.join("functions.json");
    fs::write(&path, LISTING).unwrap();
    path.to_string_lossy().to_string()
}

fn args(dir: &Path) -> ExportArgs {
    ExportArgs {
        functions: write_listing(dir),
        config: dir.join("game.toml").to_string_lossy().to_string(),
        csv: Some(dir.join("functions.csv").to_string_lossy().to_string()),
        input: Some("SLUS_000.00".into()),
        ..ExportArgs::default()
    }
}

#[test]
fn run_export_writes_config_and_function_map() {
    let temp = tempdir().unwrap();
    let summary = run_export(&args(temp.path())).expect("export");

    assert_eq!(summary.input, "SLUS_000.00");
    assert_eq!(summary.counts.function_count, 7);
    assert_eq!(summary.counts.stub_count, 3);
    assert_eq!(summary.counts.skip_count, 1);
    assert_eq!(summary.counts.unresolved_count, 0);

    let config = fs::read_to_string(temp.path().join("game.toml")).unwrap();
    assert!(config.contains("input = \"SLUS_000.00\"\n"));
    assert!(config.contains("  \"memcpy@0x00100040\",\n  \"memcpy@0x00100080\",\n"));
    assert!(config.contains("  \"printf@0x00100100\",\n"));
    assert!(config.contains("skip = [\n  \"_fini@0x00100200\",\n]\n"));
    assert!(config.contains("function_count = 7\n"));

    let map = fs::read_to_string(temp.path().join("functions.csv")).unwrap();
    let mut lines = map.lines();
    assert_eq!(lines.next(), Some("Name,Start,End,Size"));
    assert_eq!(lines.next(), Some("entry,0x00100000,0x00100040,64"));
    assert_eq!(map.lines().count(), 8);
}

#[test]
fn run_export_applies_settings_file() {
    let temp = tempdir().unwrap();
    let settings = temp.path().join("settings.yaml");
    fs::write(&settings, "patch_syscalls: true\noutput_dir: /tmp/recomp\n").unwrap();
    let mut args = args(temp.path());
    args.settings = Some(settings.to_string_lossy().to_string());
    args.csv = None;

    let summary = run_export(&args).expect("export");
    assert_eq!(summary.output_dir, "/tmp/recomp");
    assert_eq!(summary.function_map_path, None);

    let config = fs::read_to_string(temp.path().join("game.toml")).unwrap();
    assert!(config.contains("patch_syscalls = true\n"));
    assert!(config.contains("ghidra_output = \"\"\n"));
    assert!(!temp.path().join("functions.csv").exists());
}

#[test]
fn run_export_errors_when_listing_missing() {
    let temp = tempdir().unwrap();
    let args = ExportArgs {
        functions: temp.path().join("missing.json").to_string_lossy().to_string(),
        config: temp.path().join("game.toml").to_string_lossy().to_string(),
        ..ExportArgs::default()
    };
    let err = run_export(&args).unwrap_err();
    assert!(err.to_string().contains("Failed to load function listing"), "unexpected error: {err}");
    assert!(!temp.path().join("game.toml").exists());
}

#[test]
fn run_export_errors_when_config_unwritable() {
    let temp = tempdir().unwrap();
    let mut args = args(temp.path());
    args.config = temp.path().join("no-such-dir").join("game.toml").to_string_lossy().to_string();
    let err = run_export(&args).unwrap_err();
    assert!(err.to_string().contains("Failed to export config"), "unexpected error: {err}");
}

#[test]
fn export_cli_prints_json_summary() {
    let temp = tempdir().unwrap();
    let listing = write_listing(temp.path());
    let config = temp.path().join("game.toml");

    let output = cargo_bin_cmd!("stubmap")
        .args(["export", "--functions", &listing, "--config"])
        .arg(&config)
        .arg("--json")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let body: serde_json::Value = serde_json::from_slice(&output).expect("export json");
    assert_eq!(body["counts"]["stub_count"], 3);
    assert_eq!(body["counts"]["skip_count"], 1);
    assert!(config.exists());
}

#[test]
fn export_cli_human_summary_and_format_override() {
    let temp = tempdir().unwrap();
    let listing = temp.path().join("functions.dump");
    fs::write(&listing, LISTING).unwrap();
    let config = temp.path().join("game.toml");

    cargo_bin_cmd!("stubmap")
        .args(["export", "--format", "json", "--functions"])
        .arg(&listing)
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("Functions: 7"))
        .stdout(predicate::str::contains("Stubs: 3"));
}

#[test]
fn export_cli_fails_on_unknown_format() {
    let temp = tempdir().unwrap();
    let listing = write_listing(temp.path());
    cargo_bin_cmd!("stubmap")
        .args(["export", "--format", "ida", "--functions", &listing, "--config"])
        .arg(temp.path().join("game.toml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load function listing"));
}

#[test]
fn export_cli_writes_absolute_paths_for_relative_arguments() {
    let temp = tempdir().unwrap();
    write_listing(temp.path());
    fs::create_dir_all(temp.path().join("cfg")).unwrap();

    let output = cargo_bin_cmd!("stubmap")
        .current_dir(temp.path())
        .args(["export", "--functions", "functions.json", "--config", "cfg/game.toml"])
        .args(["--csv", "cfg/f.csv", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let body: serde_json::Value = serde_json::from_slice(&output).expect("export json");

    for key in ["config_path", "function_map_path", "output_dir"] {
        let path = body[key].as_str().unwrap_or_default();
        assert!(Path::new(path).is_absolute(), "{key} should be absolute: {path}");
    }
    let output_dir = body["output_dir"].as_str().unwrap();
    let map_path = body["function_map_path"].as_str().unwrap();
    assert!(Path::new(output_dir).ends_with("cfg/output"));
    assert!(Path::new(map_path).ends_with("cfg/f.csv"));

    let config = fs::read_to_string(temp.path().join("cfg/game.toml")).unwrap();
    assert!(config.contains(&format!("output = \"{output_dir}\"\n")));
    assert!(config.contains(&format!("ghidra_output = \"{map_path}\"\n")));
}

#[test]
fn cancelled_run_export_writes_nothing() {
    let temp = tempdir().unwrap();
    let stop = Arc::new(AtomicBool::new(true));
    let err = run_export_with_cancel(&args(temp.path()), &stop).unwrap_err();
    assert!(err.to_string().contains("Failed to export config"), "unexpected error: {err}");
    assert!(!temp.path().join("game.toml").exists());
    assert!(!temp.path().join("functions.csv").exists());
}
