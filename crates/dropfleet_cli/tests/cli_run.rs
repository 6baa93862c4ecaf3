use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde_json::Value;
use tempfile::TempDir;

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../..")
}

fn fixture_path(name: &str) -> PathBuf {
    workspace_root().join("tests/fixtures").join(name)
}

fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_dropfleet-tts"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run dropfleet-tts CLI")
}

/// Copies a fixture into a fresh directory so reports and outputs land there.
fn staged_save(fixture: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("tempdir");
    let dest = dir.path().join(fixture);
    fs::copy(fixture_path(fixture), &dest).expect("copy fixture");
    (dir, dest)
}

fn asset_checkout(root: &Path, files: &[&str]) {
    for file in files {
        let path = root.join(file);
        fs::create_dir_all(path.parent().expect("asset has a parent")).expect("mkdir");
        fs::write(path, b"\x89PNG").expect("write asset");
    }
}

fn script_of<'a>(save: &'a Value, nickname: &str) -> &'a str {
    fn find<'v>(nodes: &'v [Value], nickname: &str) -> Option<&'v Value> {
        nodes.iter().find_map(|node| {
            if node["Nickname"] == nickname {
                return Some(node);
            }
            node["ContainedObjects"]
                .as_array()
                .and_then(|children| find(children, nickname))
        })
    }
    let states = save["ObjectStates"].as_array().expect("ObjectStates");
    find(states, nickname)
        .and_then(|node| node["LuaScript"].as_str())
        .unwrap_or_else(|| panic!("no script for {nickname}"))
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

#[test]
fn cli_rewrites_found_images_against_local_checkout() {
    let (dir, save) = staged_save("fleet_save.json");
    let assets = dir.path().join("assets");
    asset_checkout(
        &assets,
        &[
            "UCM/New Orleans_CardFrontImage.png",
            "UCM/New Orleans_ModelImage.png",
            "UCM/Upgrades/Railgun.png",
        ],
    );

    let output = run_cli(&["--asset-dir", &path_arg(&assets), &path_arg(&save)]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Ship cards:       2"));
    assert!(stdout.contains("Upgrade cards:    1"));
    assert!(stdout.contains("Save changed:     yes"));

    let original = fs::read(fixture_path("fleet_save.json")).expect("fixture");
    let backup = fs::read(dir.path().join("fleet_save.json.backup")).expect("backup written");
    assert_eq!(backup, original);

    let modified_text =
        fs::read_to_string(dir.path().join("fleet_save_modified.json")).expect("modified save");
    assert!(modified_text.contains("1.50"));
    let modified: Value = serde_json::from_str(&modified_text).expect("modified save is JSON");

    let new_orleans = script_of(&modified, "New Orleans");
    assert!(new_orleans.contains(
        "local cardFrontImage = \"https://raw.githubusercontent.com/TemporalDistoriton/DropfleetTTS/main/UCM/New%20Orleans_CardFrontImage.png\""
    ));
    assert!(new_orleans.contains("local faction = \"UCM\""));

    let railgun = script_of(&modified, "Railgun Upgrade");
    assert!(railgun.contains("/main/UCM/Upgrades/Railgun.png\""));

    let old_ship = script_of(&modified, "Old Ship");
    assert!(old_ship.contains("http://cloud-3.steamusercontent.com/ugc/111/model.png"));
    assert!(old_ship.contains("local faction = \"Neutral\""));

    let medea = script_of(&modified, "Medea");
    assert!(medea.contains("local faction = \"Neutral\""));

    let report =
        fs::read_to_string(dir.path().join("ShipCardUpdateData.csv")).expect("ship report");
    assert_eq!(report.lines().count(), 3);
    assert!(report.lines().any(|l| l.starts_with("New Orleans,UCM,1.25,12,6,125,")));
    assert!(dir.path().join("UpgradeCardUpdateData.csv").is_file());

    let log = fs::read_to_string(dir.path().join("update_errors.log")).expect("error log");
    assert!(log.starts_with("UPDATE ERRORS LOG\n"));
    assert!(log.contains("SKIPPING: No images found for Medea in PHR faction"));
    assert!(log.contains(
        "ERROR: ModelImage not found for Medea in PHR faction (tried path: PHR/Medea_ModelImage.png)"
    ));
    assert!(!log.contains("Old Ship"));
}

#[test]
fn cli_extract_only_leaves_save_untouched() {
    let (dir, save) = staged_save("fleet_save.json");

    let output = run_cli(&["--extract-only", &path_arg(&save)]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Save changed:     no"));

    assert!(dir.path().join("ShipCardData.csv").is_file());
    assert!(!dir.path().join("ShipCardUpdateData.csv").exists());
    assert!(!dir.path().join("fleet_save_modified.json").exists());
    assert!(!dir.path().join("fleet_save.json.backup").exists());
    assert!(!dir.path().join("update_errors.log").exists());

    let report = fs::read_to_string(dir.path().join("ShipCardData.csv")).expect("report");
    assert!(report.contains("Not Updated"));
    assert!(!report.contains("Old Ship"));
}

#[test]
fn cli_dry_run_writes_reports_but_not_the_save() {
    let (dir, save) = staged_save("fleet_save.json");
    let assets = dir.path().join("assets");
    asset_checkout(&assets, &["UCM/New Orleans_ModelImage.png"]);

    let output = run_cli(&[
        "--dry-run",
        "--asset-dir",
        &path_arg(&assets),
        &path_arg(&save),
    ]);
    assert!(output.status.success());
    assert!(dir.path().join("ShipCardUpdateData.csv").is_file());
    assert!(!dir.path().join("fleet_save_modified.json").exists());
    assert!(!dir.path().join("fleet_save.json.backup").exists());
}

#[test]
fn cli_json_output_lists_cards() {
    let (_dir, save) = staged_save("fleet_save.json");

    let output = run_cli(&["--extract-only", "--json", &path_arg(&save)]);
    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).expect("stdout is JSON");

    let names: Vec<&str> = json["ships"]
        .as_array()
        .expect("ships")
        .iter()
        .filter_map(|s| s["name"].as_str())
        .collect();
    assert_eq!(names, vec!["New Orleans", "Medea"]);
    assert_eq!(json["ships"][0]["faction"], "UCM");
    assert_eq!(json["ships"][1]["container_path"], "PHR Fleet");
    assert_eq!(json["upgrades"][0]["name"], "Railgun");
    assert_eq!(json["modified"], false);
}

#[test]
fn cli_reads_config_next_to_save() {
    let (dir, save) = staged_save("fleet_save.json");
    fs::write(
        dir.path().join("dropfleet.toml"),
        "excluded_containers = [\"PHR Fleet\"]\n",
    )
    .expect("write config");

    let output = run_cli(&["--extract-only", "--json", &path_arg(&save)]);
    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).expect("stdout is JSON");
    let names: Vec<&str> = json["ships"]
        .as_array()
        .expect("ships")
        .iter()
        .filter_map(|s| s["name"].as_str())
        .collect();
    assert_eq!(names, vec!["New Orleans", "Old Ship"]);
}

#[test]
fn cli_skips_disabled_card_kinds() {
    let (_dir, save) = staged_save("fleet_save.json");

    let output = run_cli(&["--extract-only", "--json", "--no-upgrades", &path_arg(&save)]);
    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).expect("stdout is JSON");
    assert_eq!(json["upgrades"].as_array().map(Vec::len), Some(0));
    assert_eq!(json["ships"].as_array().map(Vec::len), Some(2));
}

#[test]
fn cli_fails_on_save_without_object_states() {
    let path = path_arg(&fixture_path("no_object_states.json"));
    let output = run_cli(&["--extract-only", &path]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ObjectStates"));
}

#[test]
fn cli_fails_on_missing_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = path_arg(&dir.path().join("missing.json"));
    let output = run_cli(&["--extract-only", &path]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn cli_rejects_conflicting_flags() {
    let path = path_arg(&fixture_path("fleet_save.json"));

    let output = run_cli(&["--no-ships", "--no-upgrades", "--extract-only", &path]);
    assert_eq!(output.status.code(), Some(2));

    let output = run_cli(&["--download-images", "images", &path]);
    assert_eq!(output.status.code(), Some(2));

    let output = run_cli(&["--url-style", "sideways", "--extract-only", &path]);
    assert_eq!(output.status.code(), Some(2));
}
