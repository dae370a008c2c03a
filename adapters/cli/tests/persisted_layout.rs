use std::{fs, path::PathBuf, process::Command};

use serde_json::Value;

const CONFIG: &str = r#"
[grid]
width = 8
depth = 8

[[placeables]]
asset = "crate"
size = [1.0, 1.0]
layer = "Blocking"
"#;

const SAVE: &str = r#"{
    "placeableObjectDataCollection": {
        "old": {
            "assetIdentifier": "retired_asset",
            "guid": "old",
            "direction": "Down",
            "gridPosition": { "x": 5, "y": 0, "z": 5 }
        }
    }
}"#;

fn scratch_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("grid-builder-cli-{}", uuid::Uuid::new_v4()));
    fs::create_dir_all(&dir).expect("scratch directory");
    dir
}

#[test]
fn records_skipped_on_load_are_written_back() {
    let dir = scratch_dir();
    let config = dir.join("grid_builder.toml");
    let save = dir.join("save_file.json");
    fs::write(&config, CONFIG).expect("config is written");
    fs::write(&save, SAVE).expect("save is written");

    let output = Command::new(env!("CARGO_BIN_EXE_grid-builder"))
        .arg("--config")
        .arg(&config)
        .arg("--save")
        .arg(&save)
        .args(["place", "crate", "0", "0"])
        .output()
        .expect("failed to run grid-builder");
    assert!(output.status.success(), "place command should succeed");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("skipped saved object old"), "{stdout}");
    assert!(stdout.contains("placed "), "{stdout}");
    assert!(!stdout.contains("saved placements"), "log lines belong on stderr: {stdout}");

    let written: Value =
        serde_json::from_str(&fs::read_to_string(&save).expect("save is rewritten"))
            .expect("save is valid json");
    let records = written["placeableObjectDataCollection"]
        .as_object()
        .expect("collection is keyed by guid");
    assert_eq!(records.len(), 2);
    assert_eq!(records["old"]["assetIdentifier"], "retired_asset");

    let _ = fs::remove_dir_all(dir);
}
