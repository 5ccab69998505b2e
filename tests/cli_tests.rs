//! Command-line tests for the respacker binary

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

const SCENE: &str = r#"{
    "meshes": [ { "name": "Cube", "positions": [[0,0,0],[1,0,0],[1,1,0]], "faces": [[0,1,2]] } ],
    "objects": [
        { "name": "Crate.001", "type": "mesh", "location": [1, 2, 3], "data": { "mesh": "Cube" } },
        { "name": "Spawner_Enemy", "type": "mesh", "data": { "mesh": "Cube" } },
        { "name": "Marker", "type": "empty" }
    ],
    "selection": ["Crate.001"]
}"#;

fn respacker(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_respacker"))
        .args(args)
        .output()
        .unwrap()
}

fn write_scene(dir: &Path) -> String {
    let path = dir.join("level.json");
    fs::write(&path, SCENE).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn test_export_document_selection() {
    let dir = tempfile::tempdir().unwrap();
    let scene = write_scene(dir.path());

    let output = respacker(&["export", &scene, "--format", "json"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["descriptors"].as_array().unwrap().len(), 1);
    assert!(dir.path().join("dungeon-map/Crate_001.txt").is_file());
    assert!(dir.path().join("dungeon-map/mesh/Cube.obj").is_file());
}

#[test]
fn test_export_all_then_inspect() {
    let dir = tempfile::tempdir().unwrap();
    let scene = write_scene(dir.path());

    let output = respacker(&["export", &scene, "--all"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let spawner = dir.path().join("dungeon-map/Spawner_Enemy.txt");
    let output = respacker(&["inspect", &spawner.to_string_lossy()]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("spawner_type: ENEMY"));
    assert!(stdout.contains("spawner_name: NOT_FOUND"));
}

#[test]
fn test_plan_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let scene = write_scene(dir.path());

    let output = respacker(&["plan", &scene, "--all", "--format", "json"]);
    assert!(output.status.success());

    let plan: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let entries = plan["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[1]["class"]["kind"], "spawner");
    assert_eq!(entries[2]["skip_reason"], "no data");
    assert!(!dir.path().join("dungeon-map").exists());
}

#[test]
fn test_unknown_selection_fails() {
    let dir = tempfile::tempdir().unwrap();
    let scene = write_scene(dir.path());

    let output = respacker(&["export", &scene, "--select", "Nope"]);
    assert!(!output.status.success());
    assert!(!dir.path().join("dungeon-map").exists());
}

#[test]
fn test_inspect_rejects_garbage() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.txt");
    fs::write(&path, "not a descriptor\n").unwrap();

    let output = respacker(&["inspect", &path.to_string_lossy()]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("line 1"));
}
