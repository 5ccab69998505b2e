//! Integration tests for the in-memory scene host
//!
//! These tests cover loading documents from disk, the resource pack/unpack
//! cycle, and OBJ export through the `SceneHost` trait.

use std::fs;
use std::path::Path;

use respacker_core::{Error, Transform, Vec3};
use respacker_scene::{MemoryScene, ObjExportOptions, SceneHost, UnpackMethod};

const SCENE: &str = r#"{
    "meshes": [
        {
            "name": "Barrel",
            "positions": [[0,0,0],[1,0,0],[1,1,0],[0,1,0]],
            "uvs": [[0,0],[1,0],[1,1],[0,1]],
            "faces": [{ "indices": [0,1,2,3], "material": 0 }],
            "materials": ["Wood"]
        }
    ],
    "materials": [ { "name": "Wood", "diffuse": [0.6, 0.4, 0.2], "texture": "wood" } ],
    "resources": [ { "name": "wood", "filepath": "//assets/wood.png" } ],
    "objects": [
        { "name": "Barrel", "type": "mesh", "location": [0, 5, 0], "data": { "mesh": "Barrel" } }
    ],
    "selection": ["Barrel"],
    "active": "Barrel"
}"#;

fn write_scene(dir: &Path) -> std::path::PathBuf {
    fs::create_dir_all(dir.join("assets")).unwrap();
    fs::write(dir.join("assets/wood.png"), b"not really a png").unwrap();
    let path = dir.join("scene.json");
    fs::write(&path, SCENE).unwrap();
    path
}

#[test]
fn test_load_missing_file() {
    let err = MemoryScene::load("/definitely/not/here.json").unwrap_err();
    assert!(matches!(err, Error::FileNotFound(_)));
}

#[test]
fn test_load_invalid_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "{ objects: ").unwrap();
    let err = MemoryScene::load(&path).unwrap_err();
    assert!(err.to_string().contains("broken.json"));
}

#[test]
fn test_loaded_scene_has_document_path() {
    let dir = tempfile::tempdir().unwrap();
    let scene = MemoryScene::load(write_scene(dir.path())).unwrap();
    let doc = scene.document_path().unwrap();
    assert!(doc.ends_with("scene.json"));
    assert!(doc.is_absolute());
}

#[test]
fn test_pack_unpack_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let mut scene = MemoryScene::load(write_scene(dir.path())).unwrap();

    let packed = scene.pack_all().unwrap();
    assert_eq!(packed.processed, vec!["wood".to_string()]);

    let unpacked = scene.unpack_all(UnpackMethod::WriteLocal).unwrap();
    assert_eq!(unpacked.processed.len(), 1);
    assert!(dir.path().join("textures/wood.png").is_file());
    assert_eq!(scene.resources()[0].filepath, "//textures/wood.png");

    // Re-packing reads the local copy
    let repacked = scene.pack_all().unwrap();
    assert_eq!(repacked.processed, vec!["wood".to_string()]);
    assert!(scene.resources()[0].is_packed());
}

#[test]
fn test_export_at_identity_ignores_world_position() {
    let dir = tempfile::tempdir().unwrap();
    let mut scene = MemoryScene::load(write_scene(dir.path())).unwrap();
    let id = scene.find_object("Barrel").unwrap();

    let original = scene.world_transform(id).unwrap();
    assert_eq!(original.location, Vec3::new(0.0, 5.0, 0.0));

    scene.set_world_transform(id, Transform::IDENTITY).unwrap();
    let path = dir.path().join("Barrel.obj");
    scene.export_obj(&path, &ObjExportOptions::default()).unwrap();
    scene.set_world_transform(id, original).unwrap();

    let obj = fs::read_to_string(&path).unwrap();
    assert!(obj.contains("v 1.000000 0.000000 -1.000000\n"));
    assert!(obj.contains("f 1/1 2/2 3/3 4/4\n"));
    assert_eq!(scene.world_transform(id).unwrap(), original);

    let mtl = fs::read_to_string(dir.path().join("Barrel.mtl")).unwrap();
    assert!(mtl.contains("map_Kd wood.png\n"));
}
