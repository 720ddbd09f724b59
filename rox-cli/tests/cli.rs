//! End-to-end tests for the rox binary

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use glam::{Mat4, Vec3};
use predicates::prelude::*;
use rox_model::{
    Animation, Bone, BoneAnimation, Keyframe, MaterialRef, Mesh, MeshVertices, Model,
    SkinnedVertex, Submesh,
};
use tempfile::{TempDir, tempdir};

fn rox() -> Command {
    Command::cargo_bin("rox").unwrap()
}

fn lever_model() -> Model {
    let vertex = |x: f32, bone: u8| SkinnedVertex {
        position: Vec3::new(x, 0.0, 0.0),
        normal: Vec3::Z,
        bone_indices: [bone, 0, 0, 0],
        weights: [1.0, 0.0, 0.0, 0.0],
        ..SkinnedVertex::default()
    };

    Model {
        name: "lever".to_string(),
        bones: vec![Bone::new("base", None), Bone::new("handle", Some(0))],
        bone_matrices: vec![Mat4::IDENTITY; 2],
        inverse_bind_matrices: vec![
            Mat4::IDENTITY,
            Mat4::from_translation(Vec3::new(0.0, -1.0, 0.0)),
        ],
        meshes: vec![Mesh {
            name: "lever_mesh".to_string(),
            submeshes: vec![Submesh {
                name: "lever_mesh".to_string(),
                index_count: 3,
                ..Submesh::default()
            }],
            indices: vec![0, 1, 2],
            vertices: MeshVertices::Skinned(vec![vertex(0.0, 0), vertex(1.0, 1), vertex(2.0, 1)]),
            bone_influences: vec![0, 1],
        }],
        materials: vec![MaterialRef::default()],
    }
}

fn pull_animation() -> Animation {
    let mut pulled = Keyframe::identity(0.5);
    pulled.translation = Vec3::new(0.0, 0.25, 0.0);
    Animation::new(
        "pull",
        vec![
            BoneAnimation::identity(0.5),
            BoneAnimation::new(vec![Keyframe::identity(0.0), pulled]),
        ],
    )
}

fn write_fixtures() -> (TempDir, PathBuf, PathBuf) {
    let dir = tempdir().unwrap();
    let model_path = dir.path().join("lever.modl");
    let anim_path = dir.path().join("pull.anim");
    lever_model().save(&model_path).unwrap();
    pull_animation().save(&anim_path).unwrap();
    (dir, model_path, anim_path)
}

fn path_arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn test_model_info() {
    let (_dir, model, _) = write_fixtures();

    rox()
        .args(["model", "info", path_arg(&model)])
        .assert()
        .success()
        .stdout(predicate::str::contains("Name:      lever"))
        .stdout(predicate::str::contains("Bones:     2"))
        .stdout(predicate::str::contains("lever_mesh"));
}

#[test]
fn test_model_info_json() {
    let (_dir, model, _) = write_fixtures();

    let output = rox()
        .args(["model", "info", "--json", path_arg(&model)])
        .output()
        .unwrap();
    assert!(output.status.success());

    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["name"], "lever");
    assert_eq!(summary["bones"], 2);
    assert_eq!(summary["skinned"], true);
    assert_eq!(summary["meshes"][0]["vertex_size"], 52);
    assert_eq!(summary["meshes"][0]["submeshes"][0]["index_count"], 3);
}

#[test]
fn test_model_tree_shows_hierarchy() {
    let (_dir, model, _) = write_fixtures();

    rox()
        .args(["model", "tree", "--no-color", path_arg(&model)])
        .assert()
        .success()
        .stdout(predicate::str::contains("Skeleton"))
        .stdout(predicate::str::contains("🦴 base"))
        .stdout(predicate::str::contains("└── 🦴 handle"))
        .stdout(predicate::str::contains("Vertex Buffer"));
}

#[test]
fn test_model_validate() {
    let (_dir, model, _) = write_fixtures();

    rox()
        .args(["model", "validate", path_arg(&model)])
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ Model file is valid"));
}

#[test]
fn test_invalid_model_fails_validation() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.modl");
    let mut model = lever_model();
    model.bones[1].name = "base".to_string();
    model.save(&path).unwrap();

    rox()
        .args(["model", "validate", path_arg(&path)])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Duplicate bone name 'base'"));
}

#[test]
fn test_anim_info_and_validate() {
    let (_dir, model, anim) = write_fixtures();

    rox()
        .args(["anim", "info", "--detailed", path_arg(&anim)])
        .assert()
        .success()
        .stdout(predicate::str::contains("Name:      pull"))
        .stdout(predicate::str::contains("Tracks:    2 (1 at rest)"));

    rox()
        .args([
            "anim",
            "validate",
            path_arg(&anim),
            "--model",
            path_arg(&model),
        ])
        .assert()
        .success();
}

#[test]
fn test_anim_validate_against_wrong_model() {
    let dir = tempdir().unwrap();
    let model_path = dir.path().join("single.modl");
    let anim_path = dir.path().join("pull.anim");
    Model {
        name: "single".to_string(),
        bones: vec![Bone::new("only", None)],
        bone_matrices: vec![Mat4::IDENTITY],
        inverse_bind_matrices: vec![Mat4::IDENTITY],
        ..Model::default()
    }
    .save(&model_path)
    .unwrap();
    pull_animation().save(&anim_path).unwrap();

    rox()
        .args([
            "anim",
            "validate",
            path_arg(&anim_path),
            "--model",
            path_arg(&model_path),
        ])
        .assert()
        .failure()
        .stdout(predicate::str::contains("expected 1"));
}

#[test]
fn test_missing_file_fails() {
    rox()
        .args(["model", "info", "does-not-exist.modl"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does-not-exist.modl"));
}

#[test]
fn test_import_missing_source_fails() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("out.modl");

    rox()
        .args([
            "model",
            "import",
            "missing.gltf",
            path_arg(&output),
        ])
        .assert()
        .failure();
    assert!(!output.exists());
}

const TWO_CLIPS_GLTF: &str = r#"{
    "asset": { "version": "2.0" },
    "scene": 0,
    "scenes": [{ "nodes": [0] }],
    "nodes": [{ "name": "hips" }],
    "buffers": [{ "uri": "clips.bin", "byteLength": 32 }],
    "bufferViews": [
        { "buffer": 0, "byteOffset": 0, "byteLength": 8 },
        { "buffer": 0, "byteOffset": 8, "byteLength": 24 }
    ],
    "accessors": [
        { "bufferView": 0, "componentType": 5126, "count": 2, "type": "SCALAR", "min": [0.0], "max": [1.0] },
        { "bufferView": 1, "componentType": 5126, "count": 2, "type": "VEC3" }
    ],
    "animations": [
        {
            "name": "Armature|Walk",
            "samplers": [{ "input": 0, "output": 1 }],
            "channels": [{ "sampler": 0, "target": { "node": 0, "path": "translation" } }]
        },
        {
            "name": "Armature_Walk",
            "samplers": [{ "input": 0, "output": 1 }],
            "channels": [{ "sampler": 0, "target": { "node": 0, "path": "translation" } }]
        }
    ]
}"#;

#[test]
fn test_anim_import_keeps_clips_with_clashing_file_names() {
    let dir = tempdir().unwrap();
    let values: [f32; 8] = [0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 2.0, 0.0];
    let bytes: Vec<u8> = values.iter().flat_map(|f| f.to_le_bytes()).collect();
    std::fs::write(dir.path().join("clips.bin"), bytes).unwrap();
    let source = dir.path().join("clips.gltf");
    std::fs::write(&source, TWO_CLIPS_GLTF).unwrap();
    let out = dir.path().join("anims");

    rox()
        .args(["anim", "import", path_arg(&source), path_arg(&out)])
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ Wrote 2 animation(s)"));

    let first = Animation::load(out.join("Armature_Walk.anim")).unwrap();
    let second = Animation::load(out.join("Armature_Walk_2.anim")).unwrap();
    let mut names = vec![first.name, second.name];
    names.sort();
    assert_eq!(names, vec!["Armature_Walk", "Armature|Walk"]);
    assert_eq!(std::fs::read_dir(&out).unwrap().count(), 2);
}

#[test]
fn test_completions() {
    rox()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("rox"));
}
