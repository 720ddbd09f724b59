//! glTF 2.0 scene importer built on the `gltf` crate.

use std::collections::HashMap;
use std::path::Path;

use glam::{Mat4, Quat, Vec2, Vec3};
use gltf::animation::Interpolation;
use gltf::animation::util::ReadOutputs;
use gltf::buffer::Data;
use gltf::mesh::Mode;
use log::{debug, info, warn};

use crate::error::{ImportError, Result};
use crate::scene::{
    ImportScene, NodeChannel, QuatKey, SceneAnimation, SceneBone, SceneImporter, SceneMesh,
    SceneNode, VectorKey, VertexWeight,
};

/// Reads `.gltf` and `.glb` files.
///
/// Each triangle primitive becomes one [`SceneMesh`]; skins become scene
/// bones named after their joint nodes. glTF times are already in seconds,
/// so clips report one tick per second.
#[derive(Debug, Clone, Copy, Default)]
pub struct GltfImporter;

impl GltfImporter {
    pub fn new() -> Self {
        Self
    }
}

impl SceneImporter for GltfImporter {
    fn import(&self, path: &Path) -> Result<ImportScene> {
        let (document, buffers, _images) =
            gltf::import(path).map_err(|e| ImportError::Scene {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        let scene = convert_document(&document, &buffers);
        info!(
            "Imported {}: {} meshes, {} animations",
            path.display(),
            scene.meshes.len(),
            scene.animations.len()
        );
        Ok(scene)
    }
}

fn node_name(node: &gltf::Node) -> String {
    node.name()
        .map_or_else(|| format!("node{}", node.index()), str::to_string)
}

fn buffer_data<'a>(buffers: &'a [Data], buffer: &gltf::Buffer) -> Option<&'a [u8]> {
    buffers.get(buffer.index()).map(|data| &data[..])
}

fn convert_document(document: &gltf::Document, buffers: &[Data]) -> ImportScene {
    let root = match document.default_scene().or_else(|| document.scenes().next()) {
        Some(scene) => SceneNode::new(
            scene.name().unwrap_or("scene"),
            Mat4::IDENTITY,
        )
        .with_children(scene.nodes().map(|node| convert_node(&node)).collect()),
        None => SceneNode::new("scene", Mat4::IDENTITY),
    };

    let mut meshes = Vec::new();
    for node in document.nodes() {
        if let Some(mesh) = node.mesh() {
            convert_mesh(&node, &mesh, buffers, &mut meshes);
        }
    }

    let animations = document
        .animations()
        .map(|animation| convert_animation(&animation, buffers))
        .collect();

    ImportScene {
        root,
        meshes,
        animations,
    }
}

fn convert_node(node: &gltf::Node) -> SceneNode {
    SceneNode::new(
        node_name(node),
        Mat4::from_cols_array_2d(&node.transform().matrix()),
    )
    .with_children(node.children().map(|child| convert_node(&child)).collect())
}

/// Joint names and inverse bind matrices of the node's skin, if any.
fn skin_joints(node: &gltf::Node, buffers: &[Data]) -> Vec<(String, Mat4)> {
    let Some(skin) = node.skin() else {
        return Vec::new();
    };

    let reader = skin.reader(|buffer| buffer_data(buffers, &buffer));
    let inverse_bind_matrices: Vec<Mat4> = reader
        .read_inverse_bind_matrices()
        .map(|matrices| matrices.map(|m| Mat4::from_cols_array_2d(&m)).collect())
        .unwrap_or_default();

    skin.joints()
        .enumerate()
        .map(|(i, joint)| {
            let matrix = inverse_bind_matrices
                .get(i)
                .copied()
                .unwrap_or(Mat4::IDENTITY);
            (node_name(&joint), matrix)
        })
        .collect()
}

fn convert_mesh(node: &gltf::Node, mesh: &gltf::Mesh, buffers: &[Data], out: &mut Vec<SceneMesh>) {
    let base_name = mesh.name().map_or_else(|| node_name(node), str::to_string);
    let primitive_count = mesh.primitives().len();
    let joints = skin_joints(node, buffers);

    for primitive in mesh.primitives() {
        if primitive.mode() != Mode::Triangles {
            warn!(
                "Skipping primitive {} of mesh '{}': {:?} is not a triangle list",
                primitive.index(),
                base_name,
                primitive.mode()
            );
            continue;
        }

        let name = if primitive_count > 1 {
            format!("{}_{}", base_name, primitive.index())
        } else {
            base_name.clone()
        };

        let reader = primitive.reader(|buffer| buffer_data(buffers, &buffer));
        let Some(positions) = reader.read_positions() else {
            warn!("Skipping primitive of mesh '{name}' without positions");
            continue;
        };
        let positions: Vec<Vec3> = positions.map(Vec3::from).collect();
        let normals: Vec<Vec3> = reader
            .read_normals()
            .map(|normals| normals.map(Vec3::from).collect())
            .unwrap_or_default();
        let tex_coords: Vec<Vec2> = reader
            .read_tex_coords(0)
            .map(|uvs| uvs.into_f32().map(Vec2::from).collect())
            .unwrap_or_default();

        let indices: Vec<u32> = match reader.read_indices() {
            Some(indices) => indices.into_u32().collect(),
            None => (0..positions.len() as u32).collect(),
        };
        let faces = indices
            .chunks_exact(3)
            .map(|face| [face[0], face[1], face[2]])
            .collect();

        let mut bones: Vec<SceneBone> = joints
            .iter()
            .map(|(joint, offset_matrix)| SceneBone {
                name: joint.clone(),
                offset_matrix: *offset_matrix,
                weights: Vec::new(),
            })
            .collect();

        if let (Some(vertex_joints), Some(vertex_weights)) =
            (reader.read_joints(0), reader.read_weights(0))
        {
            for (vertex_id, (joint_set, weight_set)) in vertex_joints
                .into_u16()
                .zip(vertex_weights.into_f32())
                .enumerate()
            {
                for (joint, weight) in joint_set.into_iter().zip(weight_set) {
                    if weight <= 0.0 {
                        continue;
                    }
                    match bones.get_mut(joint as usize) {
                        Some(bone) => bone.weights.push(VertexWeight {
                            vertex_id: vertex_id as u32,
                            weight,
                        }),
                        None => warn!("Mesh '{name}' vertex {vertex_id} uses missing joint {joint}"),
                    }
                }
            }
        }

        debug!(
            "glTF mesh '{}': {} vertices, {} faces, {} bones",
            name,
            positions.len(),
            indices.len() / 3,
            bones.len()
        );

        out.push(SceneMesh {
            name,
            material_index: primitive.material().index().unwrap_or(0) as u32,
            positions,
            normals,
            tex_coords,
            faces,
            bones,
        });
    }
}

/// Cubic spline samplers store an in-tangent, value and out-tangent per key.
fn key_values<T>(values: Vec<T>, interpolation: Interpolation) -> Vec<T> {
    match interpolation {
        Interpolation::CubicSpline => values.into_iter().skip(1).step_by(3).collect(),
        Interpolation::Linear | Interpolation::Step => values,
    }
}

fn convert_animation(animation: &gltf::Animation, buffers: &[Data]) -> SceneAnimation {
    let mut channels: Vec<NodeChannel> = Vec::new();
    let mut by_node: HashMap<usize, usize> = HashMap::new();
    let mut duration = 0.0f64;

    for channel in animation.channels() {
        let target = channel.target().node();
        let reader = channel.reader(|buffer| buffer_data(buffers, &buffer));
        let (Some(inputs), Some(outputs)) = (reader.read_inputs(), reader.read_outputs()) else {
            continue;
        };
        let times: Vec<f64> = inputs.map(f64::from).collect();
        duration = times.iter().copied().fold(duration, f64::max);

        let slot = *by_node.entry(target.index()).or_insert_with(|| {
            channels.push(NodeChannel {
                node_name: node_name(&target),
                ..NodeChannel::default()
            });
            channels.len() - 1
        });
        let node_channel = &mut channels[slot];
        let interpolation = channel.sampler().interpolation();

        match outputs {
            ReadOutputs::Translations(values) => {
                let values = key_values(values.map(Vec3::from).collect(), interpolation);
                node_channel.position_keys.extend(
                    times
                        .iter()
                        .zip(values)
                        .map(|(&time, value)| VectorKey { time, value }),
                );
            }
            ReadOutputs::Rotations(values) => {
                let values =
                    key_values(values.into_f32().map(Quat::from_array).collect(), interpolation);
                node_channel.rotation_keys.extend(
                    times
                        .iter()
                        .zip(values)
                        .map(|(&time, value)| QuatKey { time, value }),
                );
            }
            ReadOutputs::Scales(values) => {
                let values = key_values(values.map(Vec3::from).collect(), interpolation);
                node_channel.scale_keys.extend(
                    times
                        .iter()
                        .zip(values)
                        .map(|(&time, value)| VectorKey { time, value }),
                );
            }
            ReadOutputs::MorphTargetWeights(_) => {
                debug!("Skipping morph target channel on '{}'", node_channel.node_name);
            }
        }
    }

    SceneAnimation {
        name: animation.name().unwrap_or_default().to_string(),
        ticks_per_second: 1.0,
        duration,
        channels,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const TRIANGLE_GLTF: &str = r#"{
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [{ "name": "Scene", "nodes": [0] }],
        "nodes": [
            { "name": "Armature", "children": [1, 2] },
            { "name": "Triangle", "mesh": 0, "translation": [0.0, 1.0, 0.0] },
            { }
        ],
        "meshes": [{ "name": "Triangle", "primitives": [{ "attributes": { "POSITION": 0 } }] }],
        "buffers": [{ "uri": "triangle.bin", "byteLength": 36 }],
        "bufferViews": [{ "buffer": 0, "byteLength": 36 }],
        "accessors": [{
            "bufferView": 0,
            "componentType": 5126,
            "count": 3,
            "type": "VEC3",
            "min": [0.0, 0.0, 0.0],
            "max": [1.0, 1.0, 0.0]
        }]
    }"#;

    fn write_triangle(dir: &Path) -> std::path::PathBuf {
        let positions: [f32; 9] = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        let bytes: Vec<u8> = positions.iter().flat_map(|f| f.to_le_bytes()).collect();
        std::fs::write(dir.join("triangle.bin"), bytes).unwrap();

        let path = dir.join("triangle.gltf");
        std::fs::write(&path, TRIANGLE_GLTF).unwrap();
        path
    }

    #[test]
    fn test_import_triangle() {
        let dir = tempdir().unwrap();
        let scene = GltfImporter::new()
            .import(&write_triangle(dir.path()))
            .unwrap();

        assert_eq!(scene.root.name, "Scene");
        let armature = &scene.root.children[0];
        assert_eq!(armature.name, "Armature");
        assert_eq!(armature.children[0].name, "Triangle");
        assert_eq!(
            armature.children[0].transform,
            Mat4::from_translation(Vec3::Y)
        );
        assert_eq!(armature.children[1].name, "node2");

        assert_eq!(scene.meshes.len(), 1);
        let mesh = &scene.meshes[0];
        assert_eq!(mesh.name, "Triangle");
        assert_eq!(mesh.positions[1], Vec3::X);
        assert_eq!(mesh.faces, vec![[0, 1, 2]]);
        assert!(mesh.normals.is_empty());
        assert!(mesh.bones.is_empty());
        assert!(scene.animations.is_empty());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();
        let err = GltfImporter::new()
            .import(&dir.path().join("missing.gltf"))
            .unwrap_err();
        match err {
            ImportError::Scene { path, .. } => assert!(path.ends_with("missing.gltf")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_cubic_spline_keeps_values() {
        let values = vec![0, 1, 2, 10, 11, 12];
        assert_eq!(key_values(values.clone(), Interpolation::CubicSpline), vec![1, 11]);
        assert_eq!(key_values(values, Interpolation::Linear).len(), 6);
    }
}
