//! Scene graph handed over by a [`SceneImporter`].
//!
//! This is the boundary to third-party scene libraries. An importer fills
//! these plain values and the rest of the pipeline never sees the library.
//! Key times are in the source's ticks; [`SceneAnimation::ticks_per_second`]
//! converts them to seconds.

use std::path::Path;

use glam::{Mat4, Quat, Vec2, Vec3};

use crate::error::Result;

/// Reads a scene file into an [`ImportScene`].
pub trait SceneImporter {
    fn import(&self, path: &Path) -> Result<ImportScene>;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportScene {
    pub root: SceneNode,
    pub meshes: Vec<SceneMesh>,
    pub animations: Vec<SceneAnimation>,
}

impl ImportScene {
    /// Names of all bones referenced by the meshes, with the offset matrix
    /// of the first bone seen under each name.
    pub fn mesh_bones(&self) -> Vec<(&str, Mat4)> {
        let mut bones: Vec<(&str, Mat4)> = Vec::new();
        for bone in self.meshes.iter().flat_map(|mesh| mesh.bones.iter()) {
            if !bones.iter().any(|(name, _)| *name == bone.name) {
                bones.push((bone.name.as_str(), bone.offset_matrix));
            }
        }
        bones
    }
}

/// A node of the scene hierarchy.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub name: String,
    /// Transform relative to the parent node
    pub transform: Mat4,
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    pub fn new(name: impl Into<String>, transform: Mat4) -> Self {
        Self {
            name: name.into(),
            transform,
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<SceneNode>) -> Self {
        self.children = children;
        self
    }
}

impl Default for SceneNode {
    fn default() -> Self {
        Self::new("root", Mat4::IDENTITY)
    }
}

/// One triangulated mesh with a single material.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneMesh {
    pub name: String,
    pub material_index: u32,
    pub positions: Vec<Vec3>,
    /// Empty or one per position
    pub normals: Vec<Vec3>,
    /// First texture coordinate set; empty or one per position
    pub tex_coords: Vec<Vec2>,
    pub faces: Vec<[u32; 3]>,
    pub bones: Vec<SceneBone>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneBone {
    /// Name of the scene node driving this bone
    pub name: String,
    /// Mesh space to bone space, i.e. the inverse bind matrix
    pub offset_matrix: Mat4,
    pub weights: Vec<VertexWeight>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexWeight {
    pub vertex_id: u32,
    pub weight: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VectorKey {
    pub time: f64,
    pub value: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuatKey {
    pub time: f64,
    pub value: Quat,
}

/// Keys animating one node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeChannel {
    pub node_name: String,
    pub position_keys: Vec<VectorKey>,
    pub rotation_keys: Vec<QuatKey>,
    pub scale_keys: Vec<VectorKey>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneAnimation {
    /// May be empty
    pub name: String,
    /// Zero when the source does not say
    pub ticks_per_second: f64,
    /// Length of the clip in ticks
    pub duration: f64,
    pub channels: Vec<NodeChannel>,
}
