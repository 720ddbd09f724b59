//! In-memory model representation.

use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use custom_debug::Debug;
use glam::{Mat4, Vec2, Vec3};
use rox_data::prelude::*;
use rox_utils::debug::trimmed_collection_fmt;

use crate::error::{ModelError, Result};
use crate::header::{SKINNED_VERTEX_SIZE, VERTEX_SIZE};
use crate::modl::{ModlReader, ModlWriter};

/// Handle to a material owned outside the model.
///
/// Submeshes refer to materials by index into [`Model::materials`]; the
/// handle itself only carries the shared material name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MaterialRef(Arc<str>);

impl MaterialRef {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl Default for MaterialRef {
    fn default() -> Self {
        Self::new("default")
    }
}

impl fmt::Display for MaterialRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A skeleton joint. Its index is its position in [`Model::bones`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bone {
    pub name: String,
    /// Always lower than this bone's own index
    pub parent: Option<u32>,
}

impl Bone {
    pub fn new(name: impl Into<String>, parent: Option<u32>) -> Self {
        Self {
            name: name.into(),
            parent,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, RoxHeaderR, RoxHeaderW)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub tex_coord: Vec2,
}

/// Vertex with up to four bone influences. Unused slots have index 0 and
/// weight 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, RoxHeaderR, RoxHeaderW)]
pub struct SkinnedVertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub tex_coord: Vec2,
    pub bone_indices: [u8; 4],
    pub weights: [f32; 4],
}

impl SkinnedVertex {
    pub fn from_vertex(vertex: Vertex) -> Self {
        Self {
            position: vertex.position,
            normal: vertex.normal,
            tex_coord: vertex.tex_coord,
            ..Self::default()
        }
    }

    pub fn weight_sum(&self) -> f32 {
        self.weights.iter().sum()
    }

    /// Slots carrying a positive weight, in slot order.
    pub fn influences(&self) -> impl Iterator<Item = (u8, f32)> + '_ {
        self.bone_indices
            .iter()
            .zip(self.weights.iter())
            .filter(|&(_, &weight)| weight > 0.0)
            .map(|(&index, &weight)| (index, weight))
    }
}

/// Vertex storage of a mesh. The variant decides the on-disk stride and the
/// mesh's skinned flag.
#[derive(Clone, PartialEq)]
pub enum MeshVertices {
    Unskinned(Vec<Vertex>),
    Skinned(Vec<SkinnedVertex>),
}

impl MeshVertices {
    pub fn len(&self) -> usize {
        match self {
            Self::Unskinned(vertices) => vertices.len(),
            Self::Skinned(vertices) => vertices.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_skinned(&self) -> bool {
        matches!(self, Self::Skinned(_))
    }

    /// Stride of one vertex in the vertex buffer.
    pub fn vertex_size(&self) -> u32 {
        match self {
            Self::Unskinned(_) => VERTEX_SIZE,
            Self::Skinned(_) => SKINNED_VERTEX_SIZE,
        }
    }

    pub fn position(&self, index: usize) -> Option<Vec3> {
        match self {
            Self::Unskinned(vertices) => vertices.get(index).map(|v| v.position),
            Self::Skinned(vertices) => vertices.get(index).map(|v| v.position),
        }
    }
}

impl Default for MeshVertices {
    fn default() -> Self {
        Self::Unskinned(Vec::new())
    }
}

impl fmt::Debug for MeshVertices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unskinned(vertices) => {
                write!(f, "Unskinned(")?;
                trimmed_collection_fmt(vertices, f)?;
                write!(f, ")")
            }
            Self::Skinned(vertices) => {
                write!(f, "Skinned(")?;
                trimmed_collection_fmt(vertices, f)?;
                write!(f, ")")
            }
        }
    }
}

/// A draw range inside a mesh's shared buffers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Submesh {
    pub name: String,
    pub material_index: u32,
    pub index_count: u32,
    pub start_index: u32,
    /// Added to every index of the range to address the vertex buffer
    pub vertex_offset: u32,
}

impl Submesh {
    /// Index range of this submesh inside the mesh's index buffer.
    pub fn index_range(&self) -> std::ops::Range<usize> {
        let start = self.start_index as usize;
        start..start + self.index_count as usize
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub name: String,
    pub submeshes: Vec<Submesh>,
    #[debug(with = trimmed_collection_fmt)]
    pub indices: Vec<u16>,
    pub vertices: MeshVertices,
    /// Sorted, de-duplicated bone indices referenced by the vertices
    pub bone_influences: Vec<u32>,
}

impl Mesh {
    pub fn is_skinned(&self) -> bool {
        self.vertices.is_skinned()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// A skinned or static model: skeleton, meshes and material handles.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Model {
    pub name: String,
    pub bones: Vec<Bone>,
    /// Aligned with `bones`
    #[debug(with = trimmed_collection_fmt)]
    pub bone_matrices: Vec<Mat4>,
    /// Aligned with `bones`
    #[debug(with = trimmed_collection_fmt)]
    pub inverse_bind_matrices: Vec<Mat4>,
    pub meshes: Vec<Mesh>,
    pub materials: Vec<MaterialRef>,
}

impl Model {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn num_bones(&self) -> usize {
        self.bones.len()
    }

    pub fn num_meshes(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_skinned(&self) -> bool {
        self.meshes.iter().any(Mesh::is_skinned)
    }

    /// Total vertices over all meshes
    pub fn vertex_count(&self) -> usize {
        self.meshes.iter().map(Mesh::vertex_count).sum()
    }

    /// Total indices over all meshes
    pub fn index_count(&self) -> usize {
        self.meshes.iter().map(Mesh::index_count).sum()
    }

    pub fn bone_index(&self, name: &str) -> Option<usize> {
        self.bones.iter().position(|bone| bone.name == name)
    }

    /// Children of `bone`, in bone order. `None` lists the roots.
    pub fn bone_children(&self, bone: Option<u32>) -> impl Iterator<Item = usize> + '_ {
        self.bones
            .iter()
            .enumerate()
            .filter(move |(_, b)| b.parent == bone)
            .map(|(index, _)| index)
    }

    /// Loads a model file. Every material slot of the file is bound to
    /// `material`.
    pub fn load<P: AsRef<Path>>(path: P, material: MaterialRef) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ModelError::FileOpen {
            path: path.to_path_buf(),
            source,
        })?;
        ModlReader::new(BufReader::new(file), material).read()
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| ModelError::FileCreate {
            path: path.to_path_buf(),
            source,
        })?;
        let mut writer = BufWriter::new(file);
        ModlWriter::new(&mut writer).write(self)?;
        writer.flush()?;
        Ok(())
    }
}
