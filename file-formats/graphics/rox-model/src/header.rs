//! Packed header records of the `.modl` and `.anim` layouts.
//!
//! Each struct is encoded field by field in declaration order, little-endian,
//! with no padding. Variable-length data (names, buffers) follows the header
//! that sizes it.

use rox_data::prelude::*;

/// Format version written into every model header.
pub const MODL_VERSION: u16 = 1;

/// Parent index stored for root bones.
pub const NO_PARENT: u32 = u32::MAX;

/// Width of one index in bytes. Only 16-bit indices are stored.
pub const INDEX_SIZE: u32 = 2;

/// Stride of an unskinned vertex: position, normal, tex coord.
pub const VERTEX_SIZE: u32 = 32;

/// Stride of a skinned vertex: the unskinned fields, 4 bone indices, 4 weights.
pub const SKINNED_VERTEX_SIZE: u32 = 52;

/// Size of one keyframe: time, translation, scale, rotation.
pub const KEYFRAME_SIZE: u64 = 44;

/// Model file header (18 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, RoxHeaderR, RoxHeaderW)]
pub struct ModelHeader {
    pub version: u16,
    pub name_len: u32,
    pub bone_count: u32,
    pub mesh_count: u32,
    pub material_count: u32,
}

/// Per-bone record, followed by the bone name
#[derive(Debug, Clone, Copy, PartialEq, Eq, RoxHeaderR, RoxHeaderW)]
pub struct BoneHeader {
    pub name_len: u32,
    pub parent_index: u32,
}

/// Per-mesh record (13 bytes), followed by the name and bone influences
#[derive(Debug, Clone, Copy, PartialEq, Eq, RoxHeaderR, RoxHeaderW)]
pub struct MeshHeader {
    pub is_skinned: u8,
    pub name_len: u32,
    pub bone_influence_count: u32,
    pub submesh_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, RoxHeaderR, RoxHeaderW)]
pub struct SubmeshHeader {
    pub name_len: u32,
    pub material_index: u32,
    pub index_count: u32,
    pub start_index: u32,
    pub vertex_offset: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, RoxHeaderR, RoxHeaderW)]
pub struct IndexBufferHeader {
    pub index_size: u32,
    pub index_count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, RoxHeaderR, RoxHeaderW)]
pub struct VertexBufferHeader {
    pub vertex_size: u32,
    pub vertex_count: u64,
}

/// Animation file header (5 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, RoxHeaderR, RoxHeaderW)]
pub struct AnimHeader {
    pub bone_animation_count: u8,
    pub name_len: u32,
}

/// Per-track record. `keyframe_size_bytes` is the length of the whole
/// keyframe payload that follows, not the stride of one keyframe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, RoxHeaderR, RoxHeaderW)]
pub struct BoneAnimHeader {
    pub keyframe_count: u32,
    pub keyframe_size_bytes: u64,
}
