//! Bone hierarchy extraction.

use std::collections::HashMap;

use glam::Mat4;
use log::debug;
use rox_model::Bone;

use crate::scene::{ImportScene, SceneNode};

/// Bones in hierarchy order, with their matrices aligned to the bone list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Skeleton {
    pub bones: Vec<Bone>,
    /// Always identity; kept so the file layout carries a slot per bone
    pub bone_matrices: Vec<Mat4>,
    pub inverse_bind_matrices: Vec<Mat4>,
    /// Accumulated scene transform of each bone's node
    pub global_transforms: Vec<Mat4>,
    lookup: HashMap<String, u32>,
}

impl Skeleton {
    /// Walks `root` depth first, registering every node named in `bone_set`.
    ///
    /// A registered node becomes the parent of the bones below it; other
    /// nodes pass their parent through. Nodes are visited in pre-order, left
    /// to right, so every parent precedes its children. When a name appears
    /// twice in the tree only the first node counts.
    pub fn build(root: &SceneNode, bone_set: &[(&str, Mat4)]) -> Self {
        let mut offsets: HashMap<&str, Mat4> = HashMap::with_capacity(bone_set.len());
        for &(name, offset) in bone_set {
            offsets.entry(name).or_insert(offset);
        }
        let mut skeleton = Self::default();

        let mut stack: Vec<(&SceneNode, Option<u32>, Mat4)> = vec![(root, None, Mat4::IDENTITY)];
        while let Some((node, parent, parent_transform)) = stack.pop() {
            let global = parent_transform * node.transform;

            let mut child_parent = parent;
            if let Some(offset) = offsets.get(node.name.as_str()) {
                if !skeleton.lookup.contains_key(&node.name) {
                    let index = skeleton.bones.len() as u32;
                    skeleton.bones.push(Bone::new(node.name.clone(), parent));
                    skeleton.bone_matrices.push(Mat4::IDENTITY);
                    skeleton.inverse_bind_matrices.push(*offset);
                    skeleton.global_transforms.push(global);
                    skeleton.lookup.insert(node.name.clone(), index);
                    child_parent = Some(index);
                }
            }

            for child in node.children.iter().rev() {
                stack.push((child, child_parent, global));
            }
        }

        let missing = offsets.len().saturating_sub(skeleton.bones.len());
        if missing > 0 {
            debug!("{missing} bone names have no node in the scene hierarchy");
        }

        skeleton
    }

    /// Skeleton of the bones referenced by the scene's meshes.
    pub fn from_scene(scene: &ImportScene) -> Self {
        Self::build(&scene.root, &scene.mesh_bones())
    }

    /// Skeleton for animation import.
    ///
    /// Scenes without mesh bones (animation-only sources) use the animated
    /// node names as bones, with identity offsets.
    pub fn for_animations(scene: &ImportScene) -> Self {
        let mut bone_set = scene.mesh_bones();
        if bone_set.is_empty() {
            for channel in scene.animations.iter().flat_map(|a| a.channels.iter()) {
                if !bone_set.iter().any(|(name, _)| *name == channel.node_name) {
                    bone_set.push((channel.node_name.as_str(), Mat4::IDENTITY));
                }
            }
        }
        Self::build(&scene.root, &bone_set)
    }

    pub fn index_of(&self, name: &str) -> Option<u32> {
        self.lookup.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.bones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }
}
