//! Per-vertex bone influences.

use log::{debug, warn};

use crate::error::{ImportError, Result};
use crate::options::WeightCalibration;
use crate::scene::SceneMesh;
use crate::skeleton::Skeleton;

/// Bone slots per skinned vertex.
pub const MAX_INFLUENCES: usize = 4;

/// Step added per slot by [`WeightCalibration::Iterative`].
pub const CALIBRATION_EPSILON: f32 = 1e-4;

/// Up to four (bone, weight) pairs, filled in the order they were added.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Influences {
    pub bone_indices: [u8; MAX_INFLUENCES],
    pub weights: [f32; MAX_INFLUENCES],
    len: usize,
}

impl Influences {
    /// Takes the next free slot. Returns `false` when all slots are in use.
    pub fn push(&mut self, bone: u8, weight: f32) -> bool {
        if self.len == MAX_INFLUENCES {
            return false;
        }
        self.bone_indices[self.len] = bone;
        self.weights[self.len] = weight;
        self.len += 1;
        true
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn weight_sum(&self) -> f32 {
        self.weights[..self.len].iter().sum()
    }

    pub fn bones(&self) -> &[u8] {
        &self.bone_indices[..self.len]
    }

    /// Brings the weight sum up to 1.0. Empty slots stay zero and a vertex
    /// without influences is left untouched.
    pub fn calibrate(&mut self, mode: WeightCalibration) {
        if self.len == 0 {
            return;
        }
        match mode {
            WeightCalibration::Iterative => {
                let mut slot = 0;
                while self.weight_sum() < 1.0 {
                    self.weights[slot] += CALIBRATION_EPSILON;
                    slot = (slot + 1) % self.len;
                }
            }
            WeightCalibration::Normalize => {
                let sum = self.weight_sum();
                for weight in &mut self.weights[..self.len] {
                    *weight /= sum;
                }
            }
        }
    }
}

/// Collects the influences of every vertex of `mesh` and calibrates them.
///
/// Scene bones are visited in order, then their weights in order; once a
/// vertex has four influences further ones are dropped. Weights of zero or
/// less are ignored, as are bones missing from the skeleton.
pub fn resolve_influences(
    mesh: &SceneMesh,
    skeleton: &Skeleton,
    calibration: WeightCalibration,
) -> Result<Vec<Influences>> {
    let mut influences = vec![Influences::default(); mesh.positions.len()];
    let mut dropped = 0usize;

    for bone in &mesh.bones {
        let Some(index) = skeleton.index_of(&bone.name) else {
            warn!(
                "Mesh '{}' references bone '{}', which is not in the skeleton",
                mesh.name, bone.name
            );
            continue;
        };

        for weight in bone.weights.iter().filter(|w| w.weight > 0.0) {
            let packed = u8::try_from(index).map_err(|_| ImportError::BoneIndexOverflow {
                bone: bone.name.clone(),
                index,
            })?;

            let Some(vertex) = influences.get_mut(weight.vertex_id as usize) else {
                warn!(
                    "Bone '{}' weights vertex {} of mesh '{}', which has {} vertices",
                    bone.name,
                    weight.vertex_id,
                    mesh.name,
                    mesh.positions.len()
                );
                continue;
            };

            if !vertex.push(packed, weight.weight) {
                dropped += 1;
            }
        }
    }

    if dropped > 0 {
        debug!(
            "Mesh '{}': dropped {} influences beyond {} per vertex",
            mesh.name, dropped, MAX_INFLUENCES
        );
    }

    for vertex in &mut influences {
        vertex.calibrate(calibration);
    }

    Ok(influences)
}
