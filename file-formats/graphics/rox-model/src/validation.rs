//! Structural checks for models and animations.
//!
//! The readers trust the counts they decode; run these checks on anything
//! that comes from an untrusted file before handing it to a renderer.

use std::collections::HashSet;

use thiserror::Error;

use crate::animation::Animation;
use crate::error::{ModelError, Result};
use crate::model::{Mesh, MeshVertices, Model};

/// Tolerance below 1.0 accepted for the weight sum of a skinned vertex.
pub const WEIGHT_SUM_TOLERANCE: f32 = 1e-4;

/// Validation error types
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Duplicate bone name '{0}'")]
    DuplicateBoneName(String),

    #[error("Bone {bone} has parent {parent}, which does not precede it")]
    ParentOrder { bone: usize, parent: u32 },

    #[error("{field} has {actual} entries, expected {expected}")]
    CountMismatch {
        field: String,
        expected: usize,
        actual: usize,
    },

    #[error("{field} references {value}, valid range is 0..{limit}")]
    InvalidReference {
        field: String,
        value: u64,
        limit: usize,
    },

    #[error("Mesh '{mesh}' vertex {vertex} has weight sum {sum}")]
    WeightSum {
        mesh: String,
        vertex: usize,
        sum: f32,
    },

    #[error("Track {track} has {count} keyframes, at least 2 are required")]
    TooFewKeyframes { track: usize, count: usize },

    #[error("Track {track} keyframe {keyframe} does not come after the previous one")]
    UnsortedKeyframes { track: usize, keyframe: usize },
}

/// Validation warning types
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationWarning {
    #[error("Mesh '{0}' has no vertices")]
    EmptyMesh(String),

    #[error("Mesh '{mesh}' has {count} skinned vertices without bone influences")]
    UnweightedVertices { mesh: String, count: usize },

    #[error("Mesh '{mesh}' index count {count} is not a multiple of 3")]
    PartialTriangle { mesh: String, count: usize },

    #[error("Mesh '{mesh}' submesh {submesh} uses material {index}, but only {available} are bound")]
    UnboundMaterial {
        mesh: String,
        submesh: usize,
        index: u32,
        available: usize,
    },
}

/// Report of validation results
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ValidationReport {
    /// Violations of the model or animation invariants
    pub errors: Vec<ValidationError>,

    /// Suspicious but well-formed data
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// Folds the errors into a single [`ModelError::Validation`].
    pub fn into_result(self) -> Result<()> {
        if self.errors.is_empty() {
            return Ok(());
        }
        let messages: Vec<String> = self.errors.iter().map(ToString::to_string).collect();
        Err(ModelError::Validation(messages.join("; ")))
    }
}

/// Checks the bone list, matrix arrays, and every mesh of `model`.
pub fn validate_model(model: &Model) -> ValidationReport {
    let mut report = ValidationReport::new();

    let mut names = HashSet::new();
    for (index, bone) in model.bones.iter().enumerate() {
        if !names.insert(bone.name.as_str()) {
            report.add_error(ValidationError::DuplicateBoneName(bone.name.clone()));
        }
        if let Some(parent) = bone.parent {
            if parent as usize >= index {
                report.add_error(ValidationError::ParentOrder {
                    bone: index,
                    parent,
                });
            }
        }
    }

    for (field, actual) in [
        ("bone_matrices", model.bone_matrices.len()),
        ("inverse_bind_matrices", model.inverse_bind_matrices.len()),
    ] {
        if actual != model.bones.len() {
            report.add_error(ValidationError::CountMismatch {
                field: field.to_string(),
                expected: model.bones.len(),
                actual,
            });
        }
    }

    for mesh in &model.meshes {
        validate_mesh(mesh, model, &mut report);
    }

    report
}

fn validate_mesh(mesh: &Mesh, model: &Model, report: &mut ValidationReport) {
    let vertex_count = mesh.vertex_count();
    let bone_count = model.bones.len();

    if mesh.vertices.is_empty() {
        report.add_warning(ValidationWarning::EmptyMesh(mesh.name.clone()));
    }
    if mesh.indices.len() % 3 != 0 {
        report.add_warning(ValidationWarning::PartialTriangle {
            mesh: mesh.name.clone(),
            count: mesh.indices.len(),
        });
    }

    for (i, submesh) in mesh.submeshes.iter().enumerate() {
        let field = format!("mesh '{}' submesh {}", mesh.name, i);

        if submesh.material_index as usize >= model.materials.len() {
            report.add_warning(ValidationWarning::UnboundMaterial {
                mesh: mesh.name.clone(),
                submesh: i,
                index: submesh.material_index,
                available: model.materials.len(),
            });
        }

        let range = submesh.index_range();
        if range.end > mesh.indices.len() {
            report.add_error(ValidationError::InvalidReference {
                field: format!("{field} index range end"),
                value: range.end as u64,
                limit: mesh.indices.len() + 1,
            });
            continue;
        }

        if submesh.vertex_offset as usize > vertex_count {
            report.add_error(ValidationError::InvalidReference {
                field: format!("{field} vertex offset"),
                value: u64::from(submesh.vertex_offset),
                limit: vertex_count + 1,
            });
            continue;
        }

        // Report only the first out-of-range index per submesh
        if let Some(index) = mesh.indices[range]
            .iter()
            .map(|&index| u64::from(submesh.vertex_offset) + u64::from(index))
            .find(|&index| index >= vertex_count as u64)
        {
            report.add_error(ValidationError::InvalidReference {
                field: format!("{field} index"),
                value: index,
                limit: vertex_count,
            });
        }
    }

    for &bone in &mesh.bone_influences {
        if bone as usize >= bone_count {
            report.add_error(ValidationError::InvalidReference {
                field: format!("mesh '{}' bone influence", mesh.name),
                value: u64::from(bone),
                limit: bone_count,
            });
        }
    }

    if let MeshVertices::Skinned(vertices) = &mesh.vertices {
        let mut unweighted = 0;
        for (i, vertex) in vertices.iter().enumerate() {
            let mut influences = vertex.influences().peekable();
            if influences.peek().is_none() {
                unweighted += 1;
                continue;
            }
            if let Some((bone, _)) = influences.find(|&(bone, _)| bone as usize >= bone_count) {
                report.add_error(ValidationError::InvalidReference {
                    field: format!("mesh '{}' vertex {} bone", mesh.name, i),
                    value: u64::from(bone),
                    limit: bone_count,
                });
            }
            let sum = vertex.weight_sum();
            if sum < 1.0 - WEIGHT_SUM_TOLERANCE {
                report.add_error(ValidationError::WeightSum {
                    mesh: mesh.name.clone(),
                    vertex: i,
                    sum,
                });
            }
        }
        if unweighted > 0 {
            report.add_warning(ValidationWarning::UnweightedVertices {
                mesh: mesh.name.clone(),
                count: unweighted,
            });
        }
    }
}

/// Checks keyframe ordering, and the track count against `model` when given.
pub fn validate_animation(animation: &Animation, model: Option<&Model>) -> ValidationReport {
    let mut report = ValidationReport::new();

    if let Some(model) = model {
        if animation.bone_animations.len() != model.bones.len() {
            report.add_error(ValidationError::CountMismatch {
                field: format!("animation '{}' tracks", animation.name),
                expected: model.bones.len(),
                actual: animation.bone_animations.len(),
            });
        }
    }

    for (track, bone_animation) in animation.bone_animations.iter().enumerate() {
        let keyframes = &bone_animation.keyframes;
        if keyframes.len() < 2 {
            report.add_error(ValidationError::TooFewKeyframes {
                track,
                count: keyframes.len(),
            });
        }
        if let Some(keyframe) = keyframes
            .windows(2)
            .position(|pair| pair[1].time <= pair[0].time)
        {
            report.add_error(ValidationError::UnsortedKeyframes {
                track,
                keyframe: keyframe + 1,
            });
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{BoneAnimation, Keyframe};
    use crate::model::{Bone, MaterialRef, SkinnedVertex, Submesh, Vertex};
    use glam::Mat4;

    fn two_bone_model() -> Model {
        Model {
            name: "arm".to_string(),
            bones: vec![Bone::new("upper", None), Bone::new("lower", Some(0))],
            bone_matrices: vec![Mat4::IDENTITY; 2],
            inverse_bind_matrices: vec![Mat4::IDENTITY; 2],
            meshes: vec![Mesh {
                name: "skin".to_string(),
                submeshes: vec![Submesh {
                    name: "skin".to_string(),
                    index_count: 3,
                    ..Submesh::default()
                }],
                indices: vec![0, 1, 2],
                vertices: MeshVertices::Skinned(vec![
                    SkinnedVertex {
                        bone_indices: [0, 0, 0, 0],
                        weights: [1.0, 0.0, 0.0, 0.0],
                        ..SkinnedVertex::default()
                    },
                    SkinnedVertex {
                        bone_indices: [0, 1, 0, 0],
                        weights: [0.5, 0.5, 0.0, 0.0],
                        ..SkinnedVertex::default()
                    },
                    SkinnedVertex {
                        bone_indices: [1, 0, 0, 0],
                        weights: [1.0, 0.0, 0.0, 0.0],
                        ..SkinnedVertex::default()
                    },
                ]),
                bone_influences: vec![0, 1],
            }],
            materials: vec![MaterialRef::default()],
        }
    }

    #[test]
    fn test_valid_model() {
        let report = validate_model(&two_bone_model());
        assert!(!report.has_errors(), "{:?}", report.errors);
        assert!(!report.has_warnings());
        assert!(report.into_result().is_ok());
    }

    #[test]
    fn test_bone_errors() {
        let mut model = two_bone_model();
        model.bones[0].parent = Some(1);
        model.bones[1].name = "upper".to_string();
        model.inverse_bind_matrices.pop();

        let report = validate_model(&model);
        assert_eq!(report.error_count(), 3);
        assert!(
            report
                .errors
                .contains(&ValidationError::ParentOrder { bone: 0, parent: 1 })
        );
        assert!(
            report
                .errors
                .contains(&ValidationError::DuplicateBoneName("upper".to_string()))
        );
        assert!(matches!(
            report.into_result(),
            Err(ModelError::Validation(_))
        ));
    }

    #[test]
    fn test_index_outside_vertex_buffer() {
        let mut model = two_bone_model();
        model.meshes[0].submeshes[0].vertex_offset = 1;

        let report = validate_model(&model);
        assert_eq!(
            report.errors,
            vec![ValidationError::InvalidReference {
                field: "mesh 'skin' submesh 0 index".to_string(),
                value: 3,
                limit: 3,
            }]
        );
    }

    #[test]
    fn test_submesh_range_outside_index_buffer() {
        let mut model = two_bone_model();
        model.meshes[0].submeshes[0].start_index = 2;

        let report = validate_model(&model);
        assert_eq!(report.error_count(), 1);
    }

    #[test]
    fn test_weight_sum_and_bone_reference() {
        let mut model = two_bone_model();
        if let MeshVertices::Skinned(vertices) = &mut model.meshes[0].vertices {
            vertices[1].weights = [0.5, 0.25, 0.0, 0.0];
            vertices[2].bone_indices = [7, 0, 0, 0];
        }

        let report = validate_model(&model);
        assert_eq!(report.error_count(), 2);
        assert!(matches!(
            report.errors[0],
            ValidationError::WeightSum { vertex: 1, .. }
        ));
    }

    #[test]
    fn test_unweighted_vertices_are_a_warning() {
        let mut model = two_bone_model();
        if let MeshVertices::Skinned(vertices) = &mut model.meshes[0].vertices {
            vertices[0].weights = [0.0; 4];
        }

        let report = validate_model(&model);
        assert!(!report.has_errors());
        assert_eq!(report.warning_count(), 1);
    }

    #[test]
    fn test_unbound_material_is_a_warning() {
        let mut model = two_bone_model();
        model.meshes[0].submeshes[0].material_index = 2;

        let report = validate_model(&model);
        assert!(!report.has_errors());
        assert_eq!(
            report.warnings,
            vec![ValidationWarning::UnboundMaterial {
                mesh: "skin".to_string(),
                submesh: 0,
                index: 2,
                available: 1,
            }]
        );
    }

    #[test]
    fn test_static_mesh_without_bones() {
        let model = Model {
            name: "rock".to_string(),
            meshes: vec![Mesh {
                name: "rock".to_string(),
                submeshes: vec![Submesh {
                    index_count: 3,
                    ..Submesh::default()
                }],
                indices: vec![0, 1, 2],
                vertices: MeshVertices::Unskinned(vec![Vertex::default(); 3]),
                bone_influences: Vec::new(),
            }],
            materials: vec![MaterialRef::default()],
            ..Model::default()
        };
        assert!(!validate_model(&model).has_errors());
    }

    #[test]
    fn test_animation_checks() {
        let model = two_bone_model();
        let animation = Animation::new(
            "wave",
            vec![
                BoneAnimation::identity(1.0),
                BoneAnimation::new(vec![Keyframe::identity(0.5), Keyframe::identity(0.5)]),
            ],
        );
        let report = validate_animation(&animation, Some(&model));
        assert_eq!(
            report.errors,
            vec![ValidationError::UnsortedKeyframes {
                track: 1,
                keyframe: 1
            }]
        );

        let short = Animation::new("blink", vec![BoneAnimation::new(vec![Keyframe::default()])]);
        let report = validate_animation(&short, Some(&model));
        assert_eq!(report.error_count(), 2);
        assert!(validate_animation(&short, None).error_count() == 1);
    }
}
