//! Scene meshes to model meshes.

use std::collections::BTreeSet;

use glam::{Vec2, Vec3};
use log::debug;
use rox_model::{Mesh, MeshVertices, ModelError, SkinnedVertex, Submesh, Vertex};

use crate::error::{ImportError, Result};
use crate::options::ImportOptions;
use crate::scene::SceneMesh;
use crate::skeleton::Skeleton;
use crate::skinning::{Influences, resolve_influences};

/// Geometry of one scene mesh, ready to become a submesh.
struct Part {
    vertices: Vec<Vertex>,
    /// Present when skinned vertices are requested
    influences: Option<Vec<Influences>>,
    indices: Vec<u16>,
}

fn count_u32(what: &'static str, count: usize) -> Result<u32> {
    u32::try_from(count).map_err(|_| ModelError::CountOverflow { what, count }.into())
}

fn base_vertices(mesh: &SceneMesh) -> Vec<Vertex> {
    mesh.positions
        .iter()
        .enumerate()
        .map(|(i, &position)| Vertex {
            position,
            normal: mesh.normals.get(i).copied().unwrap_or(Vec3::ZERO),
            tex_coord: mesh.tex_coords.get(i).copied().unwrap_or(Vec2::ZERO),
        })
        .collect()
}

fn local_indices(mesh: &SceneMesh) -> Result<Vec<u16>> {
    mesh.faces
        .iter()
        .flatten()
        .map(|&index| {
            u16::try_from(index).map_err(|_| ImportError::IndexOverflow {
                mesh: mesh.name.clone(),
                index,
            })
        })
        .collect()
}

fn build_part(mesh: &SceneMesh, skeleton: &Skeleton, options: &ImportOptions) -> Result<Part> {
    let influences = if options.skinned {
        Some(resolve_influences(mesh, skeleton, options.calibration)?)
    } else {
        None
    };

    Ok(Part {
        vertices: base_vertices(mesh),
        influences,
        indices: local_indices(mesh)?,
    })
}

/// Pairs vertices with their influences and collects the referenced bones.
fn finish_vertices(
    vertices: Vec<Vertex>,
    influences: Option<Vec<Influences>>,
) -> (MeshVertices, Vec<u32>) {
    let Some(influences) = influences else {
        return (MeshVertices::Unskinned(vertices), Vec::new());
    };

    let mut bones = BTreeSet::new();
    let skinned = vertices
        .into_iter()
        .zip(influences)
        .map(|(vertex, influences)| {
            bones.extend(influences.bones().iter().map(|&bone| u32::from(bone)));
            SkinnedVertex {
                bone_indices: influences.bone_indices,
                weights: influences.weights,
                ..SkinnedVertex::from_vertex(vertex)
            }
        })
        .collect();

    (MeshVertices::Skinned(skinned), bones.into_iter().collect())
}

/// Converts every scene mesh into its own [`Mesh`] with a single submesh, or
/// packs them all into one mesh named `model_name` when
/// [`ImportOptions::pack_meshes`] is set.
pub fn assemble_meshes(
    model_name: &str,
    scene_meshes: &[SceneMesh],
    skeleton: &Skeleton,
    options: &ImportOptions,
) -> Result<Vec<Mesh>> {
    if options.pack_meshes {
        assemble_packed(model_name, scene_meshes, skeleton, options).map(|mesh| vec![mesh])
    } else {
        scene_meshes
            .iter()
            .map(|scene_mesh| assemble_single(scene_mesh, skeleton, options))
            .collect()
    }
}

fn assemble_single(
    scene_mesh: &SceneMesh,
    skeleton: &Skeleton,
    options: &ImportOptions,
) -> Result<Mesh> {
    let part = build_part(scene_mesh, skeleton, options)?;
    let submesh = Submesh {
        name: scene_mesh.name.clone(),
        material_index: scene_mesh.material_index,
        index_count: count_u32("indices", part.indices.len())?,
        start_index: 0,
        vertex_offset: 0,
    };

    debug!(
        "Mesh '{}': {} vertices, {} indices",
        scene_mesh.name,
        part.vertices.len(),
        part.indices.len()
    );

    let (vertices, bone_influences) = finish_vertices(part.vertices, part.influences);
    Ok(Mesh {
        name: scene_mesh.name.clone(),
        submeshes: vec![submesh],
        indices: part.indices,
        vertices,
        bone_influences,
    })
}

/// Indices stay local to each submesh; `vertex_offset` locates its vertices
/// in the shared buffer.
fn assemble_packed(
    model_name: &str,
    scene_meshes: &[SceneMesh],
    skeleton: &Skeleton,
    options: &ImportOptions,
) -> Result<Mesh> {
    let mut submeshes = Vec::with_capacity(scene_meshes.len());
    let mut indices = Vec::new();
    let mut vertices = Vec::new();
    let mut influences = options.skinned.then(Vec::new);

    for scene_mesh in scene_meshes {
        let part = build_part(scene_mesh, skeleton, options)?;

        submeshes.push(Submesh {
            name: scene_mesh.name.clone(),
            material_index: scene_mesh.material_index,
            index_count: count_u32("indices", part.indices.len())?,
            start_index: count_u32("indices", indices.len())?,
            vertex_offset: count_u32("vertices", vertices.len())?,
        });

        indices.extend(part.indices);
        vertices.extend(part.vertices);
        if let (Some(all), Some(part)) = (influences.as_mut(), part.influences) {
            all.extend(part);
        }
    }

    debug!(
        "Packed {} meshes into '{}': {} vertices, {} indices",
        scene_meshes.len(),
        model_name,
        vertices.len(),
        indices.len()
    );

    let (vertices, bone_influences) = finish_vertices(vertices, influences);
    Ok(Mesh {
        name: model_name.to_string(),
        submeshes,
        indices,
        vertices,
        bone_influences,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{SceneBone, SceneNode, VertexWeight};
    use glam::Mat4;
    use pretty_assertions::assert_eq;

    fn quad(name: &str, material_index: u32) -> SceneMesh {
        SceneMesh {
            name: name.to_string(),
            material_index,
            positions: vec![Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::ONE],
            normals: vec![Vec3::Z; 4],
            tex_coords: Vec::new(),
            faces: vec![[0, 1, 2], [2, 1, 3]],
            bones: Vec::new(),
        }
    }

    fn triangle(name: &str) -> SceneMesh {
        SceneMesh {
            name: name.to_string(),
            positions: vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            faces: vec![[0, 1, 2]],
            ..SceneMesh::default()
        }
    }

    #[test]
    fn test_per_submesh_mode() {
        let meshes = [quad("hull", 0), triangle("sail")];
        let result =
            assemble_meshes("ship", &meshes, &Skeleton::default(), &ImportOptions::default())
                .unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].name, "hull");
        assert_eq!(result[0].indices, vec![0, 1, 2, 2, 1, 3]);
        assert_eq!(result[0].submeshes[0].index_count, 6);
        assert_eq!(result[1].submeshes[0].start_index, 0);
        assert_eq!(result[1].submeshes[0].vertex_offset, 0);
        assert!(!result[0].is_skinned());
    }

    #[test]
    fn test_missing_attributes_are_zero_filled() {
        let result = assemble_meshes(
            "ship",
            &[triangle("sail")],
            &Skeleton::default(),
            &ImportOptions::default(),
        )
        .unwrap();

        let MeshVertices::Unskinned(vertices) = &result[0].vertices else {
            panic!("expected unskinned vertices");
        };
        assert_eq!(vertices[1].position, Vec3::X);
        assert_eq!(vertices[1].normal, Vec3::ZERO);
        assert_eq!(vertices[1].tex_coord, Vec2::ZERO);
    }

    #[test]
    fn test_packed_mode_offsets() {
        let meshes = [quad("hull", 0), triangle("sail"), quad("deck", 2)];
        let options = ImportOptions::default().with_pack_meshes(true);
        let result = assemble_meshes("ship", &meshes, &Skeleton::default(), &options).unwrap();

        assert_eq!(result.len(), 1);
        let mesh = &result[0];
        assert_eq!(mesh.name, "ship");
        assert_eq!(mesh.vertex_count(), 11);
        assert_eq!(mesh.index_count(), 15);

        let offsets: Vec<_> = mesh
            .submeshes
            .iter()
            .map(|s| (s.start_index, s.index_count, s.vertex_offset, s.material_index))
            .collect();
        assert_eq!(offsets, vec![(0, 6, 0, 0), (6, 3, 4, 0), (9, 6, 7, 2)]);

        for submesh in &mesh.submeshes {
            let local_max = mesh.indices[submesh.index_range()].iter().max().copied().unwrap();
            assert!((submesh.vertex_offset + u32::from(local_max)) < mesh.vertex_count() as u32);
        }
        assert_eq!(&mesh.indices[6..9], &[0, 1, 2]);
    }

    #[test]
    fn test_index_overflow() {
        let mut mesh = triangle("huge");
        mesh.faces.push([0, 70_000, 1]);

        let err = assemble_meshes("m", &[mesh], &Skeleton::default(), &ImportOptions::default())
            .unwrap_err();
        assert!(matches!(
            err,
            ImportError::IndexOverflow { index: 70_000, .. }
        ));
    }

    #[test]
    fn test_skinned_bone_influences() {
        let root = SceneNode::default().with_children(vec![
            SceneNode::new("root_bone", Mat4::IDENTITY)
                .with_children(vec![SceneNode::new("tip", Mat4::IDENTITY)]),
        ]);
        let weight = |vertex_id, weight| VertexWeight { vertex_id, weight };
        let mut mesh = triangle("arm");
        mesh.bones = vec![
            SceneBone {
                name: "tip".to_string(),
                offset_matrix: Mat4::IDENTITY,
                weights: vec![weight(2, 1.0)],
            },
            SceneBone {
                name: "root_bone".to_string(),
                offset_matrix: Mat4::IDENTITY,
                weights: vec![weight(0, 1.0), weight(1, 0.5)],
            },
        ];
        let skeleton = Skeleton::build(&root, &[("root_bone", Mat4::IDENTITY), ("tip", Mat4::IDENTITY)]);

        let options = ImportOptions::default().with_skinned(true);
        let result = assemble_meshes("arm", &[mesh], &skeleton, &options).unwrap();
        let mesh = &result[0];

        assert!(mesh.is_skinned());
        assert_eq!(mesh.bone_influences, vec![0, 1]);
        let MeshVertices::Skinned(vertices) = &mesh.vertices else {
            panic!("expected skinned vertices");
        };
        assert_eq!(vertices[2].bone_indices, [1, 0, 0, 0]);
        assert_eq!(vertices[0].weights, [1.0, 0.0, 0.0, 0.0]);
        assert!(vertices[1].weight_sum() >= 1.0);
    }
}
