//! Stream codec for `.modl` files.

use log::{debug, warn};
use rox_data::prelude::*;

use crate::error::{ModelError, Result};
use crate::header::{
    BoneHeader, INDEX_SIZE, IndexBufferHeader, MODL_VERSION, MeshHeader, ModelHeader, NO_PARENT,
    SKINNED_VERTEX_SIZE, SubmeshHeader, VERTEX_SIZE, VertexBufferHeader,
};
use crate::model::{Bone, MaterialRef, Mesh, MeshVertices, Model, Submesh};

const MATRIX_SIZE: u64 = 64;

/// Converts an in-memory count to its `u32` field.
pub(crate) fn count_u32(what: &'static str, count: usize) -> Result<u32> {
    u32::try_from(count).map_err(|_| ModelError::CountOverflow { what, count })
}

/// Byte length of `count` records of `stride` bytes.
pub(crate) fn payload_len(what: &'static str, count: u64, stride: u64) -> Result<u64> {
    count
        .checked_mul(stride)
        .ok_or(ModelError::CountOverflow {
            what,
            count: count as usize,
        })
}

/// Writes a [`Model`] in the `.modl` layout.
#[derive(Debug)]
pub struct ModlWriter<W: Write> {
    writer: W,
}

impl<W: Write> ModlWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    pub fn write(&mut self, model: &Model) -> Result<()> {
        let bone_count = model.bones.len();
        for (field, len) in [
            ("bone matrices", model.bone_matrices.len()),
            ("inverse bind matrices", model.inverse_bind_matrices.len()),
        ] {
            if len != bone_count {
                return Err(ModelError::Validation(format!(
                    "{len} {field} for {bone_count} bones"
                )));
            }
        }

        let header = ModelHeader {
            version: MODL_VERSION,
            name_len: name_len(&model.name)?,
            bone_count: count_u32("bones", bone_count)?,
            mesh_count: count_u32("meshes", model.meshes.len())?,
            material_count: count_u32("materials", model.materials.len())?,
        };
        self.writer.rox_write(&header)?;
        self.writer.write_name(&model.name)?;

        for bone in &model.bones {
            let header = BoneHeader {
                name_len: name_len(&bone.name)?,
                parent_index: bone.parent.unwrap_or(NO_PARENT),
            };
            self.writer.rox_write(&header)?;
            self.writer.write_name(&bone.name)?;
        }

        self.writer.write_records(&model.bone_matrices)?;
        self.writer.write_records(&model.inverse_bind_matrices)?;

        for mesh in &model.meshes {
            self.write_mesh(mesh)?;
        }

        debug!(
            "Wrote model '{}': {} bones, {} meshes",
            model.name,
            model.bones.len(),
            model.meshes.len()
        );
        Ok(())
    }

    fn write_mesh(&mut self, mesh: &Mesh) -> Result<()> {
        let header = MeshHeader {
            is_skinned: u8::from(mesh.is_skinned()),
            name_len: name_len(&mesh.name)?,
            bone_influence_count: count_u32("bone influences", mesh.bone_influences.len())?,
            submesh_count: count_u32("submeshes", mesh.submeshes.len())?,
        };
        self.writer.rox_write(&header)?;
        self.writer.write_name(&mesh.name)?;
        self.writer.write_records(&mesh.bone_influences)?;

        for submesh in &mesh.submeshes {
            let header = SubmeshHeader {
                name_len: name_len(&submesh.name)?,
                material_index: submesh.material_index,
                index_count: submesh.index_count,
                start_index: submesh.start_index,
                vertex_offset: submesh.vertex_offset,
            };
            self.writer.rox_write(&header)?;
            self.writer.write_name(&submesh.name)?;
        }

        self.writer.rox_write(&IndexBufferHeader {
            index_size: INDEX_SIZE,
            index_count: mesh.indices.len() as u64,
        })?;
        self.writer.write_records(&mesh.indices)?;

        self.writer.rox_write(&VertexBufferHeader {
            vertex_size: mesh.vertices.vertex_size(),
            vertex_count: mesh.vertices.len() as u64,
        })?;
        match &mesh.vertices {
            MeshVertices::Unskinned(vertices) => self.writer.write_records(vertices)?,
            MeshVertices::Skinned(vertices) => self.writer.write_records(vertices)?,
        }

        Ok(())
    }
}

/// Reads a [`Model`] from the `.modl` layout.
///
/// Counts are trusted; structural checks live in [`crate::validation`].
/// Material slots are not stored in the file, so each one is bound to the
/// reference given here.
#[derive(Debug)]
pub struct ModlReader<R: Read> {
    reader: R,
    material: MaterialRef,
}

impl<R: Read> ModlReader<R> {
    pub fn new(reader: R, material: MaterialRef) -> Self {
        Self { reader, material }
    }

    pub fn read(&mut self) -> Result<Model> {
        let header: ModelHeader = self.reader.rox_read()?;
        if header.version != MODL_VERSION {
            warn!(
                "Model version {} differs from supported version {}, reading anyway",
                header.version, MODL_VERSION
            );
        }

        let name = self.reader.read_name(header.name_len, "model")?;

        let mut bones = Vec::new();
        for _ in 0..header.bone_count {
            let bone_header: BoneHeader = self.reader.rox_read()?;
            let bone_name = self.reader.read_name(bone_header.name_len, "bone")?;
            let parent = (bone_header.parent_index != NO_PARENT).then_some(bone_header.parent_index);
            bones.push(Bone::new(bone_name, parent));
        }

        let count = u64::from(header.bone_count);
        let matrix_bytes = payload_len("bones", count, MATRIX_SIZE)?;
        let bytes = self.reader.read_payload(matrix_bytes)?;
        let bone_matrices = decode_records(&bytes, bones.len())?;
        let bytes = self.reader.read_payload(matrix_bytes)?;
        let inverse_bind_matrices = decode_records(&bytes, bones.len())?;

        let mut meshes = Vec::new();
        for _ in 0..header.mesh_count {
            meshes.push(self.read_mesh()?);
        }

        let material_count = header.material_count as usize;
        let mut materials = Vec::new();
        materials
            .try_reserve_exact(material_count)
            .map_err(|_| ModelError::CountOverflow {
                what: "materials",
                count: material_count,
            })?;
        materials.resize(material_count, self.material.clone());

        debug!(
            "Read model '{}': {} bones, {} meshes, {} materials",
            name,
            bones.len(),
            meshes.len(),
            materials.len()
        );

        Ok(Model {
            name,
            bones,
            bone_matrices,
            inverse_bind_matrices,
            meshes,
            materials,
        })
    }

    fn read_mesh(&mut self) -> Result<Mesh> {
        let header: MeshHeader = self.reader.rox_read()?;
        let name = self.reader.read_name(header.name_len, "mesh")?;

        let count = u64::from(header.bone_influence_count);
        let bytes = self
            .reader
            .read_payload(payload_len("bone influences", count, 4)?)?;
        let bone_influences = decode_records(&bytes, count as usize)?;

        let mut submeshes = Vec::new();
        for _ in 0..header.submesh_count {
            let submesh_header: SubmeshHeader = self.reader.rox_read()?;
            submeshes.push(Submesh {
                name: self.reader.read_name(submesh_header.name_len, "submesh")?,
                material_index: submesh_header.material_index,
                index_count: submesh_header.index_count,
                start_index: submesh_header.start_index,
                vertex_offset: submesh_header.vertex_offset,
            });
        }

        let index_header: IndexBufferHeader = self.reader.rox_read()?;
        if index_header.index_size != INDEX_SIZE {
            return Err(ModelError::UnsupportedIndexSize(index_header.index_size));
        }
        let bytes = self.reader.read_payload(payload_len(
            "indices",
            index_header.index_count,
            u64::from(INDEX_SIZE),
        )?)?;
        let indices = decode_records(&bytes, index_header.index_count as usize)?;

        let skinned = header.is_skinned != 0;
        let expected = if skinned { SKINNED_VERTEX_SIZE } else { VERTEX_SIZE };
        let vertex_header: VertexBufferHeader = self.reader.rox_read()?;
        if vertex_header.vertex_size != expected {
            return Err(ModelError::VertexSizeMismatch {
                mesh: name,
                expected,
                found: vertex_header.vertex_size,
            });
        }
        let count = vertex_header.vertex_count;
        let bytes = self
            .reader
            .read_payload(payload_len("vertices", count, u64::from(expected))?)?;
        let vertices = if skinned {
            MeshVertices::Skinned(decode_records(&bytes, count as usize)?)
        } else {
            MeshVertices::Unskinned(decode_records(&bytes, count as usize)?)
        };

        Ok(Mesh {
            name,
            submeshes,
            indices,
            vertices,
            bone_influences,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Vertex;
    use std::io::Cursor;

    fn single_vertex_model() -> Model {
        Model {
            name: "modl".to_string(),
            meshes: vec![Mesh {
                name: "mesh".to_string(),
                submeshes: vec![Submesh {
                    name: "submesh".to_string(),
                    index_count: 1,
                    ..Submesh::default()
                }],
                indices: vec![0],
                vertices: MeshVertices::Unskinned(vec![Vertex::default()]),
                bone_influences: Vec::new(),
            }],
            materials: vec![MaterialRef::default()],
            ..Model::default()
        }
    }

    fn encode(model: &Model) -> Vec<u8> {
        let mut writer = ModlWriter::new(Vec::new());
        writer.write(model).unwrap();
        writer.into_inner()
    }

    // header(18) + name(4) + mesh header(13) + name(4) + submesh header(20)
    // + name(7) + index header(12) + one index(2)
    const VERTEX_HEADER_OFFSET: usize = 18 + 4 + 13 + 4 + 20 + 7 + 12 + 2;
    const INDEX_HEADER_OFFSET: usize = 18 + 4 + 13 + 4 + 20 + 7;

    #[test]
    fn test_encoded_size() {
        let data = encode(&single_vertex_model());
        assert_eq!(data.len(), VERTEX_HEADER_OFFSET + 12 + 32);
        assert_eq!(&data[0..2], &MODL_VERSION.to_le_bytes());
        assert_eq!(&data[18..22], b"modl");
    }

    #[test]
    fn test_unsupported_index_size() {
        let mut data = encode(&single_vertex_model());
        data[INDEX_HEADER_OFFSET..INDEX_HEADER_OFFSET + 4].copy_from_slice(&4u32.to_le_bytes());

        let err = ModlReader::new(Cursor::new(data), MaterialRef::default())
            .read()
            .unwrap_err();
        assert!(matches!(err, ModelError::UnsupportedIndexSize(4)));
    }

    #[test]
    fn test_vertex_size_mismatch() {
        let mut data = encode(&single_vertex_model());
        data[VERTEX_HEADER_OFFSET..VERTEX_HEADER_OFFSET + 4]
            .copy_from_slice(&SKINNED_VERTEX_SIZE.to_le_bytes());

        let err = ModlReader::new(Cursor::new(data), MaterialRef::default())
            .read()
            .unwrap_err();
        match err {
            ModelError::VertexSizeMismatch {
                mesh,
                expected,
                found,
            } => {
                assert_eq!(mesh, "mesh");
                assert_eq!(expected, VERTEX_SIZE);
                assert_eq!(found, SKINNED_VERTEX_SIZE);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_other_version_is_still_read() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut data = encode(&single_vertex_model());
        data[0..2].copy_from_slice(&7u16.to_le_bytes());

        let model = ModlReader::new(Cursor::new(data), MaterialRef::default())
            .read()
            .unwrap();
        assert_eq!(model.name, "modl");
    }

    #[test]
    fn test_truncated_file() {
        let mut data = encode(&single_vertex_model());
        data.truncate(data.len() - 10);

        let err = ModlReader::new(Cursor::new(data), MaterialRef::default())
            .read()
            .unwrap_err();
        assert!(matches!(err, ModelError::Data(_)));
    }

    #[test]
    fn test_material_count_beyond_memory() {
        let header = ModelHeader {
            version: MODL_VERSION,
            name_len: 0,
            bone_count: 0,
            mesh_count: 0,
            material_count: u32::MAX,
        };
        let mut data = Vec::new();
        data.rox_write(&header).unwrap();
        assert_eq!(data.len(), 18);

        let err = ModlReader::new(Cursor::new(data), MaterialRef::default())
            .read()
            .unwrap_err();
        assert!(matches!(
            err,
            ModelError::CountOverflow {
                what: "materials",
                ..
            }
        ));
    }

    #[test]
    fn test_matrix_count_must_match_bones() {
        let mut model = single_vertex_model();
        model.bones.push(Bone::new("root", None));

        let err = ModlWriter::new(Vec::new()).write(&model).unwrap_err();
        assert!(matches!(err, ModelError::Validation(_)));
    }

    #[test]
    fn test_materials_bound_to_reference() {
        let mut model = single_vertex_model();
        model.materials = vec![MaterialRef::new("a"), MaterialRef::new("b")];
        let data = encode(&model);

        let read = ModlReader::new(Cursor::new(data), MaterialRef::new("stone"))
            .read()
            .unwrap();
        assert_eq!(read.materials, vec![MaterialRef::new("stone"); 2]);
    }
}
