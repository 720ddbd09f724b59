//! Scene import for the RoX asset pipeline.
//!
//! A [`SceneImporter`] turns a source file into the plain scene graph of
//! [`scene`]. From there the skeleton is extracted in hierarchy order, vertex
//! weights are packed into four slots per vertex, scene meshes become model
//! meshes and submeshes, and animation channels become one keyframe track per
//! bone.
//!
//! ```no_run
//! use rox_import::{ImportOptions, import_animations, import_model};
//! use rox_model::MaterialRef;
//!
//! # fn main() -> rox_import::Result<()> {
//! let options = ImportOptions::default().with_skinned(true);
//! let model = import_model("knight.gltf", MaterialRef::new("knight"), &options)?;
//! model.save("knight.modl")?;
//!
//! for (name, animation) in import_animations("knight.gltf")? {
//!     animation.save(format!("{name}.anim"))?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod animation;
pub mod assembler;
pub mod error;
pub mod gltf_scene;
pub mod options;
pub mod scene;
pub mod skeleton;
pub mod skinning;

use std::collections::BTreeMap;
use std::path::Path;

use log::{info, warn};
use rox_model::{Animation, MaterialRef, Model};

pub use error::{ImportError, Result};
pub use gltf_scene::GltfImporter;
pub use options::{ImportOptions, WeightCalibration};
pub use scene::{ImportScene, SceneImporter};
pub use skeleton::Skeleton;

/// Name given to a model: the file stem of its source.
fn model_name(path: &Path) -> String {
    path.file_stem()
        .map_or_else(|| "model".to_string(), |stem| stem.to_string_lossy().into_owned())
}

/// Imports a glTF file as a [`Model`] bound to `material`.
pub fn import_model<P: AsRef<Path>>(
    path: P,
    material: MaterialRef,
    options: &ImportOptions,
) -> Result<Model> {
    import_model_with(&GltfImporter::new(), path, material, options)
}

/// Imports a model through any [`SceneImporter`].
pub fn import_model_with<I, P>(
    importer: &I,
    path: P,
    material: MaterialRef,
    options: &ImportOptions,
) -> Result<Model>
where
    I: SceneImporter + ?Sized,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let scene = importer.import(path)?;
    build_model(&scene, &model_name(path), material, options)
}

/// Builds a [`Model`] from an already imported scene.
pub fn build_model(
    scene: &ImportScene,
    name: &str,
    material: MaterialRef,
    options: &ImportOptions,
) -> Result<Model> {
    let skeleton = Skeleton::from_scene(scene);
    let meshes = assembler::assemble_meshes(name, &scene.meshes, &skeleton, options)?;

    let model = Model {
        name: name.to_string(),
        bones: skeleton.bones,
        bone_matrices: skeleton.bone_matrices,
        inverse_bind_matrices: skeleton.inverse_bind_matrices,
        meshes,
        materials: vec![material],
    };

    info!(
        "Built model '{}': {} bones, {} meshes, {} vertices",
        model.name,
        model.num_bones(),
        model.num_meshes(),
        model.vertex_count()
    );
    Ok(model)
}

/// Imports every clip of a glTF file, keyed by clip name.
pub fn import_animations<P: AsRef<Path>>(path: P) -> Result<BTreeMap<String, Animation>> {
    import_animations_with(&GltfImporter::new(), path)
}

/// Imports every clip through any [`SceneImporter`].
pub fn import_animations_with<I, P>(importer: &I, path: P) -> Result<BTreeMap<String, Animation>>
where
    I: SceneImporter + ?Sized,
    P: AsRef<Path>,
{
    let scene = importer.import(path.as_ref())?;
    Ok(build_animations(&scene))
}

/// Normalizes the clips of an already imported scene. Unnamed clips are
/// called `clip{index}`.
pub fn build_animations(scene: &ImportScene) -> BTreeMap<String, Animation> {
    let skeleton = Skeleton::for_animations(scene);
    let mut animations = BTreeMap::new();

    for (index, clip) in scene.animations.iter().enumerate() {
        let name = if clip.name.is_empty() {
            format!("clip{index}")
        } else {
            clip.name.clone()
        };
        let animation = animation::normalize_animation(name.clone(), clip, &skeleton);
        if animations.insert(name, animation).is_some() {
            warn!("Clip {index} replaces an earlier clip with the same name");
        }
    }

    info!(
        "Built {} animations over {} bones",
        animations.len(),
        skeleton.len()
    );
    animations
}
