//! Packed model and animation files for the RoX asset pipeline.
//!
//! A `.modl` file stores a skeleton (bones, bind and inverse bind matrices)
//! and meshes made of submeshes over shared 16-bit index and vertex buffers.
//! A `.anim` file stores one keyframe track per bone of a model.
//!
//! ```no_run
//! use rox_model::{Animation, MaterialRef, Model};
//!
//! # fn main() -> rox_model::Result<()> {
//! let model = Model::load("knight.modl", MaterialRef::new("knight"))?;
//! println!("{}: {} bones, {} meshes", model.name, model.num_bones(), model.num_meshes());
//!
//! let walk = Animation::load("walk.anim")?;
//! println!("{} lasts {:.2}s", walk.name, walk.duration());
//! # Ok(())
//! # }
//! ```

pub mod anim;
pub mod animation;
pub mod error;
pub mod header;
pub mod modl;
pub mod model;
pub mod validation;

pub use anim::{AnimReader, AnimWriter};
pub use animation::{Animation, BoneAnimation, Keyframe};
pub use error::{ModelError, Result};
pub use modl::{ModlReader, ModlWriter};
pub use model::{Bone, MaterialRef, Mesh, MeshVertices, Model, SkinnedVertex, Submesh, Vertex};
pub use validation::{ValidationReport, validate_animation, validate_model};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
