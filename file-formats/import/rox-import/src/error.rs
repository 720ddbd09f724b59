use std::path::PathBuf;

use rox_model::ModelError;
use thiserror::Error;

/// Error types for scene import
#[derive(Error, Debug)]
pub enum ImportError {
    /// The scene importer could not read the source file
    #[error("Failed to import scene {}: {message}", path.display())]
    Scene { path: PathBuf, message: String },

    /// A bone index does not fit the u8 bone slot of a skinned vertex
    #[error("Bone '{bone}' has index {index}, skinned vertices address at most 256 bones")]
    BoneIndexOverflow { bone: String, index: u32 },

    /// A vertex index does not fit the 16-bit index buffer
    #[error("Mesh '{mesh}' uses vertex index {index}, which does not fit a 16-bit index buffer")]
    IndexOverflow { mesh: String, index: u32 },

    /// Building or writing the model failed
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Result type using ImportError
pub type Result<T> = std::result::Result<T, ImportError>;
