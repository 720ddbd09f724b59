use std::io;
use std::path::PathBuf;

use rox_data::error::RoxDataError;
use thiserror::Error;

/// Error types for RoX model and animation files
#[derive(Error, Debug)]
pub enum ModelError {
    /// I/O error during reading or writing
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file could not be opened for reading
    #[error("Failed to open {}: {source}", path.display())]
    FileOpen { path: PathBuf, source: io::Error },

    /// The file could not be opened for writing
    #[error("Failed to create {}: {source}", path.display())]
    FileCreate { path: PathBuf, source: io::Error },

    /// Field or payload decoding failed
    #[error(transparent)]
    Data(#[from] RoxDataError),

    /// Index buffer uses an element width other than 16 bits
    #[error("Unsupported index size: {0} bytes (only 16-bit indices are supported)")]
    UnsupportedIndexSize(u32),

    /// Vertex buffer stride does not match the mesh's vertex type
    #[error("Vertex size mismatch in mesh '{mesh}': expected {expected} bytes, found {found}")]
    VertexSizeMismatch {
        mesh: String,
        expected: u32,
        found: u32,
    },

    /// Animation has more tracks than the one-byte count can describe
    #[error("Animation '{name}' has {count} bone tracks, the format stores at most 255")]
    TooManyTracks { name: String, count: usize },

    /// A count does not fit its on-disk field
    #[error("Too many {what}: {count}")]
    CountOverflow { what: &'static str, count: usize },

    /// Error during validation
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type using ModelError
pub type Result<T> = std::result::Result<T, ModelError>;
