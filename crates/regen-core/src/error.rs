//! Error types for regen-core

use std::path::PathBuf;

/// Result type for regen-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in regen-core operations.
///
/// Merging itself is infallible; these cover persistence and configuration.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Registry snapshot parsed but holds invalid data
    #[error("Checksum registry at {path} is corrupt: {message}")]
    CorruptRegistry { path: PathBuf, message: String },

    /// Unknown conflict policy name
    #[error("Invalid conflict policy '{0}' (expected skip, write or backup)")]
    InvalidPolicy(String),

    /// Filesystem error from regen-fs
    #[error(transparent)]
    Fs(#[from] regen_fs::Error),
}
