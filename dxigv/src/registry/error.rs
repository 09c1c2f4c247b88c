//! Error types for registry operations.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::manifest::ManifestError;
use crate::store::StoreError;

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Errors that can occur while maintaining a registry folder.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A remote lookup failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A manifest could not be built or written.
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// Failed to read a file or directory.
    #[error("failed to read {}: {source}", path.display())]
    ReadFailed { path: PathBuf, source: io::Error },

    /// Failed to write a file.
    #[error("failed to write {}: {source}", path.display())]
    WriteFailed { path: PathBuf, source: io::Error },

    /// Failed to create a directory.
    #[error("failed to create directory {}: {source}", path.display())]
    CreateDirFailed { path: PathBuf, source: io::Error },

    /// Failed to remove a file.
    #[error("failed to remove {}: {source}", path.display())]
    RemoveFailed { path: PathBuf, source: io::Error },

    /// Failed to create an alias symlink.
    #[error("failed to link {} -> {}: {reason}", link.display(), target.display())]
    SymlinkFailed {
        link: PathBuf,
        target: PathBuf,
        reason: String,
    },

    /// Group names must be usable verbatim in URLs and paths.
    #[error("invalid group name '{0}': must be a single URL-safe path segment")]
    InvalidGroup(String),

    /// Reference genome id not supported by the registry.
    #[error("unsupported reference genome '{0}' (expected one of: 1kg_v37, mm10, hg19)")]
    UnsupportedGenome(String),

    /// A path is not valid UTF-8 or is outside the registry folder.
    #[error("invalid path: {0}")]
    InvalidPath(String),
}
