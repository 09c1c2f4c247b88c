//! Error types for manifest construction.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::store::StoreError;

/// Result type for manifest operations.
pub type ManifestResult<T> = Result<T, ManifestError>;

/// Errors that can occur while building or writing a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// A remote lookup failed during the walk.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The project name cannot be used as a file name.
    #[error("project name '{0}' cannot be used as a manifest file name")]
    InvalidName(String),

    /// The manifest file could not be written.
    #[error("failed to write {}: {source}", path.display())]
    WriteFailed { path: PathBuf, source: io::Error },
}
