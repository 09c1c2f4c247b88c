//! Error types for remote project lookups.

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// A failed call to the remote platform.
///
/// Any of these aborts the manifest build of the current project.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The HTTP request could not be completed.
    #[error("request to {url} failed: {reason}")]
    Http { url: String, reason: String },

    /// The API answered with a non-success status.
    #[error("{url} returned HTTP {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    /// The API answered with a body that could not be decoded.
    #[error("unexpected response from {url}: {reason}")]
    InvalidResponse { url: String, reason: String },

    /// No visible project matches the given id or name.
    #[error("project not found: {0}")]
    ProjectNotFound(String),

    /// More than one visible project carries the given name.
    #[error("project name '{name}' is ambiguous ({count} matches)")]
    AmbiguousProject { name: String, count: usize },

    /// No credentials are available for the platform.
    #[error("no DNAnexus auth token configured (set dnanexus.auth_token or DX_SECURITY_CONTEXT)")]
    MissingToken,

    /// The HTTP client could not be built.
    #[error("failed to create HTTP client: {0}")]
    Client(String),

    /// Injected or backend-specific failure.
    #[error("lookup failed: {0}")]
    Lookup(String),
}

impl StoreError {
    /// Whether retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            StoreError::Http { .. } => true,
            StoreError::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}
