//! Remote project storage abstraction.
//!
//! Everything the manifest builder needs from the cloud platform goes through
//! the [`ProjectStore`] trait: folder listings, exact-name file lookups,
//! pre-authenticated URL minting and project discovery.
//!
//! # Implementations
//!
//! - [`DxClient`] - DNAnexus JSON API over blocking HTTP
//! - [`MemoryStore`] - in-memory project trees for tests and dry runs

mod dnanexus;
mod error;
mod memory;

pub use dnanexus::{DxClient, DxClientConfig, DEFAULT_API_SERVER};
pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;

/// Identifier prefix of DNAnexus project ids.
pub const PROJECT_ID_PREFIX: &str = "project-";

/// A remote project visible to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectInfo {
    /// Platform identifier, e.g. `project-BzPb25j0627bFJv6q9g81ZX5`.
    pub id: String,

    /// Display name; also the manifest file stem.
    pub name: String,
}

impl ProjectInfo {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A file object inside a project folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHandle {
    /// Platform identifier, e.g. `file-Bz6GbkQ0VGPv0fpqZZ6ZZGfx`.
    pub id: String,

    /// File name as stored on the platform.
    pub name: String,
}

impl FileHandle {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Returns true if the argument looks like a project id rather than a name.
pub fn is_project_id(id_or_name: &str) -> bool {
    id_or_name.starts_with(PROJECT_ID_PREFIX)
}

/// Read access to remote projects.
///
/// All calls are blocking. Any error is a lookup failure that aborts the
/// manifest build of the current project.
pub trait ProjectStore {
    /// Names (not paths) of the immediate sub-folders of `folder`.
    fn list_subfolders(&self, project: &ProjectInfo, folder: &str) -> StoreResult<Vec<String>>;

    /// Files directly inside `folder`, non-recursive.
    fn list_files(&self, project: &ProjectInfo, folder: &str) -> StoreResult<Vec<FileHandle>>;

    /// Look up a file by exact name directly inside `folder`.
    fn find_file_by_exact_name(
        &self,
        project: &ProjectInfo,
        folder: &str,
        name: &str,
    ) -> StoreResult<Option<FileHandle>>;

    /// Mint a pre-authenticated download URL valid for `duration_secs`.
    fn mint_download_url(
        &self,
        project: &ProjectInfo,
        file: &FileHandle,
        duration_secs: u64,
        suggested_name: &str,
    ) -> StoreResult<String>;

    /// Every project visible to the caller.
    fn list_projects(&self) -> StoreResult<Vec<ProjectInfo>>;

    /// Resolve a `project-…` id or a project name to a project.
    fn resolve_project(&self, id_or_name: &str) -> StoreResult<ProjectInfo>;
}

/// Join a folder path and a child name, collapsing the double slash at root.
pub fn join_folder(folder: &str, child: &str) -> String {
    format!("{}/{}", folder.trim_end_matches('/'), child)
}
