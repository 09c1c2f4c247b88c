//! Registered-project cache.
//!
//! The set of registered projects is whatever `*.xml` manifests exist in the
//! registry folder; the cache is rebuilt from disk at the start of every
//! session and never persisted.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};

use super::{RegistryError, RegistryResult};
use crate::manifest::MANIFEST_EXTENSION;

/// List the manifest files directly inside `folder`.
pub fn manifest_files(folder: &Path) -> RegistryResult<Vec<PathBuf>> {
    let folder_str = folder
        .to_str()
        .ok_or_else(|| RegistryError::InvalidPath(folder.display().to_string()))?;
    let pattern = format!("{}/*.{}", Pattern::escape(folder_str), MANIFEST_EXTENSION);

    // Hidden files are not manifests.
    let options = MatchOptions {
        require_literal_leading_dot: true,
        ..MatchOptions::new()
    };
    let paths = glob::glob_with(&pattern, options)
        .map_err(|e| RegistryError::InvalidPath(e.to_string()))?;
    let mut files = Vec::new();
    for entry in paths {
        let path = entry.map_err(|e| RegistryError::ReadFailed {
            path: e.path().to_path_buf(),
            source: e.into(),
        })?;
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Names of projects that already have a manifest in the registry folder.
#[derive(Debug, Clone, Default)]
pub struct RegistryCache {
    projects: BTreeSet<String>,
}

impl RegistryCache {
    /// Build the cache from the manifests present in `folder`.
    pub fn scan(folder: &Path) -> RegistryResult<Self> {
        let projects = manifest_files(folder)?
            .iter()
            .filter_map(|path| path.file_stem())
            .filter_map(|stem| stem.to_str())
            .map(str::to_string)
            .collect();
        Ok(Self { projects })
    }

    pub fn contains(&self, project_name: &str) -> bool {
        self.projects.contains(project_name)
    }

    pub fn insert(&mut self, project_name: impl Into<String>) {
        self.projects.insert(project_name.into());
    }

    pub fn clear(&mut self) {
        self.projects.clear();
    }

    /// Project names in sorted order.
    pub fn names(&self) -> Vec<String> {
        self.projects.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }
}
