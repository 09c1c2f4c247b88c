//! In-memory project store.
//!
//! Holds project folder trees built with a small builder API. Download URLs
//! are synthetic but deterministic, so manifests built from a `MemoryStore`
//! are byte-stable across runs.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};

use super::{
    is_project_id, join_folder, FileHandle, ProjectInfo, ProjectStore, StoreError, StoreResult,
};

/// Base of the synthetic download URLs.
const URL_BASE: &str = "https://dl.example.org";

#[derive(Debug, Default)]
struct MemoryProject {
    name: String,
    folders: BTreeSet<String>,
    files: BTreeMap<String, Vec<FileHandle>>,
}

/// A [`ProjectStore`] backed by in-memory folder trees.
#[derive(Debug, Default)]
pub struct MemoryStore {
    projects: BTreeMap<String, MemoryProject>,
    next_file_id: usize,
    failing_folder: Option<String>,
    probes: RefCell<Vec<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an empty project containing only the root folder.
    pub fn with_project(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        let mut project = MemoryProject {
            name: name.into(),
            ..Default::default()
        };
        project.folders.insert("/".to_string());
        self.projects.insert(id.into(), project);
        self
    }

    /// Add a folder (and its missing parents) to a project.
    pub fn with_folder(mut self, project_id: &str, path: &str) -> Self {
        if let Some(project) = self.projects.get_mut(project_id) {
            insert_folder(project, path);
        }
        self
    }

    /// Add a file to a folder, creating the folder if needed.
    pub fn with_file(mut self, project_id: &str, folder: &str, name: &str) -> Self {
        self.next_file_id += 1;
        let handle = FileHandle::new(format!("file-{:04}", self.next_file_id), name);
        if let Some(project) = self.projects.get_mut(project_id) {
            insert_folder(project, folder);
            project
                .files
                .entry(normalize(folder))
                .or_default()
                .push(handle);
        }
        self
    }

    /// Make every listing of `folder` fail with a lookup error.
    pub fn failing_on(mut self, folder: &str) -> Self {
        self.failing_folder = Some(normalize(folder));
        self
    }

    /// Names passed to `find_file_by_exact_name`, in call order.
    pub fn probes(&self) -> Vec<String> {
        self.probes.borrow().clone()
    }

    fn project(&self, project: &ProjectInfo) -> StoreResult<&MemoryProject> {
        self.projects
            .get(&project.id)
            .ok_or_else(|| StoreError::ProjectNotFound(project.id.clone()))
    }

    fn check_failure(&self, folder: &str) -> StoreResult<()> {
        match &self.failing_folder {
            Some(failing) if *failing == normalize(folder) => {
                Err(StoreError::Lookup(format!("listing {} failed", failing)))
            }
            _ => Ok(()),
        }
    }
}

fn normalize(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

fn insert_folder(project: &mut MemoryProject, path: &str) {
    let mut current = "/".to_string();
    for part in normalize(path).split('/').filter(|p| !p.is_empty()) {
        current = join_folder(&current, part);
        project.folders.insert(current.clone());
    }
}

impl ProjectStore for MemoryStore {
    fn list_subfolders(&self, project: &ProjectInfo, folder: &str) -> StoreResult<Vec<String>> {
        self.check_failure(folder)?;
        let stored = self.project(project)?;
        let parent = normalize(folder);
        Ok(stored
            .folders
            .iter()
            .filter(|path| path.as_str() != "/")
            .filter_map(|path| {
                let (dir, name) = path.rsplit_once('/')?;
                let dir = if dir.is_empty() { "/" } else { dir };
                (dir == parent).then(|| name.to_string())
            })
            .collect())
    }

    fn list_files(&self, project: &ProjectInfo, folder: &str) -> StoreResult<Vec<FileHandle>> {
        self.check_failure(folder)?;
        let stored = self.project(project)?;
        Ok(stored
            .files
            .get(&normalize(folder))
            .cloned()
            .unwrap_or_default())
    }

    fn find_file_by_exact_name(
        &self,
        project: &ProjectInfo,
        folder: &str,
        name: &str,
    ) -> StoreResult<Option<FileHandle>> {
        self.probes.borrow_mut().push(name.to_string());
        Ok(self
            .list_files(project, folder)?
            .into_iter()
            .find(|f| f.name == name))
    }

    fn mint_download_url(
        &self,
        project: &ProjectInfo,
        file: &FileHandle,
        duration_secs: u64,
        suggested_name: &str,
    ) -> StoreResult<String> {
        Ok(format!(
            "{}/{}/{}/{}?duration={}",
            URL_BASE, project.id, file.id, suggested_name, duration_secs
        ))
    }

    fn list_projects(&self) -> StoreResult<Vec<ProjectInfo>> {
        Ok(self
            .projects
            .iter()
            .map(|(id, p)| ProjectInfo::new(id.clone(), p.name.clone()))
            .collect())
    }

    fn resolve_project(&self, id_or_name: &str) -> StoreResult<ProjectInfo> {
        if is_project_id(id_or_name) {
            return self
                .projects
                .get(id_or_name)
                .map(|p| ProjectInfo::new(id_or_name, p.name.clone()))
                .ok_or_else(|| StoreError::ProjectNotFound(id_or_name.to_string()));
        }

        let matches: Vec<ProjectInfo> = self
            .list_projects()?
            .into_iter()
            .filter(|p| p.name == id_or_name)
            .collect();
        match matches.len() {
            0 => Err(StoreError::ProjectNotFound(id_or_name.to_string())),
            1 => Ok(matches[0].clone()),
            count => Err(StoreError::AmbiguousProject {
                name: id_or_name.to_string(),
                count,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project() -> ProjectInfo {
        ProjectInfo::new("project-1", "Demo")
    }

    #[test]
    fn test_subfolders_are_direct_children_only() {
        let store = MemoryStore::new()
            .with_project("project-1", "Demo")
            .with_folder("project-1", "/a/b/c")
            .with_folder("project-1", "/d");

        let mut root = store.list_subfolders(&project(), "/").unwrap();
        root.sort();
        assert_eq!(root, vec!["a", "d"]);
        assert_eq!(store.list_subfolders(&project(), "/a").unwrap(), vec!["b"]);
        assert!(store.list_subfolders(&project(), "/d").unwrap().is_empty());
    }

    #[test]
    fn test_files_keep_insertion_order() {
        let store = MemoryStore::new()
            .with_project("project-1", "Demo")
            .with_file("project-1", "/", "z.bam")
            .with_file("project-1", "/", "a.bam");

        let names: Vec<String> = store
            .list_files(&project(), "/")
            .unwrap()
            .into_iter()
            .map(|f| f.name)
            .collect();
        assert_eq!(names, vec!["z.bam", "a.bam"]);
    }

    #[test]
    fn test_find_exact_name_records_probe() {
        let store = MemoryStore::new()
            .with_project("project-1", "Demo")
            .with_file("project-1", "/x", "s.bam.bai");

        assert!(store
            .find_file_by_exact_name(&project(), "/x", "s.bam.bai")
            .unwrap()
            .is_some());
        assert!(store
            .find_file_by_exact_name(&project(), "/", "s.bam.bai")
            .unwrap()
            .is_none());
        assert_eq!(store.probes(), vec!["s.bam.bai", "s.bam.bai"]);
    }

    #[test]
    fn test_failing_folder() {
        let store = MemoryStore::new()
            .with_project("project-1", "Demo")
            .with_folder("project-1", "/broken")
            .failing_on("/broken/");

        assert!(store.list_files(&project(), "/broken").is_err());
        assert!(store.list_files(&project(), "/").is_ok());
    }

    #[test]
    fn test_resolve_by_id_and_name() {
        let store = MemoryStore::new()
            .with_project("project-1", "Demo")
            .with_project("project-2", "Twin")
            .with_project("project-3", "Twin");

        assert_eq!(store.resolve_project("project-1").unwrap().name, "Demo");
        assert_eq!(store.resolve_project("Demo").unwrap().id, "project-1");
        assert!(matches!(
            store.resolve_project("Twin"),
            Err(StoreError::AmbiguousProject { count: 2, .. })
        ));
        assert!(matches!(
            store.resolve_project("project-9"),
            Err(StoreError::ProjectNotFound(_))
        ));
    }
}
