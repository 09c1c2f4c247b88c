//! Registry sessions: publishing project manifests into a registry folder.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::cache::{manifest_files, RegistryCache};
use super::layout::initialise_folder;
use super::merge::{merge_manifest_url, read_registry};
use super::url::manifest_url;
use super::{RegistryConfig, RegistryError, RegistryResult};
use crate::manifest::{build_manifest, write_manifest};
use crate::store::{ProjectInfo, ProjectStore, StoreError};

/// Remote projects whose name starts with this are never published.
pub const EXCLUDED_PROJECT_PREFIX: &str = "PIPELINE";

/// Remote projects whose name ends with this are never published.
pub const EXCLUDED_PROJECT_SUFFIX: &str = "resources";

/// Whether a remote project is eligible for publishing.
pub fn is_publishable(project_name: &str) -> bool {
    !project_name.starts_with(EXCLUDED_PROJECT_PREFIX)
        && !project_name.ends_with(EXCLUDED_PROJECT_SUFFIX)
}

/// Outcome of publishing one project.
#[derive(Debug, Clone)]
pub struct ProjectReport {
    pub project: ProjectInfo,

    /// Where the manifest was written.
    pub manifest_path: PathBuf,

    /// Registry URL of the manifest; `None` for standalone manifests.
    pub url: Option<String>,

    /// Resources in the manifest.
    pub resources: usize,

    /// Data files left out for lack of an index.
    pub skipped: usize,
}

/// Walk a project and write its manifest into `dir`, without any registry.
pub fn export_manifest<S: ProjectStore + ?Sized>(
    store: &S,
    id_or_name: &str,
    dir: &Path,
    url_validity_secs: u64,
) -> RegistryResult<ProjectReport> {
    let project = store.resolve_project(id_or_name)?;
    let tree = build_manifest(store, &project, url_validity_secs)?;
    let manifest_path = write_manifest(&tree, dir)?;
    info!(
        "Wrote {} ({}) to {}",
        project.name,
        project.id,
        manifest_path.display()
    );
    Ok(ProjectReport {
        resources: tree.resource_count(),
        skipped: tree.skipped.len(),
        project,
        manifest_path,
        url: None,
    })
}

/// An open registry folder for one reference genome.
///
/// Sessions are not guarded against concurrent runs on the same folder.
pub struct Registry<'s, S: ProjectStore + ?Sized> {
    config: RegistryConfig,
    store: &'s S,
    cache: RegistryCache,
}

impl<'s, S: ProjectStore + ?Sized> Registry<'s, S> {
    /// Prepare the registry folder and load the project cache.
    pub fn open(config: RegistryConfig, store: &'s S) -> RegistryResult<Self> {
        initialise_folder(&config)?;
        let cache = RegistryCache::scan(&config.folder())?;
        info!(
            folder = %config.folder().display(),
            genome = %config.reference_genome,
            projects = cache.len(),
            "Opened registry"
        );
        Ok(Self {
            config,
            store,
            cache,
        })
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Local registry folder.
    pub fn folder(&self) -> PathBuf {
        self.config.folder()
    }

    /// Path of the registry file.
    pub fn registry_path(&self) -> PathBuf {
        self.config.registry_path()
    }

    /// Registered project names, sorted.
    pub fn projects(&self) -> Vec<String> {
        self.cache.names()
    }

    /// URLs currently listed in the registry file.
    pub fn urls(&self) -> RegistryResult<Vec<String>> {
        Ok(read_registry(&self.registry_path())?.into_iter().collect())
    }

    /// Publish each project, given by id or name, in order.
    ///
    /// Stops at the first failure; manifests already published stay.
    pub fn add_projects<T: AsRef<str>>(
        &mut self,
        ids_or_names: &[T],
    ) -> RegistryResult<Vec<ProjectReport>> {
        let mut reports = Vec::with_capacity(ids_or_names.len());
        for id_or_name in ids_or_names {
            let project = self.store.resolve_project(id_or_name.as_ref())?;
            reports.push(self.add_project(&project)?);
        }
        Ok(reports)
    }

    /// Build, write and register the manifest of one project.
    pub fn add_project(&mut self, project: &ProjectInfo) -> RegistryResult<ProjectReport> {
        let tree = build_manifest(self.store, project, self.config.url_validity_secs)?;
        let folder = self.folder();
        let manifest_path = write_manifest(&tree, &folder)?;

        let url = manifest_url(&self.config.folder_url(), &folder, &manifest_path)?;
        merge_manifest_url(&self.registry_path(), &url)?;
        self.cache.insert(project.name.clone());

        if !tree.skipped.is_empty() {
            warn!(
                project = %project.name,
                skipped = tree.skipped.len(),
                "Some data files were left out for lack of an index"
            );
        }

        Ok(ProjectReport {
            project: project.clone(),
            manifest_path,
            url: Some(url),
            resources: tree.resource_count(),
            skipped: tree.skipped.len(),
        })
    }

    /// Remote projects that are publishable but not yet registered.
    pub fn find_new_projects(&self) -> RegistryResult<Vec<ProjectInfo>> {
        let mut projects: Vec<ProjectInfo> = self
            .store
            .list_projects()?
            .into_iter()
            .filter(|p| is_publishable(&p.name) && !self.cache.contains(&p.name))
            .collect();
        projects.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        projects.dedup_by(|a, b| a.id == b.id);
        for pair in projects.windows(2) {
            if pair[0].name == pair[1].name {
                warn!(
                    project = %pair[1].name,
                    first = %pair[0].id,
                    second = %pair[1].id,
                    "Several remote projects share a name; the last one published wins"
                );
            }
        }
        info!("Found {} new projects on DNAnexus", projects.len());
        Ok(projects)
    }

    /// Publish every new project.
    pub fn add_new_projects(&mut self) -> RegistryResult<Vec<ProjectReport>> {
        let projects = self.find_new_projects()?;
        let mut reports = Vec::with_capacity(projects.len());
        for project in &projects {
            reports.push(self.add_project(project)?);
        }
        Ok(reports)
    }

    /// Write a project's manifest into `dir`, leaving this registry untouched.
    pub fn write_manifest_only(
        &self,
        id_or_name: &str,
        dir: &Path,
    ) -> RegistryResult<ProjectReport> {
        export_manifest(self.store, id_or_name, dir, self.config.url_validity_secs)
    }

    /// Delete every manifest and the registry file, then regenerate.
    ///
    /// With `existing_only`, only previously registered projects are rebuilt;
    /// otherwise every publishable remote project is. Registered names are
    /// resolved before anything is deleted: names that no longer match
    /// exactly one remote project are dropped with a warning, and any other
    /// lookup failure aborts with the folder untouched.
    pub fn force_update(&mut self, existing_only: bool) -> RegistryResult<Vec<ProjectReport>> {
        if !existing_only {
            self.erase()?;
            return self.add_new_projects();
        }

        let projects = self.resolve_registered()?;
        self.erase()?;
        info!("Rebuilding {} registered projects", projects.len());
        let mut reports = Vec::with_capacity(projects.len());
        for project in &projects {
            reports.push(self.add_project(project)?);
        }
        Ok(reports)
    }

    fn resolve_registered(&self) -> RegistryResult<Vec<ProjectInfo>> {
        let mut projects = Vec::new();
        for name in self.cache.names() {
            match self.store.resolve_project(&name) {
                Ok(project) => projects.push(project),
                Err(e @ StoreError::ProjectNotFound(_))
                | Err(e @ StoreError::AmbiguousProject { .. }) => {
                    warn!(project = %name, error = %e, "Dropping registered project");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(projects)
    }

    /// Remove all manifests and the registry file, and clear the cache.
    fn erase(&mut self) -> RegistryResult<()> {
        for path in manifest_files(&self.folder())? {
            fs::remove_file(&path).map_err(|e| RegistryError::RemoveFailed {
                path: path.clone(),
                source: e,
            })?;
        }

        let registry = self.registry_path();
        if registry.exists() {
            fs::remove_file(&registry).map_err(|e| RegistryError::RemoveFailed {
                path: registry.clone(),
                source: e,
            })?;
        }

        self.cache.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{FileHandle, MemoryStore, StoreResult};
    use tempfile::TempDir;

    fn store() -> MemoryStore {
        MemoryStore::new()
            .with_project("project-1", "Alpha")
            .with_file("project-1", "/", "a.bam")
            .with_file("project-1", "/", "a.bam.bai")
            .with_project("project-2", "Beta study")
            .with_file("project-2", "/", "b.seg")
            .with_project("project-3", "PIPELINE scratch")
            .with_project("project-4", "reference resources")
    }

    fn config(temp: &TempDir) -> RegistryConfig {
        RegistryConfig::new(temp.path(), "https://h/igvdata/")
    }

    #[test]
    fn test_is_publishable() {
        assert!(is_publishable("Alpha"));
        assert!(!is_publishable("PIPELINE runs"));
        assert!(!is_publishable("genome resources"));
    }

    #[test]
    fn test_add_projects_by_name_and_id() {
        let temp = TempDir::new().unwrap();
        let store = store();
        let mut registry = Registry::open(config(&temp), &store).unwrap();

        let reports = registry.add_projects(&["Alpha", "project-2"]).unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].resources, 1);
        assert_eq!(
            reports[1].url.as_deref(),
            Some("https://h/igvdata/Beta%20study.xml")
        );
        assert_eq!(registry.projects(), vec!["Alpha", "Beta study"]);
        assert_eq!(
            registry.urls().unwrap(),
            vec![
                "https://h/igvdata/Alpha.xml",
                "https://h/igvdata/Beta%20study.xml"
            ]
        );
    }

    #[test]
    fn test_find_new_projects_filters_and_excludes_cached() {
        let temp = TempDir::new().unwrap();
        let store = store();
        let mut registry = Registry::open(config(&temp), &store).unwrap();
        registry.add_projects(&["Alpha"]).unwrap();

        let names: Vec<String> = registry
            .find_new_projects()
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Beta study"]);
    }

    #[test]
    fn test_cache_rebuilt_from_disk() {
        let temp = TempDir::new().unwrap();
        let store = store();
        {
            let mut registry = Registry::open(config(&temp), &store).unwrap();
            registry.add_projects(&["Alpha"]).unwrap();
        }
        let registry = Registry::open(config(&temp), &store).unwrap();
        assert_eq!(registry.projects(), vec!["Alpha"]);
    }

    #[test]
    fn test_force_update_rebuilds_everything() {
        let temp = TempDir::new().unwrap();
        let store = store();
        fs::write(temp.path().join("Stale.xml"), "<Global/>").unwrap();
        let mut registry = Registry::open(config(&temp), &store).unwrap();
        registry.add_projects(&["Alpha"]).unwrap();

        let reports = registry.force_update(false).unwrap();
        let names: Vec<&str> = reports.iter().map(|r| r.project.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Beta study"]);
        assert!(!temp.path().join("Stale.xml").exists());
        assert_eq!(registry.projects(), vec!["Alpha", "Beta study"]);
        assert_eq!(registry.urls().unwrap().len(), 2);
    }

    #[test]
    fn test_force_update_existing_only() {
        let temp = TempDir::new().unwrap();
        let store = store();
        let mut registry = Registry::open(config(&temp), &store).unwrap();
        registry.add_projects(&["Beta study"]).unwrap();

        let reports = registry.force_update(true).unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(registry.projects(), vec!["Beta study"]);
        assert_eq!(
            registry.urls().unwrap(),
            vec!["https://h/igvdata/Beta%20study.xml"]
        );
    }

    #[test]
    fn test_force_update_existing_only_drops_vanished_project() {
        let temp = TempDir::new().unwrap();
        let before = MemoryStore::new()
            .with_project("project-1", "Aardvark")
            .with_file("project-1", "/", "a.bw")
            .with_project("project-2", "Zebra")
            .with_file("project-2", "/", "z.bw");
        Registry::open(config(&temp), &before)
            .unwrap()
            .add_projects(&["Aardvark", "Zebra"])
            .unwrap();

        let after = MemoryStore::new()
            .with_project("project-2", "Zebra")
            .with_file("project-2", "/", "z.bw");
        let mut registry = Registry::open(config(&temp), &after).unwrap();
        let reports = registry.force_update(true).unwrap();

        assert_eq!(reports.len(), 1);
        assert!(!temp.path().join("Aardvark.xml").exists());
        assert!(temp.path().join("Zebra.xml").is_file());
        assert_eq!(
            registry.urls().unwrap(),
            vec!["https://h/igvdata/Zebra.xml"]
        );
        let reopened = Registry::open(config(&temp), &after).unwrap();
        assert_eq!(reopened.projects(), vec!["Zebra"]);
    }

    /// A store whose every call fails as if no credentials were set.
    struct Unauthenticated;

    impl ProjectStore for Unauthenticated {
        fn list_subfolders(&self, _: &ProjectInfo, _: &str) -> StoreResult<Vec<String>> {
            Err(StoreError::MissingToken)
        }

        fn list_files(&self, _: &ProjectInfo, _: &str) -> StoreResult<Vec<FileHandle>> {
            Err(StoreError::MissingToken)
        }

        fn find_file_by_exact_name(
            &self,
            _: &ProjectInfo,
            _: &str,
            _: &str,
        ) -> StoreResult<Option<FileHandle>> {
            Err(StoreError::MissingToken)
        }

        fn mint_download_url(
            &self,
            _: &ProjectInfo,
            _: &FileHandle,
            _: u64,
            _: &str,
        ) -> StoreResult<String> {
            Err(StoreError::MissingToken)
        }

        fn list_projects(&self) -> StoreResult<Vec<ProjectInfo>> {
            Err(StoreError::MissingToken)
        }

        fn resolve_project(&self, _: &str) -> StoreResult<ProjectInfo> {
            Err(StoreError::MissingToken)
        }
    }

    #[test]
    fn test_force_update_existing_only_keeps_folder_on_lookup_failure() {
        let temp = TempDir::new().unwrap();
        let store = store();
        Registry::open(config(&temp), &store)
            .unwrap()
            .add_projects(&["Beta study"])
            .unwrap();

        let mut registry = Registry::open(config(&temp), &Unauthenticated).unwrap();
        let result = registry.force_update(true);

        assert!(matches!(
            result,
            Err(RegistryError::Store(StoreError::MissingToken))
        ));
        assert!(temp.path().join("Beta study.xml").is_file());
        assert_eq!(registry.projects(), vec!["Beta study"]);
        assert_eq!(
            registry.urls().unwrap(),
            vec!["https://h/igvdata/Beta%20study.xml"]
        );
    }

    #[test]
    fn test_find_new_projects_keeps_same_named_projects() {
        let temp = TempDir::new().unwrap();
        let store = MemoryStore::new()
            .with_project("project-9", "Twin")
            .with_project("project-8", "Twin");
        let registry = Registry::open(config(&temp), &store).unwrap();

        let ids: Vec<String> = registry
            .find_new_projects()
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec!["project-8", "project-9"]);
    }

    #[test]
    fn test_failed_walk_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let store = MemoryStore::new()
            .with_project("project-1", "Broken")
            .with_file("project-1", "/x", "a.bw")
            .failing_on("/x");
        let mut registry = Registry::open(config(&temp), &store).unwrap();

        assert!(registry.add_projects(&["Broken"]).is_err());
        assert!(!temp.path().join("Broken.xml").exists());
        assert!(registry.urls().unwrap().is_empty());
        assert!(registry.projects().is_empty());
    }

    #[test]
    fn test_export_manifest_without_registry() {
        let temp = TempDir::new().unwrap();
        let store = store();

        let report = export_manifest(&store, "Alpha", temp.path(), 60).unwrap();
        assert_eq!(report.manifest_path, temp.path().join("Alpha.xml"));
        assert!(report.url.is_none());
        assert!(!temp
            .path()
            .join("1kg_v37_dataServerRegistry.txt")
            .exists());
    }

    #[test]
    fn test_write_manifest_only_leaves_registry_alone() {
        let registry_dir = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let store = store();
        let registry = Registry::open(config(&registry_dir), &store).unwrap();

        let report = registry.write_manifest_only("Beta study", out.path()).unwrap();
        assert_eq!(report.manifest_path, out.path().join("Beta study.xml"));
        assert!(registry.projects().is_empty());
        assert!(registry.urls().unwrap().is_empty());
    }
}
