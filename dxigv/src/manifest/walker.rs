//! Recursive folder walk that turns a project into a [`ManifestTree`].

use tracing::{debug, info, warn};

use super::classify::{classify, coverage_candidates, index_name, logical_name, FileKind};
use super::tree::{Category, ManifestNode, ManifestTree, Resource, SkippedFile, PLACEHOLDER};
use crate::store::{join_folder, FileHandle, ProjectInfo, ProjectStore, StoreResult};

/// Housekeeping folders that never hold browser-loadable data.
pub const EXCLUDED_FOLDERS: &[&str] = &["metrics", "inputFastq", "reports"];

/// Root folder of every project.
pub const ROOT_FOLDER: &str = "/";

/// Walks one project and builds its manifest.
///
/// Sub-folders are visited depth-first in lexicographic order; files are
/// handled in the order the store lists them.
pub struct TreeWalker<'a, S: ProjectStore + ?Sized> {
    store: &'a S,
    project: &'a ProjectInfo,
    url_duration_secs: u64,
    skipped: Vec<SkippedFile>,
}

impl<'a, S: ProjectStore + ?Sized> TreeWalker<'a, S> {
    pub fn new(store: &'a S, project: &'a ProjectInfo, url_duration_secs: u64) -> Self {
        Self {
            store,
            project,
            url_duration_secs,
            skipped: Vec::new(),
        }
    }

    /// Walk the whole project from `/`.
    ///
    /// Any store failure aborts the walk; no partial tree is returned.
    pub fn walk(mut self) -> StoreResult<ManifestTree> {
        let children = self.walk_folder(ROOT_FOLDER)?;
        let mut tree = ManifestTree::new(self.project.name.clone(), children);
        tree.skipped = self.skipped;
        Ok(tree)
    }

    /// Build the children of one folder: categories first, then resources.
    fn walk_folder(&mut self, folder: &str) -> StoreResult<Vec<ManifestNode>> {
        info!("Adding {}:{}", self.project.name, folder);

        let mut subfolders: Vec<String> = self
            .store
            .list_subfolders(self.project, folder)?
            .into_iter()
            .filter(|name| !EXCLUDED_FOLDERS.contains(&name.as_str()))
            .collect();
        subfolders.sort();
        subfolders.dedup();

        let mut children = Vec::new();
        for subfolder in subfolders {
            let path = join_folder(folder, &subfolder);
            let grandchildren = self.walk_folder(&path)?;
            children.push(ManifestNode::Category(Category::new(
                subfolder,
                grandchildren,
            )));
        }

        for file in self.store.list_files(self.project, folder)? {
            let kind = classify(&file.name);
            let resource = match kind {
                FileKind::Unrecognized => None,
                FileKind::Alignment | FileKind::Variant => {
                    self.add_indexed_entry(&file, folder, kind)?
                }
                _ => Some(self.add_track_entry(&file, folder)?),
            };
            if let Some(resource) = resource {
                children.push(ManifestNode::Resource(resource));
            }
        }

        Ok(children)
    }

    /// Pair a data file with its index and build its resource.
    ///
    /// Returns `Ok(None)` and records a skip when no index exists.
    pub fn add_indexed_entry(
        &mut self,
        file: &FileHandle,
        folder: &str,
        kind: FileKind,
    ) -> StoreResult<Option<Resource>> {
        info!("Adding {}:{}", self.project.name, join_folder(folder, &file.name));

        let name = logical_name(&file.name);
        let path = self.mint(file, &name)?;

        let index_names = kind
            .index_extensions()
            .iter()
            .map(|ext| index_name(&file.name, ext));
        let Some(index) = self.probe(folder, index_names)? else {
            warn!("Skipping {}, failed to find an index file", file.name);
            self.skipped.push(SkippedFile {
                folder: folder.to_string(),
                name: file.name.clone(),
            });
            return Ok(None);
        };
        let index_url = self.mint(&index, &logical_name(&index.name))?;

        let mut resource = Resource {
            name,
            path,
            index: Some(index_url),
            coverage: None,
            mapping: None,
        };

        match kind {
            FileKind::Alignment => {
                let coverage = match self.probe(folder, coverage_candidates(&file.name))? {
                    Some(tdf) => self.mint(&tdf, &logical_name(&tdf.name))?,
                    None => PLACEHOLDER.to_string(),
                };
                resource.coverage = Some(coverage);
            }
            FileKind::Variant => resource.mapping = Some(PLACEHOLDER.to_string()),
            _ => {}
        }

        Ok(Some(resource))
    }

    /// Build the resource of a track file; no companion lookup.
    pub fn add_track_entry(&self, file: &FileHandle, folder: &str) -> StoreResult<Resource> {
        info!("Adding {}:{}", self.project.name, join_folder(folder, &file.name));
        let name = logical_name(&file.name);
        let path = self.mint(file, &name)?;
        Ok(Resource::track(name, path))
    }

    /// First candidate name that exists in `folder`.
    fn probe(
        &self,
        folder: &str,
        candidates: impl IntoIterator<Item = String>,
    ) -> StoreResult<Option<FileHandle>> {
        for candidate in candidates {
            debug!("Looking for companion file: {}", candidate);
            if let Some(found) = self
                .store
                .find_file_by_exact_name(self.project, folder, &candidate)?
            {
                return Ok(Some(found));
            }
        }
        Ok(None)
    }

    fn mint(&self, file: &FileHandle, suggested_name: &str) -> StoreResult<String> {
        self.store
            .mint_download_url(self.project, file, self.url_duration_secs, suggested_name)
    }
}

/// Walk a project and build its manifest.
pub fn build_manifest<S: ProjectStore + ?Sized>(
    store: &S,
    project: &ProjectInfo,
    url_duration_secs: u64,
) -> StoreResult<ManifestTree> {
    TreeWalker::new(store, project, url_duration_secs).walk()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, StoreError};

    const PID: &str = "project-1";

    fn project() -> ProjectInfo {
        ProjectInfo::new(PID, "Demo")
    }

    fn store() -> MemoryStore {
        MemoryStore::new().with_project(PID, "Demo")
    }

    #[test]
    fn test_bam_with_index_and_no_coverage() {
        let store = store()
            .with_file(PID, "/", "sample.bam")
            .with_file(PID, "/", "sample.bam.bai");

        let tree = build_manifest(&store, &project(), 3600).unwrap();
        let resources = tree.resources();
        assert_eq!(resources.len(), 1);
        let r = resources[0];
        assert_eq!(r.name, "sample.bam");
        assert!(!r.path.is_empty());
        assert!(r.index.as_deref().is_some_and(|i| i.contains("sample.bam.bai")));
        assert_eq!(r.coverage.as_deref(), Some("."));
        assert_eq!(r.mapping, None);
    }

    #[test]
    fn test_bam_without_index_is_skipped() {
        let store = store().with_file(PID, "/", "sample.bam");

        let tree = build_manifest(&store, &project(), 3600).unwrap();
        assert_eq!(tree.resource_count(), 0);
        assert_eq!(
            tree.skipped,
            vec![SkippedFile {
                folder: "/".to_string(),
                name: "sample.bam".to_string()
            }]
        );
    }

    #[test]
    fn test_index_in_other_folder_does_not_count() {
        let store = store()
            .with_file(PID, "/a", "sample.bam")
            .with_file(PID, "/b", "sample.bam.bai");

        let tree = build_manifest(&store, &project(), 3600).unwrap();
        assert_eq!(tree.resource_count(), 0);
        assert_eq!(tree.skipped.len(), 1);
    }

    #[test]
    fn test_coverage_prefers_replaced_suffix() {
        let store = store()
            .with_file(PID, "/", "s.bam")
            .with_file(PID, "/", "s.bam.bai")
            .with_file(PID, "/", "s.bam.tdf")
            .with_file(PID, "/", "s.tdf");

        let tree = build_manifest(&store, &project(), 3600).unwrap();
        let coverage = tree.resources()[0].coverage.clone().unwrap();
        assert!(coverage.ends_with("/s.tdf?duration=3600"));
    }

    #[test]
    fn test_coverage_falls_back_to_appended_suffix() {
        let store = store()
            .with_file(PID, "/", "s.bam")
            .with_file(PID, "/", "s.bam.bai")
            .with_file(PID, "/", "s.bam.tdf");

        let tree = build_manifest(&store, &project(), 3600).unwrap();
        let coverage = tree.resources()[0].coverage.clone().unwrap();
        assert!(coverage.ends_with("/s.bam.tdf?duration=3600"));
    }

    #[test]
    fn test_vcf_prefers_tbi_over_idx() {
        let store = store()
            .with_file(PID, "/", "v.vcf.gz")
            .with_file(PID, "/", "v.vcf.gz.idx")
            .with_file(PID, "/", "v.vcf.gz.tbi");

        let tree = build_manifest(&store, &project(), 3600).unwrap();
        let r = tree.resources()[0];
        assert!(r.index.as_deref().unwrap().contains("v.vcf.gz.tbi"));
        assert_eq!(r.mapping.as_deref(), Some("."));
        assert_eq!(r.coverage, None);
        assert_eq!(store.probes(), vec!["v.vcf.gz.tbi"]);
    }

    #[test]
    fn test_vcf_uses_idx_when_no_tbi() {
        let store = store()
            .with_file(PID, "/", "v.vcf.gz")
            .with_file(PID, "/", "v.vcf.gz.idx");

        let tree = build_manifest(&store, &project(), 3600).unwrap();
        assert!(tree.resources()[0]
            .index
            .as_deref()
            .unwrap()
            .contains("v.vcf.gz.idx"));
        assert_eq!(store.probes(), vec!["v.vcf.gz.tbi", "v.vcf.gz.idx"]);
    }

    #[test]
    fn test_vcf_without_index_is_skipped_without_error() {
        let store = store().with_file(PID, "/", "sample.vcf.gz");

        let tree = build_manifest(&store, &project(), 3600).unwrap();
        assert_eq!(tree.resource_count(), 0);
        assert_eq!(tree.skipped.len(), 1);
    }

    #[test]
    fn test_track_files_never_carry_index() {
        let store = store()
            .with_file(PID, "/", "a.bw")
            .with_file(PID, "/", "b.bed.gz")
            .with_file(PID, "/", "c.seg")
            .with_file(PID, "/", "d.cn")
            .with_file(PID, "/", "d.cn.bai")
            .with_file(PID, "/", "notes.txt");

        let tree = build_manifest(&store, &project(), 3600).unwrap();
        let names: Vec<&str> = tree.resources().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["a.bw", "b.bed.gz", "c.seg", "d.cn"]);
        assert!(tree.resources().iter().all(|r| r.index.is_none()));
        assert!(store.probes().is_empty());
    }

    #[test]
    fn test_logical_name_used_for_name_and_url() {
        let store = store()
            .with_file(PID, "/", "x.merged.dedup.realigned.bam")
            .with_file(PID, "/", "x.merged.dedup.realigned.bam.bai");

        let tree = build_manifest(&store, &project(), 60).unwrap();
        let r = tree.resources()[0];
        assert_eq!(r.name, "x.bam");
        assert!(r.path.ends_with("/x.bam?duration=60"));
        assert!(r.index.as_deref().unwrap().ends_with("/x.bam.bai?duration=60"));
    }

    #[test]
    fn test_gvcf_is_paired_by_raw_name() {
        let store = store()
            .with_file(PID, "/", "s.gvcf.gz")
            .with_file(PID, "/", "s.gvcf.gz.tbi");

        let tree = build_manifest(&store, &project(), 60).unwrap();
        let r = tree.resources()[0];
        assert_eq!(r.name, "s.g.vcf.gz");
        assert!(r.index.as_deref().unwrap().ends_with("/s.g.vcf.gz.tbi?duration=60"));
    }

    #[test]
    fn test_excluded_folders_pruned_at_any_depth() {
        let store = store()
            .with_file(PID, "/metrics", "a.bw")
            .with_file(PID, "/run1/reports", "b.bw")
            .with_file(PID, "/run1/inputFastq", "c.bw")
            .with_file(PID, "/run1/bams", "d.bw");

        let tree = build_manifest(&store, &project(), 60).unwrap();
        let mut paths = tree.category_paths();
        paths.sort();
        assert_eq!(paths, vec!["run1", "run1/bams"]);
        assert_eq!(tree.resource_count(), 1);
    }

    #[test]
    fn test_categories_nest_and_sort() {
        let store = store()
            .with_file(PID, "/zeta", "z.bw")
            .with_file(PID, "/alpha/inner", "a.bw")
            .with_file(PID, "/", "root.bw");

        let tree = build_manifest(&store, &project(), 60).unwrap();
        assert_eq!(tree.children.len(), 3);
        match (&tree.children[0], &tree.children[1], &tree.children[2]) {
            (ManifestNode::Category(a), ManifestNode::Category(z), ManifestNode::Resource(r)) => {
                assert_eq!(a.name, "alpha");
                assert_eq!(z.name, "zeta");
                assert_eq!(r.name, "root.bw");
                assert!(matches!(&a.children[0], ManifestNode::Category(c) if c.name == "inner"));
            }
            other => panic!("unexpected layout: {:?}", other),
        }
    }

    #[test]
    fn test_empty_folders_still_emit_categories() {
        let store = store().with_folder(PID, "/empty");

        let tree = build_manifest(&store, &project(), 60).unwrap();
        assert_eq!(tree.category_paths(), vec!["empty"]);
    }

    #[test]
    fn test_lookup_failure_aborts_walk() {
        let store = store()
            .with_file(PID, "/", "a.bw")
            .with_file(PID, "/deep/broken", "b.bw")
            .failing_on("/deep/broken");

        let result = build_manifest(&store, &project(), 60);
        assert!(matches!(result, Err(StoreError::Lookup(_))));
    }
}
