//! Registry configuration.

use std::path::PathBuf;

use super::url::quote;
use super::{ReferenceGenome, RegistryError, RegistryResult};

pub const ONE_HOUR: u64 = 3600;
pub const ONE_DAY: u64 = ONE_HOUR * 24;
pub const ONE_WEEK: u64 = ONE_DAY * 7;
pub const ONE_MONTH: u64 = ONE_DAY * 31;
pub const ONE_YEAR: u64 = ONE_DAY * 365;

/// Default web root that serves the registry folder.
pub const DEFAULT_URL_ROOT: &str = "https://localhost:8000/igvdata/";

/// Suffix of registry file names; IGV substitutes the genome id for `$$`.
pub const REGISTRY_SUFFIX: &str = "_dataServerRegistry.txt";

/// Everything needed to open a registry.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Genome whose registry file is maintained.
    pub reference_genome: ReferenceGenome,

    /// Validity of minted download URLs, in seconds.
    pub url_validity_secs: u64,

    /// Local folder served by the web server.
    pub registry_root: PathBuf,

    /// Web-accessible URL of `registry_root`.
    pub url_root: String,

    /// Optional access-partitioned sub-folder.
    pub group: Option<String>,

    /// Directory holding `.htpasswd_<group>` files.
    pub htpasswd_dir: PathBuf,
}

/// Default local registry folder, `~/igvdata`.
pub fn default_registry_root() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("igvdata")
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            reference_genome: ReferenceGenome::default(),
            url_validity_secs: ONE_YEAR,
            registry_root: default_registry_root(),
            url_root: DEFAULT_URL_ROOT.to_string(),
            group: None,
            htpasswd_dir: dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")),
        }
    }
}

impl RegistryConfig {
    /// Create a configuration for a registry root and web URL.
    pub fn new(registry_root: impl Into<PathBuf>, url_root: impl Into<String>) -> Self {
        Self {
            registry_root: registry_root.into(),
            url_root: url_root.into(),
            ..Default::default()
        }
    }

    /// Set the reference genome.
    pub fn with_reference_genome(mut self, genome: ReferenceGenome) -> Self {
        self.reference_genome = genome;
        self
    }

    /// Set the URL validity duration.
    pub fn with_url_validity_secs(mut self, secs: u64) -> Self {
        self.url_validity_secs = secs;
        self
    }

    /// Set the access group.
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Set the htpasswd directory.
    pub fn with_htpasswd_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.htpasswd_dir = dir.into();
        self
    }

    /// Reject group names that would change under URL quoting or escape the root.
    pub fn validate(&self) -> RegistryResult<()> {
        if let Some(group) = &self.group {
            let unsafe_name = group.is_empty()
                || group == "."
                || group == ".."
                || group.contains('/')
                || quote(group) != *group;
            if unsafe_name {
                return Err(RegistryError::InvalidGroup(group.clone()));
            }
        }
        Ok(())
    }

    /// Local folder holding manifests and the registry file.
    pub fn folder(&self) -> PathBuf {
        match &self.group {
            Some(group) => self.registry_root.join(group),
            None => self.registry_root.clone(),
        }
    }

    /// Web URL of [`folder`](Self::folder), without trailing slash.
    pub fn folder_url(&self) -> String {
        let root = self.url_root.trim_end_matches('/');
        match &self.group {
            Some(group) => format!("{}/{}", root, group),
            None => root.to_string(),
        }
    }

    /// Registry file name for a genome id.
    pub fn registry_file_name(genome_id: &str) -> String {
        format!("{}{}", genome_id, REGISTRY_SUFFIX)
    }

    /// Path of the registry file.
    pub fn registry_path(&self) -> PathBuf {
        self.folder()
            .join(Self::registry_file_name(self.reference_genome.id()))
    }

    /// Path of the htpasswd file for a group.
    pub fn htpasswd_path(&self, group: &str) -> PathBuf {
        self.htpasswd_dir.join(format!(".htpasswd_{}", group))
    }
}
