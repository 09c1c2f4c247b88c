//! In-memory manifest tree.
//!
//! Trees are plain owned values: every folder visit returns its own list of
//! children and the parent wraps them in a [`Category`].

/// Schema version written on the root element.
pub const MANIFEST_VERSION: &str = "1";

/// Placeholder for attributes that must be present but have no file.
pub const PLACEHOLDER: &str = ".";

/// One loadable resource (a leaf of the manifest).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    /// Logical (normalized) file name.
    pub name: String,

    /// Pre-authenticated URL of the data file.
    pub path: String,

    /// URL of the paired index file.
    pub index: Option<String>,

    /// URL of the coverage file, or [`PLACEHOLDER`]. Alignment files only.
    pub coverage: Option<String>,

    /// Always [`PLACEHOLDER`] for variant files.
    pub mapping: Option<String>,
}

impl Resource {
    /// A resource with only a data URL.
    pub fn track(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            index: None,
            coverage: None,
            mapping: None,
        }
    }

    /// Attributes in output order, skipping absent ones.
    pub fn attributes(&self) -> Vec<(&'static str, &str)> {
        let mut attrs = vec![("name", self.name.as_str()), ("path", self.path.as_str())];
        let optional = [
            ("index", &self.index),
            ("coverage", &self.coverage),
            ("mapping", &self.mapping),
        ];
        for (key, value) in optional {
            if let Some(v) = value {
                attrs.push((key, v.as_str()));
            }
        }
        attrs
    }
}

/// A folder of the project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub children: Vec<ManifestNode>,
}

impl Category {
    pub fn new(name: impl Into<String>, children: Vec<ManifestNode>) -> Self {
        Self {
            name: name.into(),
            children,
        }
    }
}

/// A child of the root or of a category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestNode {
    Category(Category),
    Resource(Resource),
}

/// A data file left out of the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    /// Folder the file lives in.
    pub folder: String,

    /// Raw file name.
    pub name: String,
}

/// The manifest of one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestTree {
    /// Project display name.
    pub name: String,

    /// Schema version tag.
    pub version: String,

    /// Top-level categories and resources.
    pub children: Vec<ManifestNode>,

    /// Data files skipped because no index was found.
    pub skipped: Vec<SkippedFile>,
}

impl ManifestTree {
    pub fn new(name: impl Into<String>, children: Vec<ManifestNode>) -> Self {
        Self {
            name: name.into(),
            version: MANIFEST_VERSION.to_string(),
            children,
            skipped: Vec::new(),
        }
    }

    /// Every resource in document order.
    pub fn resources(&self) -> Vec<&Resource> {
        let mut out = Vec::new();
        collect_resources(&self.children, &mut out);
        out
    }

    /// Number of resources at any depth.
    pub fn resource_count(&self) -> usize {
        self.resources().len()
    }

    /// Slash-joined paths of every category, e.g. `run1/bams`.
    pub fn category_paths(&self) -> Vec<String> {
        let mut out = Vec::new();
        collect_categories(&self.children, "", &mut out);
        out
    }
}

fn collect_resources<'a>(nodes: &'a [ManifestNode], out: &mut Vec<&'a Resource>) {
    for node in nodes {
        match node {
            ManifestNode::Category(c) => collect_resources(&c.children, out),
            ManifestNode::Resource(r) => out.push(r),
        }
    }
}

fn collect_categories(nodes: &[ManifestNode], prefix: &str, out: &mut Vec<String>) {
    for node in nodes {
        if let ManifestNode::Category(c) = node {
            let path = if prefix.is_empty() {
                c.name.clone()
            } else {
                format!("{}/{}", prefix, c.name)
            };
            collect_categories(&c.children, &path, out);
            out.push(path);
        }
    }
}
