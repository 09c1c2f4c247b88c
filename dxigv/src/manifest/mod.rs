//! IGV manifest construction.
//!
//! A manifest describes every IGV-loadable file of one project:
//!
//! 1. [`TreeWalker`] visits the project folders depth-first
//! 2. [`classify`] decides what each file is by its name suffix
//! 3. alignment and variant files are paired with an index file, and
//!    dropped (with a warning) when none exists
//! 4. [`render`] turns the resulting [`ManifestTree`] into XML
//!
//! # Example
//!
//! ```ignore
//! use dxigv::manifest::{build_manifest, write_manifest};
//!
//! let tree = build_manifest(&store, &project, ONE_YEAR)?;
//! let path = write_manifest(&tree, registry_dir)?;
//! ```

mod classify;
mod error;
mod tree;
mod walker;
mod xml;

pub use classify::{
    classify, coverage_candidates, index_name, logical_name, FileKind, COVERAGE_EXTENSION,
};
pub use error::{ManifestError, ManifestResult};
pub use tree::{
    Category, ManifestNode, ManifestTree, Resource, SkippedFile, MANIFEST_VERSION, PLACEHOLDER,
};
pub use walker::{build_manifest, TreeWalker, EXCLUDED_FOLDERS, ROOT_FOLDER};
pub use xml::{escape_attribute, manifest_path, render, write_manifest, MANIFEST_EXTENSION};
