//! dxigv - IGV data server registries for DNAnexus projects
//!
//! This library walks the folder tree of a DNAnexus project, pairs genomic
//! data files with their index files, mints pre-authenticated download URLs
//! and publishes the result as an IGV XML manifest listed in a
//! `<genome>_dataServerRegistry.txt` registry file.
//!
//! # Overview
//!
//! ```text
//! ProjectStore ──► TreeWalker ──► ManifestTree ──► XML file ──► Registry file
//! (DNAnexus API)   (classify,     (categories,     (<name>.xml)  (sorted URLs)
//!                   pair index)    resources)
//! ```

pub mod config;
pub mod logging;
pub mod manifest;
pub mod registry;
pub mod store;

/// Crate version, reported by the CLI banner.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
