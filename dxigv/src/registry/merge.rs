//! Registry file merging.
//!
//! The registry file is a set of URLs: one per line, sorted, no duplicates.
//! Every update rewrites the whole file, so merging is idempotent regardless
//! of what the file held before.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::info;

use super::{RegistryError, RegistryResult};

/// Read the URLs of a registry file. A missing file is an empty registry.
pub fn read_registry(path: &Path) -> RegistryResult<BTreeSet<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(content
            .lines()
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(BTreeSet::new()),
        Err(e) => Err(RegistryError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Resolve an alias symlink to the file it points at, so aliases survive rewrites.
fn write_target(path: &Path) -> PathBuf {
    if path.is_symlink() {
        fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
    } else {
        path.to_path_buf()
    }
}

/// Rewrite a registry file with the given URLs, one per line.
///
/// The content goes to a sibling temporary file which is then renamed over
/// the registry.
pub fn write_registry(path: &Path, urls: &BTreeSet<String>) -> RegistryResult<()> {
    let target = write_target(path);
    let mut content = String::new();
    for url in urls {
        content.push_str(url);
        content.push('\n');
    }

    let mut tmp_name = target.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp = target.with_file_name(tmp_name);

    fs::write(&tmp, content).map_err(|e| RegistryError::WriteFailed {
        path: tmp.clone(),
        source: e,
    })?;
    fs::rename(&tmp, &target).map_err(|e| RegistryError::WriteFailed {
        path: target.clone(),
        source: e,
    })
}

/// Merge several URLs into a registry file.
pub fn merge_manifest_urls<I, S>(path: &Path, new_urls: I) -> RegistryResult<BTreeSet<String>>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut urls = read_registry(path)?;
    urls.extend(new_urls.into_iter().map(Into::into));
    write_registry(path, &urls)?;
    Ok(urls)
}

/// Merge one manifest URL into a registry file.
pub fn merge_manifest_url(path: &Path, url: &str) -> RegistryResult<()> {
    info!("Adding {} to registry at {}", url, path.display());
    merge_manifest_urls(path, [url]).map(|_| ())
}
