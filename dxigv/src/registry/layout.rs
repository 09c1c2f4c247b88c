//! Registry folder bootstrap.
//!
//! On open, the registry folder is created if needed (with an Apache
//! `.htaccess` stub when the folder belongs to a group), the registry file is
//! touched, and genome alias symlinks are put in place.

use std::fs::{self, OpenOptions};
use std::os::unix::fs::symlink;
use std::path::{Path, PathBuf};

use tracing::info;

use super::{RegistryConfig, RegistryError, RegistryResult};

/// Name of the Apache access-control file.
pub const HTACCESS_FILENAME: &str = ".htaccess";

/// Create a file if it does not exist, leaving existing content alone.
pub fn touch(path: &Path) -> RegistryResult<()> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map(|_| ())
        .map_err(|e| RegistryError::WriteFailed {
            path: path.to_path_buf(),
            source: e,
        })
}

/// Contents of the `.htaccess` file for a group.
pub fn htaccess_content(group: &str, htpasswd_path: &Path) -> String {
    format!(
        "AuthUserFile {}\nAuthName \"{}\"\nAuthType Basic\nRequire valid-user\n",
        htpasswd_path.display(),
        group
    )
}

/// Write `.htaccess` into `folder` and create an empty htpasswd file.
pub fn write_access_control(
    folder: &Path,
    group: &str,
    htpasswd_path: &Path,
) -> RegistryResult<PathBuf> {
    let htaccess_path = folder.join(HTACCESS_FILENAME);
    info!(
        "Initialising Apache folder-level security for {}",
        htaccess_path.display()
    );
    fs::write(&htaccess_path, htaccess_content(group, htpasswd_path)).map_err(|e| {
        RegistryError::WriteFailed {
            path: htaccess_path.clone(),
            source: e,
        }
    })?;

    touch(htpasswd_path)?;
    info!("Configured empty htpasswd file: {}", htpasswd_path.display());
    info!(
        "Set its group and permissions: sudo chgrp www-data {0} && chmod 640 {0}",
        htpasswd_path.display()
    );
    info!(
        "Add username:password entries to {} (e.g. with htpasswd -B)",
        htpasswd_path.display()
    );

    Ok(htaccess_path)
}

/// Link each alias registry name to the registry file.
///
/// Existing files or links at an alias path are left untouched. Links are
/// relative so the folder can be moved.
pub fn create_aliases(registry_path: &Path, aliases: &[&str]) -> RegistryResult<Vec<PathBuf>> {
    let folder = registry_path.parent().unwrap_or_else(|| Path::new("."));
    let target = registry_path
        .file_name()
        .map(PathBuf::from)
        .ok_or_else(|| RegistryError::InvalidPath(registry_path.display().to_string()))?;

    let mut created = Vec::new();
    for alias in aliases {
        let link = folder.join(RegistryConfig::registry_file_name(alias));
        if link.symlink_metadata().is_ok() {
            continue;
        }
        symlink(&target, &link).map_err(|e| RegistryError::SymlinkFailed {
            link: link.clone(),
            target: target.clone(),
            reason: e.to_string(),
        })?;
        info!("Linked {} -> {}", link.display(), target.display());
        created.push(link);
    }
    Ok(created)
}

/// Prepare the registry folder described by `config`.
///
/// Returns true if the folder was created by this call.
pub fn initialise_folder(config: &RegistryConfig) -> RegistryResult<bool> {
    config.validate()?;
    let folder = config.folder();

    let created = !folder.exists();
    if created {
        info!("Initialising {}", folder.display());
        fs::create_dir_all(&folder).map_err(|e| RegistryError::CreateDirFailed {
            path: folder.clone(),
            source: e,
        })?;
        if let Some(group) = &config.group {
            write_access_control(&folder, group, &config.htpasswd_path(group))?;
        }
    }

    let registry_path = config.registry_path();
    touch(&registry_path)?;
    create_aliases(&registry_path, config.reference_genome.aliases())?;

    Ok(created)
}
