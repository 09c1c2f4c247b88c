//! Registry folder maintenance.
//!
//! A registry folder holds one XML manifest per published project plus a
//! registry file, `<genome>_dataServerRegistry.txt`, listing the web URL of
//! every manifest. IGV loads the registry through its data-server setting
//! and offers each manifest in its "Load from Server" dialog.
//!
//! [`Registry`] is the session type: open it over a [`RegistryConfig`] and a
//! [`ProjectStore`](crate::store::ProjectStore), then add projects by id or
//! name, add every unregistered project, or rebuild the whole folder.

mod cache;
mod config;
mod error;
mod genome;
mod layout;
mod merge;
mod session;
mod url;

pub use cache::{manifest_files, RegistryCache};
pub use config::{
    default_registry_root, RegistryConfig, DEFAULT_URL_ROOT, ONE_DAY, ONE_HOUR, ONE_MONTH,
    ONE_WEEK, ONE_YEAR, REGISTRY_SUFFIX,
};
pub use error::{RegistryError, RegistryResult};
pub use genome::ReferenceGenome;
pub use layout::{create_aliases, htaccess_content, initialise_folder, touch, HTACCESS_FILENAME};
pub use merge::{merge_manifest_url, merge_manifest_urls, read_registry, write_registry};
pub use session::{
    export_manifest, is_publishable, ProjectReport, Registry, EXCLUDED_PROJECT_PREFIX,
    EXCLUDED_PROJECT_SUFFIX,
};
pub use url::{manifest_url, quote, SAFE_CHARS};
