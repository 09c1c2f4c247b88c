//! CLI error type.

use thiserror::Error;

use dxigv::config::ConfigFileError;
use dxigv::registry::RegistryError;
use dxigv::store::StoreError;

/// Errors surfaced to the user; each is printed as `Error: ...` with exit code 1.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Config(String),

    #[error(transparent)]
    ConfigFile(#[from] ConfigFileError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("failed to initialise logging: {0}")]
    Logging(std::io::Error),
}
