//! Shared command setup: configuration, logging and the DNAnexus client.

use tracing::info;

use dxigv::config::{config_file_path, ConfigFile};
use dxigv::logging::{init_logging, LoggingGuard};
use dxigv::store::DxClient;

use crate::error::CliError;

/// Per-invocation context for commands that talk to DNAnexus.
pub struct CliRunner {
    config: ConfigFile,
    _logging: LoggingGuard,
}

impl CliRunner {
    /// Load the config file and install logging.
    pub fn new(verbose: bool) -> Result<Self, CliError> {
        let config = ConfigFile::load()?;
        let logging =
            init_logging(config.logging.file.as_deref(), verbose).map_err(CliError::Logging)?;
        Ok(Self {
            config,
            _logging: logging,
        })
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Log the version, command and configuration source.
    pub fn log_startup(&self, command: &str) {
        info!(
            version = dxigv::VERSION,
            command,
            config = %config_file_path().display(),
            "dxigv starting"
        );
        if let Some(file) = &self.config.logging.file {
            info!("Logging to {}", file.display());
        }
    }

    /// Connect a DNAnexus client using the configured credentials.
    pub fn store(&self) -> Result<DxClient, CliError> {
        Ok(DxClient::new(self.config.to_dx_client_config())?)
    }
}
