//! User configuration.
//!
//! ```text
//! ~/.dxigv/config.ini
//!
//! [registry]
//! path = ~/igvdata
//! url = https://localhost:8000/igvdata/
//! reference_genome = 1kg_v37
//! group =
//! htpasswd_dir = ~
//!
//! [urls]
//! duration = 31536000
//!
//! [dnanexus]
//! api_server = https://api.dnanexus.com
//! auth_token =
//! timeout = 60
//! max_retries = 3
//!
//! [logging]
//! file =
//! ```

mod file;
mod keys;

pub use file::{
    config_dir, config_file_path, expand_tilde, ConfigFile, ConfigFileError, ConfigFileResult,
    DnanexusSettings, LoggingSettings, RegistrySettings, UrlSettings,
};
pub use keys::{ConfigKey, UnknownConfigKey};
