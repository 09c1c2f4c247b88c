//! Init command - write the configuration file.

use dxigv::config::{config_file_path, ConfigFile};

use crate::error::CliError;

/// Create the config file, keeping any values already set.
pub fn run() -> Result<(), CliError> {
    let path = config_file_path();
    let existed = path.exists();
    let config = ConfigFile::load()?;
    config.save()?;

    if existed {
        println!("Configuration file updated: {}", path.display());
    } else {
        println!("Configuration file created: {}", path.display());
    }
    println!();
    println!("Set registry.path and registry.url to the folder your web server");
    println!("publishes, and dnanexus.auth_token (or DX_SECURITY_CONTEXT).");
    println!("CLI arguments override config file values when specified.");
    Ok(())
}
