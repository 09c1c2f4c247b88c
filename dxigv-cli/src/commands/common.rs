//! Options shared by the registry commands.

use std::path::PathBuf;

use clap::Args;
use dxigv::config::ConfigFile;
use dxigv::registry::{ReferenceGenome, RegistryConfig};

use crate::error::CliError;

/// Registry location and URL options. Each overrides the config file.
#[derive(Debug, Clone, Default, Args)]
pub struct RegistryArgs {
    /// Reference genome of the registry (1kg_v37, mm10, hg19)
    #[arg(short = 'r', long = "ref-genome")]
    pub ref_genome: Option<ReferenceGenome>,

    /// Validity of download URLs in seconds
    #[arg(short = 'd', long)]
    pub duration: Option<u64>,

    /// Access-partitioned sub-folder of the registry
    #[arg(short = 'g', long)]
    pub group: Option<String>,

    /// Local folder served as the IGV data root
    #[arg(long = "igvdata-path")]
    pub igvdata_path: Option<PathBuf>,

    /// Web URL of the IGV data root
    #[arg(long)]
    pub url: Option<String>,
}

/// Validate a URL validity duration.
pub fn resolve_duration(cli: Option<u64>, config: &ConfigFile) -> Result<u64, CliError> {
    match cli.unwrap_or(config.urls.duration) {
        0 => Err(CliError::Config(
            "URL duration must be greater than zero".to_string(),
        )),
        secs => Ok(secs),
    }
}

/// Resolve registry settings: CLI flags, then config file, then defaults.
pub fn resolve_registry_config(
    args: &RegistryArgs,
    config: &ConfigFile,
) -> Result<RegistryConfig, CliError> {
    let mut registry = config.to_registry_config();

    if let Some(genome) = args.ref_genome {
        registry = registry.with_reference_genome(genome);
    }
    registry = registry.with_url_validity_secs(resolve_duration(args.duration, config)?);
    if let Some(group) = &args.group {
        registry = registry.with_group(group.clone());
    }
    if let Some(path) = &args.igvdata_path {
        registry.registry_root = path.clone();
    }
    if let Some(url) = &args.url {
        registry.url_root = url.clone();
    }

    registry.validate()?;
    Ok(registry)
}

/// One-line description of a registry for user output.
pub fn describe(registry: &RegistryConfig) -> String {
    format!(
        "{} registry at {}",
        registry.reference_genome,
        registry.folder().display()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_config() {
        let config = ConfigFile::parse(
            "[registry]\npath = /srv/igvdata\nreference_genome = mm10\n[urls]\nduration = 60\n",
        )
        .unwrap();
        let args = RegistryArgs {
            ref_genome: Some(ReferenceGenome::Hg19),
            duration: Some(120),
            group: Some("LKCGP".to_string()),
            igvdata_path: None,
            url: Some("https://h/igvdata".to_string()),
        };

        let registry = resolve_registry_config(&args, &config).unwrap();
        assert_eq!(registry.reference_genome, ReferenceGenome::Hg19);
        assert_eq!(registry.url_validity_secs, 120);
        assert_eq!(registry.folder(), PathBuf::from("/srv/igvdata/LKCGP"));
        assert_eq!(registry.folder_url(), "https://h/igvdata/LKCGP");
    }

    #[test]
    fn test_config_used_when_flags_absent() {
        let config =
            ConfigFile::parse("[registry]\nreference_genome = mm10\n[urls]\nduration = 60\n")
                .unwrap();
        let registry = resolve_registry_config(&RegistryArgs::default(), &config).unwrap();
        assert_eq!(registry.reference_genome, ReferenceGenome::Mm10);
        assert_eq!(registry.url_validity_secs, 60);
    }

    #[test]
    fn test_zero_duration_rejected() {
        let args = RegistryArgs {
            duration: Some(0),
            ..Default::default()
        };
        assert!(matches!(
            resolve_registry_config(&args, &ConfigFile::default()),
            Err(CliError::Config(_))
        ));
    }

    #[test]
    fn test_invalid_group_rejected() {
        let args = RegistryArgs {
            group: Some("no spaces".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            resolve_registry_config(&args, &ConfigFile::default()),
            Err(CliError::Registry(_))
        ));
    }
}
