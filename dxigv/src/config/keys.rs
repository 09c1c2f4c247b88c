//! Typed `section.key` access to configuration settings.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use super::file::{expand_tilde, ConfigFile, ConfigFileError};
use crate::registry::{ReferenceGenome, RegistryConfig};

/// A settable configuration key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    RegistryPath,
    RegistryUrl,
    RegistryReferenceGenome,
    RegistryGroup,
    RegistryHtpasswdDir,
    UrlsDuration,
    DnanexusApiServer,
    DnanexusAuthToken,
    DnanexusTimeout,
    DnanexusMaxRetries,
    LoggingFile,
}

/// Error for an unknown `section.key` name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown configuration key '{0}'")]
pub struct UnknownConfigKey(pub String);

impl ConfigKey {
    /// Every key, in file order.
    pub fn all() -> &'static [ConfigKey] {
        &[
            Self::RegistryPath,
            Self::RegistryUrl,
            Self::RegistryReferenceGenome,
            Self::RegistryGroup,
            Self::RegistryHtpasswdDir,
            Self::UrlsDuration,
            Self::DnanexusApiServer,
            Self::DnanexusAuthToken,
            Self::DnanexusTimeout,
            Self::DnanexusMaxRetries,
            Self::LoggingFile,
        ]
    }

    pub fn section(&self) -> &'static str {
        match self {
            Self::RegistryPath
            | Self::RegistryUrl
            | Self::RegistryReferenceGenome
            | Self::RegistryGroup
            | Self::RegistryHtpasswdDir => "registry",
            Self::UrlsDuration => "urls",
            Self::DnanexusApiServer
            | Self::DnanexusAuthToken
            | Self::DnanexusTimeout
            | Self::DnanexusMaxRetries => "dnanexus",
            Self::LoggingFile => "logging",
        }
    }

    pub fn key_name(&self) -> &'static str {
        match self {
            Self::RegistryPath => "path",
            Self::RegistryUrl => "url",
            Self::RegistryReferenceGenome => "reference_genome",
            Self::RegistryGroup => "group",
            Self::RegistryHtpasswdDir => "htpasswd_dir",
            Self::UrlsDuration => "duration",
            Self::DnanexusApiServer => "api_server",
            Self::DnanexusAuthToken => "auth_token",
            Self::DnanexusTimeout => "timeout",
            Self::DnanexusMaxRetries => "max_retries",
            Self::LoggingFile => "file",
        }
    }

    /// Full `section.key` name.
    pub fn name(&self) -> String {
        format!("{}.{}", self.section(), self.key_name())
    }

    /// Current value as text; empty when unset.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            Self::RegistryPath => config.registry.path.display().to_string(),
            Self::RegistryUrl => config.registry.url.clone(),
            Self::RegistryReferenceGenome => config.registry.reference_genome.to_string(),
            Self::RegistryGroup => config.registry.group.clone().unwrap_or_default(),
            Self::RegistryHtpasswdDir => config.registry.htpasswd_dir.display().to_string(),
            Self::UrlsDuration => config.urls.duration.to_string(),
            Self::DnanexusApiServer => config.dnanexus.api_server.clone(),
            Self::DnanexusAuthToken => config.dnanexus.auth_token.clone().unwrap_or_default(),
            Self::DnanexusTimeout => config.dnanexus.timeout.to_string(),
            Self::DnanexusMaxRetries => config.dnanexus.max_retries.to_string(),
            Self::LoggingFile => config
                .logging
                .file
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
        }
    }

    /// Validate and store a value. An empty value clears optional keys.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigFileError> {
        let value = value.trim();
        let invalid = |reason: String| ConfigFileError::InvalidValue {
            key: self.name(),
            value: value.to_string(),
            reason,
        };
        let optional = |v: &str| (!v.is_empty()).then(|| v.to_string());

        match self {
            Self::RegistryPath => {
                if value.is_empty() {
                    return Err(invalid("path must not be empty".to_string()));
                }
                config.registry.path = expand_tilde(value);
            }
            Self::RegistryUrl => {
                if !value.starts_with("http://") && !value.starts_with("https://") {
                    return Err(invalid("must be an http(s) URL".to_string()));
                }
                config.registry.url = value.to_string();
            }
            Self::RegistryReferenceGenome => {
                config.registry.reference_genome = value
                    .parse::<ReferenceGenome>()
                    .map_err(|e| invalid(e.to_string()))?;
            }
            Self::RegistryGroup => {
                let group = optional(value);
                if let Some(group) = &group {
                    RegistryConfig::default()
                        .with_group(group.clone())
                        .validate()
                        .map_err(|e| invalid(e.to_string()))?;
                }
                config.registry.group = group;
            }
            Self::RegistryHtpasswdDir => {
                if value.is_empty() {
                    return Err(invalid("path must not be empty".to_string()));
                }
                config.registry.htpasswd_dir = expand_tilde(value);
            }
            Self::UrlsDuration => {
                let secs: u64 = value
                    .parse()
                    .map_err(|_| invalid("must be a number of seconds".to_string()))?;
                if secs == 0 {
                    return Err(invalid("must be greater than zero".to_string()));
                }
                config.urls.duration = secs;
            }
            Self::DnanexusApiServer => {
                if !value.starts_with("http://") && !value.starts_with("https://") {
                    return Err(invalid("must be an http(s) URL".to_string()));
                }
                config.dnanexus.api_server = value.trim_end_matches('/').to_string();
            }
            Self::DnanexusAuthToken => config.dnanexus.auth_token = optional(value),
            Self::DnanexusTimeout => {
                config.dnanexus.timeout = value
                    .parse()
                    .map_err(|_| invalid("must be a number of seconds".to_string()))?;
            }
            Self::DnanexusMaxRetries => {
                config.dnanexus.max_retries = value
                    .parse()
                    .map_err(|_| invalid("must be a non-negative integer".to_string()))?;
            }
            Self::LoggingFile => {
                config.logging.file = optional(value).map(|v| expand_tilde(&v));
            }
        }
        Ok(())
    }
}

impl FromStr for ConfigKey {
    type Err = UnknownConfigKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_lowercase();
        Self::all()
            .iter()
            .copied()
            .find(|key| key.name() == name)
            .ok_or_else(|| UnknownConfigKey(s.to_string()))
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.section(), self.key_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_keys() {
        for key in ConfigKey::all() {
            assert_eq!(key.name().parse::<ConfigKey>().unwrap(), *key);
        }
        let err = "registry.unknown".parse::<ConfigKey>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "unknown configuration key 'registry.unknown'"
        );
        assert_eq!(
            "URLS.Duration".parse::<ConfigKey>().unwrap(),
            ConfigKey::UrlsDuration
        );
    }

    #[test]
    fn test_set_and_get() {
        let mut config = ConfigFile::default();
        ConfigKey::RegistryGroup.set(&mut config, "LKCGP").unwrap();
        ConfigKey::UrlsDuration.set(&mut config, "3600").unwrap();
        ConfigKey::RegistryReferenceGenome
            .set(&mut config, "hg19")
            .unwrap();

        assert_eq!(ConfigKey::RegistryGroup.get(&config), "LKCGP");
        assert_eq!(config.urls.duration, 3600);
        assert_eq!(ConfigKey::RegistryReferenceGenome.get(&config), "hg19");
    }

    #[test]
    fn test_empty_value_clears_optional() {
        let mut config = ConfigFile::default();
        ConfigKey::RegistryGroup.set(&mut config, "G").unwrap();
        ConfigKey::RegistryGroup.set(&mut config, "").unwrap();
        assert!(config.registry.group.is_none());
        assert_eq!(ConfigKey::LoggingFile.get(&config), "");
    }

    #[test]
    fn test_set_validates() {
        let mut config = ConfigFile::default();
        assert!(ConfigKey::UrlsDuration.set(&mut config, "0").is_err());
        assert!(ConfigKey::UrlsDuration.set(&mut config, "soon").is_err());
        assert!(ConfigKey::RegistryGroup.set(&mut config, "a b").is_err());
        assert!(ConfigKey::RegistryUrl.set(&mut config, "ftp://x").is_err());
        assert!(ConfigKey::RegistryReferenceGenome
            .set(&mut config, "hg38")
            .is_err());
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_sections_grouped_in_order() {
        let sections: Vec<&str> = ConfigKey::all().iter().map(|k| k.section()).collect();
        let mut deduped = sections.clone();
        deduped.dedup();
        assert_eq!(deduped, vec!["registry", "urls", "dnanexus", "logging"]);
    }
}
