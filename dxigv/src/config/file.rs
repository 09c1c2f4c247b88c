//! INI configuration file.
//!
//! Settings live in `~/.dxigv/config.ini`. A missing file, section or key
//! falls back to the built-in default; command-line flags override both.

use std::path::{Path, PathBuf};
use std::time::Duration;

use ini::Ini;
use thiserror::Error;

use crate::registry::{
    default_registry_root, ReferenceGenome, RegistryConfig, DEFAULT_URL_ROOT, ONE_YEAR,
};
use crate::store::DxClientConfig;

/// Directory name under the home directory.
const CONFIG_DIR: &str = ".dxigv";

/// Configuration file name.
const CONFIG_FILENAME: &str = "config.ini";

/// Errors reading or writing the configuration file.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("failed to read config file {}: {message}", path.display())]
    Read { path: PathBuf, message: String },

    #[error("failed to write config file {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

/// Result type for configuration file operations.
pub type ConfigFileResult<T> = Result<T, ConfigFileError>;

/// Path of the configuration file, `~/.dxigv/config.ini`.
pub fn config_file_path() -> PathBuf {
    config_dir().join(CONFIG_FILENAME)
}

/// Directory holding the configuration file.
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR)
}

/// Expand a leading `~` to the home directory.
pub fn expand_tilde(value: &str) -> PathBuf {
    let home = dirs::home_dir();
    match (value, home) {
        ("~", Some(home)) => home,
        (v, Some(home)) if v.starts_with("~/") => home.join(&v[2..]),
        (v, _) => PathBuf::from(v),
    }
}

/// `[registry]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrySettings {
    /// Local web-served root folder.
    pub path: PathBuf,
    /// Web URL of `path`.
    pub url: String,
    pub reference_genome: ReferenceGenome,
    /// Access-partitioned sub-folder, if any.
    pub group: Option<String>,
    /// Where `.htpasswd_<group>` files are created.
    pub htpasswd_dir: PathBuf,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            path: default_registry_root(),
            url: DEFAULT_URL_ROOT.to_string(),
            reference_genome: ReferenceGenome::default(),
            group: None,
            htpasswd_dir: dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")),
        }
    }
}

/// `[urls]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlSettings {
    /// Download URL validity in seconds.
    pub duration: u64,
}

impl Default for UrlSettings {
    fn default() -> Self {
        Self { duration: ONE_YEAR }
    }
}

/// `[dnanexus]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnanexusSettings {
    pub api_server: String,
    /// Falls back to `DX_SECURITY_CONTEXT` when unset.
    pub auth_token: Option<String>,
    /// Request timeout in seconds.
    pub timeout: u64,
    pub max_retries: u32,
}

impl Default for DnanexusSettings {
    fn default() -> Self {
        let client = DxClientConfig::default();
        Self {
            api_server: client.api_server,
            auth_token: None,
            timeout: client.timeout.as_secs(),
            max_retries: client.max_retries,
        }
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoggingSettings {
    /// Optional log file; stderr logging is always on.
    pub file: Option<PathBuf>,
}

/// Parsed configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    pub registry: RegistrySettings,
    pub urls: UrlSettings,
    pub dnanexus: DnanexusSettings,
    pub logging: LoggingSettings,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> ConfigFileResult<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| ConfigFileError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            reason: e.to_string(),
        })
}

impl ConfigFile {
    /// Load `~/.dxigv/config.ini`, or defaults if it does not exist.
    pub fn load() -> ConfigFileResult<Self> {
        Self::load_from(&config_file_path())
    }

    /// Load a configuration file, or defaults if it does not exist.
    pub fn load_from(path: &Path) -> ConfigFileResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let ini = Ini::load_from_file(path).map_err(|e| ConfigFileError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_ini(&ini)
    }

    /// Parse configuration from INI text.
    pub fn parse(content: &str) -> ConfigFileResult<Self> {
        let ini = Ini::load_from_str(content).map_err(|e| ConfigFileError::Read {
            path: PathBuf::from("<string>"),
            message: e.to_string(),
        })?;
        Self::from_ini(&ini)
    }

    fn from_ini(ini: &Ini) -> ConfigFileResult<Self> {
        let mut config = Self::default();

        if let Some(section) = ini.section(Some("registry")) {
            if let Some(v) = non_empty(section.get("path")) {
                config.registry.path = expand_tilde(v);
            }
            if let Some(v) = non_empty(section.get("url")) {
                config.registry.url = v.to_string();
            }
            if let Some(v) = non_empty(section.get("reference_genome")) {
                config.registry.reference_genome =
                    v.parse().map_err(|e: crate::registry::RegistryError| {
                        ConfigFileError::InvalidValue {
                            key: "registry.reference_genome".to_string(),
                            value: v.to_string(),
                            reason: e.to_string(),
                        }
                    })?;
            }
            config.registry.group = non_empty(section.get("group")).map(str::to_string);
            if let Some(v) = non_empty(section.get("htpasswd_dir")) {
                config.registry.htpasswd_dir = expand_tilde(v);
            }
        }

        if let Some(section) = ini.section(Some("urls")) {
            if let Some(v) = non_empty(section.get("duration")) {
                config.urls.duration = parse_number("urls.duration", v)?;
            }
        }

        if let Some(section) = ini.section(Some("dnanexus")) {
            if let Some(v) = non_empty(section.get("api_server")) {
                config.dnanexus.api_server = v.trim_end_matches('/').to_string();
            }
            config.dnanexus.auth_token = non_empty(section.get("auth_token")).map(str::to_string);
            if let Some(v) = non_empty(section.get("timeout")) {
                config.dnanexus.timeout = parse_number("dnanexus.timeout", v)?;
            }
            if let Some(v) = non_empty(section.get("max_retries")) {
                config.dnanexus.max_retries = parse_number("dnanexus.max_retries", v)?;
            }
        }

        if let Some(section) = ini.section(Some("logging")) {
            config.logging.file = non_empty(section.get("file")).map(expand_tilde);
        }

        Ok(config)
    }

    fn to_ini(&self) -> Ini {
        let mut ini = Ini::new();
        ini.with_section(Some("registry"))
            .set("path", self.registry.path.display().to_string())
            .set("url", self.registry.url.as_str())
            .set("reference_genome", self.registry.reference_genome.id())
            .set("group", self.registry.group.clone().unwrap_or_default())
            .set(
                "htpasswd_dir",
                self.registry.htpasswd_dir.display().to_string(),
            );
        ini.with_section(Some("urls"))
            .set("duration", self.urls.duration.to_string());
        ini.with_section(Some("dnanexus"))
            .set("api_server", self.dnanexus.api_server.as_str())
            .set(
                "auth_token",
                self.dnanexus.auth_token.clone().unwrap_or_default(),
            )
            .set("timeout", self.dnanexus.timeout.to_string())
            .set("max_retries", self.dnanexus.max_retries.to_string());
        ini.with_section(Some("logging")).set(
            "file",
            self.logging
                .file
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
        );
        ini
    }

    /// Write to `~/.dxigv/config.ini`, creating the directory if needed.
    pub fn save(&self) -> ConfigFileResult<()> {
        self.save_to(&config_file_path())
    }

    /// Write to the given path, creating parent directories if needed.
    pub fn save_to(&self, path: &Path) -> ConfigFileResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigFileError::Write {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        self.to_ini()
            .write_to_file(path)
            .map_err(|e| ConfigFileError::Write {
                path: path.to_path_buf(),
                source: e,
            })
    }

    /// Registry settings as a [`RegistryConfig`].
    pub fn to_registry_config(&self) -> RegistryConfig {
        let mut config = RegistryConfig::new(&self.registry.path, self.registry.url.clone())
            .with_reference_genome(self.registry.reference_genome)
            .with_url_validity_secs(self.urls.duration)
            .with_htpasswd_dir(&self.registry.htpasswd_dir);
        config.group = self.registry.group.clone();
        config
    }

    /// Connection settings as a [`DxClientConfig`].
    pub fn to_dx_client_config(&self) -> DxClientConfig {
        let mut config = DxClientConfig::default()
            .with_api_server(self.dnanexus.api_server.clone())
            .with_timeout(Duration::from_secs(self.dnanexus.timeout))
            .with_max_retries(self.dnanexus.max_retries);
        if let Some(token) = &self.dnanexus.auth_token {
            config = config.with_auth_token(token.clone());
        }
        config
    }
}
