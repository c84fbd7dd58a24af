//! Configuration management for mdinline.
//!
//! Parses `mdinline.toml` configuration files with serde and provides
//! auto-discovery of config files from the document directory upward.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `diagrams.server_url`
//! - `diagrams.local_jar`
//! - `diagrams.java_path`
//! - `diagrams.dot_path`

mod expand;

use mdinline_diagrams::DEFAULT_SERVER_URL;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "mdinline.toml";

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override vault root directory.
    pub vault_root: Option<PathBuf>,
    /// Override cache enabled flag.
    pub cache_enabled: Option<bool>,
    /// Override image description policy.
    pub keep_description: Option<bool>,
    /// Override default diagram output format.
    pub format: Option<String>,
    /// Override `PlantUML` server URL.
    pub server_url: Option<String>,
    /// Override local `PlantUML` jar or executable path.
    pub local_jar: Option<String>,
    /// Directory of the document being converted. Config discovery starts
    /// here, and without a config file it becomes the vault root.
    pub document_dir: Option<PathBuf>,
}

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Vault configuration (paths are relative strings from TOML).
    vault: VaultConfigRaw,
    /// Image embedding configuration.
    pub images: ImagesConfig,
    /// Diagram rendering configuration.
    pub diagrams: DiagramsConfig,

    /// Resolved vault configuration (set after loading).
    #[serde(skip)]
    pub vault_resolved: VaultConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw vault configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct VaultConfigRaw {
    root: Option<String>,
    cache_enabled: Option<bool>,
}

/// Resolved vault configuration with absolute paths.
#[derive(Debug, Default)]
pub struct VaultConfig {
    /// Root of the document collection.
    pub root: PathBuf,
    /// Whether the persistent diagram cache is enabled.
    pub cache_enabled: bool,
}

impl VaultConfig {
    /// Project data directory (`.mdinline/` inside the vault).
    #[must_use]
    pub fn project_dir(&self) -> PathBuf {
        self.root.join(".mdinline")
    }

    /// Cache directory path (`.mdinline/cache/`).
    #[must_use]
    pub fn cache_dir(&self) -> PathBuf {
        self.project_dir().join("cache")
    }
}

/// Image embedding configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ImagesConfig {
    /// Keep alt text (standard links) or file name (wiki embeds) as image description.
    pub keep_description: bool,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            keep_description: true,
        }
    }
}

/// Diagram rendering configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DiagramsConfig {
    /// Default output format (`png` or `svg`).
    pub format: String,
    /// `PlantUML` server base URL.
    pub server_url: String,
    /// Local `PlantUML` jar or executable. Empty selects the server.
    pub local_jar: String,
    /// Java runtime used to run a jar.
    pub java_path: String,
    /// Graphviz `dot` executable passed to `PlantUML`.
    pub dot_path: String,
}

impl Default for DiagramsConfig {
    fn default() -> Self {
        Self {
            format: "png".to_owned(),
            server_url: DEFAULT_SERVER_URL.to_owned(),
            local_jar: String::new(),
            java_path: "java".to_owned(),
            dot_path: "dot".to_owned(),
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`diagrams.server_url`").
        field: String,
        /// Error message (e.g., "${`PLANTUML_SERVER`} not set").
        message: String,
    },
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `mdinline.toml` in the document directory (or
    /// the current directory) and its parents. With no file found, the vault
    /// is rooted at that starting directory.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the final configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let start = cli_settings
            .and_then(|s| s.document_dir.clone())
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_default();

        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config(&start) {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_base(&start)
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(root) = &settings.vault_root {
            self.vault_resolved.root.clone_from(root);
        }
        if let Some(cache_enabled) = settings.cache_enabled {
            self.vault_resolved.cache_enabled = cache_enabled;
        }
        if let Some(keep_description) = settings.keep_description {
            self.images.keep_description = keep_description;
        }
        if let Some(format) = &settings.format {
            self.diagrams.format.clone_from(format);
        }
        if let Some(server_url) = &settings.server_url {
            self.diagrams.server_url.clone_from(server_url);
        }
        if let Some(local_jar) = &settings.local_jar {
            self.diagrams.local_jar.clone_from(local_jar);
        }
    }

    /// Search for config file in `start` and its parents.
    fn discover_config(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with the vault rooted at `base`.
    fn default_with_base(base: &Path) -> Self {
        Self {
            vault: VaultConfigRaw::default(),
            images: ImagesConfig::default(),
            diagrams: DiagramsConfig::default(),
            vault_resolved: VaultConfig {
                root: base.to_path_buf(),
                cache_enabled: true,
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !matches!(self.diagrams.format.as_str(), "png" | "svg") {
            return Err(ConfigError::Validation(format!(
                "diagrams.format must be \"png\" or \"svg\", got \"{}\"",
                self.diagrams.format
            )));
        }

        // Empty falls back to the default server
        if !self.diagrams.server_url.is_empty() {
            require_http_url(&self.diagrams.server_url, "diagrams.server_url")?;
        }

        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        let diagrams = &mut self.diagrams;
        diagrams.server_url = expand::expand_env(&diagrams.server_url, "diagrams.server_url")?;
        diagrams.local_jar = expand::expand_env(&diagrams.local_jar, "diagrams.local_jar")?;
        diagrams.java_path = expand::expand_env(&diagrams.java_path, "diagrams.java_path")?;
        diagrams.dot_path = expand::expand_env(&diagrams.dot_path, "diagrams.dot_path")?;
        Ok(())
    }

    /// Resolve the vault root relative to the config file directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        self.vault_resolved = VaultConfig {
            root: config_dir.join(self.vault.root.as_deref().unwrap_or(".")),
            cache_enabled: self.vault.cache_enabled.unwrap_or(true),
        };
    }
}
