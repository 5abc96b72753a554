//! Configuration structures and loading logic.

use std::fs;
use std::path::{Path, PathBuf};

use directories::{ProjectDirs, UserDirs};
use serde::{Deserialize, Serialize};

use crate::api::{DEFAULT_BASE_URL, DEFAULT_PAGE_SIZE};
use crate::download::DEFAULT_CONCURRENT_TRANSFERS;
use crate::error::{Error, Result};

/// File name of the configuration inside the config directory.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Main configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub account: AccountConfig,

    #[serde(default)]
    pub options: OptionsConfig,
}

/// Canvas account configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountConfig {
    /// Canvas access token. Absent until one has been validated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Root URL of the Canvas instance.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

/// Download options configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionsConfig {
    /// Base directory for downloads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_directory: Option<PathBuf>,

    /// Categories whose checkbox starts ticked.
    #[serde(default = "default_categories")]
    pub default_categories: Vec<String>,

    /// Page size requested from collection endpoints.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Whether to show per-file progress.
    #[serde(default = "default_true")]
    pub show_downloads: bool,

    /// Transfers running at the same time.
    #[serde(default = "default_concurrent_transfers")]
    pub concurrent_transfers: usize,
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            token: None,
            base_url: default_base_url(),
        }
    }
}

impl Default for OptionsConfig {
    fn default() -> Self {
        Self {
            download_directory: None,
            default_categories: default_categories(),
            page_size: default_page_size(),
            show_downloads: true,
            concurrent_transfers: default_concurrent_transfers(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_categories() -> Vec<String> {
    vec!["modules".to_string(), "files".to_string()]
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_concurrent_transfers() -> usize {
    DEFAULT_CONCURRENT_TRANSFERS
}

fn default_true() -> bool {
    true
}

/// Platform config location, e.g. `~/.config/canvas-downloader/config.toml`.
pub fn default_config_path() -> PathBuf {
    ProjectDirs::from("", "", "canvas-downloader")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::Config(format!(
                    "Configuration file not found: {}",
                    path.display()
                ))
            } else {
                Error::Io(e)
            }
        })?;

        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration, falling back to defaults when the file does not
    /// exist yet.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Save configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, content)?;
        Ok(())
    }

    /// Store a validated token and persist it.
    pub fn set_token(&mut self, token: &str, path: &Path) -> Result<()> {
        self.account.token = Some(token.to_string());
        self.save(path)
    }

    /// Forget the stored token and persist the change.
    pub fn clear_token(&mut self, path: &Path) -> Result<()> {
        self.account.token = None;
        self.save(path)
    }

    /// Get the effective download directory.
    pub fn download_directory(&self) -> PathBuf {
        self.options.download_directory.clone().unwrap_or_else(|| {
            UserDirs::new()
                .and_then(|dirs| dirs.download_dir().map(Path::to_path_buf))
                .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_from_empty_file() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.account.base_url, "https://canvas.nus.edu.sg");
        assert_eq!(config.options.default_categories, vec!["modules", "files"]);
        assert_eq!(config.options.page_size, 100);
        assert!(config.options.show_downloads);
        assert_eq!(config.options.concurrent_transfers, 8);
    }

    #[test]
    fn test_partial_file() {
        let config: Config = toml::from_str(
            r#"
            [account]
            token = "1234~abcdef"

            [options]
            download_directory = "/tmp/canvas"
            default_categories = ["grades"]
            "#,
        )
        .unwrap();

        assert_eq!(config.account.token.as_deref(), Some("1234~abcdef"));
        assert_eq!(config.account.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.download_directory(), PathBuf::from("/tmp/canvas"));
        assert_eq!(config.options.default_categories, vec!["grades"]);
    }

    #[test]
    fn test_token_persistence() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/config.toml");

        let mut config = Config::load_or_default(&path).unwrap();
        config.set_token("1234~abcdef", &path).unwrap();
        assert_eq!(
            Config::load(&path).unwrap().account.token.as_deref(),
            Some("1234~abcdef")
        );

        config.clear_token(&path).unwrap();
        let reloaded = Config::load(&path).unwrap();
        assert!(reloaded.account.token.is_none());
        assert!(!fs::read_to_string(&path).unwrap().contains("token"));
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let dir = TempDir::new().unwrap();
        let result = Config::load(&dir.path().join("absent.toml"));
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
