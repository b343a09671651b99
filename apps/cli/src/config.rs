//! # Application Configuration
//!
//! Layered settings for the `velmo` CLI.
//!
//! ## Load Order (later overrides earlier)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Defaults            public URL, GNF, 42-column receipts             │
//! │  2. velmo.toml          $VELMO_CONFIG, else the platform config dir:    │
//! │                         • Linux:   ~/.config/velmo/velmo.toml           │
//! │                         • macOS:   ~/Library/Application Support/       │
//! │                                    app.velmo.velmo/velmo.toml           │
//! │                         • Windows: %APPDATA%\velmo\velmo\config\        │
//! │  3. Environment         VELMO_BACKEND_URL, VELMO_ANON_KEY,              │
//! │                         VELMO_PUBLIC_URL, VELMO_DB_PATH,                │
//! │                         VELMO_RECEIPT_WIDTH, VELMO_CURRENCY             │
//! │                         (a `.env` file in the working dir counts)       │
//! │  4. validate()          backend URL and key are required                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example Config File
//! ```toml
//! [backend]
//! url = "https://abcd1234.supabase.co"
//! anon_key = "eyJhbGciOi..."
//! timeout_secs = 15
//!
//! [storefront]
//! public_url = "https://velmo.app"
//! currency = "GNF"
//! receipt_width = 32
//!
//! [storage]
//! db_path = "/var/lib/velmo/velmo.db"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use velmo_backend::{BackendConfig, BackendError};
use velmo_core::receipt::ReceiptWidth;
use velmo_core::DEFAULT_CURRENCY;

const CONFIG_FILE_NAME: &str = "velmo.toml";
const DB_FILE_NAME: &str = "velmo.db";

// =============================================================================
// Errors
// =============================================================================

/// Configuration loading failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// A required setting is absent from every layer.
    #[error("Missing required setting: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid setting {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    /// No home directory to derive default paths from.
    #[error("Could not determine the application data directory")]
    NoDataDir,
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Sections
// =============================================================================

/// Hosted backend connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendSettings {
    /// Project URL, e.g. `https://abcd1234.supabase.co`.
    #[serde(default)]
    pub url: String,

    /// Public anonymous key.
    #[serde(default)]
    pub anon_key: String,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_media_bucket")]
    pub media_bucket: String,
}

fn default_timeout() -> u64 {
    15
}

fn default_media_bucket() -> String {
    velmo_backend::config::DEFAULT_MEDIA_BUCKET.to_string()
}

impl Default for BackendSettings {
    fn default() -> Self {
        BackendSettings {
            url: String::new(),
            anon_key: String::new(),
            timeout_secs: default_timeout(),
            media_bucket: default_media_bucket(),
        }
    }
}

/// Shopper-facing presentation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorefrontSettings {
    /// Public site serving `/receipt/<id>` pages.
    #[serde(default = "default_public_url")]
    pub public_url: String,

    /// Currency shown when a shop has none set.
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Receipt columns: 32, 42 or 48.
    #[serde(default = "default_receipt_width")]
    pub receipt_width: usize,
}

fn default_public_url() -> String {
    "https://velmo.app".to_string()
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

fn default_receipt_width() -> usize {
    ReceiptWidth::default().columns()
}

impl Default for StorefrontSettings {
    fn default() -> Self {
        StorefrontSettings {
            public_url: default_public_url(),
            currency: default_currency(),
            receipt_width: default_receipt_width(),
        }
    }
}

/// On-device storage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageSettings {
    /// SQLite file; the platform data dir when unset.
    #[serde(default)]
    pub db_path: Option<PathBuf>,
}

// =============================================================================
// AppConfig
// =============================================================================

/// Complete CLI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub backend: BackendSettings,

    #[serde(default)]
    pub storefront: StorefrontSettings,

    #[serde(default)]
    pub storage: StorageSettings,
}

impl AppConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// `config_path` (from `--config`) wins over `VELMO_CONFIG`.
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!(?path, "Loaded .env file");
        }

        let path = config_path
            .or_else(|| std::env::var_os("VELMO_CONFIG").map(PathBuf::from))
            .or_else(Self::default_config_path);

        let mut config = match path {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Reads a TOML file; a missing file gives the defaults.
    fn from_file(path: &Path) -> ConfigResult<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(?path, "Config file not found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };

        info!(?path, "Loaded config file");
        Ok(toml::from_str(&contents)?)
    }

    /// Applies `VELMO_*` overrides read through `lookup`.
    fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("VELMO_BACKEND_URL") {
            debug!(url = %url, "Overriding backend URL from environment");
            self.backend.url = url;
        }

        if let Some(key) = lookup("VELMO_ANON_KEY") {
            self.backend.anon_key = key;
        }

        if let Some(url) = lookup("VELMO_PUBLIC_URL") {
            self.storefront.public_url = url;
        }

        if let Some(path) = lookup("VELMO_DB_PATH") {
            self.storage.db_path = Some(PathBuf::from(path));
        }

        if let Some(width) = lookup("VELMO_RECEIPT_WIDTH") {
            match width.trim().parse::<usize>() {
                Ok(columns) => self.storefront.receipt_width = columns,
                Err(_) => warn!(width = %width, "Ignoring non-numeric receipt width"),
            }
        }

        if let Some(currency) = lookup("VELMO_CURRENCY") {
            self.storefront.currency = currency.trim().to_uppercase();
        }
    }

    /// Validates the merged configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.backend.url.trim().is_empty() {
            return Err(ConfigError::MissingRequired("backend.url (VELMO_BACKEND_URL)"));
        }

        if self.backend.anon_key.trim().is_empty() {
            return Err(ConfigError::MissingRequired("backend.anon_key (VELMO_ANON_KEY)"));
        }

        let public_url = self.storefront.public_url.trim();
        if !public_url.starts_with("http://") && !public_url.starts_with("https://") {
            return Err(ConfigError::Invalid {
                field: "storefront.public_url",
                reason: format!("must start with http:// or https://, got: {public_url}"),
            });
        }

        ReceiptWidth::try_from(self.storefront.receipt_width).map_err(|e| {
            ConfigError::Invalid {
                field: "storefront.receipt_width",
                reason: e.to_string(),
            }
        })?;

        if self.storefront.currency.trim().is_empty() {
            return Err(ConfigError::MissingRequired("storefront.currency"));
        }

        Ok(())
    }

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("app", "velmo", "velmo")
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    // =========================================================================
    // Derived Settings
    // =========================================================================

    /// Settings for the backend client.
    pub fn backend_config(&self) -> Result<BackendConfig, BackendError> {
        Ok(
            BackendConfig::new(&self.backend.url, self.backend.anon_key.trim())?
                .timeout(Duration::from_secs(self.backend.timeout_secs))
                .media_bucket(self.backend.media_bucket.clone()),
        )
    }

    /// Where the local database lives.
    pub fn database_path(&self) -> ConfigResult<PathBuf> {
        if let Some(path) = &self.storage.db_path {
            return Ok(path.clone());
        }

        Self::project_dirs()
            .map(|dirs| dirs.data_dir().join(DB_FILE_NAME))
            .ok_or(ConfigError::NoDataDir)
    }

    /// Receipt width, standard when the setting is invalid.
    pub fn receipt_width(&self) -> ReceiptWidth {
        ReceiptWidth::try_from(self.storefront.receipt_width).unwrap_or_default()
    }

    /// Base URL for public receipt links.
    pub fn public_url(&self) -> &str {
        self.storefront.public_url.trim()
    }

    pub fn currency(&self) -> &str {
        self.storefront.currency.trim()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn configured() -> AppConfig {
        let mut config = AppConfig::default();
        config.backend.url = "https://abc.supabase.co".to_string();
        config.backend.anon_key = "anon".to_string();
        config
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.storefront.currency, "GNF");
        assert_eq!(config.storefront.receipt_width, 42);
        assert_eq!(config.backend.timeout_secs, 15);
        assert_eq!(config.backend.media_bucket, "velmo-media");
    }

    #[test]
    fn test_missing_backend_is_rejected() {
        let mut config = AppConfig::default();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingRequired(field)) if field.starts_with("backend.url")
        ));

        config.backend.url = "https://abc.supabase.co".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingRequired(field)) if field.starts_with("backend.anon_key")
        ));

        config.backend.anon_key = "anon".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_settings_are_rejected() {
        let mut config = configured();
        config.storefront.receipt_width = 40;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "storefront.receipt_width", .. })
        ));

        let mut config = configured();
        config.storefront.public_url = "velmo.app".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "storefront.public_url", .. })
        ));
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut config: AppConfig = toml::from_str(
            r#"
            [backend]
            url = "https://from-file.supabase.co"
            anon_key = "file-key"

            [storefront]
            receipt_width = 48
            "#,
        )
        .unwrap();

        config.apply_env_overrides(env(&[
            ("VELMO_BACKEND_URL", "https://from-env.supabase.co"),
            ("VELMO_RECEIPT_WIDTH", "32"),
            ("VELMO_CURRENCY", " xof "),
            ("VELMO_DB_PATH", "/tmp/velmo-env.db"),
        ]));

        assert_eq!(config.backend.url, "https://from-env.supabase.co");
        assert_eq!(config.backend.anon_key, "file-key");
        assert_eq!(config.receipt_width(), ReceiptWidth::Narrow);
        assert_eq!(config.currency(), "XOF");
        assert_eq!(
            config.database_path().unwrap(),
            PathBuf::from("/tmp/velmo-env.db")
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bad_width_in_env_is_ignored() {
        let mut config = configured();
        config.apply_env_overrides(env(&[("VELMO_RECEIPT_WIDTH", "wide")]));
        assert_eq!(config.storefront.receipt_width, 42);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let path = std::env::temp_dir().join(format!("velmo-{}.toml", uuid::Uuid::new_v4()));
        let config = AppConfig::from_file(&path).unwrap();
        assert!(config.backend.url.is_empty());
    }

    #[test]
    fn test_unreadable_path_is_an_error() {
        // A directory exists but cannot be read as a file.
        let dir = std::env::temp_dir().join(format!("velmo-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir(&dir).unwrap();

        let result = AppConfig::from_file(&dir);
        std::fs::remove_dir(&dir).unwrap();

        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_file_is_parsed() {
        let path = std::env::temp_dir().join(format!("velmo-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(
            &path,
            "[backend]\nurl = \"https://abc.supabase.co\"\nanon_key = \"k\"\ntimeout_secs = 3\n",
        )
        .unwrap();

        let config = AppConfig::from_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.backend.timeout_secs, 3);
        let backend = config.backend_config().unwrap();
        assert_eq!(backend.timeout, Duration::from_secs(3));
        assert_eq!(backend.base_url.as_str(), "https://abc.supabase.co/");
    }

    #[test]
    fn test_toml_serialization() {
        let toml_str = toml::to_string_pretty(&configured()).unwrap();
        assert!(toml_str.contains("[backend]"));
        assert!(toml_str.contains("[storefront]"));
    }
}
