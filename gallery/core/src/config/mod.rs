//! TOML Configuration File Support
//!
//! Centralized configuration loading for the gallery, with an optional TOML
//! file at `~/.config/gallery/gallery.toml`.
//!
//! # Configuration Priority
//!
//! Values are resolved with the following priority (highest first):
//! 1. CLI arguments ([`ConfigOverrides`])
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Default values
//!
//! # XDG Base Directory Compliance
//!
//! - Config: `$XDG_CONFIG_HOME/gallery/gallery.toml`
//! - Favorites storage: `$XDG_DATA_HOME/gallery/storage.json`
//!
//! # Example Configuration
//!
//! ```toml
//! [api]
//! base_url = "https://api.artic.edu/api/v1"
//! request_timeout_secs = 20
//! search_fields = ["id", "title", "image_id", "artist_id"]
//!
//! [images]
//! host = "www.artic.edu"
//! service_path = "iiif/2"
//! width = 843
//!
//! [listing]
//! page_size = 15
//! artist_works_limit = 100
//!
//! [storage]
//! path = "/home/me/.local/share/gallery/storage.json"
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Overrides |
//! |----------|-----------|
//! | `GALLERY_API_URL` | `api.base_url` |
//! | `GALLERY_REQUEST_TIMEOUT` | `api.request_timeout_secs` |
//! | `GALLERY_PAGE_SIZE` | `listing.page_size` |
//! | `GALLERY_IMAGE_WIDTH` | `images.width` |
//! | `GALLERY_STORAGE_PATH` | `storage.path` |

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::gateway::{ImageTemplate, DEFAULT_API_URL};
use crate::listing::DEFAULT_PAGE_SIZE;

/// Default number of titles fetched for an artist detail
pub const DEFAULT_ARTIST_WORKS_LIMIT: u32 = 100;

const ENV_API_URL: &str = "GALLERY_API_URL";
const ENV_REQUEST_TIMEOUT: &str = "GALLERY_REQUEST_TIMEOUT";
const ENV_PAGE_SIZE: &str = "GALLERY_PAGE_SIZE";
const ENV_IMAGE_WIDTH: &str = "GALLERY_IMAGE_WIDTH";
const ENV_STORAGE_PATH: &str = "GALLERY_STORAGE_PATH";

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where the highest-priority configuration value came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from command-line argument
    Cli,
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// `[api]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiToml {
    /// Catalog API root
    pub base_url: Option<String>,

    /// Whole-request timeout in seconds
    pub request_timeout_secs: Option<u64>,

    /// Fields requested from the search endpoint
    pub search_fields: Option<Vec<String>>,
}

/// `[images]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ImagesToml {
    /// IIIF host
    pub host: Option<String>,

    /// IIIF service path on the host
    pub service_path: Option<String>,

    /// Requested image width in pixels
    pub width: Option<u32>,
}

/// `[listing]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingToml {
    /// Artworks per page
    pub page_size: Option<u32>,

    /// Titles fetched for an artist detail
    pub artist_works_limit: Option<u32>,
}

/// `[storage]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageToml {
    /// Favorites storage file
    pub path: Option<PathBuf>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryToml {
    /// API section
    pub api: ApiToml,

    /// Images section
    pub images: ImagesToml,

    /// Listing section
    pub listing: ListingToml,

    /// Storage section
    pub storage: StorageToml,
}

// =============================================================================
// Main Configuration Struct
// =============================================================================

/// Resolved gallery configuration
///
/// Use [`load_config`] to build one with proper priority handling, then
/// [`ConfigOverrides::apply`] for CLI flags and [`GalleryConfig::validate`].
#[derive(Clone, Debug)]
pub struct GalleryConfig {
    /// Catalog API root
    pub api_url: String,

    /// Image URL template
    pub images: ImageTemplate,

    /// Whole-request timeout; `None` waits indefinitely
    pub request_timeout: Option<Duration>,

    /// Fields requested from search; empty keeps the gateway default
    pub search_fields: Vec<String>,

    /// Artworks per page
    pub page_size: u32,

    /// Titles fetched for an artist detail
    pub artist_works_limit: u32,

    /// Favorites storage file; `None` uses [`default_storage_path`]
    pub storage_path: Option<PathBuf>,

    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,

    source: ConfigSource,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            images: ImageTemplate::default(),
            request_timeout: None,
            search_fields: Vec::new(),
            page_size: DEFAULT_PAGE_SIZE,
            artist_works_limit: DEFAULT_ARTIST_WORKS_LIMIT,
            storage_path: None,
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

impl GalleryConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the primary source of this configuration
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Set the configuration source
    pub fn set_source(&mut self, source: ConfigSource) {
        self.source = source;
    }

    /// Storage file to use, falling back to the XDG data directory
    #[must_use]
    pub fn resolved_storage_path(&self) -> Option<PathBuf> {
        self.storage_path.clone().or_else(default_storage_path)
    }

    /// Reject values the gallery cannot run with
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] for an empty API URL, a zero
    /// page size, or a zero image width.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "api.base_url must not be empty".to_string(),
            ));
        }
        if self.page_size == 0 {
            return Err(ConfigError::ValidationError(
                "listing.page_size must be at least 1".to_string(),
            ));
        }
        if self.images.width == 0 {
            return Err(ConfigError::ValidationError(
                "images.width must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/gallery/gallery.toml` or
/// `~/.config/gallery/gallery.toml` if `XDG_CONFIG_HOME` is not set.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("gallery").join("gallery.toml"))
}

/// Get the default favorites storage path
///
/// Returns `$XDG_DATA_HOME/gallery/storage.json`.
#[must_use]
pub fn default_storage_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("gallery").join("storage.json"))
}

/// Load configuration from all sources with proper priority
///
/// CLI overrides are not handled here; apply [`ConfigOverrides`] afterwards.
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed.
/// A missing config file is not an error (defaults are used).
pub fn load_config() -> Result<GalleryConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read or parsed.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<GalleryConfig, ConfigError> {
    load_config_with_env(path, |key| std::env::var(key).ok())
}

/// Load configuration with an explicit environment lookup
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read or parsed.
pub fn load_config_with_env<F>(path: Option<PathBuf>, env: F) -> Result<GalleryConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = GalleryConfig::default();

    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: GalleryToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, &toml_config);
            config.config_file_path = Some(config_path.clone());
            config.source = ConfigSource::File;

            tracing::info!(
                path = %config_path.display(),
                "Loaded configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    apply_env_config(&mut config, env);

    Ok(config)
}

fn apply_toml_config(config: &mut GalleryConfig, toml: &GalleryToml) {
    if let Some(ref url) = toml.api.base_url {
        config.api_url.clone_from(url);
    }
    if let Some(secs) = toml.api.request_timeout_secs {
        config.request_timeout = Some(Duration::from_secs(secs));
    }
    if let Some(ref fields) = toml.api.search_fields {
        config.search_fields.clone_from(fields);
    }

    if let Some(ref host) = toml.images.host {
        config.images.host.clone_from(host);
    }
    if let Some(ref path) = toml.images.service_path {
        config.images.service_path.clone_from(path);
    }
    if let Some(width) = toml.images.width {
        config.images.width = width;
    }

    if let Some(size) = toml.listing.page_size {
        config.page_size = size;
    }
    if let Some(limit) = toml.listing.artist_works_limit {
        config.artist_works_limit = limit;
    }

    if toml.storage.path.is_some() {
        config.storage_path.clone_from(&toml.storage.path);
    }
}

fn apply_env_config<F>(config: &mut GalleryConfig, env: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = env(ENV_API_URL) {
        config.api_url = url;
        config.source = ConfigSource::Env;
    }
    if let Some(timeout) = env(ENV_REQUEST_TIMEOUT) {
        if let Ok(secs) = timeout.parse::<u64>() {
            config.request_timeout = Some(Duration::from_secs(secs));
            config.source = ConfigSource::Env;
        } else {
            tracing::warn!(var = ENV_REQUEST_TIMEOUT, value = %timeout, "Ignoring unparseable environment value");
        }
    }
    if let Some(size) = env(ENV_PAGE_SIZE) {
        if let Ok(n) = size.parse::<u32>() {
            config.page_size = n;
            config.source = ConfigSource::Env;
        } else {
            tracing::warn!(var = ENV_PAGE_SIZE, value = %size, "Ignoring unparseable environment value");
        }
    }
    if let Some(width) = env(ENV_IMAGE_WIDTH) {
        if let Ok(n) = width.parse::<u32>() {
            config.images.width = n;
            config.source = ConfigSource::Env;
        } else {
            tracing::warn!(var = ENV_IMAGE_WIDTH, value = %width, "Ignoring unparseable environment value");
        }
    }
    if let Some(path) = env(ENV_STORAGE_PATH) {
        config.storage_path = Some(PathBuf::from(path));
        config.source = ConfigSource::Env;
    }
}

// =============================================================================
// CLI Override Support
// =============================================================================

/// Builder for applying CLI overrides to configuration
///
/// Use this after [`load_config`] to apply command-line argument overrides.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// API root override
    pub api_url: Option<String>,

    /// Page size override
    pub page_size: Option<u32>,

    /// Storage path override
    pub storage_path: Option<PathBuf>,
}

impl ConfigOverrides {
    /// Create a new empty set of overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set API root override
    #[must_use]
    pub fn with_api_url(mut self, url: String) -> Self {
        self.api_url = Some(url);
        self
    }

    /// Set page size override
    #[must_use]
    pub fn with_page_size(mut self, size: u32) -> Self {
        self.page_size = Some(size);
        self
    }

    /// Set storage path override
    #[must_use]
    pub fn with_storage_path(mut self, path: PathBuf) -> Self {
        self.storage_path = Some(path);
        self
    }

    /// Apply overrides to a configuration
    pub fn apply(&self, config: &mut GalleryConfig) {
        if self.api_url.is_some() || self.page_size.is_some() || self.storage_path.is_some() {
            config.source = ConfigSource::Cli;
        }

        if let Some(ref url) = self.api_url {
            config.api_url.clone_from(url);
        }
        if let Some(size) = self.page_size {
            config.page_size = size;
        }
        if self.storage_path.is_some() {
            config.storage_path.clone_from(&self.storage_path);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
