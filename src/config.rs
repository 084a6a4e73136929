use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration.
///
/// Built once at process start and passed by reference into each capability
/// client; nothing else in the crate reads the environment.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Board credentials and endpoint
    #[serde(default)]
    pub trello: TrelloConfig,
    /// Backend credentials and endpoint
    #[serde(default)]
    pub strapi: StrapiConfig,
    /// Image catalog credentials and endpoint
    #[serde(default)]
    pub unsplash: UnsplashConfig,
    /// Object storage credentials, region and bucket names
    #[serde(default)]
    pub storage: StorageConfig,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TrelloConfig {
    /// API key (can also be set via SNACK__TRELLO__API_KEY)
    pub api_key: Option<String>,
    /// Member token authorizing board access
    pub api_token: Option<String>,
    #[serde(default = "default_trello_base_url")]
    pub base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StrapiConfig {
    /// JWT bearer token for authenticated writes
    pub auth_token: Option<String>,
    #[serde(default = "default_strapi_base_url")]
    pub base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UnsplashConfig {
    /// Access key for catalog lookups; only checked on first use
    pub access_key: Option<String>,
    #[serde(default = "default_unsplash_base_url")]
    pub base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    #[serde(default = "default_storage_region")]
    pub region: String,
    /// Domain under which uploaded objects are publicly reachable
    /// (`https://{bucket}.{public_domain}/{key}`)
    #[serde(default = "default_storage_domain")]
    pub public_domain: String,
    #[serde(default = "default_image_bucket")]
    pub image_bucket: String,
    #[serde(default = "default_sharepic_bucket")]
    pub sharepic_bucket: String,
}

impl Default for TrelloConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_token: None,
            base_url: default_trello_base_url(),
        }
    }
}

impl Default for StrapiConfig {
    fn default() -> Self {
        Self {
            auth_token: None,
            base_url: default_strapi_base_url(),
        }
    }
}

impl Default for UnsplashConfig {
    fn default() -> Self {
        Self {
            access_key: None,
            base_url: default_unsplash_base_url(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            access_key: None,
            secret_key: None,
            region: default_storage_region(),
            public_domain: default_storage_domain(),
            image_bucket: default_image_bucket(),
            sharepic_bucket: default_sharepic_bucket(),
        }
    }
}

// Default value functions
fn default_trello_base_url() -> String {
    "https://api.trello.com".to_string()
}

fn default_strapi_base_url() -> String {
    "https://cms.factsforfriends.de".to_string()
}

fn default_unsplash_base_url() -> String {
    "https://api.unsplash.com".to_string()
}

fn default_storage_region() -> String {
    "eu-central-1".to_string()
}

fn default_storage_domain() -> String {
    "s3.eu-central-1.amazonaws.com".to_string()
}

fn default_image_bucket() -> String {
    "snack-images".to_string()
}

fn default_sharepic_bucket() -> String {
    "sharepics".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl AppConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with SNACK__ prefix
    /// 2. config.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: SNACK__TRELLO__API_KEY
    pub fn load() -> Result<Self, ConfigError> {
        load_config()
    }
}

/// Load configuration from file and environment variables.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let settings = Config::builder()
        // Optional config file (can be missing)
        .add_source(File::with_name("config").required(false))
        // Environment variables with SNACK prefix
        // Use double underscore for nested: SNACK__STRAPI__AUTH_TOKEN
        .add_source(
            Environment::with_prefix("SNACK")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}
