//! Configuration types.

use std::path::PathBuf;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Top-level application configuration, built from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// TCP port the HTTP server binds.
    pub port: u16,
    /// Base URL of the offer-processing service (submission target).
    pub offer_api_base: String,
    /// Property lookup endpoint.
    pub property_api_url: String,
    /// Listing scraper endpoint. `None` disables the pre-fetch trigger.
    pub scraper_api_url: Option<String>,
    /// Directory where the draft file is stored.
    pub data_dir: PathBuf,
    pub assistant: AssistantConfig,
}

/// Chat assistant configuration.
#[derive(Debug, Clone)]
pub struct AssistantConfig {
    /// API key for the chat-completions endpoint. `None` means chat is
    /// unavailable and requests fail with a configuration error.
    pub api_key: Option<SecretString>,
    pub model: String,
    pub api_url: String,
}

impl AppConfig {
    /// Build config from environment variables.
    ///
    /// `OFFER_API_BASE_URL` and `PROPERTY_API_URL` are required; everything
    /// else has a default or is optional.
    pub fn from_env() -> Result<Self, ConfigError> {
        let port: u16 = match std::env::var("OFFER_WIZARD_PORT") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: "OFFER_WIZARD_PORT".to_string(),
                message: format!("not a valid port number: {raw:?}"),
            })?,
            Err(_) => 3000,
        };

        let offer_api_base = require_env("OFFER_API_BASE_URL")?;
        let property_api_url = require_env("PROPERTY_API_URL")?;
        let scraper_api_url = std::env::var("SCRAPER_API_URL")
            .ok()
            .filter(|s| !s.trim().is_empty());

        let data_dir = std::env::var("OFFER_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data"));

        Ok(Self {
            port,
            offer_api_base,
            property_api_url,
            scraper_api_url,
            data_dir,
            assistant: AssistantConfig::from_env(),
        })
    }
}

impl AssistantConfig {
    pub fn from_env() -> Self {
        let api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(SecretString::from);

        let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());

        let api_url = std::env::var("OPENAI_API_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1/chat/completions".to_string());

        Self {
            api_key,
            model,
            api_url,
        }
    }
}

fn require_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}
