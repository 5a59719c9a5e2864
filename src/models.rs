//! Data models and configuration
//!
//! Wire types for the `/chat` endpoint and the environment-driven
//! application configuration.

use serde::{Deserialize, Deserializer, Serialize};

pub const DEFAULT_MODEL: &str = "gemma-3-27b-it";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;

/// Body of `POST /chat`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub message: String,
    #[serde(default)]
    pub image: Option<String>,
}

impl ChatRequest {
    /// The data URL, if one was actually supplied.
    pub fn image_data_url(&self) -> Option<&str> {
        self.image.as_deref().filter(|s| !s.is_empty())
    }
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Reply of `POST /chat`; absent fields are omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ChatResponse {
    pub fn ok(response: String) -> Self {
        Self {
            success: true,
            response: Some(response),
            error: None,
        }
    }

    pub fn failed(error: String) -> Self {
        Self {
            success: false,
            response: None,
            error: Some(error),
        }
    }
}

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub google_api_key: String,
    pub model: String,
    pub host: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> crate::Result<Self> {
        check_env_file(dotenvy::dotenv().map(|path| {
            tracing::debug!("Loaded environment from {}", path.display());
        }))?;
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match var("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| {
                crate::Error::Config(format!("PORT must be a port number, got '{}': {}", raw, e))
            })?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            google_api_key: var("GOOGLE_API_KEY")
                .ok_or_else(|| crate::Error::Config("GOOGLE_API_KEY not set".to_string()))?,
            model: var("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            host: var("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
        })
    }
}

/// A missing `.env` is fine; one that exists but cannot be parsed is not.
fn check_env_file(loaded: dotenvy::Result<()>) -> crate::Result<()> {
    match loaded {
        Err(e) if e.not_found() => Ok(()),
        Err(e) => {
            tracing::error!("Failed to load .env file: {}", e);
            Err(e.into())
        }
        Ok(()) => Ok(()),
    }
}
