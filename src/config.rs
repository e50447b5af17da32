//! Process configuration
//!
//! All collaborator credentials come from the environment. There are no
//! baked-in fallbacks for the store URL or key: a missing variable fails
//! startup instead of silently pointing at an embedded default.

use std::env;
use thiserror::Error;
use url::Url;

const DEFAULT_PORT: u16 = 3001;

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("Missing configuration: {0}")]
  MissingVar(&'static str),

  #[error("Invalid configuration: {0}: {1}")]
  InvalidVar(&'static str, String),
}

#[derive(Debug, Clone)]
pub struct Config {
  /// Model API credential
  pub groq_api_key: String,
  /// Base URL of the hosted data store
  pub store_url: Url,
  /// The store's public (anon) API key
  pub store_anon_key: String,
  /// Listening port
  pub port: u16,
}

impl Config {
  pub fn from_env() -> Result<Self, ConfigError> {
    let groq_api_key = require("GROQ_API_KEY")?;
    let store_url = require("SUPABASE_URL")?;
    let store_url =
      Url::parse(&store_url).map_err(|e| ConfigError::InvalidVar("SUPABASE_URL", e.to_string()))?;
    let store_anon_key = require("SUPABASE_ANON_KEY")?;

    let port = match env::var("PORT") {
      Ok(raw) => raw
        .parse::<u16>()
        .map_err(|e| ConfigError::InvalidVar("PORT", e.to_string()))?,
      Err(_) => DEFAULT_PORT,
    };

    Ok(Self {
      groq_api_key,
      store_url,
      store_anon_key,
      port,
    })
  }
}

fn require(name: &'static str) -> Result<String, ConfigError> {
  match env::var(name) {
    Ok(value) if !value.trim().is_empty() => Ok(value),
    _ => Err(ConfigError::MissingVar(name)),
  }
}
