//! Configuration types.

use std::path::PathBuf;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Default HTTP port for the API server.
pub const DEFAULT_PORT: u16 = 8080;

/// Default on-disk location of the profile/campaign database.
pub const DEFAULT_DB_PATH: &str = "./data/adscampaign.db";

/// Connection settings for the hosted auth service.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Project base URL, e.g. `https://xyzcompany.supabase.co`.
    pub url: String,
    /// Public (anon) API key sent with every auth request.
    pub anon_key: SecretString,
}

/// Service configuration, read from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub auth: AuthConfig,
    pub port: u16,
    pub db_path: PathBuf,
}

impl AppConfig {
    /// Load configuration from process environment variables.
    ///
    /// - `ADSCAMPAIGN_AUTH_URL` (required)
    /// - `ADSCAMPAIGN_AUTH_ANON_KEY` (required)
    /// - `ADSCAMPAIGN_PORT` (default 8080)
    /// - `ADSCAMPAIGN_DB_PATH` (default `./data/adscampaign.db`)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup("ADSCAMPAIGN_AUTH_URL")
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("ADSCAMPAIGN_AUTH_URL".into()))?;
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ConfigError::InvalidValue {
                key: "ADSCAMPAIGN_AUTH_URL".into(),
                message: format!("expected an http(s) URL, got {url:?}"),
            });
        }

        let anon_key = lookup("ADSCAMPAIGN_AUTH_ANON_KEY")
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("ADSCAMPAIGN_AUTH_ANON_KEY".into()))?;

        let port = match lookup("ADSCAMPAIGN_PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::InvalidValue {
                key: "ADSCAMPAIGN_PORT".into(),
                message: e.to_string(),
            })?,
            None => DEFAULT_PORT,
        };

        let db_path = lookup("ADSCAMPAIGN_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH));

        Ok(Self {
            auth: AuthConfig {
                url: url.trim_end_matches('/').to_string(),
                anon_key: SecretString::from(anon_key),
            },
            port,
            db_path,
        })
    }
}
