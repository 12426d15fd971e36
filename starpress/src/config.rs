//! Application configuration management.
//!
//! Configuration is loaded from a YAML file with environment variable overrides. The configuration
//! file path defaults to `config.yaml` but can be specified via `-f` flag or `STARPRESS_CONFIG`
//! environment variable.
//!
//! ## Loading Priority
//!
//! Configuration sources are merged in the following order (later sources override earlier ones):
//!
//! 1. **YAML config file** - Base configuration (default: `config.yaml`)
//! 2. **Environment variables** - Variables prefixed with `STARPRESS_` override YAML values
//! 3. **API_KEY** - Special case: overrides `backend.api_key` if set
//!
//! For nested config values, use double underscores in environment variables. For example,
//! `STARPRESS_BACKEND__URL=https://staging.example.com` sets the `backend.url` field.
//!
//! ## Environment Variable Examples
//!
//! ```bash
//! # Override server port
//! STARPRESS_PORT=8080
//!
//! # Set the write credential (preferred method)
//! API_KEY="sk-star-..."
//!
//! # Or use STARPRESS_BACKEND__API_KEY
//! STARPRESS_BACKEND__API_KEY="sk-star-..."
//! ```

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Production address of the Star content service, used when no backend URL is configured.
pub static DEFAULT_BACKEND_URL: &str = "https://api.star.vividcats.org";

/// Simple CLI args - just for specifying config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "STARPRESS_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    /// Useful for CI/CD pipelines to catch config errors before deployment.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
///
/// This is the root configuration structure loaded from YAML and environment variables.
/// All fields have sensible defaults defined in the `Default` implementation.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// Convenience override: bare `API_KEY` environment variable.
    /// Folded into `backend.api_key` during load.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Content service connection settings
    pub backend: BackendConfig,
    /// CORS configuration for browser clients
    pub cors: CorsConfig,
}

/// Connection settings for the backend content service.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct BackendConfig {
    /// Base address of the content service
    pub url: Url,
    /// Server-held write credential, injected as the `X-API-Key` header on
    /// forwarded posts. Never exposed to gateway callers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Timeout applied to outbound backend requests
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: Url::parse(DEFAULT_BACKEND_URL).expect("default backend URL is valid"),
            api_key: None,
            timeout: Duration::from_secs(30),
        }
    }
}

/// CORS (Cross-Origin Resource Sharing) configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorsConfig {
    /// Allowed origins for CORS requests
    pub allowed_origins: Vec<CorsOrigin>,
    /// Allow credentials (cookies) in CORS requests
    pub allow_credentials: bool,
    /// Cache preflight requests for this many seconds
    pub max_age: Option<u64>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![CorsOrigin::Wildcard],
            allow_credentials: false,
            max_age: Some(3600), // Cache preflight for 1 hour
        }
    }
}

/// CORS origin specification.
///
/// Can be either a wildcard (`*`) to allow all origins, or a specific URL.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum CorsOrigin {
    /// Allow all origins (`*`)
    #[serde(deserialize_with = "parse_wildcard")]
    Wildcard,
    /// Specific origin URL (e.g., `https://app.example.com`)
    #[serde(deserialize_with = "parse_url")]
    Url(Url),
}

fn parse_wildcard<'de, D>(deserializer: D) -> Result<(), D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    if s == "*" {
        Ok(())
    } else {
        Err(serde::de::Error::custom("Expected '*'"))
    }
}

fn parse_url<'de, D>(deserializer: D) -> Result<Url, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    Url::parse(&s).map_err(serde::de::Error::custom)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            api_key: None,
            backend: BackendConfig::default(),
            cors: CorsConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let mut config: Self = Self::figment(args).extract()?;

        // if the bare API_KEY variable is set, it wins over backend.api_key
        if let Some(key) = config.api_key.take() {
            config.backend.api_key = Some(key);
        }

        config.validate().map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    pub fn figment(args: &Args) -> Figment {
        Figment::new()
            // Load base config file
            .merge(Yaml::file(&args.config))
            // Environment variables can still override specific values
            .merge(Env::prefixed("STARPRESS_").split("__"))
            // Common API_KEY pattern, matching how the backend issues the secret
            .merge(Env::raw().only(&["API_KEY"]))
    }

    fn validate(&self) -> Result<(), String> {
        if self.cors.allowed_origins.is_empty() {
            return Err("Config validation: CORS allowed_origins cannot be empty. Add at least one allowed origin.".to_string());
        }

        // Wildcard origins cannot be combined with credentialed requests
        let has_wildcard = self.cors.allowed_origins.iter().any(|origin| matches!(origin, CorsOrigin::Wildcard));
        if has_wildcard && self.cors.allow_credentials {
            return Err(
                "Config validation: CORS cannot use wildcard origin '*' with allow_credentials=true. Specify explicit origins.".to_string(),
            );
        }

        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
