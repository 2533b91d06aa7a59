//! Centralized configuration for Marquee.
//!
//! All tunable parameters and settings are defined here to avoid
//! hard-coded values scattered throughout the codebase.

use std::time::Duration;

use crate::{MarqueeError, Result};

/// Environment variable holding the OMDb API key.
pub const API_KEY_ENV: &str = "OMDB_API_KEY";
/// Environment variable overriding the OMDb endpoint.
pub const BASE_URL_ENV: &str = "MARQUEE_OMDB_URL";
/// Environment variable overriding the metadata request timeout in seconds.
pub const REQUEST_TIMEOUT_ENV: &str = "MARQUEE_REQUEST_TIMEOUT_SECS";
/// Environment variable overriding the display budget.
pub const DISPLAY_BUDGET_ENV: &str = "MARQUEE_DISPLAY_BUDGET";
/// Environment variable capping concurrent upstream requests per fan-out.
pub const MAX_CONCURRENCY_ENV: &str = "MARQUEE_MAX_CONCURRENCY";

/// Central configuration for all Marquee components.
///
/// Groups related configuration settings into logical sections.
/// Supports environment variable overrides for runtime customization.
#[derive(Debug, Clone, Default)]
pub struct MarqueeConfig {
    pub api: ApiConfig,
    pub poster: PosterConfig,
    pub pipeline: PipelineConfig,
}

/// Metadata API connection settings.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Endpoint all metadata requests are issued against
    pub base_url: String,
    /// Credential appended to every request; supplied externally
    pub api_key: Option<String>,
    /// Timeout for a single search or detail request
    pub request_timeout: Duration,
    /// User agent for HTTP requests
    pub user_agent: &'static str,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.omdbapi.com/".to_string(),
            api_key: None,
            request_timeout: Duration::from_secs(10),
            user_agent: "marquee/0.1.0",
        }
    }
}

/// Poster download and decode limits.
#[derive(Debug, Clone)]
pub struct PosterConfig {
    /// Timeout for fetching one poster image
    pub request_timeout: Duration,
    /// Largest poster body accepted for decoding
    pub max_bytes: usize,
}

impl Default for PosterConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            max_bytes: 5 * 1024 * 1024, // 5 MiB
        }
    }
}

/// Search pipeline sizing.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Candidates kept from a search response
    pub search_result_limit: usize,
    /// Maximum number of validated records returned per search
    pub display_budget: usize,
    /// Concurrent upstream operations per fan-out stage (None = unlimited)
    pub max_concurrent_requests: Option<usize>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            search_result_limit: 15,
            display_budget: 9,
            max_concurrent_requests: None,
        }
    }
}

impl MarqueeConfig {
    /// Builds configuration from defaults plus process environment overrides.
    ///
    /// # Errors
    ///
    /// - `MarqueeError::Configuration` - If an override is present but unparseable
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from defaults plus overrides resolved by `lookup`.
    ///
    /// # Errors
    ///
    /// - `MarqueeError::Configuration` - If an override is present but unparseable
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(api_key) = lookup(API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            config.api.api_key = Some(api_key.trim().to_string());
        }
        if let Some(base_url) = lookup(BASE_URL_ENV) {
            config.api.base_url = base_url;
        }
        if let Some(secs) = lookup(REQUEST_TIMEOUT_ENV) {
            config.api.request_timeout = Duration::from_secs(parse_number(REQUEST_TIMEOUT_ENV, &secs)?);
        }
        if let Some(budget) = lookup(DISPLAY_BUDGET_ENV) {
            config.pipeline.display_budget = parse_number(DISPLAY_BUDGET_ENV, &budget)?;
        }
        if let Some(limit) = lookup(MAX_CONCURRENCY_ENV) {
            config.pipeline.max_concurrent_requests = Some(parse_number(MAX_CONCURRENCY_ENV, &limit)?);
        }

        Ok(config)
    }

    /// Returns the configured API key or a configuration error naming how to supply it.
    ///
    /// # Errors
    ///
    /// - `MarqueeError::Configuration` - If no key has been supplied
    pub fn require_api_key(&self) -> Result<&str> {
        self.api
            .api_key
            .as_deref()
            .ok_or_else(|| MarqueeError::Configuration {
                reason: format!("no API key supplied; set {API_KEY_ENV} or pass --api-key"),
            })
    }

    /// Checks that the configuration can drive a pipeline run.
    ///
    /// # Errors
    ///
    /// - `MarqueeError::Configuration` - Missing key, bad endpoint URL or a zero-sized limit
    pub fn validate(&self) -> Result<()> {
        self.require_api_key()?;

        url::Url::parse(&self.api.base_url).map_err(|e| MarqueeError::Configuration {
            reason: format!("invalid metadata endpoint '{}': {e}", self.api.base_url),
        })?;

        if self.pipeline.display_budget == 0 {
            return Err(MarqueeError::Configuration {
                reason: "display budget must be at least 1".to_string(),
            });
        }
        if self.pipeline.search_result_limit == 0 {
            return Err(MarqueeError::Configuration {
                reason: "search result limit must be at least 1".to_string(),
            });
        }
        if self.pipeline.max_concurrent_requests == Some(0) {
            return Err(MarqueeError::Configuration {
                reason: "max concurrent requests must be at least 1".to_string(),
            });
        }

        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| MarqueeError::Configuration {
            reason: format!("{key} must be a non-negative integer, got '{value}'"),
        })
}
