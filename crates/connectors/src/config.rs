//! Connector configuration types
//!
//! Each connector defines its own config struct here; the workspace config
//! crate embeds them as TOML sections. Credentials are NOT part of these
//! structs - tokens are supplied at process entry and passed to the
//! connector constructors as opaque strings.

use serde::Deserialize;

use crate::pagination::PaginatorConfig;

/// GitHub GraphQL connector configuration
///
/// # Example
///
/// ```toml
/// [github]
/// api_url = "https://api.github.com"
/// page_size = 100
/// max_pages = 200
/// rate_limit_low_water = 50
/// timeout_secs = 180
/// max_retries = 3
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GitHubConnectorConfig {
    /// API base URL (default: https://api.github.com)
    pub api_url: String,

    /// Items per page (GraphQL `first:`, max 100)
    pub page_size: u32,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Maximum retry attempts for transient failures
    pub max_retries: u32,

    /// Base delay for exponential backoff
    pub retry_base_delay_ms: u64,

    /// Safety cap on pages per fetch
    pub max_pages: u32,

    /// Suspend when remaining quota drops to or below this
    pub rate_limit_low_water: u32,
}

impl Default for GitHubConnectorConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".to_string(),
            page_size: 100,
            timeout_secs: 180,
            max_retries: 3,
            retry_base_delay_ms: 1000,
            max_pages: 200,
            rate_limit_low_water: 50,
        }
    }
}

impl GitHubConnectorConfig {
    /// Build paginator settings from these values
    pub fn paginator_config(&self) -> PaginatorConfig {
        PaginatorConfig {
            max_retries: self.max_retries,
            retry_base_delay_ms: self.retry_base_delay_ms,
            max_pages: self.max_pages,
            rate_limit_low_water: self.rate_limit_low_water,
        }
    }
}

/// ADS bibliographic connector configuration
///
/// # Example
///
/// ```toml
/// [ads]
/// api_url = "https://api.adsabs.harvard.edu/v1"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AdsConnectorConfig {
    /// API base URL
    pub api_url: String,

    /// Rows per search page; citation lookups rarely need more than one
    pub page_size: u32,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Maximum retry attempts for transient failures
    pub max_retries: u32,

    /// Base delay for exponential backoff
    pub retry_base_delay_ms: u64,

    /// Safety cap on pages per lookup
    pub max_pages: u32,

    /// Suspend when remaining quota drops to or below this
    pub rate_limit_low_water: u32,
}

impl Default for AdsConnectorConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.adsabs.harvard.edu/v1".to_string(),
            page_size: 10,
            timeout_secs: 30,
            max_retries: 3,
            retry_base_delay_ms: 1000,
            max_pages: 20,
            rate_limit_low_water: 10,
        }
    }
}

impl AdsConnectorConfig {
    /// Build paginator settings from these values
    pub fn paginator_config(&self) -> PaginatorConfig {
        PaginatorConfig {
            max_retries: self.max_retries,
            retry_base_delay_ms: self.retry_base_delay_ms,
            max_pages: self.max_pages,
            rate_limit_low_water: self.rate_limit_low_water,
        }
    }
}
