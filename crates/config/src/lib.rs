//! Tally Configuration
//!
//! TOML-based configuration loading with sensible defaults. A minimal
//! config only needs the owner and the repository list; every connector
//! and analysis knob has a default. Credentials never appear here - tokens
//! are supplied at process entry.
//!
//! # Parsing
//!
//! Use the `FromStr` trait to parse configuration:
//!
//! ```
//! use tally_config::Config;
//! use std::str::FromStr;
//!
//! let config = Config::from_str(r#"
//! repo_owner = "astropy"
//!
//! [[repos]]
//! name = "astropy"
//! publications = ["2013A&A...558A..33A"]
//! "#).unwrap();
//! assert_eq!(config.repos.len(), 1);
//! ```

mod error;
mod validation;

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;

use tally_connectors::{AdsConnectorConfig, GitHubConnectorConfig};
use tally_merge::CitationDecreasePolicy;
use tally_model::{PubId, PublicationLinks, RepoId};
use tally_query::DEFAULT_BOT_AUTHORS;

pub use error::{ConfigError, Result};

/// Main configuration structure
///
/// All sections are optional with sensible defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Owner (or organization) of every configured repository
    pub repo_owner: String,

    /// Cache location
    pub cache: CacheConfig,

    /// GitHub connector settings
    pub github: GitHubConnectorConfig,

    /// ADS connector settings and citation policy
    pub ads: AdsConfig,

    /// Derived-statistics settings
    pub analysis: AnalysisConfig,

    /// Repositories to collect, with their linked publications
    pub repos: Vec<RepoConfig>,
}

/// Cache file location
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Path of the persisted dataset
    pub path: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("cache/tally.json"),
        }
    }
}

/// ADS section: connector settings plus the decrease policy
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AdsConfig {
    #[serde(flatten)]
    pub connector: AdsConnectorConfig,

    /// What to do when a citation count goes down
    pub citation_decrease: CitationDecreasePolicy,
}

/// Settings for read-side statistics
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Trailing window for "recent" statistics, in days
    pub recent_days: u32,

    /// Width of the rolling-average window for per-month plots
    pub rolling_window: usize,

    /// Authors excluded from contributor statistics
    pub bot_authors: Vec<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            recent_days: 90,
            rolling_window: 3,
            bot_authors: DEFAULT_BOT_AUTHORS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// One repository entry
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RepoConfig {
    /// Repository name under `repo_owner`
    pub name: String,

    /// Bibliographic record ids of publications describing this repository
    pub publications: Vec<String>,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, contains invalid TOML, or
    /// fails validation.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;
        contents.parse()
    }

    /// Identities of all configured repositories, in config order
    pub fn repo_ids(&self) -> Vec<RepoId> {
        self.repos
            .iter()
            .map(|repo| RepoId::new(&self.repo_owner, &repo.name))
            .collect()
    }

    /// All publications referenced by any repository, deduplicated
    pub fn publications(&self) -> BTreeSet<PubId> {
        self.repos
            .iter()
            .flat_map(|repo| repo.publications.iter())
            .map(|bibcode| PubId::new(bibcode.clone()))
            .collect()
    }

    /// The repository/publication relation table declared by this config
    pub fn publication_links(&self) -> PublicationLinks {
        let mut links = PublicationLinks::new();
        for repo in &self.repos {
            let id = RepoId::new(&self.repo_owner, &repo.name);
            for bibcode in &repo.publications {
                links.link(id.clone(), PubId::new(bibcode.clone()));
            }
        }
        links
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s)?;
        validation::validate(&config)?;
        Ok(config)
    }
}
