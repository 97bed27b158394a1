//! Repository and publication identity types
//!
//! `RepoId` partitions all cached activity; `PubId` keys citation series.
//! Both serialize as plain strings so they can be used as JSON map keys and
//! the cache stays diffable.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Error returned when an "owner/name" string cannot be parsed
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid repository id '{0}': expected 'owner/name'")]
pub struct InvalidRepoId(pub String);

/// Stable key for a repository: owner (or organization) plus name
///
/// # Example
///
/// ```
/// use tally_model::RepoId;
///
/// let repo: RepoId = "astropy/astropy".parse().unwrap();
/// assert_eq!(repo.owner(), "astropy");
/// assert_eq!(repo.name(), "astropy");
/// assert_eq!(repo.to_string(), "astropy/astropy");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RepoId {
    owner: String,
    name: String,
}

impl RepoId {
    /// Create a repository id from owner and name parts
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Repository owner or organization
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Repository name
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepoId {
    type Err = InvalidRepoId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() => {
                Ok(Self::new(owner, name))
            }
            _ => Err(InvalidRepoId(s.to_string())),
        }
    }
}

impl Serialize for RepoId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RepoId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Opaque key for a citable work (e.g. an ADS bibcode)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PubId(String);

impl PubId {
    /// Create a new publication id
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the id as a string slice
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PubId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PubId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for PubId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for PubId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_id_parse_valid() {
        let repo: RepoId = "rust-lang/rust".parse().unwrap();
        assert_eq!(repo.owner(), "rust-lang");
        assert_eq!(repo.name(), "rust");
    }

    #[test]
    fn test_repo_id_parse_splits_on_first_slash() {
        let repo: RepoId = "owner/repo/extra".parse().unwrap();
        assert_eq!(repo.owner(), "owner");
        assert_eq!(repo.name(), "repo/extra");
    }

    #[test]
    fn test_repo_id_parse_empty_owner() {
        assert!("/repo".parse::<RepoId>().is_err());
    }

    #[test]
    fn test_repo_id_parse_empty_name() {
        assert!("owner/".parse::<RepoId>().is_err());
    }

    #[test]
    fn test_repo_id_parse_no_slash() {
        let err = "justaname".parse::<RepoId>().unwrap_err();
        assert!(err.to_string().contains("justaname"));
    }

    #[test]
    fn test_repo_id_serializes_as_string() {
        let repo = RepoId::new("astropy", "astropy");
        let json = serde_json::to_string(&repo).unwrap();
        assert_eq!(json, "\"astropy/astropy\"");

        let back: RepoId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, repo);
    }

    #[test]
    fn test_pub_id_transparent() {
        let id = PubId::new("2019ApJ...123..456B");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"2019ApJ...123..456B\"");
    }
}
