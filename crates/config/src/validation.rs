//! Configuration validation
//!
//! Checks cross-field invariants after parsing: a config that parses but
//! names the same repository twice, or asks for an impossible page size,
//! fails here before any connector runs.

use std::collections::BTreeSet;

use crate::error::{ConfigError, Result};
use crate::Config;

pub(crate) fn validate(config: &Config) -> Result<()> {
    if !config.repos.is_empty() && config.repo_owner.trim().is_empty() {
        return Err(ConfigError::MissingOwner);
    }

    let mut seen = BTreeSet::new();
    for repo in &config.repos {
        if repo.name.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "repos",
                "name",
                "must not be empty",
            ));
        }
        if repo.name.contains('/') {
            return Err(ConfigError::invalid_value(
                "repos",
                "name",
                format!("'{}' must not contain '/'; the owner is shared", repo.name),
            ));
        }
        if !seen.insert(repo.name.as_str()) {
            return Err(ConfigError::duplicate_repo(&repo.name));
        }
        if repo.publications.iter().any(|b| b.trim().is_empty()) {
            return Err(ConfigError::invalid_value(
                "repos",
                "publications",
                format!("repository '{}' lists an empty bibcode", repo.name),
            ));
        }
    }

    if config.github.page_size == 0 || config.github.page_size > 100 {
        return Err(ConfigError::invalid_value(
            "github",
            "page_size",
            "must be between 1 and 100",
        ));
    }
    if config.github.max_pages == 0 {
        return Err(ConfigError::invalid_value(
            "github",
            "max_pages",
            "must be at least 1",
        ));
    }
    if config.ads.connector.page_size == 0 {
        return Err(ConfigError::invalid_value(
            "ads",
            "page_size",
            "must be at least 1",
        ));
    }
    if config.analysis.rolling_window == 0 {
        return Err(ConfigError::invalid_value(
            "analysis",
            "rolling_window",
            "must be at least 1",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use crate::{Config, ConfigError};

    #[test]
    fn test_missing_owner_with_repos() {
        let err = Config::from_str("[[repos]]\nname = \"alpha\"").unwrap_err();
        assert!(matches!(err, ConfigError::MissingOwner));
    }

    #[test]
    fn test_duplicate_repo_rejected() {
        let err = Config::from_str(
            r#"
repo_owner = "org"

[[repos]]
name = "alpha"

[[repos]]
name = "alpha"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateRepo { .. }));
    }

    #[test]
    fn test_repo_name_with_slash_rejected() {
        let err = Config::from_str(
            r#"
repo_owner = "org"

[[repos]]
name = "org/alpha"
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("must not contain '/'"));
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let err = Config::from_str(
            r#"
repo_owner = "org"

[github]
page_size = 0

[[repos]]
name = "alpha"
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("page_size"));
    }

    #[test]
    fn test_oversized_page_size_rejected() {
        let err = Config::from_str("[github]\npage_size = 250").unwrap_err();
        assert!(err.to_string().contains("between 1 and 100"));
    }

    #[test]
    fn test_empty_bibcode_rejected() {
        let err = Config::from_str(
            r#"
repo_owner = "org"

[[repos]]
name = "alpha"
publications = [""]
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("empty bibcode"));
    }
}
