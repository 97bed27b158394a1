//! Tally - Cache Store
//!
//! Persists the [`CachedDataset`] as pretty-printed JSON with fully ordered
//! keys. The cache doubles as the human-visible historical record (the
//! surrounding product commits it to a dedicated branch), so serialization
//! must be deterministic: re-saving an unchanged dataset produces identical
//! bytes, and unrelated runs produce minimal diffs.
//!
//! Writes go to a sibling temporary file first and are moved into place
//! with an atomic rename - an interrupted save never leaves a readable but
//! inconsistent cache. A cache that exists but fails to parse is an error,
//! never an empty dataset: silently discarding history is the one thing
//! this store must not do.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use tally_model::CachedDataset;

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur loading or saving the cache
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem failure
    #[error("cache io error at '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    /// The cache exists but cannot be parsed; recovery needs operator
    /// intervention or an explicit reset
    #[error("cache at '{path}' is corrupt: {source}")]
    Corrupt {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Load/save handle for the cache file
#[derive(Debug, Clone)]
pub struct CacheStore {
    path: PathBuf,
}

impl CacheStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the dataset; a missing file is an empty dataset, not an error.
    pub fn load(&self) -> Result<CachedDataset> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(path = %self.path.display(), "no cache yet, starting from an empty dataset");
                return Ok(CachedDataset::new());
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.display().to_string(),
                    source,
                })
            }
        };

        let dataset = serde_json::from_str(&contents).map_err(|source| StoreError::Corrupt {
            path: self.path.display().to_string(),
            source,
        })?;
        debug!(path = %self.path.display(), "loaded cache");
        Ok(dataset)
    }

    /// Save the dataset atomically (write to temporary, then rename).
    pub fn save(&self, dataset: &CachedDataset) -> Result<()> {
        let io_err = |source| StoreError::Io {
            path: self.path.display().to_string(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }

        // BTreeMap keys make this deterministic; the trailing newline keeps
        // the file friendly to line-based diff tools
        let mut contents =
            serde_json::to_string_pretty(dataset).expect("dataset serialization cannot fail");
        contents.push('\n');

        let tmp_path = self.tmp_path();
        fs::write(&tmp_path, contents).map_err(io_err)?;
        fs::rename(&tmp_path, &self.path).map_err(io_err)?;

        debug!(path = %self.path.display(), "saved cache");
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tally_model::{ActivityKind, ActivityRecord, CitationSnapshot, PubId, RepoId};

    fn sample_dataset() -> CachedDataset {
        let mut dataset = CachedDataset::new();
        let repo = RepoId::new("org", "alpha");
        let series = dataset.activity_mut(&repo);
        series.extend_dedup(vec![ActivityRecord::new(
            "deadbeef",
            ActivityKind::Commit,
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            "alice",
        )]);
        series.advance_watermark(ActivityKind::Commit, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());

        dataset
            .citations_mut(&PubId::new("2019ApJ...123..456B"))
            .upsert(CitationSnapshot::new(
                NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
                57,
            ));
        dataset
    }

    #[test]
    fn test_load_missing_file_is_empty_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path().join("tally.json"));
        let dataset = store.load().unwrap();
        assert!(dataset.is_empty());
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path().join("tally.json"));

        let dataset = sample_dataset();
        store.save(&dataset).unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded, dataset);
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path().join("deep/nested/tally.json"));
        store.save(&sample_dataset()).unwrap();
        assert!(store.path().exists());
    }

    #[test]
    fn test_resave_produces_identical_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path().join("tally.json"));

        let dataset = sample_dataset();
        store.save(&dataset).unwrap();
        let first = fs::read(store.path()).unwrap();
        store.save(&dataset).unwrap();
        let second = fs::read(store.path()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_no_temporary_file_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path().join("tally.json"));
        store.save(&sample_dataset()).unwrap();

        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .filter(|name| name.ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_corrupt_cache_is_an_error_not_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tally.json");
        fs::write(&path, "{ this is not json").unwrap();

        let store = CacheStore::new(&path);
        let err = store.load().unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
        assert!(err.to_string().contains("corrupt"));
    }

    #[test]
    fn test_saved_form_is_human_readable() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path().join("tally.json"));
        store.save(&sample_dataset()).unwrap();

        let contents = fs::read_to_string(store.path()).unwrap();
        assert!(contents.contains("\"org/alpha\""));
        assert!(contents.contains("\"commit\""));
        assert!(contents.ends_with('\n'));
    }
}
