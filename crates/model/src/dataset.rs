//! The durable dataset aggregate and the repository/publication relation

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::activity::ActivitySeries;
use crate::citation::CitationSeries;
use crate::identity::{PubId, RepoId};

/// Many-to-many relation between repositories and the publications that
/// describe them
///
/// The relation is declared by configuration and may change between runs
/// without migrating historical data, so it is an explicit table rather
/// than foreign keys embedded in the series.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PublicationLinks {
    links: BTreeSet<(RepoId, PubId)>,
}

impl PublicationLinks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `publication` describes `repo`
    pub fn link(&mut self, repo: RepoId, publication: PubId) {
        self.links.insert((repo, publication));
    }

    /// Publications associated with a repository
    pub fn publications_for<'a>(&'a self, repo: &'a RepoId) -> impl Iterator<Item = &'a PubId> {
        self.links
            .iter()
            .filter(move |(r, _)| r == repo)
            .map(|(_, p)| p)
    }

    /// Repositories backed by a publication
    pub fn repos_for<'a>(&'a self, publication: &'a PubId) -> impl Iterator<Item = &'a RepoId> {
        self.links
            .iter()
            .filter(move |(_, p)| p == publication)
            .map(|(r, _)| r)
    }

    /// Every publication that appears in the relation
    pub fn publications(&self) -> BTreeSet<&PubId> {
        self.links.iter().map(|(_, p)| p).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

/// The durable aggregate the cache store persists
///
/// BTreeMap keys give deterministic serialization: re-saving an unchanged
/// dataset produces an identical file, and unrelated runs produce minimal
/// diffs in version control.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedDataset {
    #[serde(default)]
    pub activity: BTreeMap<RepoId, ActivitySeries>,
    #[serde(default)]
    pub citations: BTreeMap<PubId, CitationSeries>,
}

impl CachedDataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Series for a repository, created empty on first touch
    pub fn activity_mut(&mut self, repo: &RepoId) -> &mut ActivitySeries {
        self.activity.entry(repo.clone()).or_default()
    }

    /// Series for a publication, created empty on first touch
    pub fn citations_mut(&mut self, publication: &PubId) -> &mut CitationSeries {
        self.citations.entry(publication.clone()).or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.activity.is_empty() && self.citations.is_empty()
    }
}
