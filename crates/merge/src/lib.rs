//! Tally - Merge Engine
//!
//! The only component that mutates the cached dataset. Merges are
//! idempotent: replaying the same fetch outcome is a no-op, so a run
//! interrupted between fetch and persist can always be repeated safely.
//! Watermarks only advance here, together with the records that justify
//! them - a connector never touches them.
//!
//! Derived metrics (cumulative counts, per-month tallies) are deliberately
//! not stored; they are recomputed at read time by the query crate so the
//! stored totals can never drift from the raw records.

use std::collections::BTreeSet;

use serde::Deserialize;
use tracing::{debug, info, warn};

use tally_model::{
    ActivitySeries, CachedDataset, CitationSeries, CitationSnapshot, FetchOutcome, PubId, RepoId,
};

/// What to do when a source reports fewer citations than it used to
///
/// Sources occasionally correct counts downward; the snapshot is recorded
/// either way, this only controls whether the correction is surfaced for
/// operator review.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CitationDecreasePolicy {
    /// Record silently
    Accept,
    /// Record and log at WARN
    #[default]
    Warn,
}

/// Result of merging one activity fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivityMerge {
    /// Records appended to the series
    pub appended: usize,
    /// Incoming records dropped because their id was already present
    pub duplicates: usize,
    /// Whether the kind's watermark moved forward
    pub watermark_advanced: bool,
}

/// Result of merging one citation snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CitationMerge {
    /// Count that a same-date snapshot replaced, if any
    pub replaced: Option<u64>,
    /// Whether the new count is below the previously latest one
    pub decreased: bool,
}

/// Keys removed by an explicit prune
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PruneOutcome {
    pub removed_repos: Vec<RepoId>,
    pub removed_publications: Vec<PubId>,
}

/// Merge newly fetched activity into a repository's series.
///
/// Records whose id is already cached are dropped silently (the connector
/// refetches the watermark boundary day on purpose), survivors are kept in
/// `(date, id)` order, and the kind's watermark advances to the maximum of
/// its current value and the candidate. An empty incoming set is a valid
/// no-op.
pub fn merge_activity(series: &mut ActivitySeries, incoming: FetchOutcome) -> ActivityMerge {
    let FetchOutcome {
        kind,
        records,
        candidate_watermark,
    } = incoming;

    let (appended, duplicates) = series.extend_dedup(records);
    let watermark_advanced = match candidate_watermark {
        Some(candidate) => series.advance_watermark(kind, candidate),
        None => false,
    };

    debug!(
        kind = %kind,
        appended,
        duplicates,
        watermark_advanced,
        "merged activity fetch"
    );

    ActivityMerge {
        appended,
        duplicates,
        watermark_advanced,
    }
}

/// Merge one citation snapshot into a publication's series.
///
/// Append-only; a snapshot dated the same as an existing entry replaces it
/// (same-day re-runs, last write wins).
pub fn merge_citation(
    series: &mut CitationSeries,
    publication: &PubId,
    snapshot: CitationSnapshot,
    policy: CitationDecreasePolicy,
) -> CitationMerge {
    let previous = series.latest();
    let decreased = previous
        .is_some_and(|prev| snapshot.date >= prev.date && snapshot.count < prev.count);

    if decreased && policy == CitationDecreasePolicy::Warn {
        // unwrap is fine: decreased implies a previous snapshot
        let prev = previous.unwrap();
        warn!(
            publication = %publication,
            previous_count = prev.count,
            new_count = snapshot.count,
            "citation count decreased - source corrected downward"
        );
    }

    let replaced = series.upsert(snapshot);
    CitationMerge { replaced, decreased }
}

/// Remove cached entries for keys no longer configured.
///
/// A normal run never deletes anything: a repository or publication absent
/// from the configuration keeps its history untouched. Pruning is this
/// explicit, separate operation.
pub fn prune<'a>(
    dataset: &mut CachedDataset,
    keep_repos: impl IntoIterator<Item = &'a RepoId>,
    keep_publications: impl IntoIterator<Item = &'a PubId>,
) -> PruneOutcome {
    let keep_repos: BTreeSet<&RepoId> = keep_repos.into_iter().collect();
    let keep_publications: BTreeSet<&PubId> = keep_publications.into_iter().collect();

    let removed_repos: Vec<RepoId> = dataset
        .activity
        .keys()
        .filter(|repo| !keep_repos.contains(*repo))
        .cloned()
        .collect();
    for repo in &removed_repos {
        dataset.activity.remove(repo);
    }

    let removed_publications: Vec<PubId> = dataset
        .citations
        .keys()
        .filter(|publication| !keep_publications.contains(*publication))
        .cloned()
        .collect();
    for publication in &removed_publications {
        dataset.citations.remove(publication);
    }

    if !removed_repos.is_empty() || !removed_publications.is_empty() {
        info!(
            repos = removed_repos.len(),
            publications = removed_publications.len(),
            "pruned cache entries no longer configured"
        );
    }

    PruneOutcome {
        removed_repos,
        removed_publications,
    }
}
