//! Tally - Pipeline
//!
//! Drives one collection run across the configured repositories and
//! publications: load the cache, fetch activity per repository and kind
//! through the activity source, merge, fetch citation snapshots, merge,
//! persist. One state machine per invocation:
//!
//! ```text
//! INIT -> FETCH_ACTIVITY(repo)* -> FETCH_CITATIONS(pub)* -> PERSIST -> DONE
//!                 |                        |
//!                 +------ fatal error -----+--> FAILED
//! ```
//!
//! Each key is fault-isolated: a transient failure or pagination overrun
//! logs a warning, leaves the key's watermarks untouched (the next run
//! retries the same window) and continues with the rest. Fatal errors
//! (credentials, malformed query) abort the run - every remaining key
//! would fail identically.
//!
//! The dataset is saved atomically after every repository and once more at
//! the end, so an interrupted run loses at most one repository's progress
//! and never persists a watermark without its records.

mod error;
mod report;

use tracing::{info, warn};

use tally_config::Config;
use tally_connectors::{ActivitySource, CitationSource, ConnectorError};
use tally_merge::{merge_activity, merge_citation, prune};
use tally_model::{ActivityKind, CachedDataset, RepoId};
use tally_store::CacheStore;

pub use error::PipelineError;
pub use report::{RunReport, Skipped};
pub use tally_merge::PruneOutcome;

/// One-run orchestrator over an activity source and a citation source
pub struct Pipeline<A, C> {
    config: Config,
    activity: A,
    citations: C,
    store: CacheStore,
}

impl<A: ActivitySource, C: CitationSource> Pipeline<A, C> {
    pub fn new(config: Config, activity: A, citations: C, store: CacheStore) -> Self {
        Self {
            config,
            activity,
            citations,
            store,
        }
    }

    /// Execute one full collection run.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Store`] if the cache is corrupt or cannot
    /// be written, and [`PipelineError::Fatal`] on a source error that
    /// would fail for every key. Per-key failures do not error - they are
    /// listed in the returned report.
    pub async fn run(&self) -> Result<RunReport, PipelineError> {
        let mut dataset = self.store.load()?;
        let mut report = RunReport::default();

        let repos = self.config.repo_ids();
        let publications = self.config.publications();
        info!(
            repos = repos.len(),
            publications = publications.len(),
            cache = %self.store.path().display(),
            "starting collection run"
        );

        for repo in &repos {
            match self.fetch_repo(&mut dataset, repo).await {
                Ok(added) => {
                    report.repos_fetched += 1;
                    report.records_added += added;
                    // bound loss on partial failure: commit progress per repo
                    self.store.save(&dataset)?;
                }
                Err(e) if e.is_fatal() => {
                    return Err(PipelineError::Fatal(e));
                }
                Err(e) => {
                    warn!(repo = %repo, error = %e, "skipping repository for this run");
                    report.skip(repo.to_string(), &e);
                }
            }
        }

        for publication in &publications {
            match self.citations.fetch_citations(publication).await {
                Ok(snapshot) => {
                    merge_citation(
                        dataset.citations_mut(publication),
                        publication,
                        snapshot,
                        self.config.ads.citation_decrease,
                    );
                    report.publications_fetched += 1;
                }
                Err(e) if e.is_fatal() => {
                    return Err(PipelineError::Fatal(e));
                }
                Err(e) => {
                    warn!(publication = %publication, error = %e, "skipping publication for this run");
                    report.skip(publication.to_string(), &e);
                }
            }
        }

        self.store.save(&dataset)?;
        info!(
            repos_fetched = report.repos_fetched,
            publications_fetched = report.publications_fetched,
            records_added = report.records_added,
            skipped = report.skipped.len(),
            "collection run complete"
        );
        Ok(report)
    }

    /// Fetch and merge every activity kind for one repository.
    ///
    /// Kinds already merged stay merged if a later kind fails - their
    /// watermarks advanced together with their records, so the partial
    /// result is consistent and the failed kind is retried next run.
    async fn fetch_repo(
        &self,
        dataset: &mut CachedDataset,
        repo: &RepoId,
    ) -> Result<usize, ConnectorError> {
        let mut added = 0;
        for kind in ActivityKind::ALL {
            let watermark = dataset
                .activity
                .get(repo)
                .and_then(|series| series.watermark(kind));
            let outcome = self.activity.fetch_activity(repo, kind, watermark).await?;
            let merged = merge_activity(dataset.activity_mut(repo), outcome);
            added += merged.appended;
        }
        Ok(added)
    }

}

/// Remove cached history for keys no longer configured.
///
/// Deliberately not part of [`Pipeline::run`]: a normal run leaves
/// unconfigured keys untouched, and deleting history requires this
/// explicit call. Needs no connectors, so it takes the config and store
/// directly.
pub fn prune_unconfigured(config: &Config, store: &CacheStore) -> Result<PruneOutcome, PipelineError> {
    let mut dataset = store.load()?;
    let repos = config.repo_ids();
    let publications = config.publications();
    let outcome = prune(&mut dataset, repos.iter(), publications.iter());
    if !outcome.removed_repos.is_empty() || !outcome.removed_publications.is_empty() {
        store.save(&dataset)?;
    }
    Ok(outcome)
}
