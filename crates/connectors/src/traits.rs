//! Source connector traits
//!
//! The orchestrator drives sources through these seams so tests can swap in
//! scripted fakes; the real implementations are [`crate::GitHub`] and
//! [`crate::Ads`].

use std::future::Future;

use chrono::NaiveDate;

use tally_model::{ActivityKind, CitationSnapshot, FetchOutcome, PubId, RepoId};

use crate::error::ConnectorError;

/// A source of repository activity (commits, issues, pull requests)
///
/// `fetch_activity` returns every record of `kind` with a date at or after
/// `watermark` (the watermark day itself is refetched; the merge engine
/// drops ids that are already cached). The connector reports the maximum
/// date it observed as the candidate new watermark - it never advances
/// watermarks itself.
pub trait ActivitySource: Send + Sync {
    fn fetch_activity(
        &self,
        repo: &RepoId,
        kind: ActivityKind,
        watermark: Option<NaiveDate>,
    ) -> impl Future<Output = Result<FetchOutcome, ConnectorError>> + Send;
}

/// A source of citation counts for publications
///
/// Snapshots are dated at fetch time; there is no watermark concept, the
/// series is append-only.
pub trait CitationSource: Send + Sync {
    fn fetch_citations(
        &self,
        publication: &PubId,
    ) -> impl Future<Output = Result<CitationSnapshot, ConnectorError>> + Send;
}
