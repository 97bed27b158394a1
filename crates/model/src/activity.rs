//! Activity records and per-repository series
//!
//! An [`ActivityRecord`] is one dated, immutable event attributed to a
//! repository. An [`ActivitySeries`] holds the records for one repository
//! sorted by `(date, id)` plus a watermark per [`ActivityKind`]: the latest
//! date for which that kind is known to be fully fetched. Watermarks never
//! move backward.

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Kind of repository event
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum ActivityKind {
    Commit,
    IssueOpened,
    IssueClosed,
    PullRequestOpened,
    PullRequestMerged,
}

impl ActivityKind {
    /// All kinds, in canonical order
    pub const ALL: [ActivityKind; 5] = [
        ActivityKind::Commit,
        ActivityKind::IssueOpened,
        ActivityKind::IssueClosed,
        ActivityKind::PullRequestOpened,
        ActivityKind::PullRequestMerged,
    ];

    /// Stable name used in logs and cache keys
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::Commit => "commit",
            ActivityKind::IssueOpened => "issue-opened",
            ActivityKind::IssueClosed => "issue-closed",
            ActivityKind::PullRequestOpened => "pull-request-opened",
            ActivityKind::PullRequestMerged => "pull-request-merged",
        }
    }
}

impl std::fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One dated event in a repository's history
///
/// `id` is the source-provided unique id used for deduplication (a commit
/// oid, or a synthetic `issue-<n>-opened` style id for state events).
/// Records are immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub id: String,
    pub kind: ActivityKind,
    pub date: NaiveDate,
    /// Author identity; may be anonymized or aggregated upstream
    pub author: String,
}

impl ActivityRecord {
    pub fn new(
        id: impl Into<String>,
        kind: ActivityKind,
        date: NaiveDate,
        author: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            date,
            author: author.into(),
        }
    }
}

/// What a connector fetch produced for one repository and kind
///
/// The connector reports the maximum date it observed as the candidate new
/// watermark; only the merge engine advances the stored watermark, so that
/// watermark movement and record persistence stay atomic.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub kind: ActivityKind,
    pub records: Vec<ActivityRecord>,
    pub candidate_watermark: Option<NaiveDate>,
}

impl FetchOutcome {
    /// An outcome carrying no new records (valid no-op, not an error)
    pub fn empty(kind: ActivityKind) -> Self {
        Self {
            kind,
            records: Vec::new(),
            candidate_watermark: None,
        }
    }
}

/// Ordered event history for one repository, with per-kind watermarks
///
/// Invariants: no two records share an id; records are sorted by
/// `(date, id)`; watermarks never regress.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivitySeries {
    #[serde(default)]
    records: Vec<ActivityRecord>,
    #[serde(default)]
    watermarks: BTreeMap<ActivityKind, NaiveDate>,
}

impl ActivitySeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records, sorted by `(date, id)`
    pub fn records(&self) -> &[ActivityRecord] {
        &self.records
    }

    /// Records of one kind, in date order
    pub fn records_of(&self, kind: ActivityKind) -> impl Iterator<Item = &ActivityRecord> {
        self.records.iter().filter(move |r| r.kind == kind)
    }

    /// Latest fully-fetched date for a kind, if any fetch has completed
    pub fn watermark(&self, kind: ActivityKind) -> Option<NaiveDate> {
        self.watermarks.get(&kind).copied()
    }

    /// All watermarks
    pub fn watermarks(&self) -> &BTreeMap<ActivityKind, NaiveDate> {
        &self.watermarks
    }

    /// Whether a record with this id is already present
    pub fn contains(&self, id: &str) -> bool {
        self.records.iter().any(|r| r.id == id)
    }

    /// Append records whose ids are not yet present, keeping sort order.
    ///
    /// Returns `(appended, duplicates_dropped)`. Duplicates are dropped
    /// silently: merging the same fetch twice must be a no-op.
    pub fn extend_dedup(&mut self, incoming: Vec<ActivityRecord>) -> (usize, usize) {
        // Also catches the same id appearing twice within one fetch
        let mut seen: HashSet<String> = self.records.iter().map(|r| r.id.clone()).collect();
        let mut appended = 0;
        let mut duplicates = 0;
        for record in incoming {
            if seen.insert(record.id.clone()) {
                self.records.push(record);
                appended += 1;
            } else {
                duplicates += 1;
            }
        }
        if appended > 0 {
            self.records
                .sort_by(|a, b| (a.date, a.id.as_str()).cmp(&(b.date, b.id.as_str())));
        }
        (appended, duplicates)
    }

    /// Raise the watermark for a kind; never lowers it.
    ///
    /// Returns true if the watermark moved.
    pub fn advance_watermark(&mut self, kind: ActivityKind, candidate: NaiveDate) -> bool {
        match self.watermarks.get(&kind) {
            Some(current) if *current >= candidate => false,
            _ => {
                self.watermarks.insert(kind, candidate);
                true
            }
        }
    }
}

#[cfg(test)]
#[path = "activity_test.rs"]
mod activity_test;
