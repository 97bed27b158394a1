//! Citation snapshots and per-publication series
//!
//! A snapshot is a single dated observation of a citation count, not a
//! delta. Series are append-only and ordered by fetch date; a snapshot for
//! a date already present replaces it (same-day re-runs, last write wins).
//! Counts normally grow, but a source may correct downward; the series
//! records either without complaint.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One dated observation of a publication's citation count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitationSnapshot {
    pub date: NaiveDate,
    pub count: u64,
}

impl CitationSnapshot {
    pub fn new(date: NaiveDate, count: u64) -> Self {
        Self { date, count }
    }
}

/// Ordered-by-date citation history for one publication
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CitationSeries {
    counts: BTreeMap<NaiveDate, u64>,
}

impl CitationSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Most recent snapshot, if any
    pub fn latest(&self) -> Option<CitationSnapshot> {
        self.counts
            .last_key_value()
            .map(|(date, count)| CitationSnapshot::new(*date, *count))
    }

    /// Count recorded for a specific date
    pub fn count_on(&self, date: NaiveDate) -> Option<u64> {
        self.counts.get(&date).copied()
    }

    /// Snapshots in date order
    pub fn iter(&self) -> impl Iterator<Item = CitationSnapshot> + '_ {
        self.counts
            .iter()
            .map(|(date, count)| CitationSnapshot::new(*date, *count))
    }

    /// Insert a snapshot; a same-date entry is replaced.
    ///
    /// Returns the count it replaced, if any.
    pub fn upsert(&mut self, snapshot: CitationSnapshot) -> Option<u64> {
        self.counts.insert(snapshot.date, snapshot.count)
    }
}
