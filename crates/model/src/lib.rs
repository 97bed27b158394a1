//! Tally - Data Model
//!
//! Canonical types shared by the connectors, merge engine, cache store and
//! query layers:
//!
//! - [`RepoId`] / [`PubId`] - stable keys for repositories and publications
//! - [`ActivityRecord`] / [`ActivitySeries`] - dated repository events with
//!   per-kind fetch watermarks
//! - [`CitationSnapshot`] / [`CitationSeries`] - dated citation counts
//! - [`CachedDataset`] - the durable aggregate persisted by the store
//! - [`PublicationLinks`] - the repository/publication relation table
//!
//! Everything here is plain data with invariant-preserving mutators; policy
//! (retry, merge, persistence) lives in the crates that consume it.

mod activity;
mod citation;
mod dataset;
mod identity;

pub use activity::{ActivityKind, ActivityRecord, ActivitySeries, FetchOutcome};
pub use citation::{CitationSeries, CitationSnapshot};
pub use dataset::{CachedDataset, PublicationLinks};
pub use identity::{InvalidRepoId, PubId, RepoId};
