//! Tests for activity series invariants

use chrono::NaiveDate;

use crate::activity::{ActivityKind, ActivityRecord, ActivitySeries};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn commit(id: &str, y: i32, m: u32, d: u32) -> ActivityRecord {
    ActivityRecord::new(id, ActivityKind::Commit, date(y, m, d), "alice")
}

// =============================================================================
// extend_dedup
// =============================================================================

#[test]
fn test_extend_empty_series() {
    let mut series = ActivitySeries::new();
    let (appended, dups) = series.extend_dedup(vec![commit("a", 2024, 1, 2), commit("b", 2024, 1, 1)]);
    assert_eq!((appended, dups), (2, 0));
    // sorted by (date, id) regardless of input order
    let ids: Vec<_> = series.records().iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, ["b", "a"]);
}

#[test]
fn test_extend_drops_known_ids() {
    let mut series = ActivitySeries::new();
    series.extend_dedup(vec![commit("a", 2024, 1, 1)]);
    let (appended, dups) = series.extend_dedup(vec![commit("a", 2024, 1, 1), commit("b", 2024, 1, 2)]);
    assert_eq!((appended, dups), (1, 1));
    assert_eq!(series.len(), 2);
}

#[test]
fn test_extend_is_idempotent() {
    let batch = vec![commit("a", 2024, 1, 1), commit("b", 2024, 1, 2)];
    let mut once = ActivitySeries::new();
    once.extend_dedup(batch.clone());

    let mut twice = ActivitySeries::new();
    twice.extend_dedup(batch.clone());
    twice.extend_dedup(batch);

    assert_eq!(once, twice);
}

#[test]
fn test_extend_dedups_within_one_batch() {
    let mut series = ActivitySeries::new();
    let (appended, dups) = series.extend_dedup(vec![commit("a", 2024, 1, 1), commit("a", 2024, 1, 1)]);
    assert_eq!((appended, dups), (1, 1));
}

#[test]
fn test_date_tie_broken_by_id() {
    let mut series = ActivitySeries::new();
    series.extend_dedup(vec![commit("z", 2024, 1, 1), commit("a", 2024, 1, 1)]);
    let ids: Vec<_> = series.records().iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, ["a", "z"]);
}

// =============================================================================
// watermarks
// =============================================================================

#[test]
fn test_watermark_starts_unset() {
    let series = ActivitySeries::new();
    assert_eq!(series.watermark(ActivityKind::Commit), None);
}

#[test]
fn test_watermark_advances() {
    let mut series = ActivitySeries::new();
    assert!(series.advance_watermark(ActivityKind::Commit, date(2024, 1, 2)));
    assert_eq!(series.watermark(ActivityKind::Commit), Some(date(2024, 1, 2)));
}

#[test]
fn test_watermark_never_regresses() {
    let mut series = ActivitySeries::new();
    series.advance_watermark(ActivityKind::Commit, date(2024, 3, 1));
    assert!(!series.advance_watermark(ActivityKind::Commit, date(2024, 1, 1)));
    assert_eq!(series.watermark(ActivityKind::Commit), Some(date(2024, 3, 1)));
}

#[test]
fn test_watermarks_are_per_kind() {
    let mut series = ActivitySeries::new();
    series.advance_watermark(ActivityKind::Commit, date(2024, 3, 1));
    assert_eq!(series.watermark(ActivityKind::IssueOpened), None);
}

// =============================================================================
// serde shape
// =============================================================================

#[test]
fn test_series_round_trips_through_json() {
    let mut series = ActivitySeries::new();
    series.extend_dedup(vec![commit("a", 2024, 1, 1)]);
    series.advance_watermark(ActivityKind::Commit, date(2024, 1, 1));

    let json = serde_json::to_string(&series).unwrap();
    let back: ActivitySeries = serde_json::from_str(&json).unwrap();
    assert_eq!(back, series);
}

#[test]
fn test_kind_serializes_kebab_case() {
    let json = serde_json::to_string(&ActivityKind::PullRequestMerged).unwrap();
    assert_eq!(json, "\"pull-request-merged\"");
}
