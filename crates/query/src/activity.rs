//! Aggregates over activity series

use std::collections::BTreeMap;

use chrono::NaiveDate;

use tally_model::{ActivityKind, ActivitySeries};

use crate::months::{fill_missing_months, Month};

/// Running total of events of one kind, one point per distinct date
pub fn cumulative_by_date(series: &ActivitySeries, kind: ActivityKind) -> Vec<(NaiveDate, u64)> {
    let mut per_date: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    for record in series.records_of(kind) {
        *per_date.entry(record.date).or_default() += 1;
    }
    let mut total = 0;
    per_date
        .into_iter()
        .map(|(date, count)| {
            total += count;
            (date, total)
        })
        .collect()
}

/// Events of one kind per calendar month, from the first active month
/// through the month of `through`, with quiet months filled as zero
pub fn monthly_counts(
    series: &ActivitySeries,
    kind: ActivityKind,
    through: NaiveDate,
) -> Vec<(Month, u64)> {
    let mut per_month: BTreeMap<Month, u64> = BTreeMap::new();
    for record in series.records_of(kind) {
        *per_month.entry(Month::of(record.date)).or_default() += 1;
    }
    fill_missing_months(per_month.into_iter().collect(), Month::of(through))
}

/// Events of one kind in the trailing window ending at `now` (inclusive)
pub fn recent_count(
    series: &ActivitySeries,
    kind: ActivityKind,
    now: NaiveDate,
    window_days: u32,
) -> u64 {
    let start = now - chrono::Duration::days(i64::from(window_days));
    series
        .records_of(kind)
        .filter(|r| r.date > start && r.date <= now)
        .count() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_model::ActivityRecord;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn series_of(records: Vec<ActivityRecord>) -> ActivitySeries {
        let mut series = ActivitySeries::new();
        series.extend_dedup(records);
        series
    }

    fn commit(id: &str, y: i32, m: u32, d: u32) -> ActivityRecord {
        ActivityRecord::new(id, ActivityKind::Commit, date(y, m, d), "alice")
    }

    fn issue_opened(id: &str, y: i32, m: u32, d: u32) -> ActivityRecord {
        ActivityRecord::new(id, ActivityKind::IssueOpened, date(y, m, d), "bob")
    }

    #[test]
    fn test_cumulative_accumulates_per_date() {
        let series = series_of(vec![
            commit("a", 2024, 1, 1),
            commit("b", 2024, 1, 1),
            commit("c", 2024, 1, 5),
        ]);
        assert_eq!(
            cumulative_by_date(&series, ActivityKind::Commit),
            vec![(date(2024, 1, 1), 2), (date(2024, 1, 5), 3)]
        );
    }

    #[test]
    fn test_cumulative_ignores_other_kinds() {
        let series = series_of(vec![commit("a", 2024, 1, 1), issue_opened("i", 2024, 1, 2)]);
        assert_eq!(cumulative_by_date(&series, ActivityKind::Commit).len(), 1);
    }

    #[test]
    fn test_monthly_counts_fill_through_now() {
        let series = series_of(vec![commit("a", 2024, 1, 15), commit("b", 2024, 1, 20)]);
        let counts = monthly_counts(&series, ActivityKind::Commit, date(2024, 3, 10));
        assert_eq!(
            counts,
            vec![
                (Month::new(2024, 1), 2),
                (Month::new(2024, 2), 0),
                (Month::new(2024, 3), 0),
            ]
        );
    }

    #[test]
    fn test_monthly_counts_empty_series() {
        let series = ActivitySeries::new();
        assert!(monthly_counts(&series, ActivityKind::Commit, date(2024, 1, 1)).is_empty());
    }

    #[test]
    fn test_recent_count_window() {
        let series = series_of(vec![
            commit("old", 2024, 1, 1),
            commit("edge", 2024, 3, 2),
            commit("new", 2024, 3, 30),
        ]);
        // 90-day window ending 2024-03-31 excludes only the January commit
        assert_eq!(recent_count(&series, ActivityKind::Commit, date(2024, 3, 31), 90), 2);
        assert_eq!(recent_count(&series, ActivityKind::Commit, date(2024, 3, 31), 7), 1);
    }

    #[test]
    fn test_recent_count_excludes_future_dates() {
        let series = series_of(vec![commit("future", 2024, 6, 1)]);
        assert_eq!(recent_count(&series, ActivityKind::Commit, date(2024, 3, 1), 90), 0);
    }
}
