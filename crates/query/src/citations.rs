//! Aggregates over citation series

use chrono::NaiveDate;

use tally_model::CitationSeries;

/// Citation counts in fetch-date order, ready for plotting
pub fn citations_over_time(series: &CitationSeries) -> Vec<(NaiveDate, u64)> {
    series.iter().map(|s| (s.date, s.count)).collect()
}

/// Change between consecutive snapshots; negative when the source
/// corrected a count downward
pub fn citation_deltas(series: &CitationSeries) -> Vec<(NaiveDate, i64)> {
    let points: Vec<_> = series.iter().collect();
    points
        .windows(2)
        .map(|pair| {
            (
                pair[1].date,
                pair[1].count as i64 - pair[0].count as i64,
            )
        })
        .collect()
}

/// Sum of the latest counts across a set of publications
pub fn total_latest_citations<'a>(series: impl IntoIterator<Item = &'a CitationSeries>) -> u64 {
    series
        .into_iter()
        .filter_map(|s| s.latest())
        .map(|snapshot| snapshot.count)
        .sum()
}
