//! Commit-author statistics
//!
//! Mirrors what the dashboard consumer renders: who contributes, how many
//! authors are active per month, and which contributors are new. Bot
//! accounts are excluded up front so automation does not inflate the
//! numbers; the default list can be extended through configuration.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use tally_model::{ActivityKind, ActivitySeries};

use crate::months::{fill_missing_months, Month};

/// Bot authors excluded from contributor statistics by default
pub const DEFAULT_BOT_AUTHORS: &[&str] = &[
    "dependabot[bot]",
    "github-actions",
    "github-actions[bot]",
    "meeseeksmachine",
    "pre-commit-ci[bot]",
    "codetriage-readme-bot",
];

/// Derived commit-author statistics for one repository
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorStats {
    /// Total commits per author, all time
    pub commits_per_author: BTreeMap<String, u64>,
    /// Distinct commit authors per month (quiet months filled with zero)
    pub authors_per_month: Vec<(Month, u64)>,
    /// Authors whose first commit falls in each month
    pub new_authors_per_month: Vec<(Month, u64)>,
    /// Authors with more than one commit in a given month
    pub multi_commit_authors_per_month: Vec<(Month, u64)>,
    /// Authors with at least one commit in the trailing window
    pub recent_authors: u64,
    /// Authors whose first commit ever is inside the trailing window
    pub new_recent_authors: Vec<String>,
}

/// Compute author statistics over a repository's commits.
///
/// `now` anchors the trailing window of `recent_days`; `bots` lists author
/// names to ignore entirely.
pub fn author_stats(
    series: &ActivitySeries,
    now: NaiveDate,
    recent_days: u32,
    bots: &[String],
) -> AuthorStats {
    let is_bot = |author: &str| bots.iter().any(|b| b == author);
    let window_start = now - chrono::Duration::days(i64::from(recent_days));

    let mut commits_per_author: BTreeMap<String, u64> = BTreeMap::new();
    let mut first_commit: BTreeMap<&str, NaiveDate> = BTreeMap::new();
    let mut last_commit: BTreeMap<&str, NaiveDate> = BTreeMap::new();
    let mut month_author_commits: BTreeMap<(Month, &str), u64> = BTreeMap::new();

    for record in series.records_of(ActivityKind::Commit) {
        let author = record.author.as_str();
        if is_bot(author) {
            continue;
        }
        *commits_per_author.entry(author.to_string()).or_default() += 1;
        first_commit
            .entry(author)
            .and_modify(|d| *d = (*d).min(record.date))
            .or_insert(record.date);
        last_commit
            .entry(author)
            .and_modify(|d| *d = (*d).max(record.date))
            .or_insert(record.date);
        *month_author_commits
            .entry((Month::of(record.date), author))
            .or_default() += 1;
    }

    let mut authors_per_month: BTreeMap<Month, u64> = BTreeMap::new();
    let mut multi_per_month: BTreeMap<Month, u64> = BTreeMap::new();
    for ((month, _), commits) in &month_author_commits {
        *authors_per_month.entry(*month).or_default() += 1;
        if *commits > 1 {
            *multi_per_month.entry(*month).or_default() += 1;
        }
    }

    let mut new_per_month: BTreeMap<Month, u64> = BTreeMap::new();
    for date in first_commit.values() {
        *new_per_month.entry(Month::of(*date)).or_default() += 1;
    }

    let recent_authors = last_commit
        .values()
        .filter(|date| **date > window_start)
        .count() as u64;
    let mut new_recent_authors: Vec<String> = first_commit
        .iter()
        .filter(|(_, date)| **date > window_start)
        .map(|(author, _)| (*author).to_string())
        .collect();
    new_recent_authors.sort();

    let through = Month::of(now);
    AuthorStats {
        commits_per_author,
        authors_per_month: fill_missing_months(authors_per_month.into_iter().collect(), through),
        new_authors_per_month: fill_missing_months(new_per_month.into_iter().collect(), through),
        multi_commit_authors_per_month: fill_missing_months(
            multi_per_month.into_iter().collect(),
            through,
        ),
        recent_authors,
        new_recent_authors,
    }
}
