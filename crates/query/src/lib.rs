//! Tally - Query
//!
//! Read-side aggregates over cached series. Everything here is a pure
//! function of the series plus an explicit `now`: nothing is stored, so
//! derived numbers can never drift from the raw records, and report/plot
//! consumers never need to reimplement merge logic.

mod activity;
mod authors;
mod citations;
mod months;

pub use activity::{cumulative_by_date, monthly_counts, recent_count};
pub use authors::{author_stats, AuthorStats, DEFAULT_BOT_AUTHORS};
pub use citations::{citation_deltas, citations_over_time, total_latest_citations};
pub use months::{rolling_average, Month};
