//! Calendar-month bucketing and smoothing helpers

use std::fmt;

use chrono::{Datelike, NaiveDate};

/// A calendar month, the bucket for all per-month aggregates
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month {
    year: i32,
    month: u32,
}

impl Month {
    pub fn new(year: i32, month: u32) -> Self {
        debug_assert!((1..=12).contains(&month));
        Self { year, month }
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The following calendar month
    pub fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// "YYYY-MM" form used in the persisted record and plots
    pub fn label(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Fill months missing between the first bucket and `through` with zero.
///
/// Not every month has activity; plots need the quiet months present with
/// an explicit zero rather than skipped.
pub(crate) fn fill_missing_months(counts: Vec<(Month, u64)>, through: Month) -> Vec<(Month, u64)> {
    let Some(&(first, _)) = counts.first() else {
        return Vec::new();
    };
    let mut filled = Vec::new();
    let mut cursor = first;
    let mut source = counts.into_iter().peekable();
    while cursor <= through {
        let count = match source.peek() {
            Some(&(month, count)) if month == cursor => {
                source.next();
                count
            }
            _ => 0,
        };
        filled.push((cursor, count));
        cursor = cursor.next();
    }
    filled
}

/// Centered moving average over a sliding window.
///
/// The window is forced odd (even widths are decreased by one) so the
/// average stays centered; output length is `len - window + 1`. Returns
/// the averages and the window actually used.
pub fn rolling_average(values: &[u64], window: usize) -> (Vec<f64>, usize) {
    let window = if window % 2 == 0 {
        window.saturating_sub(1)
    } else {
        window
    };
    let window = window.max(1);
    if values.len() < window {
        return (Vec::new(), window);
    }
    let averages = values
        .windows(window)
        .map(|w| w.iter().sum::<u64>() as f64 / window as f64)
        .collect();
    (averages, window)
}
