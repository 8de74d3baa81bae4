//! Calendar-week seasonality profile.
//!
//! Day-over-day returns are grouped by ISO week number and averaged across
//! the whole history; every date is then assigned its own week's average as
//! the "expected weekly return". The profile deliberately includes the
//! current period in the average (look-ahead), a documented simplification
//! of this strategy rather than a defect to correct here.

use crate::domain::series::{PriceSeries, SeriesPoint};
use chrono::{Datelike, NaiveDate};
use std::collections::HashMap;

/// Average historical return per ISO calendar week (1-53). Weeks that never
/// produced a return are absent and read as 0.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SeasonalityProfile {
    weekly_average: HashMap<u32, f64>,
}

impl SeasonalityProfile {
    pub fn is_empty(&self) -> bool {
        self.weekly_average.is_empty()
    }

    pub fn weekly_average(&self, week: u32) -> Option<f64> {
        self.weekly_average.get(&week).copied()
    }

    /// Expected weekly return for a date, 0 for unobserved weeks.
    pub fn expected_return(&self, date: NaiveDate) -> f64 {
        self.weekly_average(date.iso_week().week()).unwrap_or(0.0)
    }
}

/// Derives the week-number profile from a price history. Fewer than two
/// observations yield an empty profile.
pub fn estimate_weekly_profile(prices: &PriceSeries) -> SeasonalityProfile {
    if prices.len() < 2 {
        return SeasonalityProfile::default();
    }

    let mut sums: HashMap<u32, (f64, usize)> = HashMap::new();
    let points: Vec<&SeriesPoint> = prices.iter().collect();
    for pair in points.windows(2) {
        let prev = pair[0];
        let curr = pair[1];
        if prev.value == 0.0 {
            continue;
        }
        let ret = curr.value / prev.value - 1.0;
        let entry = sums.entry(curr.date.iso_week().week()).or_insert((0.0, 0));
        entry.0 += ret;
        entry.1 += 1;
    }

    let weekly_average = sums
        .into_iter()
        .map(|(week, (sum, count))| (week, sum / count as f64))
        .collect();

    SeasonalityProfile { weekly_average }
}

/// Expected-return series aligned to the price dates. Empty input (or a
/// single row, which produces no returns) yields an empty series.
pub fn expected_return_series(prices: &PriceSeries) -> Vec<SeriesPoint> {
    let profile = estimate_weekly_profile(prices);
    if profile.is_empty() {
        return Vec::new();
    }

    prices
        .iter()
        .map(|p| SeriesPoint {
            date: p.date,
            value: profile.expected_return(p.date),
        })
        .collect()
}
