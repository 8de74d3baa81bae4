//! Date-indexed value series and as-of lookup.
//!
//! Both price histories and GDP level series share one representation: a
//! chronologically sorted vector of unique `(date, value)` points. GDP series
//! are simply sparser (typically quarterly).

use chrono::NaiveDate;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Sorted, unique-dated value series.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TimeSeries {
    points: Vec<SeriesPoint>,
}

/// Closing-price history for one instrument.
pub type PriceSeries = TimeSeries;
/// GDP level history for one economy.
pub type GdpSeries = TimeSeries;

impl TimeSeries {
    pub fn new() -> Self {
        TimeSeries { points: Vec::new() }
    }

    /// Builds a series from arbitrary-order points. Sorts by date; when a
    /// date occurs more than once the last observation wins.
    pub fn from_points(mut raw: Vec<(NaiveDate, f64)>) -> Self {
        raw.sort_by_key(|&(date, _)| date);
        let mut points: Vec<SeriesPoint> = Vec::with_capacity(raw.len());
        for (date, value) in raw {
            if let Some(last) = points.last_mut() {
                if last.date == date {
                    last.value = value;
                    continue;
                }
            }
            points.push(SeriesPoint { date, value });
        }
        TimeSeries { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SeriesPoint> {
        self.points.iter()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    /// Exact-date lookup.
    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        self.points
            .binary_search_by_key(&date, |p| p.date)
            .ok()
            .map(|i| self.points[i].value)
    }

    /// Latest observation on or before `date` (last observation carried
    /// forward). `None` when nothing has been observed yet.
    pub fn as_of(&self, date: NaiveDate) -> Option<f64> {
        let upto = self.points.partition_point(|p| p.date <= date);
        if upto == 0 {
            None
        } else {
            Some(self.points[upto - 1].value)
        }
    }

    /// Restricts the series to the closed range `[start, end]`.
    pub fn between(&self, start: NaiveDate, end: NaiveDate) -> TimeSeries {
        let points = self
            .points
            .iter()
            .filter(|p| p.date >= start && p.date <= end)
            .copied()
            .collect();
        TimeSeries { points }
    }
}

/// Merged sorted date index of two series.
pub fn union_dates(a: &TimeSeries, b: &TimeSeries) -> Vec<NaiveDate> {
    let unique: BTreeSet<NaiveDate> = a
        .iter()
        .map(|p| p.date)
        .chain(b.iter().map(|p| p.date))
        .collect();
    unique.into_iter().collect()
}
