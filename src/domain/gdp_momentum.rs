//! Cross-country GDP momentum comparison.
//!
//! Two GDP level series are aligned on a shared date index, turned into
//! n-period growth rates, min-max scaled to [-100, 100] over their whole
//! span, and compared. The divergence of the scaled growth series drives a
//! categorical long/short/neutral signal.

use crate::domain::series::{GdpSeries, SeriesPoint, union_dates};
use crate::domain::signal::MomentumSignal;
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct MomentumParams {
    /// Growth lookback in aligned observations, e.g. 4 for year-over-year on
    /// quarterly data.
    pub n_periods_growth: usize,
    /// Divergence above which the signal is Long, on the [-100, 100] scale.
    pub long_threshold: f64,
    /// Divergence below which the signal is Short, on the [-100, 100] scale.
    pub short_threshold: f64,
}

impl Default for MomentumParams {
    fn default() -> Self {
        MomentumParams {
            n_periods_growth: 4,
            long_threshold: 30.0,
            short_threshold: -30.0,
        }
    }
}

/// Output of [`compare_gdp_momentum`]. The scaled and difference series are
/// kept for plotting and debugging; the simulation only consumes `signal`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MomentumAnalysis {
    pub scaled_a: Vec<SeriesPoint>,
    pub scaled_b: Vec<SeriesPoint>,
    pub difference: Vec<SeriesPoint>,
    pub signal: Vec<(NaiveDate, MomentumSignal)>,
}

impl MomentumAnalysis {
    pub fn is_empty(&self) -> bool {
        self.signal.is_empty()
    }
}

/// Compares the growth momentum of two economies.
///
/// Insufficient overlap (fewer than `n_periods_growth + 1` aligned
/// observations) returns an empty analysis rather than an error; downstream
/// synthesis treats missing momentum as Neutral.
pub fn compare_gdp_momentum(
    series_a: &GdpSeries,
    series_b: &GdpSeries,
    params: &MomentumParams,
) -> MomentumAnalysis {
    let aligned = align(series_a, series_b);
    if aligned.len() < params.n_periods_growth + 1 {
        return MomentumAnalysis::default();
    }

    let dates: Vec<NaiveDate> = aligned.iter().map(|r| r.0).collect();
    let values_a: Vec<f64> = aligned.iter().map(|r| r.1).collect();
    let values_b: Vec<f64> = aligned.iter().map(|r| r.2).collect();

    let growth_a = growth_rates(&values_a, params.n_periods_growth);
    let growth_b = growth_rates(&values_b, params.n_periods_growth);
    let growth_dates = &dates[params.n_periods_growth..];

    let scaled_a_vals = min_max_scale(&growth_a);
    let scaled_b_vals = min_max_scale(&growth_b);

    let mut scaled_a = Vec::with_capacity(growth_dates.len());
    let mut scaled_b = Vec::with_capacity(growth_dates.len());
    let mut difference = Vec::with_capacity(growth_dates.len());
    let mut signal = Vec::with_capacity(growth_dates.len());

    for (i, &date) in growth_dates.iter().enumerate() {
        let diff = scaled_a_vals[i] - scaled_b_vals[i];
        scaled_a.push(SeriesPoint { date, value: scaled_a_vals[i] });
        scaled_b.push(SeriesPoint { date, value: scaled_b_vals[i] });
        difference.push(SeriesPoint { date, value: diff });

        let sig = if diff > params.long_threshold {
            MomentumSignal::Long
        } else if diff < params.short_threshold {
            MomentumSignal::Short
        } else {
            MomentumSignal::Neutral
        };
        signal.push((date, sig));
    }

    MomentumAnalysis {
        scaled_a,
        scaled_b,
        difference,
        signal,
    }
}

/// Unified date index over the overlap of both series, internal gaps filled
/// by linear interpolation. Dates where either series is still undefined
/// (before its first or after its last observation) are dropped.
fn align(series_a: &GdpSeries, series_b: &GdpSeries) -> Vec<(NaiveDate, f64, f64)> {
    let (Some(first_a), Some(first_b)) = (series_a.first_date(), series_b.first_date()) else {
        return Vec::new();
    };
    let (Some(last_a), Some(last_b)) = (series_a.last_date(), series_b.last_date()) else {
        return Vec::new();
    };

    let start = first_a.max(first_b);
    let end = last_a.min(last_b);
    if start > end {
        return Vec::new();
    }

    union_dates(series_a, series_b)
        .into_iter()
        .filter(|&d| d >= start && d <= end)
        .filter_map(|d| {
            let a = interpolate_at(series_a, d)?;
            let b = interpolate_at(series_b, d)?;
            Some((d, a, b))
        })
        .collect()
}

/// Value at `date`, linearly interpolated in time between the surrounding
/// observations. `None` outside the observed span.
fn interpolate_at(series: &GdpSeries, date: NaiveDate) -> Option<f64> {
    if let Some(exact) = series.get(date) {
        return Some(exact);
    }

    let points: Vec<&SeriesPoint> = series.iter().collect();
    let after = points.iter().position(|p| p.date > date)?;
    if after == 0 {
        return None;
    }
    let lo = points[after - 1];
    let hi = points[after];

    let span = (hi.date - lo.date).num_days() as f64;
    let offset = (date - lo.date).num_days() as f64;
    Some(lo.value + (hi.value - lo.value) * offset / span)
}

/// `value[i] / value[i - n] - 1` for `i >= n`; the leading `n` slots are
/// dropped.
fn growth_rates(values: &[f64], n: usize) -> Vec<f64> {
    values
        .iter()
        .enumerate()
        .skip(n)
        .map(|(i, &v)| v / values[i - n] - 1.0)
        .collect()
}

/// Scales a series to [-100, 100] over its full range. A constant series
/// maps to all zeros instead of dividing by zero.
pub fn min_max_scale(values: &[f64]) -> Vec<f64> {
    let Some(min) = values.iter().copied().reduce(f64::min) else {
        return Vec::new();
    };
    let max = values.iter().copied().reduce(f64::max).unwrap_or(min);

    if max == min {
        return vec![0.0; values.len()];
    }

    values
        .iter()
        .map(|&v| 200.0 * (v - min) / (max - min) - 100.0)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::series::TimeSeries;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn quarterly(start_year: i32, values: &[f64]) -> GdpSeries {
        let points = values
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                let year = start_year + (i / 4) as i32;
                let month = 1 + 3 * (i % 4) as u32;
                (date(year, month, 1), v)
            })
            .collect();
        TimeSeries::from_points(points)
    }

    fn params(long: f64, short: f64) -> MomentumParams {
        MomentumParams {
            n_periods_growth: 4,
            long_threshold: long,
            short_threshold: short,
        }
    }

    #[test]
    fn identical_series_yield_zero_difference_and_neutral_signal() {
        let a = quarterly(2020, &[100.0, 102.0, 104.0, 103.0, 106.0, 108.0, 110.0, 112.0]);
        let b = a.clone();

        let analysis = compare_gdp_momentum(&a, &b, &params(30.0, -30.0));

        assert!(!analysis.is_empty());
        for point in &analysis.difference {
            assert_relative_eq!(point.value, 0.0);
        }
        for (_, sig) in &analysis.signal {
            assert_eq!(*sig, MomentumSignal::Neutral);
        }
    }

    #[test]
    fn insufficient_overlap_returns_empty_analysis() {
        let a = quarterly(2020, &[100.0, 101.0, 102.0, 103.0]);
        let b = quarterly(2020, &[200.0, 201.0, 202.0, 203.0]);
        // Four aligned observations, but n_periods_growth + 1 = 5 required.
        let analysis = compare_gdp_momentum(&a, &b, &params(30.0, -30.0));
        assert!(analysis.is_empty());
    }

    #[test]
    fn disjoint_spans_return_empty_analysis() {
        let a = quarterly(2010, &[100.0, 101.0, 102.0, 103.0, 104.0]);
        let b = quarterly(2020, &[100.0, 101.0, 102.0, 103.0, 104.0]);
        assert!(compare_gdp_momentum(&a, &b, &params(30.0, -30.0)).is_empty());
    }

    #[test]
    fn diverging_growth_triggers_long_signal() {
        // A accelerates strongly, B stays flat.
        let a = quarterly(2020, &[
            100.0, 100.0, 100.0, 100.0, 100.0, 101.0, 103.0, 106.0, 112.0,
        ]);
        let b = quarterly(2020, &[
            100.0, 100.0, 100.0, 100.0, 100.0, 100.0, 100.0, 100.0, 100.0,
        ]);

        let analysis = compare_gdp_momentum(&a, &b, &params(30.0, -30.0));
        assert!(!analysis.is_empty());

        // B is constant after scaling (zero variance rule), so the
        // difference equals scaled A; its maximum must reach +100.
        let last = analysis.signal.last().unwrap();
        assert_eq!(last.1, MomentumSignal::Long);
        for point in &analysis.scaled_b {
            assert_relative_eq!(point.value, 0.0);
        }
    }

    #[test]
    fn scaled_extremes_are_plus_minus_100() {
        let a = quarterly(2020, &[100.0, 101.0, 103.0, 102.0, 108.0, 104.0, 111.0, 113.0]);
        let b = quarterly(2020, &[50.0, 51.0, 50.5, 52.0, 53.0, 52.5, 54.0, 55.0]);

        let analysis = compare_gdp_momentum(&a, &b, &params(30.0, -30.0));
        let values: Vec<f64> = analysis.scaled_a.iter().map(|p| p.value).collect();
        let min = values.iter().copied().reduce(f64::min).unwrap();
        let max = values.iter().copied().reduce(f64::max).unwrap();
        assert_relative_eq!(min, -100.0);
        assert_relative_eq!(max, 100.0);
    }

    #[test]
    fn interpolation_fills_internal_gaps() {
        // B misses the 2020-07-01 quarter; it must be interpolated, not
        // dropped, so alignment keeps the shared dates.
        let a = quarterly(2020, &[100.0, 101.0, 102.0, 103.0, 104.0, 105.0]);
        let b = TimeSeries::from_points(vec![
            (date(2020, 1, 1), 200.0),
            (date(2020, 4, 1), 202.0),
            (date(2020, 10, 1), 206.0),
            (date(2021, 1, 1), 208.0),
            (date(2021, 4, 1), 210.0),
        ]);

        let analysis = compare_gdp_momentum(&a, &b, &params(30.0, -30.0));
        assert!(!analysis.is_empty());
        // Aligned index covers all six quarters, so two growth observations
        // survive the 4-period shift.
        assert_eq!(analysis.signal.len(), 2);
    }

    #[test]
    fn min_max_scale_constant_input_is_all_zeros() {
        let scaled = min_max_scale(&[5.0, 5.0, 5.0]);
        assert_eq!(scaled, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn min_max_scale_empty_input() {
        assert!(min_max_scale(&[]).is_empty());
    }

    proptest! {
        #[test]
        fn min_max_scale_bounds(values in proptest::collection::vec(-1e6f64..1e6, 2..50)) {
            let scaled = min_max_scale(&values);
            prop_assert_eq!(scaled.len(), values.len());
            for v in &scaled {
                prop_assert!(*v >= -100.0 - 1e-9);
                prop_assert!(*v <= 100.0 + 1e-9);
            }
            let min = values.iter().copied().reduce(f64::min).unwrap();
            let max = values.iter().copied().reduce(f64::max).unwrap();
            if max > min {
                let smin = scaled.iter().copied().reduce(f64::min).unwrap();
                let smax = scaled.iter().copied().reduce(f64::max).unwrap();
                prop_assert!((smin + 100.0).abs() < 1e-6);
                prop_assert!((smax - 100.0).abs() < 1e-6);
            }
        }
    }
}
