#![allow(dead_code)]

use chrono::NaiveDate;
use fxseason::domain::config::RunConfig;
use fxseason::domain::error::FxSeasonError;
use fxseason::domain::gdp_momentum::MomentumParams;
use fxseason::domain::series::{GdpSeries, PriceSeries, TimeSeries};
use fxseason::domain::synthesis::SynthesisParams;
use fxseason::ports::data_port::DataPort;
use std::collections::HashMap;

pub const TICKER: &str = "EURUSD=X";
pub const COUNTRY_A: &str = "Euro Area";
pub const COUNTRY_B: &str = "United States";

pub struct MockDataPort {
    pub prices: HashMap<String, PriceSeries>,
    pub gdp: HashMap<String, GdpSeries>,
    pub gdp_errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            prices: HashMap::new(),
            gdp: HashMap::new(),
            gdp_errors: HashMap::new(),
        }
    }

    pub fn with_prices(mut self, ticker: &str, series: PriceSeries) -> Self {
        self.prices.insert(ticker.to_string(), series);
        self
    }

    pub fn with_gdp(mut self, country: &str, series: GdpSeries) -> Self {
        self.gdp.insert(country.to_string(), series);
        self
    }

    pub fn with_gdp_error(mut self, country: &str, reason: &str) -> Self {
        self.gdp_errors
            .insert(country.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_prices(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, FxSeasonError> {
        Ok(self
            .prices
            .get(ticker)
            .map(|s| s.between(start_date, end_date))
            .unwrap_or_default())
    }

    fn fetch_gdp(&self, country: &str) -> Result<GdpSeries, FxSeasonError> {
        if let Some(reason) = self.gdp_errors.get(country) {
            return Err(FxSeasonError::Data {
                source_name: country.to_string(),
                reason: reason.clone(),
            });
        }
        Ok(self.gdp.get(country).cloned().unwrap_or_default())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Daily prices compounding at `daily_growth` from `initial`.
pub fn growth_prices(
    start: NaiveDate,
    days: usize,
    initial: f64,
    daily_growth: f64,
) -> PriceSeries {
    TimeSeries::from_points(
        (0..days)
            .map(|i| {
                let price = initial * (1.0 + daily_growth).powi(i as i32);
                (start + chrono::Duration::days(i as i64), price)
            })
            .collect(),
    )
}

pub fn flat_prices(start: NaiveDate, days: usize, price: f64) -> PriceSeries {
    growth_prices(start, days, price, 0.0)
}

/// Quarterly GDP levels starting at `start_year` Q1.
pub fn quarterly_gdp(start_year: i32, values: &[f64]) -> GdpSeries {
    TimeSeries::from_points(
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                let year = start_year + (i / 4) as i32;
                let month = 1 + 3 * (i % 4) as u32;
                (date(year, month, 1), v)
            })
            .collect(),
    )
}

pub fn base_config(start: NaiveDate, end: NaiveDate) -> RunConfig {
    RunConfig {
        ticker: TICKER.into(),
        country_a: COUNTRY_A.into(),
        country_b: COUNTRY_B.into(),
        start_date: start,
        end_date: end,
        initial_cash: 10_000.0,
        trade_amount_percent: 0.10,
        benchmark_ticker: None,
        momentum: MomentumParams::default(),
        synthesis: SynthesisParams::default(),
    }
}

/// Config whose momentum leg reads Long on every date regardless of the GDP
/// inputs, so the seasonality leg alone decides whether a Buy fires.
pub fn buy_biased_config(start: NaiveDate, end: NaiveDate) -> RunConfig {
    let mut config = base_config(start, end);
    config.momentum.long_threshold = -1_000.0;
    config
}

/// A GDP pair with enough overlap for the default 4-period growth shift.
pub fn sample_gdp_pair() -> (GdpSeries, GdpSeries) {
    let a = quarterly_gdp(2020, &[100.0, 101.0, 102.0, 103.0, 104.0, 105.0, 106.0, 107.0]);
    let b = quarterly_gdp(2020, &[200.0, 201.0, 202.0, 203.0, 204.0, 205.0, 206.0, 207.0]);
    (a, b)
}
