//! Run configuration: one immutable value object per backtest.
//!
//! Built and fully validated from a [`ConfigPort`] before the engine
//! constructs, so no threshold or date problem can surface mid-run.

use crate::domain::error::FxSeasonError;
use crate::domain::gdp_momentum::MomentumParams;
use crate::domain::synthesis::SynthesisParams;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub ticker: String,
    pub country_a: String,
    pub country_b: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub initial_cash: f64,
    /// Fraction of total value committed per trade, in (0, 1].
    pub trade_amount_percent: f64,
    pub benchmark_ticker: Option<String>,
    pub momentum: MomentumParams,
    pub synthesis: SynthesisParams,
}

impl RunConfig {
    pub fn from_config(config: &dyn ConfigPort) -> Result<RunConfig, FxSeasonError> {
        let ticker = require_string(config, "pair", "ticker")?;
        let country_a = require_string(config, "pair", "country_a")?;
        let country_b = require_string(config, "pair", "country_b")?;

        let start_date = parse_date(config, "backtest", "start_date")?;
        let end_date = parse_date(config, "backtest", "end_date")?;
        if start_date >= end_date {
            return Err(invalid(
                "backtest",
                "start_date",
                "start_date must be before end_date",
            ));
        }

        let initial_cash = config.get_float("backtest", "initial_cash", 10_000.0);
        if initial_cash <= 0.0 {
            return Err(invalid(
                "backtest",
                "initial_cash",
                "initial_cash must be positive",
            ));
        }

        let trade_amount_percent = config.get_float("backtest", "trade_amount_percent", 0.10);
        if trade_amount_percent <= 0.0 || trade_amount_percent > 1.0 {
            return Err(invalid(
                "backtest",
                "trade_amount_percent",
                "trade_amount_percent must be in (0, 1]",
            ));
        }

        let benchmark_ticker = config
            .get_string("backtest", "benchmark_ticker")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let n_periods_growth = config.get_int("signals", "n_periods_growth", 4);
        if n_periods_growth < 1 {
            return Err(invalid(
                "signals",
                "n_periods_growth",
                "n_periods_growth must be at least 1",
            ));
        }

        let cooldown_days = config.get_int("signals", "cooldown_days", 5);
        if cooldown_days < 0 {
            return Err(invalid(
                "signals",
                "cooldown_days",
                "cooldown_days must be non-negative",
            ));
        }

        let momentum = MomentumParams {
            n_periods_growth: n_periods_growth as usize,
            long_threshold: config.get_float("signals", "gdp_long_threshold", 30.0),
            short_threshold: config.get_float("signals", "gdp_short_threshold", -30.0),
        };

        let synthesis = SynthesisParams {
            buy_threshold: config.get_float("signals", "seasonality_buy_threshold", 0.0001),
            sell_threshold: config.get_float("signals", "seasonality_sell_threshold", -0.0001),
            cooldown_days,
        };

        Ok(RunConfig {
            ticker,
            country_a,
            country_b,
            start_date,
            end_date,
            initial_cash,
            trade_amount_percent,
            benchmark_ticker,
            momentum,
            synthesis,
        })
    }
}

fn invalid(section: &str, key: &str, reason: &str) -> FxSeasonError {
    FxSeasonError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn require_string(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<String, FxSeasonError> {
    match config.get_string(section, key) {
        Some(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        _ => Err(FxSeasonError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        }),
    }
}

fn parse_date(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<NaiveDate, FxSeasonError> {
    let raw = require_string(config, section, key)?;
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|_| {
        invalid(
            section,
            key,
            &format!("invalid {key} format, expected YYYY-MM-DD"),
        )
    })
}
