//! Backtest engine: the daily simulation loop.
//!
//! Drives two independent ledgers (strategy and buy-and-hold benchmark)
//! over the trading calendar derived from the primary instrument's price
//! dates. Per day, in order: valuation snapshot, Friday close-out, position
//! sizing, directive application. All mid-run failures are logged and
//! recovered locally; only missing primary price data aborts the run.

use crate::domain::config::RunConfig;
use crate::domain::error::FxSeasonError;
use crate::domain::gdp_momentum::compare_gdp_momentum;
use crate::domain::portfolio::{EquityPoint, PositionLedger};
use crate::domain::seasonality::expected_return_series;
use crate::domain::series::GdpSeries;
use crate::domain::signal::Directive;
use crate::domain::synthesis::synthesize;
use crate::ports::data_port::DataPort;
use crate::ports::log_port::LogPort;
use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// Sized trade amounts at or below this are skipped for the day.
pub const MIN_TRADE_AMOUNT: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub strategy: Vec<EquityPoint>,
    pub benchmark: Option<Vec<EquityPoint>>,
}

pub struct BacktestEngine<'a> {
    data_port: &'a dyn DataPort,
    logger: &'a dyn LogPort,
}

impl<'a> BacktestEngine<'a> {
    pub fn new(data_port: &'a dyn DataPort, logger: &'a dyn LogPort) -> Self {
        BacktestEngine { data_port, logger }
    }

    fn log(&self, message: &str) {
        self.logger.log(&format!("[engine] {message}"));
    }

    pub fn run(&self, config: &RunConfig) -> Result<BacktestResult, FxSeasonError> {
        self.log(&format!(
            "Backtest {} from {} to {}, initial cash {:.2}, position size {:.2}%",
            config.ticker,
            config.start_date,
            config.end_date,
            config.initial_cash,
            config.trade_amount_percent * 100.0,
        ));

        // Primary price history is the one hard requirement.
        let prices =
            self.data_port
                .fetch_prices(&config.ticker, config.start_date, config.end_date)?;
        if prices.is_empty() {
            return Err(FxSeasonError::SetupData {
                ticker: config.ticker.clone(),
                reason: format!(
                    "no prices between {} and {}",
                    config.start_date, config.end_date
                ),
            });
        }
        self.log(&format!(
            "Loaded {} price rows for {}",
            prices.len(),
            config.ticker
        ));

        // GDP data degrades to a neutral signal instead of aborting.
        let gdp_a = self.fetch_gdp_lenient(&config.country_a);
        let gdp_b = self.fetch_gdp_lenient(&config.country_b);
        let momentum = compare_gdp_momentum(&gdp_a, &gdp_b, &config.momentum);
        if momentum.is_empty() {
            self.log(&format!(
                "No usable GDP momentum for {}/{}, treating as neutral",
                config.country_a, config.country_b
            ));
        } else {
            self.log(&format!(
                "GDP momentum computed over {} observations",
                momentum.signal.len()
            ));
        }

        let seasonality = expected_return_series(&prices);
        self.log(&format!(
            "Seasonality computed for {} dates",
            seasonality.len()
        ));

        let calendar: Vec<NaiveDate> = prices
            .dates()
            .into_iter()
            .filter(|&d| d >= config.start_date && d <= config.end_date)
            .collect();

        let directives = synthesize(
            &calendar,
            &seasonality,
            &momentum.signal,
            &config.synthesis,
            self.logger,
        );

        let mut strategy = PositionLedger::new(
            config.initial_cash,
            self.data_port,
            self.logger,
            config.start_date,
            config.end_date,
        );
        let mut benchmark = config.benchmark_ticker.as_ref().map(|ticker| {
            let ledger = PositionLedger::new(
                config.initial_cash,
                self.data_port,
                self.logger,
                config.start_date,
                config.end_date,
            );
            (ticker.clone(), ledger)
        });

        if let Some((ticker, ledger)) = benchmark.as_mut() {
            self.buy_and_hold(ticker, ledger, config);
        } else {
            self.log("No benchmark ticker configured, benchmark ledger omitted");
        }

        for (day, directive) in &directives {
            let day = *day;
            strategy.record_portfolio_value(day);
            if let Some((_, ledger)) = benchmark.as_mut() {
                ledger.record_portfolio_value(day);
            }

            // Friday close-out: never carry a position over the weekend,
            // whatever the day's signal says.
            if day.weekday() == Weekday::Fri {
                self.close_all(&mut strategy, day);
            }

            let amount = (strategy.calculate_total_value(day) * config.trade_amount_percent).abs();
            if amount <= MIN_TRADE_AMOUNT {
                self.log(&format!(
                    "{day}: sized amount {amount:.2} too small, skipping trade"
                ));
                continue;
            }

            match directive {
                Directive::Buy => self.apply_buy(&mut strategy, &config.ticker, amount, day),
                Directive::Sell => self.apply_sell(&mut strategy, &config.ticker, amount, day),
                Directive::Hold => {}
            }
        }

        // The curve always terminates at the requested end date, even when
        // the last trading day falls earlier or the loop was empty.
        let needs_final = directives
            .last()
            .map(|&(last, _)| config.end_date > last)
            .unwrap_or(true);
        if needs_final {
            self.log(&format!(
                "Recording final portfolio value at {}",
                config.end_date
            ));
            strategy.record_portfolio_value(config.end_date);
            if let Some((_, ledger)) = benchmark.as_mut() {
                ledger.record_portfolio_value(config.end_date);
            }
        }

        let final_value = strategy.calculate_total_value(config.end_date);
        self.log(&format!(
            "Strategy final value on {}: {final_value:.2}",
            config.end_date
        ));
        if let Some((ticker, ledger)) = benchmark.as_mut() {
            let value = ledger.calculate_total_value(config.end_date);
            self.log(&format!(
                "Benchmark {ticker} final value on {}: {value:.2}",
                config.end_date
            ));
        }

        Ok(BacktestResult {
            strategy: strategy.history,
            benchmark: benchmark.map(|(_, ledger)| ledger.history),
        })
    }

    fn fetch_gdp_lenient(&self, country: &str) -> GdpSeries {
        match self.data_port.fetch_gdp(country) {
            Ok(series) => {
                self.log(&format!("Loaded {} GDP rows for {country}", series.len()));
                series
            }
            Err(e) => {
                self.log(&format!("Warning: GDP load failed for {country}: {e}"));
                GdpSeries::new()
            }
        }
    }

    /// Invests the benchmark ledger's full cash on the first date in range
    /// with a resolvable price, then leaves it alone.
    fn buy_and_hold(&self, ticker: &str, ledger: &mut PositionLedger, config: &RunConfig) {
        let mut day = config.start_date;
        while day <= config.end_date {
            if ledger.resolve_price(ticker, day).is_some() {
                self.log(&format!("Buying benchmark {ticker} on {day}"));
                ledger.open_long(ticker, ledger.cash, day);
                return;
            }
            day += Duration::days(1);
        }
        self.log(&format!(
            "No tradable day found for benchmark {ticker}, ledger stays in cash"
        ));
    }

    fn close_all(&self, ledger: &mut PositionLedger, day: NaiveDate) {
        let tickers: Vec<String> = ledger.positions.keys().cloned().collect();
        for ticker in tickers {
            let Some(pos) = ledger.position(&ticker) else {
                continue;
            };
            if pos.is_long() {
                self.log(&format!("{day} (Friday): closing long {ticker} for the weekend"));
                ledger.close_long(&ticker, day, None);
            } else {
                self.log(&format!("{day} (Friday): covering short {ticker} for the weekend"));
                ledger.cover_short(&ticker, day, None);
            }
        }
    }

    fn apply_buy(&self, ledger: &mut PositionLedger, ticker: &str, amount: f64, day: NaiveDate) {
        if ledger.position(ticker).is_some_and(|p| p.is_short()) {
            self.log(&format!(
                "{day}: buy directive for {ticker}, covering existing short first"
            ));
            ledger.cover_short(ticker, day, None);
        }

        if !ledger.has_position(ticker) {
            if ledger.cash >= amount {
                self.log(&format!("{day}: opening long {ticker} with {amount:.2}"));
                ledger.open_long(ticker, amount, day);
            } else {
                self.log(&format!(
                    "{day}: buy directive for {ticker}, but cash {:.2} below amount {amount:.2}",
                    ledger.cash
                ));
            }
        } else {
            self.log(&format!(
                "{day}: buy directive for {ticker}, but a position is still open"
            ));
        }
    }

    fn apply_sell(&self, ledger: &mut PositionLedger, ticker: &str, amount: f64, day: NaiveDate) {
        if ledger.position(ticker).is_some_and(|p| p.is_long()) {
            self.log(&format!(
                "{day}: sell directive for {ticker}, closing existing long first"
            ));
            ledger.close_long(ticker, day, None);
        }

        if !ledger.has_position(ticker) {
            // No cash gate for shorts: proceeds are credited, margin is not
            // modeled.
            self.log(&format!(
                "{day}: opening short {ticker} with notional {amount:.2}"
            ));
            ledger.open_short(ticker, amount, day);
        } else {
            self.log(&format!(
                "{day}: sell directive for {ticker}, but a position is still open"
            ));
        }
    }
}
