//! As-of price lookup with per-ticker caching.
//!
//! The first lookup for a ticker fetches its full price history for the
//! backtest window and caches it; every later lookup answers from the cache
//! with the latest price on or before the requested date. A failed fetch is
//! cached as an empty series so the failure is logged once, not per day.

use crate::domain::series::PriceSeries;
use crate::ports::data_port::DataPort;
use crate::ports::log_port::LogPort;
use chrono::NaiveDate;
use std::collections::HashMap;

pub struct PriceResolver<'a> {
    data_port: &'a dyn DataPort,
    logger: &'a dyn LogPort,
    start_date: NaiveDate,
    end_date: NaiveDate,
    cache: HashMap<String, PriceSeries>,
}

impl<'a> PriceResolver<'a> {
    pub fn new(
        data_port: &'a dyn DataPort,
        logger: &'a dyn LogPort,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        PriceResolver {
            data_port,
            logger,
            start_date,
            end_date,
            cache: HashMap::new(),
        }
    }

    /// Latest available price on or before `date`, or `None` when no price
    /// has been observed yet (or the fetch failed).
    pub fn resolve(&mut self, ticker: &str, date: NaiveDate) -> Option<f64> {
        self.ensure_cached(ticker);
        self.cache.get(ticker).and_then(|series| series.as_of(date))
    }

    fn ensure_cached(&mut self, ticker: &str) {
        if self.cache.contains_key(ticker) {
            return;
        }
        let series = match self
            .data_port
            .fetch_prices(ticker, self.start_date, self.end_date)
        {
            Ok(series) => {
                self.logger.log(&format!(
                    "Cached {} price rows for {} ({} to {})",
                    series.len(),
                    ticker,
                    self.start_date,
                    self.end_date,
                ));
                series
            }
            Err(e) => {
                self.logger
                    .log(&format!("Warning: price fetch failed for {ticker}: {e}"));
                PriceSeries::new()
            }
        };
        self.cache.insert(ticker.to_string(), series);
    }
}
