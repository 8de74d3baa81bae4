//! Data access port trait.

use crate::domain::error::FxSeasonError;
use crate::domain::series::{GdpSeries, PriceSeries};
use chrono::NaiveDate;

pub trait DataPort {
    /// Closing-price history for an instrument over a closed date range.
    fn fetch_prices(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, FxSeasonError>;

    /// Full GDP level history for one economy.
    fn fetch_gdp(&self, country: &str) -> Result<GdpSeries, FxSeasonError>;
}
