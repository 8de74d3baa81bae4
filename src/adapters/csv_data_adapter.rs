//! CSV file data adapter.
//!
//! Prices live in `{TICKER}.csv` (`date,close`), GDP levels in
//! `gdp_{COUNTRY}.csv` (`date,value`), both under one base directory with
//! ISO dates. Spaces in country names map to underscores in filenames.

use crate::domain::error::FxSeasonError;
use crate::domain::series::{GdpSeries, PriceSeries, TimeSeries};
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

pub struct CsvDataAdapter {
    base_path: PathBuf,
}

impl CsvDataAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn price_path(&self, ticker: &str) -> PathBuf {
        self.base_path.join(format!("{ticker}.csv"))
    }

    fn gdp_path(&self, country: &str) -> PathBuf {
        let slug = country.replace(' ', "_");
        self.base_path.join(format!("gdp_{slug}.csv"))
    }

    fn read_series(&self, path: &PathBuf, source_name: &str) -> Result<TimeSeries, FxSeasonError> {
        let content = fs::read_to_string(path).map_err(|e| FxSeasonError::Data {
            source_name: source_name.to_string(),
            reason: format!("failed to read {}: {e}", path.display()),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut points = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| FxSeasonError::Data {
                source_name: source_name.to_string(),
                reason: format!("CSV parse error: {e}"),
            })?;

            let date_str = record.get(0).ok_or_else(|| FxSeasonError::Data {
                source_name: source_name.to_string(),
                reason: "missing date column".into(),
            })?;
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
                FxSeasonError::Data {
                    source_name: source_name.to_string(),
                    reason: format!("invalid date format: {e}"),
                }
            })?;

            let value: f64 = record
                .get(1)
                .ok_or_else(|| FxSeasonError::Data {
                    source_name: source_name.to_string(),
                    reason: "missing value column".into(),
                })?
                .parse()
                .map_err(|e| FxSeasonError::Data {
                    source_name: source_name.to_string(),
                    reason: format!("invalid value: {e}"),
                })?;

            points.push((date, value));
        }

        Ok(TimeSeries::from_points(points))
    }
}

impl DataPort for CsvDataAdapter {
    fn fetch_prices(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, FxSeasonError> {
        let path = self.price_path(ticker);
        let series = self.read_series(&path, ticker)?;
        Ok(series.between(start_date, end_date))
    }

    fn fetch_gdp(&self, country: &str) -> Result<GdpSeries, FxSeasonError> {
        let path = self.gdp_path(country);
        self.read_series(&path, country)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_test_data() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();

        fs::write(
            path.join("EURUSD=X.csv"),
            "date,close\n\
             2024-01-03,1.0950\n\
             2024-01-02,1.0940\n\
             2024-01-04,1.0970\n",
        )
        .unwrap();
        fs::write(
            path.join("gdp_Euro_Area.csv"),
            "date,value\n\
             2023-01-01,3500.0\n\
             2023-04-01,3520.0\n\
             2023-07-01,3540.0\n",
        )
        .unwrap();

        (dir, path)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn fetch_prices_sorts_and_filters() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvDataAdapter::new(path);

        let series = adapter
            .fetch_prices("EURUSD=X", date(2024, 1, 2), date(2024, 1, 3))
            .unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(series.first_date(), Some(date(2024, 1, 2)));
        assert_eq!(series.get(date(2024, 1, 3)), Some(1.0950));
    }

    #[test]
    fn fetch_prices_missing_file_is_an_error() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvDataAdapter::new(path);

        let result = adapter.fetch_prices("GBPUSD=X", date(2024, 1, 1), date(2024, 1, 31));
        assert!(matches!(result, Err(FxSeasonError::Data { .. })));
    }

    #[test]
    fn fetch_gdp_maps_spaces_to_underscores() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvDataAdapter::new(path);

        let series = adapter.fetch_gdp("Euro Area").unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.get(date(2023, 4, 1)), Some(3520.0));
    }

    #[test]
    fn malformed_row_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();
        fs::write(
            path.join("BAD.csv"),
            "date,close\n2024-01-02,not_a_number\n",
        )
        .unwrap();

        let adapter = CsvDataAdapter::new(path);
        let result = adapter.fetch_prices("BAD", date(2024, 1, 1), date(2024, 1, 31));
        assert!(result.is_err());
    }

    #[test]
    fn malformed_date_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();
        fs::write(path.join("BAD.csv"), "date,close\n02.01.2024,1.0\n").unwrap();

        let adapter = CsvDataAdapter::new(path);
        let result = adapter.fetch_prices("BAD", date(2024, 1, 1), date(2024, 1, 31));
        assert!(result.is_err());
    }
}
