//! INI file configuration adapter.

use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let mut config = Ini::new();
        config.load(path).map_err(std::io::Error::other)?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, String> {
        let mut config = Ini::new();
        config.read(content.to_string())?;
        Ok(Self { config })
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.config
            .getint(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_float(&self, section: &str, key: &str, default: f64) -> f64 {
        self.config
            .getfloat(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.config
            .getboolcoerce(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"
[pair]
ticker = EURUSD=X
country_a = Euro Area
country_b = United States

[backtest]
start_date = 2020-01-01
end_date = 2023-12-31
initial_cash = 10000.0
trade_amount_percent = 0.10

[signals]
n_periods_growth = 4
gdp_long_threshold = 30.0
"#;

    #[test]
    fn from_string_parses_sections() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(
            adapter.get_string("pair", "ticker"),
            Some("EURUSD=X".to_string())
        );
        assert_eq!(
            adapter.get_string("pair", "country_a"),
            Some("Euro Area".to_string())
        );
        assert_eq!(adapter.get_float("backtest", "initial_cash", 0.0), 10000.0);
        assert_eq!(adapter.get_int("signals", "n_periods_growth", 0), 4);
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let adapter = FileConfigAdapter::from_string("[backtest]\n").unwrap();
        assert_eq!(adapter.get_string("backtest", "missing"), None);
        assert_eq!(adapter.get_int("backtest", "missing", 42), 42);
        assert_eq!(adapter.get_float("backtest", "missing", 9.5), 9.5);
        assert!(adapter.get_bool("backtest", "missing", true));
    }

    #[test]
    fn non_numeric_values_fall_back_to_defaults() {
        let adapter =
            FileConfigAdapter::from_string("[backtest]\ninitial_cash = lots\n").unwrap();
        assert_eq!(adapter.get_float("backtest", "initial_cash", 1.0), 1.0);
        assert_eq!(adapter.get_int("backtest", "initial_cash", 7), 7);
    }

    #[test]
    fn bool_parsing_accepts_common_forms() {
        let adapter =
            FileConfigAdapter::from_string("[x]\na = true\nb = no\nc = 1\n").unwrap();
        assert!(adapter.get_bool("x", "a", false));
        assert!(!adapter.get_bool("x", "b", true));
        assert!(adapter.get_bool("x", "c", false));
    }

    #[test]
    fn from_file_reads_config() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{SAMPLE}").unwrap();
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(
            adapter.get_string("backtest", "start_date"),
            Some("2020-01-01".to_string())
        );
    }

    #[test]
    fn from_file_missing_file_is_an_error() {
        assert!(FileConfigAdapter::from_file("/nonexistent/config.ini").is_err());
    }
}
