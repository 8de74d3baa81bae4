//! Domain error types.

/// Top-level error type for fxseason.
#[derive(Debug, thiserror::Error)]
pub enum FxSeasonError {
    #[error("no usable price data for {ticker}: {reason}")]
    SetupData { ticker: String, reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data error for {source_name}: {reason}")]
    Data { source_name: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&FxSeasonError> for std::process::ExitCode {
    fn from(err: &FxSeasonError) -> Self {
        let code: u8 = match err {
            FxSeasonError::Io(_) => 1,
            FxSeasonError::ConfigParse { .. }
            | FxSeasonError::ConfigMissing { .. }
            | FxSeasonError::ConfigInvalid { .. } => 2,
            FxSeasonError::Data { .. } => 3,
            FxSeasonError::SetupData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
