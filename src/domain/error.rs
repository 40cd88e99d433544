//! Domain error types.
//!
//! Only structurally absent entities and unusable inputs are errors. Normal
//! data gaps (missing years, non-positive EPS, empty peer sets) are carried
//! inside result values instead.

/// Top-level error type for peerval.
#[derive(Debug, thiserror::Error)]
pub enum PeervalError {
    #[error("ticker not found: {ticker}")]
    NotFound { ticker: String },

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

    #[error("data load error: {reason}")]
    DataLoad { reason: String },

    #[error("data format error in {file} at line {line}: {reason}")]
    DataFormat {
        file: String,
        line: u64,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PeervalError {
    pub fn not_found(ticker: &str) -> Self {
        PeervalError::NotFound {
            ticker: ticker.to_string(),
        }
    }
}

impl From<&PeervalError> for std::process::ExitCode {
    fn from(err: &PeervalError) -> Self {
        let code: u8 = match err {
            PeervalError::Io(_) => 1,
            PeervalError::ConfigParse { .. }
            | PeervalError::ConfigMissing { .. }
            | PeervalError::ConfigInvalid { .. } => 2,
            PeervalError::DataLoad { .. } | PeervalError::DataFormat { .. } => 3,
            PeervalError::NotFound { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_ticker() {
        let err = PeervalError::not_found("ZZZ");
        assert_eq!(err.to_string(), "ticker not found: ZZZ");
    }

    #[test]
    fn data_format_message_includes_location() {
        let err = PeervalError::DataFormat {
            file: "companies.csv".into(),
            line: 7,
            reason: "duplicate ticker AAA".into(),
        };
        assert_eq!(
            err.to_string(),
            "data format error in companies.csv at line 7: duplicate ticker AAA"
        );
    }

    #[test]
    fn io_errors_convert_transparently() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: PeervalError = io.into();
        assert!(matches!(err, PeervalError::Io(_)));
        assert_eq!(err.to_string(), "gone");
    }
}
