//! Configuration validation.
//!
//! Checks every setting before any data file is opened.

use crate::domain::error::PeervalError;
use crate::domain::valuation::RecommendationPolicy;
use crate::ports::config_port::ConfigPort;

pub const DATA_KEYS: [&str; 3] = ["companies", "median_pe", "actual_prices"];

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), PeervalError> {
    validate_data_paths(config)?;
    validate_policy(config)?;
    validate_year(config)?;
    Ok(())
}

fn validate_data_paths(config: &dyn ConfigPort) -> Result<(), PeervalError> {
    for key in DATA_KEYS {
        if config.get_path("data", key).is_none() {
            return Err(PeervalError::ConfigMissing {
                section: "data".to_string(),
                key: key.to_string(),
            });
        }
    }
    Ok(())
}

fn validate_policy(config: &dyn ConfigPort) -> Result<(), PeervalError> {
    parse_policy(config).map(|_| ())
}

fn validate_year(config: &dyn ConfigPort) -> Result<(), PeervalError> {
    parse_year(config).map(|_| ())
}

/// `[valuation] policy`, defaulting to banded when absent.
pub fn parse_policy(config: &dyn ConfigPort) -> Result<RecommendationPolicy, PeervalError> {
    match config.get_string("valuation", "policy") {
        None => Ok(RecommendationPolicy::default()),
        Some(s) if s.trim().is_empty() => Ok(RecommendationPolicy::default()),
        Some(s) => s.parse::<RecommendationPolicy>().map_err(|reason| PeervalError::ConfigInvalid {
            section: "valuation".to_string(),
            key: "policy".to_string(),
            reason,
        }),
    }
}

/// `[valuation] year`, if set.
pub fn parse_year(config: &dyn ConfigPort) -> Result<Option<i32>, PeervalError> {
    match config.get_string("valuation", "year") {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<i32>()
            .map(Some)
            .map_err(|_| PeervalError::ConfigInvalid {
                section: "valuation".to_string(),
                key: "year".to_string(),
                reason: format!("invalid year '{}', expected e.g. 2024", s.trim()),
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    const VALID: &str = r#"
[data]
companies = data/companies.csv
median_pe = data/median_pe.csv
actual_prices = data/actual_prices.csv

[valuation]
year = 2024
policy = median_only
"#;

    fn adapter(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    #[test]
    fn valid_config_passes() {
        assert!(validate_config(&adapter(VALID)).is_ok());
    }

    #[test]
    fn valuation_section_is_optional() {
        let cfg = adapter(
            "[data]\ncompanies = a.csv\nmedian_pe = b.csv\nactual_prices = c.csv\n",
        );
        assert!(validate_config(&cfg).is_ok());
        assert_eq!(parse_policy(&cfg).unwrap(), RecommendationPolicy::Banded);
        assert_eq!(parse_year(&cfg).unwrap(), None);
    }

    #[test]
    fn missing_data_path() {
        let cfg = adapter("[data]\ncompanies = a.csv\nmedian_pe = b.csv\n");
        let err = validate_config(&cfg).unwrap_err();
        assert!(matches!(err, PeervalError::ConfigMissing { key, .. } if key == "actual_prices"));
    }

    #[test]
    fn blank_data_path_is_missing() {
        let cfg = adapter("[data]\ncompanies =   \nmedian_pe = b.csv\nactual_prices = c.csv\n");
        let err = validate_config(&cfg).unwrap_err();
        assert!(matches!(err, PeervalError::ConfigMissing { key, .. } if key == "companies"));
    }

    #[test]
    fn unknown_policy_rejected() {
        let cfg = adapter(
            "[data]\ncompanies = a\nmedian_pe = b\nactual_prices = c\n[valuation]\npolicy = dcf\n",
        );
        let err = validate_config(&cfg).unwrap_err();
        assert!(matches!(err, PeervalError::ConfigInvalid { key, .. } if key == "policy"));
    }

    #[test]
    fn non_numeric_year_rejected() {
        let cfg = adapter(
            "[data]\ncompanies = a\nmedian_pe = b\nactual_prices = c\n[valuation]\nyear = last\n",
        );
        let err = validate_config(&cfg).unwrap_err();
        assert!(matches!(err, PeervalError::ConfigInvalid { key, .. } if key == "year"));
    }

    #[test]
    fn parses_configured_values() {
        let cfg = adapter(VALID);
        assert_eq!(parse_year(&cfg).unwrap(), Some(2024));
        assert_eq!(parse_policy(&cfg).unwrap(), RecommendationPolicy::MedianOnly);
    }
}
