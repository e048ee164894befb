//! Engine error types.
//!
//! Every failure inside the engine is local validation. Nothing is retried and
//! no stage produces partial output once one of these is raised.

use chrono::NaiveDate;
use thiserror::Error;

/// What is wrong with an investment configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("unknown interval '{0}' (expected one of: day, month, year)")]
    UnknownInterval(String),

    #[error("date_from {from} is after date_to {to}")]
    InvertedWindow { from: NaiveDate, to: NaiveDate },

    #[error("{field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Errors raised by the simulation engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigurationError),

    #[error("empty input: {0}")]
    EmptyInput(String),

    #[error("invalid series '{asset}': {reason}")]
    InvalidSeries { asset: String, reason: String },
}

impl EngineError {
    pub fn is_invalid_configuration(&self) -> bool {
        matches!(self, EngineError::InvalidConfiguration(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_interval_names_offending_value() {
        let err = EngineError::from(ConfigurationError::UnknownInterval("weekly".into()));
        assert_eq!(
            err.to_string(),
            "invalid configuration: unknown interval 'weekly' (expected one of: day, month, year)"
        );
        assert!(err.is_invalid_configuration());
    }

    #[test]
    fn empty_input_is_not_a_configuration_error() {
        let err = EngineError::EmptyInput("no asset series".into());
        assert!(!err.is_invalid_configuration());
    }
}
