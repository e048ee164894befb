//! Investment plan parameters.
//!
//! `InvestmentConfig` is an immutable value passed by argument to every stage
//! that needs it. `date_to = "now"` is resolved against a date supplied by the
//! caller so the engine never reads the clock itself.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigurationError, EngineError};

/// Investment cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", rename_all = "lowercase")]
pub enum Interval {
    Day,
    Month,
    Year,
}

impl Interval {
    pub const ALL: [Interval; 3] = [Interval::Day, Interval::Month, Interval::Year];

    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::Day => "day",
            Interval::Month => "month",
            Interval::Year => "year",
        }
    }
}

impl FromStr for Interval {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day" => Ok(Interval::Day),
            "month" => Ok(Interval::Month),
            "year" => Ok(Interval::Year),
            other => Err(ConfigurationError::UnknownInterval(other.to_string()).into()),
        }
    }
}

impl TryFrom<String> for Interval {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Upper bound of the simulation window: a fixed date or "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DateBound {
    Date(NaiveDate),
    Now,
}

impl DateBound {
    /// Resolve against the invocation date.
    pub fn resolve(&self, today: NaiveDate) -> NaiveDate {
        match self {
            DateBound::Date(d) => *d,
            DateBound::Now => today,
        }
    }
}

impl FromStr for DateBound {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("now") {
            return Ok(DateBound::Now);
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(DateBound::Date)
            .map_err(|e| {
                EngineError::from(ConfigurationError::InvalidValue {
                    field: "date_to",
                    reason: format!("'{s}': {e}"),
                })
            })
    }
}

impl TryFrom<String> for DateBound {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DateBound> for String {
    fn from(bound: DateBound) -> Self {
        match bound {
            DateBound::Date(d) => d.format("%Y-%m-%d").to_string(),
            DateBound::Now => "now".to_string(),
        }
    }
}

/// Parameters of a recurring-contribution plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentConfig {
    /// Amount invested at the first period.
    pub initial_lump: f64,
    /// Amount added at every later period.
    pub continuous_investment: f64,
    pub interval: Interval,
    /// First date of the simulation window (inclusive).
    pub date_from: NaiveDate,
    /// Last date of the simulation window (inclusive).
    pub date_to: DateBound,
}

/// Simulation window with `date_to` resolved to a concrete date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedWindow {
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
}

impl ResolvedWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.date_from <= date && date <= self.date_to
    }
}

impl InvestmentConfig {
    /// Check the amounts. Window ordering is checked by [`InvestmentConfig::resolve`].
    pub fn validate(&self) -> Result<(), EngineError> {
        if !self.initial_lump.is_finite() || self.initial_lump < 0.0 {
            return Err(ConfigurationError::InvalidValue {
                field: "initial_lump",
                reason: format!("must be a non-negative number, got {}", self.initial_lump),
            }
            .into());
        }
        if !self.continuous_investment.is_finite() {
            return Err(ConfigurationError::InvalidValue {
                field: "continuous_investment",
                reason: format!("must be a finite number, got {}", self.continuous_investment),
            }
            .into());
        }
        Ok(())
    }

    /// Validate and resolve the window against `today`.
    pub fn resolve(&self, today: NaiveDate) -> Result<ResolvedWindow, EngineError> {
        self.validate()?;
        let date_to = self.date_to.resolve(today);
        if self.date_from > date_to {
            return Err(ConfigurationError::InvertedWindow {
                from: self.date_from,
                to: date_to,
            }
            .into());
        }
        Ok(ResolvedWindow {
            date_from: self.date_from,
            date_to,
        })
    }
}
