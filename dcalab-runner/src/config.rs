//! Serializable plan configuration.
//!
//! A plan file is TOML:
//!
//! ```toml
//! [invest]
//! initial_lump = 1000.0
//! continuous_investment = 100.0
//! interval = "month"
//! date_from = "2020-01-01"
//! date_to = "now"
//!
//! [constant]
//! include = true
//! display_name = "Cash"
//!
//! [[assets]]
//! display_name = "S&P 500"
//! symbol = "SPY"
//! kind = "ticker"
//! path = "data/spy.csv"
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use dcalab_core::domain::InvestmentConfig;
use dcalab_core::EngineError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from loading or validating a plan.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read plan file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse plan TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error(transparent)]
    Invalid(#[from] EngineError),

    #[error("duplicate asset display name '{0}'")]
    DuplicateAsset(String),

    #[error("asset display name must not be empty (symbol '{0}')")]
    EmptyDisplayName(String),
}

/// Which market the asset comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    /// Exchange-traded security; trades on weekdays only.
    Ticker,
    /// Cryptocurrency; trades every day, often sub-daily ticks.
    Crypto,
}

/// One asset in the plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetSpec {
    /// Column name in every output.
    pub display_name: String,
    /// Provider symbol (e.g. `SPY`, `bitcoin`).
    pub symbol: String,
    pub kind: AssetKind,
    #[serde(default = "default_include")]
    pub include: bool,
    /// CSV price history. Relative paths resolve against the plan file's directory.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

fn default_include() -> bool {
    true
}

/// Optional flat reference series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstantConfig {
    #[serde(default)]
    pub include: bool,
    #[serde(default = "default_constant_name")]
    pub display_name: String,
}

fn default_constant_name() -> String {
    "Constant".to_string()
}

impl Default for ConstantConfig {
    fn default() -> Self {
        Self {
            include: false,
            display_name: default_constant_name(),
        }
    }
}

/// A complete investment plan: amounts, cadence, window and assets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanConfig {
    pub invest: InvestmentConfig,
    #[serde(default)]
    pub constant: ConstantConfig,
    #[serde(default)]
    pub assets: Vec<AssetSpec>,
}

impl PlanConfig {
    /// Load and validate a plan file.
    ///
    /// Relative asset paths are rewritten against the file's directory.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut plan = Self::from_toml(&content)?;
        if let Some(base) = path.parent() {
            plan.resolve_paths(base);
        }
        Ok(plan)
    }

    /// Parse and validate a plan from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let plan: PlanConfig = toml::from_str(content)?;
        plan.validate()?;
        Ok(plan)
    }

    /// Check amounts and display-name uniqueness.
    ///
    /// The window is checked when the plan runs, since `date_to = "now"`
    /// depends on the invocation date.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.invest.validate()?;

        let mut seen = HashSet::new();
        if self.constant.include {
            seen.insert(self.constant.display_name.as_str());
        }
        for asset in &self.assets {
            if asset.display_name.trim().is_empty() {
                return Err(ConfigError::EmptyDisplayName(asset.symbol.clone()));
            }
            if !seen.insert(asset.display_name.as_str()) {
                return Err(ConfigError::DuplicateAsset(asset.display_name.clone()));
            }
        }
        Ok(())
    }

    /// Assets with `include = true`, in file order.
    pub fn included_assets(&self) -> impl Iterator<Item = &AssetSpec> {
        self.assets.iter().filter(|a| a.include)
    }

    /// Name of the constant series, when enabled.
    pub fn constant_name(&self) -> Option<&str> {
        self.constant
            .include
            .then_some(self.constant.display_name.as_str())
    }

    /// Deterministic identifier of this plan (BLAKE3 over its JSON form).
    pub fn plan_id(&self) -> String {
        let json = serde_json::to_string(self).unwrap_or_default();
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }

    fn resolve_paths(&mut self, base: &Path) {
        for asset in &mut self.assets {
            if let Some(p) = &asset.path {
                if p.is_relative() {
                    asset.path = Some(base.join(p));
                }
            }
        }
    }
}
