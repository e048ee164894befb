//! Date-indexed tables passed between pipeline stages.
//!
//! Each stage builds a new table; none mutates its input.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One asset's column of prices. `None` marks a cell with no data yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceColumn {
    pub asset: String,
    pub values: Vec<Option<f64>>,
}

/// Prices for several assets on a shared date axis.
///
/// Every column has exactly `dates.len()` cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceTable {
    pub dates: Vec<NaiveDate>,
    pub columns: Vec<PriceColumn>,
}

/// Daily forward-filled table produced by the aligner.
pub type AlignedDataset = PriceTable;

/// Table resampled to the investment cadence.
pub type PeriodicDataset = PriceTable;

impl PriceTable {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn column(&self, asset: &str) -> Option<&PriceColumn> {
        self.columns.iter().find(|c| c.asset == asset)
    }

    pub fn assets(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.asset.as_str())
    }

    /// Rows whose date lies in `[from, to]`, inclusive.
    pub fn between(&self, from: NaiveDate, to: NaiveDate) -> PriceTable {
        let start = self.dates.partition_point(|d| *d < from);
        let end = self.dates.partition_point(|d| *d <= to).max(start);
        PriceTable {
            dates: self.dates[start..end].to_vec(),
            columns: self
                .columns
                .iter()
                .map(|c| PriceColumn {
                    asset: c.asset.clone(),
                    values: c.values[start..end].to_vec(),
                })
                .collect(),
        }
    }
}

/// Per-period fractional changes for one asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnColumn {
    pub asset: String,
    pub returns: Vec<f64>,
}

/// Period returns on the (trimmed) periodic axis. Every cell is defined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnSeries {
    pub dates: Vec<NaiveDate>,
    pub columns: Vec<ReturnColumn>,
}

impl ReturnSeries {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn column(&self, asset: &str) -> Option<&ReturnColumn> {
        self.columns.iter().find(|c| c.asset == asset)
    }
}

/// Investment strategy behind a trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Fixed contribution every period.
    Dca,
    /// Every planned contribution invested at period 0.
    LumpSum,
}

impl Strategy {
    /// Column suffix used when the table is flattened for export.
    pub fn suffix(&self) -> &'static str {
        match self {
            Strategy::Dca => "DCA",
            Strategy::LumpSum => "lump_sum_investment",
        }
    }
}

/// Portfolio value over time for one asset under one strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    pub asset: String,
    pub strategy: Strategy,
    pub values: Vec<f64>,
}

impl Trajectory {
    /// Flat column name, e.g. `SPY_DCA`.
    pub fn column_name(&self) -> String {
        format!("{}_{}", self.asset, self.strategy.suffix())
    }

    pub fn final_value(&self) -> Option<f64> {
        self.values.last().copied()
    }
}

/// Engine output: DCA and lump-sum trajectories for every asset.
///
/// Trajectories are ordered with all DCA trajectories first, then all
/// lump-sum trajectories, each group in asset order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioValueTable {
    pub dates: Vec<NaiveDate>,
    pub trajectories: Vec<Trajectory>,
}

impl PortfolioValueTable {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn trajectory(&self, asset: &str, strategy: Strategy) -> Option<&Trajectory> {
        self.trajectories
            .iter()
            .find(|t| t.asset == asset && t.strategy == strategy)
    }

    /// Distinct asset names in output order.
    pub fn assets(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for t in &self.trajectories {
            if !seen.contains(&t.asset.as_str()) {
                seen.push(t.asset.as_str());
            }
        }
        seen
    }

    pub fn column_names(&self) -> Vec<String> {
        self.trajectories.iter().map(Trajectory::column_name).collect()
    }

    /// Chart title: `Portfolio- <col>, <col>, ...`.
    pub fn title(&self) -> String {
        format!("Portfolio- {}", self.column_names().join(", "))
    }
}
