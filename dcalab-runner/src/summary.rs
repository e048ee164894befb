//! Plan summary: how DCA compares with investing everything up front.

use dcalab_core::domain::{InvestmentConfig, PortfolioValueTable, Strategy};
use dcalab_core::engine::lump_sum_total;
use serde::{Deserialize, Serialize};

/// End-of-window comparison for one asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetSummary {
    pub asset: String,
    pub final_dca: f64,
    pub final_lump_sum: f64,
    /// `final_dca - final_lump_sum`; positive when DCA came out ahead.
    pub dca_minus_lump_sum: f64,
    /// Final DCA value over the amount contributed, minus one.
    pub dca_return: f64,
    pub lump_sum_return: f64,
}

/// Summary of a whole plan run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSummary {
    pub periods: usize,
    /// Money put in over the window (identical for both strategies).
    pub total_contributed: f64,
    pub assets: Vec<AssetSummary>,
}

impl PlanSummary {
    pub fn from_values(values: &PortfolioValueTable, config: &InvestmentConfig) -> Self {
        let periods = values.len();
        let total_contributed = if periods == 0 {
            0.0
        } else {
            lump_sum_total(periods, config.initial_lump, config.continuous_investment)
        };

        let growth = |v: f64| {
            if total_contributed != 0.0 {
                v / total_contributed - 1.0
            } else {
                0.0
            }
        };

        let assets = values
            .assets()
            .into_iter()
            .filter_map(|asset| {
                let dca = values.trajectory(asset, Strategy::Dca)?.final_value()?;
                let lump = values.trajectory(asset, Strategy::LumpSum)?.final_value()?;
                Some(AssetSummary {
                    asset: asset.to_string(),
                    final_dca: dca,
                    final_lump_sum: lump,
                    dca_minus_lump_sum: dca - lump,
                    dca_return: growth(dca),
                    lump_sum_return: growth(lump),
                })
            })
            .collect();

        Self {
            periods,
            total_contributed,
            assets,
        }
    }
}
