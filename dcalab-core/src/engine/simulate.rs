//! Portfolio value recurrences.
//!
//! DCA:      V[0] = lump,  V[i] = V[i-1] * (1 + r[i]) + contribution
//! Lump sum: V[0] = lump + contribution * (n - 1),  V[i] = V[i-1] * (1 + r[i])
//!
//! Both are evaluated as a literal left-to-right scan so floating-point
//! rounding accumulates exactly as the step-by-step recurrence does. `r[0]`
//! is never read: period 0 is the starting balance.

use rayon::prelude::*;
use tracing::debug;

use crate::domain::{InvestmentConfig, PortfolioValueTable, ReturnSeries, Strategy, Trajectory};

/// Running balance with a fixed contribution after every period's growth.
pub fn dca_trajectory(returns: &[f64], initial_lump: f64, contribution: f64) -> Vec<f64> {
    if returns.is_empty() {
        return Vec::new();
    }
    std::iter::once(initial_lump)
        .chain(returns.iter().skip(1).scan(initial_lump, |value, r| {
            *value = *value * (1.0 + r) + contribution;
            Some(*value)
        }))
        .collect()
}

/// Sum invested up front by the lump-sum counterfactual over `periods` periods.
pub fn lump_sum_total(periods: usize, initial_lump: f64, contribution: f64) -> f64 {
    let later_periods = periods.saturating_sub(1);
    initial_lump + contribution * later_periods as f64
}

/// Balance when every planned contribution is invested at period 0.
pub fn lump_sum_trajectory(returns: &[f64], initial_lump: f64, contribution: f64) -> Vec<f64> {
    if returns.is_empty() {
        return Vec::new();
    }
    let total = lump_sum_total(returns.len(), initial_lump, contribution);
    std::iter::once(total)
        .chain(returns.iter().skip(1).scan(total, |value, r| {
            *value *= 1.0 + r;
            Some(*value)
        }))
        .collect()
}

/// Both trajectories for one asset's return column.
fn asset_trajectories(asset: &str, returns: &[f64], config: &InvestmentConfig) -> (Trajectory, Trajectory) {
    let dca = Trajectory {
        asset: asset.to_string(),
        strategy: Strategy::Dca,
        values: dca_trajectory(returns, config.initial_lump, config.continuous_investment),
    };
    let lump = Trajectory {
        asset: asset.to_string(),
        strategy: Strategy::LumpSum,
        values: lump_sum_trajectory(returns, config.initial_lump, config.continuous_investment),
    };
    (dca, lump)
}

fn into_table(returns: &ReturnSeries, pairs: Vec<(Trajectory, Trajectory)>) -> PortfolioValueTable {
    let (dca, lump): (Vec<Trajectory>, Vec<Trajectory>) = pairs.into_iter().unzip();
    PortfolioValueTable {
        dates: returns.dates.clone(),
        trajectories: dca.into_iter().chain(lump).collect(),
    }
}

/// Simulate every asset column one after another.
pub fn simulate_sequential(returns: &ReturnSeries, config: &InvestmentConfig) -> PortfolioValueTable {
    let pairs = returns
        .columns
        .iter()
        .map(|c| asset_trajectories(&c.asset, &c.returns, config))
        .collect();
    into_table(returns, pairs)
}

/// Simulate asset columns in parallel.
///
/// Columns share no state, and the collect preserves column order, so the
/// output is identical to [`simulate_sequential`].
pub fn simulate(returns: &ReturnSeries, config: &InvestmentConfig) -> PortfolioValueTable {
    let pairs: Vec<(Trajectory, Trajectory)> = returns
        .columns
        .par_iter()
        .map(|c| asset_trajectories(&c.asset, &c.returns, config))
        .collect();
    debug!(
        assets = pairs.len(),
        periods = returns.len(),
        "simulated DCA and lump-sum trajectories"
    );
    into_table(returns, pairs)
}
