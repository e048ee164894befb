//! Plan runner: loads prices for a plan and drives the engine pipeline.
//!
//! Two entry points:
//! - `run_plan()`: loads every asset through the source policy, then runs. Used by the CLI.
//! - `run_plan_from_data()`: takes already-loaded data. Used by tests and callers
//!   with their own loaders.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use dcalab_core::domain::{PortfolioValueTable, ResolvedWindow};
use dcalab_core::engine::run_pipeline_detailed;
use dcalab_core::fingerprint::DatasetHash;
use dcalab_core::EngineError;

use crate::config::{ConfigError, PlanConfig};
use crate::data_loader::{load_plan_data, LoadOptions, LoadedData, SkippedAsset};
use crate::summary::PlanSummary;

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
}

impl RunError {
    /// True when the plan itself is wrong, as opposed to its data.
    pub fn is_configuration(&self) -> bool {
        match self {
            RunError::Config(_) => true,
            RunError::Engine(e) => e.is_invalid_configuration(),
        }
    }
}

/// Complete result of one plan run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanRun {
    pub plan: PlanConfig,
    pub window: ResolvedWindow,
    pub values: PortfolioValueTable,
    pub summary: PlanSummary,
    pub sources: BTreeMap<String, String>,
    pub skipped: Vec<SkippedAsset>,
    pub dataset_hash: DatasetHash,
    pub has_synthetic: bool,
}

/// Load a plan's prices and run it.
///
/// `today` resolves `date_to = "now"`.
pub fn run_plan(
    plan: &PlanConfig,
    opts: &LoadOptions,
    today: NaiveDate,
) -> Result<PlanRun, RunError> {
    plan.validate()?;
    let loaded = load_plan_data(plan, opts);
    run_plan_from_data(plan, loaded, today)
}

/// Run a plan over data that has already been loaded.
pub fn run_plan_from_data(
    plan: &PlanConfig,
    loaded: LoadedData,
    today: NaiveDate,
) -> Result<PlanRun, RunError> {
    let pipeline = run_pipeline_detailed(&loaded.raw, &plan.invest, today)?;
    let summary = PlanSummary::from_values(&pipeline.values, &plan.invest);

    info!(
        plan = %&plan.plan_id()[..12],
        periods = summary.periods,
        skipped = loaded.skipped.len(),
        "plan run complete"
    );

    Ok(PlanRun {
        plan: plan.clone(),
        window: pipeline.window,
        values: pipeline.values,
        summary,
        sources: loaded.sources,
        skipped: loaded.skipped,
        dataset_hash: loaded.dataset_hash,
        has_synthetic: loaded.has_synthetic,
    })
}
