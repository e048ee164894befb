//! End-to-end engine pipeline.
//!
//! raw dataset → align → resample → trim to window → returns → simulate.
//! Each stage reads only the previous stage's output.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::simulate::simulate;
use crate::data::{align, resample, window_returns, RawDataset};
use crate::domain::{
    AlignedDataset, InvestmentConfig, PeriodicDataset, PortfolioValueTable, ResolvedWindow,
    ReturnSeries,
};
use crate::error::EngineError;

/// Every intermediate table of one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineRun {
    pub window: ResolvedWindow,
    pub aligned: AlignedDataset,
    pub periodic: PeriodicDataset,
    pub returns: ReturnSeries,
    pub values: PortfolioValueTable,
}

/// Run the pipeline and keep every stage's output.
///
/// `today` resolves `date_to = "now"`. Configuration is checked before any
/// data is touched.
pub fn run_pipeline_detailed(
    raw: &RawDataset,
    config: &InvestmentConfig,
    today: NaiveDate,
) -> Result<PipelineRun, EngineError> {
    let window = config.resolve(today)?;

    let aligned = align(raw)?;
    let periodic = resample(&aligned, config.interval);
    let returns = window_returns(&periodic, &window);
    let values = simulate(&returns, config);

    info!(
        assets = raw.len(),
        interval = %config.interval,
        from = %window.date_from,
        to = %window.date_to,
        periods = values.len(),
        "portfolio simulation complete"
    );

    Ok(PipelineRun {
        window,
        aligned,
        periodic,
        returns,
        values,
    })
}

/// Run the pipeline, returning only the portfolio value table.
pub fn run_pipeline(
    raw: &RawDataset,
    config: &InvestmentConfig,
    today: NaiveDate,
) -> Result<PortfolioValueTable, EngineError> {
    run_pipeline_detailed(raw, config, today).map(|run| run.values)
}
