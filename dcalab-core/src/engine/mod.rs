//! Simulation engine: portfolio value recurrences and the end-to-end pipeline.
//!
//! The engine consumes a raw dataset (from the acquisition layer) and an
//! investment plan, then runs five stages strictly in order:
//!
//! 1. Assemble: per-asset series plus the optional constant reference
//! 2. Align: contiguous daily calendar with forward-fill
//! 3. Resample: day / month / year cadence
//! 4. Returns: trimmed to the plan window, first row zero
//! 5. Simulate: DCA and lump-sum trajectories per asset

pub mod pipeline;
pub mod simulate;

pub use pipeline::{run_pipeline, run_pipeline_detailed, PipelineRun};
pub use simulate::{
    dca_trajectory, lump_sum_total, lump_sum_trajectory, simulate, simulate_sequential,
};
