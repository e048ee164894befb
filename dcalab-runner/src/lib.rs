//! DCA Lab Runner: plan files, price loading, run orchestration and export.
//!
//! This crate builds on `dcalab-core` to provide:
//! - TOML plan configuration
//! - CSV and synthetic price sources with per-asset skip-on-failure loading
//! - Plan runs with DCA vs lump-sum summaries
//! - CSV/Parquet value export and JSON run manifests

pub mod config;
pub mod data_loader;
pub mod export;
pub mod runner;
pub mod source;
pub mod summary;

pub use config::{AssetKind, AssetSpec, ConfigError, ConstantConfig, PlanConfig};
pub use data_loader::{load_plan_data, load_with, LoadOptions, LoadedData, SkippedAsset};
pub use export::{save_artifacts, ArtifactPaths, ExportFormat, RunManifest};
pub use runner::{run_plan, run_plan_from_data, PlanRun, RunError};
pub use source::{CsvSource, PriceSource, SourceError, SyntheticSource};
pub use summary::{AssetSummary, PlanSummary};
