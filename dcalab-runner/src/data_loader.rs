//! Price loading and raw dataset assembly for the runner.
//!
//! Given a plan, loads every included asset and hands the results to the
//! engine's assembler. Fallback policy per asset:
//! 1. If a price file is configured → read it as CSV
//! 2. If not, and synthetic data is enabled → generate a tagged random walk
//! 3. Otherwise → skip the asset with a warning
//!
//! An asset that fails to load is excluded, never fatal here; the engine
//! reports an empty dataset if nothing survives.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use dcalab_core::data::{assemble, RawDataset};
use dcalab_core::domain::AssetSeries;
use dcalab_core::fingerprint::{dataset_hash, DatasetHash};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::{AssetSpec, PlanConfig};
use crate::source::{CsvSource, PriceSource, SourceError, SyntheticSource};

/// Options controlling how prices are loaded.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Generate synthetic prices for assets without a price file, over
    /// `(start, end)`. `None` disables the fallback.
    pub synthetic: Option<(NaiveDate, NaiveDate)>,
}

/// An asset left out of the run and why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedAsset {
    pub display_name: String,
    pub reason: String,
}

/// Result of loading, including provenance.
#[derive(Debug, Clone)]
pub struct LoadedData {
    pub raw: RawDataset,
    /// Source name per loaded asset (`csv`, `synthetic`, `constant`).
    pub sources: BTreeMap<String, String>,
    pub skipped: Vec<SkippedAsset>,
    pub dataset_hash: DatasetHash,
    /// Whether any asset used synthetic data.
    pub has_synthetic: bool,
}

/// Picks a source for each asset.
pub struct SourcePolicy {
    csv: CsvSource,
    synthetic: Option<SyntheticSource>,
}

impl SourcePolicy {
    pub fn new(opts: &LoadOptions) -> Self {
        Self {
            csv: CsvSource::new(),
            synthetic: opts
                .synthetic
                .map(|(start, end)| SyntheticSource::new(start, end)),
        }
    }

    /// The source that will serve `asset`.
    pub fn source_for(&self, asset: &AssetSpec) -> &dyn PriceSource {
        match (&asset.path, &self.synthetic) {
            (None, Some(synthetic)) => synthetic as &dyn PriceSource,
            _ => &self.csv as &dyn PriceSource,
        }
    }
}

/// Load every included asset of `plan` and assemble the raw dataset.
pub fn load_plan_data(plan: &PlanConfig, opts: &LoadOptions) -> LoadedData {
    let policy = SourcePolicy::new(opts);
    load_with(plan, |asset| {
        let source = policy.source_for(asset);
        source.load(asset).map(|s| (s, source.name().to_string()))
    })
}

/// Load using an arbitrary per-asset loader.
///
/// Used directly by tests with an in-memory loader.
pub fn load_with<F>(plan: &PlanConfig, mut load: F) -> LoadedData
where
    F: FnMut(&AssetSpec) -> Result<(AssetSeries, String), SourceError>,
{
    let mut series: Vec<(String, AssetSeries)> = Vec::new();
    let mut sources = BTreeMap::new();
    let mut skipped = Vec::new();

    for asset in &plan.assets {
        if !asset.include {
            continue;
        }
        match load(asset) {
            Ok((s, source)) => {
                sources.insert(asset.display_name.clone(), source);
                series.push((asset.display_name.clone(), s));
            }
            Err(e) => {
                warn!(asset = %asset.display_name, error = %e, "excluding asset that failed to load");
                skipped.push(SkippedAsset {
                    display_name: asset.display_name.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    let raw = assemble(series, plan.constant_name());
    if let Some(name) = raw.constant_name() {
        sources.insert(name.to_string(), "constant".to_string());
    }
    let has_synthetic = sources.values().any(|s| s == "synthetic");
    if has_synthetic {
        warn!("synthetic prices in use; results do not reflect real market data");
    }

    let dataset_hash = dataset_hash(&raw);
    info!(
        loaded = raw.len(),
        skipped = skipped.len(),
        hash = %dataset_hash,
        "loaded plan data"
    );

    LoadedData {
        raw,
        sources,
        skipped,
        dataset_hash,
        has_synthetic,
    }
}
