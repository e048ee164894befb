//! Portfolio value export (CSV/Parquet) and run manifests.
//!
//! The flat layout is one `date` column followed by `<asset>_DCA` columns and
//! then `<asset>_lump_sum_investment` columns.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use dcalab_core::domain::{PortfolioValueTable, ResolvedWindow};
use dcalab_core::fingerprint::DatasetHash;
use polars::prelude::{Column, DataFrame, NamedFrom, ParquetWriter, Series};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

use crate::config::PlanConfig;
use crate::data_loader::SkippedAsset;
use crate::runner::PlanRun;
use crate::summary::PlanSummary;

/// Current schema version for persisted manifests.
pub const SCHEMA_VERSION: u32 = 1;

/// Output file format for the value table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Parquet,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Parquet => "parquet",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "csv" => Ok(ExportFormat::Csv),
            "parquet" => Ok(ExportFormat::Parquet),
            other => bail!("unknown export format '{other}' (expected csv or parquet)"),
        }
    }
}

/// Everything needed to reproduce or audit a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub plan_id: String,
    pub title: String,
    pub plan: PlanConfig,
    pub window: ResolvedWindow,
    pub dataset_hash: DatasetHash,
    pub sources: BTreeMap<String, String>,
    pub skipped: Vec<SkippedAsset>,
    pub columns: Vec<String>,
    pub has_synthetic: bool,
    pub summary: PlanSummary,
    pub generated_at: DateTime<Utc>,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl RunManifest {
    pub fn from_run(run: &PlanRun) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            plan_id: run.plan.plan_id(),
            title: run.values.title(),
            plan: run.plan.clone(),
            window: run.window,
            dataset_hash: run.dataset_hash.clone(),
            sources: run.sources.clone(),
            skipped: run.skipped.clone(),
            columns: run.values.column_names(),
            has_synthetic: run.has_synthetic,
            summary: run.summary.clone(),
            generated_at: Utc::now(),
        }
    }
}

pub fn write_values_csv(path: &Path, values: &PortfolioValueTable) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create values CSV {}", path.display()))?;

    let mut header = vec!["date".to_string()];
    header.extend(values.column_names());
    writer.write_record(&header)?;

    for (i, date) in values.dates.iter().enumerate() {
        let mut row = Vec::with_capacity(values.trajectories.len() + 1);
        row.push(date.to_string());
        row.extend(values.trajectories.iter().map(|t| t.values[i].to_string()));
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Build the flat polars frame for the value table.
pub fn values_to_dataframe(values: &PortfolioValueTable) -> Result<DataFrame> {
    let dates: Vec<String> = values.dates.iter().map(|d| d.to_string()).collect();
    let mut columns: Vec<Column> = vec![Series::new("date".into(), dates).into()];
    for t in &values.trajectories {
        columns.push(Series::new(t.column_name().as_str().into(), t.values.clone()).into());
    }
    DataFrame::new(columns).context("Failed to build values dataframe")
}

pub fn write_values_parquet(path: &Path, values: &PortfolioValueTable) -> Result<()> {
    let mut df = values_to_dataframe(values)?;
    let mut file = File::create(path)
        .with_context(|| format!("Failed to create values parquet {}", path.display()))?;
    ParquetWriter::new(&mut file)
        .finish(&mut df)
        .context("Failed to write values parquet")?;
    Ok(())
}

pub fn write_manifest(path: &Path, manifest: &RunManifest) -> Result<()> {
    let json =
        serde_json::to_string_pretty(manifest).context("Failed to serialize run manifest")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write manifest to {}", path.display()))?;
    Ok(())
}

/// Paths written by [`save_artifacts`].
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub run_dir: PathBuf,
    pub values: PathBuf,
    pub manifest: PathBuf,
}

/// Write the value table and manifest under `output_dir/<plan id prefix>/`.
pub fn save_artifacts(run: &PlanRun, output_dir: &Path, format: ExportFormat) -> Result<ArtifactPaths> {
    let manifest = RunManifest::from_run(run);
    let run_dir = output_dir.join(&manifest.plan_id[..12]);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("Failed to create output dir {}", run_dir.display()))?;

    let values_path = run_dir.join(format!("values.{}", format.extension()));
    match format {
        ExportFormat::Csv => write_values_csv(&values_path, &run.values)?,
        ExportFormat::Parquet => write_values_parquet(&values_path, &run.values)?,
    }

    let manifest_path = run_dir.join("manifest.json");
    write_manifest(&manifest_path, &manifest)?;

    info!(dir = %run_dir.display(), format = format.extension(), "saved run artifacts");
    Ok(ArtifactPaths {
        run_dir,
        values: values_path,
        manifest: manifest_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use dcalab_core::domain::{Strategy, Trajectory};

    fn table() -> PortfolioValueTable {
        PortfolioValueTable {
            dates: vec![
                NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
                NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(),
            ],
            trajectories: vec![
                Trajectory { asset: "SPY".into(), strategy: Strategy::Dca, values: vec![100.0, 120.5] },
                Trajectory { asset: "SPY".into(), strategy: Strategy::LumpSum, values: vec![110.0, 121.0] },
            ],
        }
    }

    #[test]
    fn csv_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("values.csv");
        write_values_csv(&path, &table()).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "date,SPY_DCA,SPY_lump_sum_investment");
        assert_eq!(lines[1], "2024-01-31,100,110");
        assert_eq!(lines[2], "2024-02-29,120.5,121");
    }

    #[test]
    fn dataframe_has_one_column_per_trajectory() {
        let df = values_to_dataframe(&table()).unwrap();
        assert_eq!(df.width(), 3);
        assert_eq!(df.height(), 2);
    }

    #[test]
    fn parquet_file_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("values.parquet");
        write_values_parquet(&path, &table()).unwrap();
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn format_parsing() {
        assert_eq!("csv".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert!("xlsx".parse::<ExportFormat>().is_err());
    }
}
