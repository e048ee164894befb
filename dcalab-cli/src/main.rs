//! DCA Lab CLI: simulate and validate investment plans.
//!
//! Commands:
//! - `simulate`: run a TOML plan, print the DCA vs lump-sum summary, save artifacts
//! - `validate`: parse a plan and report what a run would use

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use dcalab_runner::{
    run_plan, save_artifacts, ExportFormat, LoadOptions, PlanConfig, PlanRun,
};

#[derive(Parser)]
#[command(
    name = "dcalab",
    about = "DCA Lab CLI: dollar-cost averaging vs lump-sum simulator"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Csv,
    Parquet,
}

impl From<Format> for ExportFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Csv => ExportFormat::Csv,
            Format::Parquet => ExportFormat::Parquet,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run a plan and save the value table plus a manifest.
    Simulate {
        /// Path to a TOML plan file.
        #[arg(long)]
        config: PathBuf,

        /// Output directory for artifacts.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,

        /// File format for the value table.
        #[arg(long, value_enum, default_value_t = Format::Csv)]
        format: Format,

        /// Generate synthetic prices for assets without a price file.
        #[arg(long, default_value_t = false)]
        synthetic: bool,

        /// Date used for `date_to = "now"` (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        today: Option<String>,

        /// Print the summary as JSON instead of a table.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Parse a plan and check its window and price files without running it.
    Validate {
        /// Path to a TOML plan file.
        #[arg(long)]
        config: PathBuf,

        /// Date used for `date_to = "now"` (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        today: Option<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "dcalab=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate {
            config,
            output_dir,
            format,
            synthetic,
            today,
            json,
        } => run_simulate(&config, &output_dir, format.into(), synthetic, today, json),
        Commands::Validate { config, today } => run_validate(&config, today),
    }
}

fn parse_today(today: Option<String>) -> Result<NaiveDate> {
    match today {
        Some(s) => NaiveDate::parse_from_str(&s, "%Y-%m-%d")
            .with_context(|| format!("invalid --today '{s}' (expected YYYY-MM-DD)")),
        None => Ok(chrono::Local::now().date_naive()),
    }
}

fn run_simulate(
    config_path: &Path,
    output_dir: &Path,
    format: ExportFormat,
    synthetic: bool,
    today: Option<String>,
    json: bool,
) -> Result<()> {
    let today = parse_today(today)?;
    let plan = PlanConfig::from_file(config_path)?;
    info!(
        config = %config_path.display(),
        %today,
        synthetic,
        assets = plan.included_assets().count(),
        "simulating plan"
    );

    let opts = if synthetic {
        let window = plan.invest.resolve(today)?;
        LoadOptions {
            synthetic: Some((window.date_from, window.date_to)),
        }
    } else {
        LoadOptions::default()
    };

    let run = run_plan(&plan, &opts, today)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&run.summary)?);
    } else {
        print_summary(&run);
    }

    let paths = save_artifacts(&run, output_dir, format)?;
    info!(
        values = %paths.values.display(),
        manifest = %paths.manifest.display(),
        "wrote run artifacts"
    );
    println!("Artifacts saved to: {}", paths.run_dir.display());

    Ok(())
}

fn run_validate(config_path: &Path, today: Option<String>) -> Result<()> {
    let today = parse_today(today)?;
    let plan = PlanConfig::from_file(config_path)?;
    let window = plan.invest.resolve(today)?;

    println!("Plan:      {}", &plan.plan_id()[..12]);
    println!("Interval:  {}", plan.invest.interval);
    println!("Window:    {} to {}", window.date_from, window.date_to);
    if let Some(name) = plan.constant_name() {
        println!("Constant:  {name}");
    }

    let mut missing = 0;
    for asset in plan.included_assets() {
        let status = match &asset.path {
            Some(p) if p.exists() => "ok".to_string(),
            Some(p) => {
                missing += 1;
                warn!(asset = %asset.display_name, path = %p.display(), "price file not found");
                format!("missing file {}", p.display())
            }
            None => "no price file (needs --synthetic)".to_string(),
        };
        println!("  {:<20} {:<12} {status}", asset.display_name, asset.symbol);
    }

    if missing > 0 {
        bail!("{missing} price file(s) not found");
    }
    println!("OK");
    Ok(())
}

fn print_summary(run: &PlanRun) {
    println!();
    println!("=== {} ===", run.values.title());
    println!(
        "Window:      {} to {} ({})",
        run.window.date_from, run.window.date_to, run.plan.invest.interval
    );
    println!("Periods:     {}", run.summary.periods);
    println!("Contributed: {:.2}", run.summary.total_contributed);
    if run.has_synthetic {
        println!("WARNING: synthetic prices in use");
    }
    for skipped in &run.skipped {
        println!("Skipped:     {} ({})", skipped.display_name, skipped.reason);
    }

    if run.summary.assets.is_empty() {
        println!("No periods fall inside the window.");
        return;
    }

    println!();
    println!(
        "{:<20} {:>14} {:>14} {:>12} {:>9} {:>9}",
        "Asset", "DCA", "Lump sum", "DCA - LS", "DCA %", "LS %"
    );
    println!("{}", "-".repeat(83));
    for a in &run.summary.assets {
        println!(
            "{:<20} {:>14.2} {:>14.2} {:>12.2} {:>8.2}% {:>8.2}%",
            a.asset,
            a.final_dca,
            a.final_lump_sum,
            a.dca_minus_lump_sum,
            a.dca_return * 100.0,
            a.lump_sum_return * 100.0
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAN: &str = r#"
[invest]
initial_lump = 100.0
continuous_investment = 10.0
interval = "month"
date_from = "2024-01-01"
date_to = "now"

[[assets]]
display_name = "Fund"
symbol = "FUND"
kind = "ticker"
path = "fund.csv"
"#;

    #[test]
    fn today_flag_parses_iso_dates() {
        assert_eq!(
            parse_today(Some("2024-02-29".into())).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
        assert!(parse_today(Some("29/02/2024".into())).is_err());
    }

    #[test]
    fn validate_reports_missing_price_files() {
        let dir = tempfile::tempdir().unwrap();
        let plan = dir.path().join("plan.toml");
        std::fs::write(&plan, PLAN).unwrap();

        let err = run_validate(&plan, Some("2024-06-01".into())).unwrap_err();
        assert!(err.to_string().contains("1 price file(s) not found"));

        std::fs::write(dir.path().join("fund.csv"), "date,price\n2024-01-02,1\n").unwrap();
        run_validate(&plan, Some("2024-06-01".into())).unwrap();
    }

    #[test]
    fn simulate_writes_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let plan = dir.path().join("plan.toml");
        std::fs::write(&plan, PLAN).unwrap();
        std::fs::write(
            dir.path().join("fund.csv"),
            "date,price\n2024-01-02,100\n2024-02-01,110\n",
        )
        .unwrap();

        let out = dir.path().join("out");
        run_simulate(&plan, &out, ExportFormat::Csv, false, Some("2024-03-15".into()), true)
            .unwrap();
        let run_dir = std::fs::read_dir(&out).unwrap().next().unwrap().unwrap().path();
        assert!(run_dir.join("values.csv").exists());
        assert!(run_dir.join("manifest.json").exists());
    }
}
