//! End-to-end tests for the simulation pipeline.
//!
//! Builds a small mixed universe (a weekday-only equity, a 7-day crypto that
//! starts later, and the constant reference) and checks every stage.

use chrono::{Datelike, NaiveDate, Weekday};

use dcalab_core::data::{align, assemble, resample, RawDataset};
use dcalab_core::domain::{
    AssetSeries, DateBound, Interval, InvestmentConfig, PricePoint, Strategy,
};
use dcalab_core::engine::{run_pipeline, run_pipeline_detailed};
use dcalab_core::{ConfigurationError, EngineError};

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// Weekday closes rising by 1.0 per trading day from 100.0.
fn equity(from: &str, to: &str) -> AssetSeries {
    let mut price = 100.0;
    let points = d(from)
        .iter_days()
        .take_while(|day| *day <= d(to))
        .filter(|day| !matches!(day.weekday(), Weekday::Sat | Weekday::Sun))
        .map(|day| {
            price += 1.0;
            PricePoint::new(day, price)
        })
        .collect();
    AssetSeries::new("equity", points).unwrap()
}

/// Every calendar day, doubling at the start of each month.
fn crypto(from: &str, to: &str) -> AssetSeries {
    let points = d(from)
        .iter_days()
        .take_while(|day| *day <= d(to))
        .map(|day| PricePoint::new(day, 2f64.powi(day.month() as i32)))
        .collect();
    AssetSeries::new("crypto", points).unwrap()
}

fn universe() -> RawDataset {
    assemble(
        vec![
            ("Stocks".to_string(), equity("2023-01-02", "2023-06-30")),
            ("Coin".to_string(), crypto("2023-03-01", "2023-06-30")),
        ],
        Some("Constant"),
    )
}

fn plan(interval: Interval, from: &str, to: &str) -> InvestmentConfig {
    InvestmentConfig {
        initial_lump: 1000.0,
        continuous_investment: 100.0,
        interval,
        date_from: d(from),
        date_to: DateBound::Date(d(to)),
    }
}

#[test]
fn weekend_gaps_are_forward_filled() {
    let aligned = align(&universe()).unwrap();
    let stocks = aligned.column("Stocks").unwrap();
    // 2023-01-06 is a Friday; Saturday and Sunday carry its close.
    let friday = aligned.dates.iter().position(|day| *day == d("2023-01-06")).unwrap();
    assert_eq!(stocks.values[friday], stocks.values[friday + 1]);
    assert_eq!(stocks.values[friday], stocks.values[friday + 2]);
    assert_ne!(stocks.values[friday], stocks.values[friday + 3]);
}

#[test]
fn late_starting_asset_is_undefined_before_first_observation() {
    let aligned = align(&universe()).unwrap();
    let coin = aligned.column("Coin").unwrap();
    let start = aligned.dates.iter().position(|day| *day == d("2023-03-01")).unwrap();
    assert!(coin.values[..start].iter().all(Option::is_none));
    assert!(coin.values[start..].iter().all(Option::is_some));

    let monthly = resample(&aligned, Interval::Month);
    assert_eq!(
        monthly.column("Coin").unwrap().values,
        vec![None, None, Some(8.0), Some(16.0), Some(32.0), Some(64.0)]
    );
}

#[test]
fn monthly_plan_doubling_asset() {
    let run = run_pipeline_detailed(
        &universe(),
        &plan(Interval::Month, "2023-01-01", "2023-06-30"),
        d("2024-01-01"),
    )
    .unwrap();

    assert_eq!(run.values.len(), 6);

    // Jan and Feb have no Coin data: zero returns; then Mar is compared
    // against an undefined Feb, also zero; Apr..Jun double.
    let coin_returns = &run.returns.column("Coin").unwrap().returns;
    assert_eq!(coin_returns, &vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0]);

    let dca = &run.values.trajectory("Coin", Strategy::Dca).unwrap().values;
    assert_eq!(dca, &vec![1000.0, 1100.0, 1200.0, 2500.0, 5100.0, 10300.0]);

    let lump = &run.values.trajectory("Coin", Strategy::LumpSum).unwrap().values;
    assert_eq!(lump, &vec![1500.0, 1500.0, 1500.0, 3000.0, 6000.0, 12000.0]);

    let constant = &run.values.trajectory("Constant", Strategy::Dca).unwrap().values;
    assert_eq!(constant, &vec![1000.0, 1100.0, 1200.0, 1300.0, 1400.0, 1500.0]);
}

#[test]
fn window_start_resets_baseline() {
    // Starting in April: the March→April doubling happens before the window.
    let values = run_pipeline(
        &universe(),
        &plan(Interval::Month, "2023-04-01", "2023-06-30"),
        d("2024-01-01"),
    )
    .unwrap();
    assert_eq!(values.dates, vec![d("2023-04-30"), d("2023-05-31"), d("2023-06-30")]);
    let dca = &values.trajectory("Coin", Strategy::Dca).unwrap().values;
    assert_eq!(dca, &vec![1000.0, 2100.0, 4300.0]);
}

#[test]
fn yearly_plan_has_one_row() {
    let values = run_pipeline(
        &universe(),
        &plan(Interval::Year, "2023-01-01", "2023-12-31"),
        d("2024-01-01"),
    )
    .unwrap();
    assert_eq!(values.dates, vec![d("2023-12-31")]);
    // A single period: both strategies hold just the initial lump.
    for t in &values.trajectories {
        assert_eq!(t.values, vec![1000.0], "{}", t.column_name());
    }
}

#[test]
fn window_outside_data_gives_empty_table() {
    let values = run_pipeline(
        &universe(),
        &plan(Interval::Day, "2030-01-01", "2030-12-31"),
        d("2031-01-01"),
    )
    .unwrap();
    assert!(values.is_empty());
    assert!(values.trajectories.iter().all(|t| t.values.is_empty()));
    assert_eq!(values.trajectories.len(), 6);
}

#[test]
fn configuration_errors_take_precedence() {
    let mut config = plan(Interval::Day, "2023-06-01", "2023-01-01");
    let err = run_pipeline(&universe(), &config, d("2024-01-01")).unwrap_err();
    assert!(matches!(
        err,
        EngineError::InvalidConfiguration(ConfigurationError::InvertedWindow { .. })
    ));

    config = plan(Interval::Day, "2023-01-01", "2023-06-01");
    config.initial_lump = f64::NAN;
    let err = run_pipeline(&universe(), &config, d("2024-01-01")).unwrap_err();
    assert!(err.is_invalid_configuration());
}
