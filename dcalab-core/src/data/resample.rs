//! Periodic resampling of the daily aligned table.
//!
//! `day` is a pass-through. `month` and `year` emit one row per calendar
//! period, labelled with the period's last calendar day, holding the last
//! defined value observed inside that period.

use chrono::{Datelike, NaiveDate};
use tracing::debug;

use crate::domain::{AlignedDataset, Interval, PeriodicDataset, PriceColumn, PriceTable};
use crate::error::EngineError;

/// Resample `table` to the given cadence.
pub fn resample(table: &AlignedDataset, interval: Interval) -> PeriodicDataset {
    let out = match interval {
        Interval::Day => table.clone(),
        Interval::Month | Interval::Year => resample_periods(table, interval),
    };
    debug!(
        interval = %interval,
        rows_in = table.len(),
        rows_out = out.len(),
        "resampled"
    );
    out
}

/// Resample using an interval given by name, e.g. from a config file.
///
/// Fails with an unknown-interval configuration error before touching the table if the name is not
/// one of `day`, `month`, `year`.
pub fn resample_named(table: &AlignedDataset, interval: &str) -> Result<PeriodicDataset, EngineError> {
    let interval: Interval = interval.parse()?;
    Ok(resample(table, interval))
}

/// Last calendar day of the period containing `date`.
pub fn period_end(date: NaiveDate, interval: Interval) -> NaiveDate {
    match interval {
        Interval::Day => date,
        Interval::Month => {
            let (y, m) = if date.month() == 12 {
                (date.year() + 1, 1)
            } else {
                (date.year(), date.month() + 1)
            };
            first_of_month(y, m).pred_opt().unwrap_or(date)
        }
        Interval::Year => NaiveDate::from_ymd_opt(date.year(), 12, 31).unwrap_or(date),
    }
}

fn first_of_month(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MAX)
}

/// Every period end from the period of `first` through the period of `last`.
fn period_ends(first: NaiveDate, last: NaiveDate, interval: Interval) -> Vec<NaiveDate> {
    let stop = period_end(last, interval);
    let mut ends = Vec::new();
    let mut end = period_end(first, interval);
    while end <= stop {
        ends.push(end);
        match end.succ_opt() {
            Some(next) => end = period_end(next, interval),
            None => break,
        }
    }
    ends
}

fn resample_periods(table: &AlignedDataset, interval: Interval) -> PeriodicDataset {
    let (first, last) = match (table.dates.first(), table.dates.last()) {
        (Some(f), Some(l)) => (*f, *l),
        _ => {
            return PriceTable {
                dates: Vec::new(),
                columns: table
                    .columns
                    .iter()
                    .map(|c| PriceColumn { asset: c.asset.clone(), values: Vec::new() })
                    .collect(),
            }
        }
    };

    let ends = period_ends(first, last, interval);

    // Row ranges [start, stop) of the source table falling in each period.
    let mut ranges = Vec::with_capacity(ends.len());
    let mut cursor = 0;
    for end in &ends {
        let start = cursor;
        while cursor < table.dates.len() && table.dates[cursor] <= *end {
            cursor += 1;
        }
        ranges.push(start..cursor);
    }

    let columns = table
        .columns
        .iter()
        .map(|column| PriceColumn {
            asset: column.asset.clone(),
            values: ranges
                .iter()
                .map(|range| column.values[range.clone()].iter().rev().find_map(|v| *v))
                .collect(),
        })
        .collect();

    PriceTable {
        dates: ends,
        columns,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    /// Daily table from `start` with one value per day.
    fn daily(start: &str, values: Vec<Option<f64>>) -> AlignedDataset {
        let start = d(start);
        let dates: Vec<NaiveDate> = start.iter_days().take(values.len()).collect();
        PriceTable {
            dates,
            columns: vec![PriceColumn { asset: "A".into(), values }],
        }
    }

    #[test]
    fn day_is_identity() {
        let table = daily("2024-01-30", vec![None, Some(1.0), Some(2.0)]);
        assert_eq!(resample(&table, Interval::Day), table);
    }

    #[test]
    fn month_takes_last_value_and_month_end_label() {
        // 2024-01-30 .. 2024-02-02
        let table = daily("2024-01-30", vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)]);
        let monthly = resample(&table, Interval::Month);
        assert_eq!(monthly.dates, vec![d("2024-01-31"), d("2024-02-29")]);
        assert_eq!(monthly.columns[0].values, vec![Some(2.0), Some(4.0)]);
    }

    #[test]
    fn month_before_first_observation_is_undefined() {
        let table = daily("2024-01-30", vec![None, None, Some(3.0)]);
        let monthly = resample(&table, Interval::Month);
        assert_eq!(monthly.columns[0].values, vec![None, Some(3.0)]);
    }

    #[test]
    fn december_rolls_into_next_year() {
        let table = daily("2023-12-31", vec![Some(1.0), Some(2.0)]);
        let monthly = resample(&table, Interval::Month);
        assert_eq!(monthly.dates, vec![d("2023-12-31"), d("2024-01-31")]);
    }

    #[test]
    fn year_labels_december_31() {
        let table = daily("2022-12-30", vec![Some(1.0), Some(2.0), Some(3.0)]);
        let yearly = resample(&table, Interval::Year);
        assert_eq!(yearly.dates, vec![d("2022-12-31"), d("2023-12-31")]);
        assert_eq!(yearly.columns[0].values, vec![Some(2.0), Some(3.0)]);
    }

    #[test]
    fn unknown_interval_name_is_rejected() {
        let table = daily("2024-01-01", vec![Some(1.0)]);
        let err = resample_named(&table, "weekly").unwrap_err();
        assert!(matches!(
            err,
            EngineError::InvalidConfiguration(crate::error::ConfigurationError::UnknownInterval(ref name))
                if name == "weekly"
        ));
        assert!(err.is_invalid_configuration());
    }

    #[test]
    fn period_end_handles_leap_february() {
        assert_eq!(period_end(d("2024-02-10"), Interval::Month), d("2024-02-29"));
        assert_eq!(period_end(d("2023-02-10"), Interval::Month), d("2023-02-28"));
    }
}
