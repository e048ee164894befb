//! Multi-asset time alignment.
//!
//! Every asset is placed on one contiguous daily calendar running from the
//! earliest to the latest observation across the dataset. Gaps after an
//! asset's first observation are forward-filled; days before it stay `None`.

use chrono::NaiveDate;
use tracing::debug;

use super::assemble::RawDataset;
use crate::domain::{AlignedDataset, AssetSeries, PriceColumn, PriceTable};
use crate::error::EngineError;

/// Build the contiguous daily date axis covering every series.
pub fn date_axis(raw: &RawDataset) -> Result<Vec<NaiveDate>, EngineError> {
    if raw.is_empty() {
        return Err(EngineError::EmptyInput("raw dataset contains no asset series".into()));
    }

    let mut start: Option<NaiveDate> = None;
    let mut end: Option<NaiveDate> = None;
    for entry in raw.entries() {
        let (first, last) = match (entry.series.first_date(), entry.series.last_date()) {
            (Some(first), Some(last)) => (first, last),
            _ => {
                return Err(EngineError::EmptyInput(format!(
                    "asset '{}' has no observations",
                    entry.name
                )))
            }
        };
        start = Some(start.map_or(first, |s| s.min(first)));
        end = Some(end.map_or(last, |e| e.max(last)));
    }

    // Both are set: the dataset is non-empty and every series had dates.
    let (start, end) = match (start, end) {
        (Some(s), Some(e)) => (s, e),
        _ => return Err(EngineError::EmptyInput("no observation dates".into())),
    };

    Ok(start.iter_days().take_while(|d| *d <= end).collect())
}

/// Align every asset in `raw` onto the shared daily axis.
pub fn align(raw: &RawDataset) -> Result<AlignedDataset, EngineError> {
    let dates = date_axis(raw)?;

    let columns: Vec<PriceColumn> = raw
        .entries()
        .iter()
        .map(|entry| PriceColumn {
            asset: entry.name.clone(),
            values: forward_fill(&entry.series, &dates),
        })
        .collect();

    debug!(
        days = dates.len(),
        assets = columns.len(),
        "aligned raw dataset onto daily axis"
    );

    Ok(PriceTable { dates, columns })
}

/// Reindex one series onto `axis`, carrying the last observation forward.
fn forward_fill(series: &AssetSeries, axis: &[NaiveDate]) -> Vec<Option<f64>> {
    let points = series.points();
    let mut next = 0;
    let mut current: Option<f64> = None;

    axis.iter()
        .map(|date| {
            while next < points.len() && points[next].date <= *date {
                current = Some(points[next].price);
                next += 1;
            }
            current
        })
        .collect()
}
