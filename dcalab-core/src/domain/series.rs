//! AssetSeries: one asset's daily price history.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// A single dated price observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, price: f64) -> Self {
        Self { date, price }
    }
}

/// An asset's price history: dates strictly increasing, prices finite and non-negative.
///
/// The series may start later than other assets and may have gaps; the aligner
/// is responsible for putting it on a contiguous calendar.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetSeries {
    points: Vec<PricePoint>,
}

impl AssetSeries {
    /// Build a series from points that are already in date order.
    ///
    /// `asset` is only used to label the error.
    pub fn new(asset: &str, points: Vec<PricePoint>) -> Result<Self, EngineError> {
        for point in &points {
            if !point.price.is_finite() || point.price < 0.0 {
                return Err(EngineError::InvalidSeries {
                    asset: asset.to_string(),
                    reason: format!("price {} on {} is not a non-negative number", point.price, point.date),
                });
            }
        }
        for pair in points.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(EngineError::InvalidSeries {
                    asset: asset.to_string(),
                    reason: format!(
                        "dates not strictly increasing ({} followed by {})",
                        pair[0].date, pair[1].date
                    ),
                });
            }
        }
        Ok(Self { points })
    }

    /// Build a series from points in any order.
    ///
    /// Points are sorted by date; when a date appears more than once the last
    /// occurrence in input order wins.
    pub fn from_unordered(asset: &str, mut points: Vec<PricePoint>) -> Result<Self, EngineError> {
        // Stable sort keeps input order within a date, so the final entry of
        // each run is the latest observation.
        points.sort_by_key(|p| p.date);
        let mut deduped: Vec<PricePoint> = Vec::with_capacity(points.len());
        for point in points {
            match deduped.last_mut() {
                Some(last) if last.date == point.date => *last = point,
                _ => deduped.push(point),
            }
        }
        Self::new(asset, deduped)
    }

    /// A flat series holding `value` on every given date.
    pub fn constant<I>(dates: I, value: f64) -> Self
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        let mut dates: Vec<NaiveDate> = dates.into_iter().collect();
        dates.sort();
        dates.dedup();
        Self {
            points: dates.into_iter().map(|d| PricePoint::new(d, value)).collect(),
        }
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.points.iter().map(|p| p.date)
    }
}
