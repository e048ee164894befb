//! Raw dataset assembly.
//!
//! Collects per-asset series handed over by the acquisition layer into one
//! `RawDataset`, optionally adding a flat "constant" reference asset.
//! Nothing here fails: an asset that could not be fetched is simply absent.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::AssetSeries;

/// Value held by the constant reference series.
pub const CONSTANT_VALUE: f64 = 1.0;

/// A display name paired with its price history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedSeries {
    pub name: String,
    pub series: AssetSeries,
}

/// Per-asset price histories keyed by unique display name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDataset {
    entries: Vec<NamedSeries>,
    constant: Option<String>,
}

impl RawDataset {
    pub fn entries(&self) -> &[NamedSeries] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&AssetSeries> {
        self.entries.iter().find(|e| e.name == name).map(|e| &e.series)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    /// Display name of the injected constant series, if any.
    pub fn constant_name(&self) -> Option<&str> {
        self.constant.as_deref()
    }

    /// Union of every observation date across all assets.
    pub fn observed_dates(&self) -> BTreeSet<NaiveDate> {
        self.entries.iter().flat_map(|e| e.series.dates()).collect()
    }
}

/// Merge per-asset series into a `RawDataset`.
///
/// A repeated display name replaces the earlier series in place. When
/// `constant` is given, a series of [`CONSTANT_VALUE`] is placed first, defined
/// on the union of all other assets' observation dates. A constant name that
/// clashes with a fetched asset is dropped in favour of the real data.
pub fn assemble<I>(series: I, constant: Option<&str>) -> RawDataset
where
    I: IntoIterator<Item = (String, AssetSeries)>,
{
    let mut entries: Vec<NamedSeries> = Vec::new();
    for (name, series) in series {
        match entries.iter_mut().find(|e| e.name == name) {
            Some(existing) => {
                debug!(asset = %name, "replacing earlier series with the same display name");
                existing.series = series;
            }
            None => entries.push(NamedSeries { name, series }),
        }
    }

    let mut dataset = RawDataset {
        entries,
        constant: None,
    };

    if let Some(name) = constant {
        if dataset.get(name).is_some() {
            warn!(asset = %name, "constant series name clashes with a fetched asset; skipping constant");
        } else {
            let flat = AssetSeries::constant(dataset.observed_dates(), CONSTANT_VALUE);
            dataset.entries.insert(
                0,
                NamedSeries {
                    name: name.to_string(),
                    series: flat,
                },
            );
            dataset.constant = Some(name.to_string());
        }
    }

    debug!(assets = dataset.len(), "assembled raw dataset");
    dataset
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PricePoint;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn series(points: &[(&str, f64)]) -> AssetSeries {
        AssetSeries::new(
            "test",
            points.iter().map(|(date, p)| PricePoint::new(d(date), *p)).collect(),
        )
        .unwrap()
    }

    #[test]
    fn keeps_every_asset() {
        let raw = assemble(
            vec![
                ("SPY".to_string(), series(&[("2024-01-02", 100.0)])),
                ("BTC".to_string(), series(&[("2024-01-01", 40_000.0)])),
            ],
            None,
        );
        assert_eq!(raw.len(), 2);
        assert!(raw.constant_name().is_none());
        assert_eq!(raw.names().collect::<Vec<_>>(), vec!["SPY", "BTC"]);
    }

    #[test]
    fn duplicate_name_replaces_earlier_series() {
        let raw = assemble(
            vec![
                ("SPY".to_string(), series(&[("2024-01-02", 100.0)])),
                ("SPY".to_string(), series(&[("2024-01-03", 200.0)])),
            ],
            None,
        );
        assert_eq!(raw.len(), 1);
        assert_eq!(raw.get("SPY").unwrap().first_date(), Some(d("2024-01-03")));
    }

    #[test]
    fn constant_spans_union_of_dates() {
        let raw = assemble(
            vec![
                ("SPY".to_string(), series(&[("2024-01-02", 100.0), ("2024-01-04", 101.0)])),
                ("BTC".to_string(), series(&[("2024-01-01", 1.0), ("2024-01-04", 2.0)])),
            ],
            Some("Constant"),
        );
        assert_eq!(raw.constant_name(), Some("Constant"));
        assert_eq!(raw.entries()[0].name, "Constant");
        let constant = raw.get("Constant").unwrap();
        let dates: Vec<NaiveDate> = constant.dates().collect();
        assert_eq!(dates, vec![d("2024-01-01"), d("2024-01-02"), d("2024-01-04")]);
        assert!(constant.points().iter().all(|p| p.price == CONSTANT_VALUE));
    }

    #[test]
    fn constant_with_no_assets_is_empty() {
        let raw = assemble(Vec::<(String, AssetSeries)>::new(), Some("Constant"));
        assert_eq!(raw.len(), 1);
        assert!(raw.get("Constant").unwrap().is_empty());
    }

    #[test]
    fn clashing_constant_name_keeps_real_asset() {
        let raw = assemble(
            vec![("Cash".to_string(), series(&[("2024-01-02", 5.0)]))],
            Some("Cash"),
        );
        assert_eq!(raw.len(), 1);
        assert!(raw.constant_name().is_none());
        assert_eq!(raw.get("Cash").unwrap().points()[0].price, 5.0);
    }
}
