//! Dataset fingerprinting: deterministic identity of the input prices.
//!
//! The hash covers asset names, dates and price bytes in sorted asset order,
//! so two runs over identical inputs share a fingerprint regardless of the
//! order assets were listed in.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::data::RawDataset;

/// BLAKE3 hex digest of a raw dataset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetHash(pub String);

impl fmt::Display for DatasetHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Compute the dataset hash.
pub fn dataset_hash(raw: &RawDataset) -> DatasetHash {
    let mut hasher = blake3::Hasher::new();

    let mut entries: Vec<_> = raw.entries().iter().collect();
    entries.sort_by(|a, b| a.name.cmp(&b.name));

    for entry in entries {
        hasher.update(entry.name.as_bytes());
        hasher.update(&(entry.series.len() as u64).to_le_bytes());
        for point in entry.series.points() {
            hasher.update(point.date.to_string().as_bytes());
            hasher.update(&point.price.to_le_bytes());
        }
    }

    DatasetHash(hasher.finalize().to_hex().to_string())
}
