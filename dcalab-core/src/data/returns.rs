//! Period-over-period returns.
//!
//! The periodic table is first cut to the simulation window, then returns are
//! computed inside the window only. The window's first row is a synthetic zero
//! and never looks at data before `date_from`.

use tracing::debug;

use crate::domain::{PeriodicDataset, ResolvedWindow, ReturnColumn, ReturnSeries};

/// Keep only rows dated inside `window` (inclusive on both ends).
pub fn trim_to_window(table: &PeriodicDataset, window: &ResolvedWindow) -> PeriodicDataset {
    table.between(window.date_from, window.date_to)
}

/// Fractional change from `prev` to `curr`.
///
/// Returns 0.0 whenever the change is not computable: either cell undefined,
/// or `prev` equal to zero. This is a known approximation: "no data" and
/// "no change" become indistinguishable, as does the step after a price that
/// really fell to zero. A dedicated no-data marker would separate them.
pub fn period_return(prev: Option<f64>, curr: Option<f64>) -> f64 {
    match (prev, curr) {
        (Some(p), Some(c)) if p != 0.0 => {
            let r = (c - p) / p;
            if r.is_finite() {
                r
            } else {
                0.0
            }
        }
        _ => 0.0,
    }
}

/// Per-column returns. Row 0 is exactly 0.0.
pub fn returns(table: &PeriodicDataset) -> ReturnSeries {
    let columns = table
        .columns
        .iter()
        .map(|column| {
            let mut out = Vec::with_capacity(column.values.len());
            if !column.values.is_empty() {
                out.push(0.0);
            }
            out.extend(
                column
                    .values
                    .windows(2)
                    .map(|pair| period_return(pair[0], pair[1])),
            );
            ReturnColumn {
                asset: column.asset.clone(),
                returns: out,
            }
        })
        .collect();

    ReturnSeries {
        dates: table.dates.clone(),
        columns,
    }
}

/// Trim to the window, then compute returns inside it.
pub fn window_returns(table: &PeriodicDataset, window: &ResolvedWindow) -> ReturnSeries {
    let trimmed = trim_to_window(table, window);
    debug!(
        rows_in = table.len(),
        rows_in_window = trimmed.len(),
        from = %window.date_from,
        to = %window.date_to,
        "trimmed periodic table to window"
    );
    returns(&trimmed)
}
