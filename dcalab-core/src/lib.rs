//! DCA Lab Core: alignment, resampling, returns and portfolio simulation.
//!
//! This crate contains the simulation engine:
//! - Domain types (asset series, investment plan, date-indexed tables)
//! - Raw dataset assembly with an optional constant reference asset
//! - Contiguous daily alignment with forward-fill
//! - Day / month / year resampling
//! - Window-trimmed period returns
//! - DCA and lump-sum value recurrences
//!
//! The engine performs no I/O and never reads the clock: data arrives already
//! fetched and "now" is resolved by the caller.

pub mod data;
pub mod domain;
pub mod engine;
pub mod error;
pub mod fingerprint;

pub use error::{ConfigurationError, EngineError};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: engine types can cross threads.
    ///
    /// Per-asset simulation runs on the rayon pool, and callers may run
    /// whole pipelines on worker threads.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<domain::AssetSeries>();
        require_sync::<domain::AssetSeries>();
        require_send::<domain::InvestmentConfig>();
        require_sync::<domain::InvestmentConfig>();
        require_send::<domain::PriceTable>();
        require_sync::<domain::PriceTable>();
        require_send::<domain::ReturnSeries>();
        require_sync::<domain::ReturnSeries>();
        require_send::<domain::PortfolioValueTable>();
        require_sync::<domain::PortfolioValueTable>();

        require_send::<data::RawDataset>();
        require_sync::<data::RawDataset>();
        require_send::<engine::PipelineRun>();
        require_sync::<engine::PipelineRun>();

        require_send::<EngineError>();
        require_sync::<EngineError>();
    }

    /// Architecture contract: the simulator sees returns, never prices.
    ///
    /// `simulate` takes a `ReturnSeries` and the plan. If a price table is ever
    /// threaded through, this stops compiling.
    #[test]
    fn simulator_consumes_only_returns() {
        fn _check(
            returns: &domain::ReturnSeries,
            config: &domain::InvestmentConfig,
        ) -> domain::PortfolioValueTable {
            engine::simulate(returns, config)
        }
    }
}
