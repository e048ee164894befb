//! Domain types for DCA Lab

pub mod config;
pub mod series;
pub mod table;

pub use config::{DateBound, Interval, InvestmentConfig, ResolvedWindow};
pub use series::{AssetSeries, PricePoint};
pub use table::{
    AlignedDataset, PeriodicDataset, PortfolioValueTable, PriceColumn, PriceTable, ReturnColumn,
    ReturnSeries, Strategy, Trajectory,
};
