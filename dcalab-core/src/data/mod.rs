//! Data stages: assembly, alignment, resampling, returns

pub mod align;
pub mod assemble;
pub mod resample;
pub mod returns;

pub use align::{align, date_axis};
pub use assemble::{assemble, NamedSeries, RawDataset, CONSTANT_VALUE};
pub use resample::{period_end, resample, resample_named};
pub use returns::{period_return, returns, trim_to_window, window_returns};
