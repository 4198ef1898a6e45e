//! Translation from k6 run output back into structured data.

pub mod summary;
pub mod timeseries;

pub use summary::extract_summary;
pub use timeseries::{aggregate, ChartDataPoint, TimeSeries, TimeSeriesAggregator};
