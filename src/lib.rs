//! trendrs: time series forecasting for Rust
//!
//! A small forecasting toolkit built around a multi-component, time-indexed
//! series container. Local models forecast one component from its own
//! history; the multivariate wrapper lifts any of them to multi-component
//! series by fitting an independent copy per component.

pub mod error;
pub mod time_series;

// Re-export commonly used types
pub use error::{Error, Result};
pub use time_series::{
    BoxedLocalForecaster, DateTimeIndex, Frequency, LocalForecaster,
    MultivariateForecastingModelWrapper, TimeSeries, TimeSeriesBuilder,
};

// Export version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
