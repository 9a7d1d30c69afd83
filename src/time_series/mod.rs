//! Time Series Forecasting Module
//!
//! Provides the time-indexed series container, a family of local (univariate)
//! forecasting models behind one capability trait, and the multivariate
//! composition adapter that applies any local model independently per
//! component of a multi-component series.
//!
//! # Forecasting models
//!
//! - Naive mean / seasonal / drift / moving average
//! - Exponential smoothing (simple and Holt's linear trend)
//! - Covariate regression (supports future covariates)

pub mod core;
pub mod forecasting;
pub mod generation;
pub mod multivariate;

pub use self::core::{DateTimeIndex, Frequency, TimeSeries, TimeSeriesBuilder};
pub use forecasting::{
    BoxedLocalForecaster, CovariateRegressionForecaster, ExponentialSmoothingForecaster,
    LocalForecaster, NaiveDriftForecaster, NaiveMeanForecaster, NaiveMovingAverageForecaster,
    NaiveSeasonalForecaster,
};
pub use generation::{constant_series, gaussian_series, linear_series};
pub use multivariate::MultivariateForecastingModelWrapper;
