//! Local forecasting models.
//!
//! A local model is trained on a single series' own history and forecasts
//! that series alone. All models here implement the [`LocalForecaster`]
//! capability contract: fit on a univariate series, predict a horizon,
//! report whether they consume future covariates, and re-instantiate an
//! untrained copy of their own configuration.
//!
//! # Models
//!
//! - `NaiveMeanForecaster` — constant mean of the training values
//! - `NaiveSeasonalForecaster` — repeats the last K values cyclically
//! - `NaiveDriftForecaster` — line through first and last value, extrapolated
//! - `NaiveMovingAverageForecaster` — autoregressive rolling mean
//! - `ExponentialSmoothingForecaster` — simple smoothing, optional Holt trend
//! - `CovariateRegressionForecaster` — OLS on future covariates

use crate::error::{Error, Result};
use crate::time_series::core::{DateTimeIndex, TimeSeries};
use std::collections::HashMap;

/// Capability contract for local forecasting models.
///
/// `fit` accepts an optional future-covariate series; models that report
/// `supports_future_covariates() == false` must ignore it silently.
/// `untrained` re-instantiates the model from its configuration alone —
/// never from learned state — so independent copies can be trained without
/// sharing anything.
pub trait LocalForecaster: Send + Sync {
    /// Fit the model on a univariate series.
    fn fit(&mut self, series: &TimeSeries, future_covariates: Option<&TimeSeries>) -> Result<()>;

    /// Forecast `n` steps past the end of the training series.
    fn predict(&self, n: usize, future_covariates: Option<&TimeSeries>) -> Result<TimeSeries>;

    /// Whether this model consumes future covariates.
    fn supports_future_covariates(&self) -> bool {
        false
    }

    /// A fresh instance with identical configuration and no learned state.
    fn untrained(&self) -> Result<Box<dyn LocalForecaster>>;

    /// Model name, for error messages and diagnostics.
    fn name(&self) -> &str;

    /// Numeric configuration parameters, for diagnostics.
    fn parameters(&self) -> HashMap<String, f64> {
        HashMap::new()
    }
}

/// Type alias for boxed model trait objects.
pub type BoxedLocalForecaster = Box<dyn LocalForecaster>;

/// Training window details every local model captures at fit time: the
/// training index (to place forecasts after it) and the component name
/// (carried through to predictions unchanged).
#[derive(Debug, Clone)]
struct FitAnchor {
    index: DateTimeIndex,
    component: String,
}

impl FitAnchor {
    fn capture(series: &TimeSeries) -> Result<Self> {
        if !series.is_univariate() {
            return Err(Error::Data(format!(
                "local models require a univariate series, got {} components",
                series.n_components()
            )));
        }
        if series.is_empty() {
            return Err(Error::EmptyData(
                "cannot fit on an empty series".to_string(),
            ));
        }
        if series.index().frequency.is_none() {
            return Err(Error::Data(
                "series index has no frequency, cannot place forecasts".to_string(),
            ));
        }
        Ok(FitAnchor {
            index: series.index().clone(),
            component: series.component_names()[0].clone(),
        })
    }

    /// Build the forecast series holding `values`, one step per value past
    /// the end of the training index.
    fn forecast_series(&self, values: Vec<f64>) -> Result<TimeSeries> {
        let index = self.index.shift_ahead(values.len())?;
        TimeSeries::new(index, vec![values], Some(vec![self.component.clone()]))
    }
}

fn check_horizon(n: usize) -> Result<()> {
    if n == 0 {
        return Err(Error::InvalidInput(
            "forecast horizon must be positive".to_string(),
        ));
    }
    Ok(())
}

fn not_fitted(model: &str) -> Error {
    Error::NotFitted(format!("{} must be fitted before predicting", model))
}

/// Forecasts the mean of the training values, indefinitely.
#[derive(Debug, Clone, Default)]
pub struct NaiveMeanForecaster {
    anchor: Option<FitAnchor>,
    mean: Option<f64>,
}

impl NaiveMeanForecaster {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalForecaster for NaiveMeanForecaster {
    fn fit(&mut self, series: &TimeSeries, _future_covariates: Option<&TimeSeries>) -> Result<()> {
        let anchor = FitAnchor::capture(series)?;
        let values = series.values(0)?;
        self.mean = Some(values.iter().sum::<f64>() / values.len() as f64);
        self.anchor = Some(anchor);
        Ok(())
    }

    fn predict(&self, n: usize, _future_covariates: Option<&TimeSeries>) -> Result<TimeSeries> {
        check_horizon(n)?;
        let anchor = self.anchor.as_ref().ok_or_else(|| not_fitted(self.name()))?;
        let mean = self.mean.ok_or_else(|| not_fitted(self.name()))?;
        anchor.forecast_series(vec![mean; n])
    }

    fn untrained(&self) -> Result<Box<dyn LocalForecaster>> {
        Ok(Box::new(Self::new()))
    }

    fn name(&self) -> &str {
        "NaiveMean"
    }
}

/// Repeats the last `k` training values cyclically.
///
/// `k = 1` is the naive last-value forecaster.
#[derive(Debug, Clone)]
pub struct NaiveSeasonalForecaster {
    k: usize,
    anchor: Option<FitAnchor>,
    last_cycle: Option<Vec<f64>>,
}

impl NaiveSeasonalForecaster {
    pub fn new(k: usize) -> Self {
        NaiveSeasonalForecaster {
            k,
            anchor: None,
            last_cycle: None,
        }
    }

    fn validate_config(&self) -> Result<()> {
        if self.k == 0 {
            return Err(Error::Configuration(
                "seasonal lag k must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl LocalForecaster for NaiveSeasonalForecaster {
    fn fit(&mut self, series: &TimeSeries, _future_covariates: Option<&TimeSeries>) -> Result<()> {
        self.validate_config()?;
        let anchor = FitAnchor::capture(series)?;
        let values = series.values(0)?;
        if values.len() < self.k {
            return Err(Error::Data(format!(
                "need at least k = {} observations, got {}",
                self.k,
                values.len()
            )));
        }
        self.last_cycle = Some(values[values.len() - self.k..].to_vec());
        self.anchor = Some(anchor);
        Ok(())
    }

    fn predict(&self, n: usize, _future_covariates: Option<&TimeSeries>) -> Result<TimeSeries> {
        check_horizon(n)?;
        let anchor = self.anchor.as_ref().ok_or_else(|| not_fitted(self.name()))?;
        let cycle = self
            .last_cycle
            .as_ref()
            .ok_or_else(|| not_fitted(self.name()))?;
        let values = (0..n).map(|h| cycle[h % self.k]).collect();
        anchor.forecast_series(values)
    }

    fn untrained(&self) -> Result<Box<dyn LocalForecaster>> {
        self.validate_config()?;
        Ok(Box::new(Self::new(self.k)))
    }

    fn name(&self) -> &str {
        "NaiveSeasonal"
    }

    fn parameters(&self) -> HashMap<String, f64> {
        HashMap::from([("k".to_string(), self.k as f64)])
    }
}

/// Extrapolates the line through the first and last training value.
#[derive(Debug, Clone, Default)]
pub struct NaiveDriftForecaster {
    anchor: Option<FitAnchor>,
    last: Option<f64>,
    slope: Option<f64>,
}

impl NaiveDriftForecaster {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalForecaster for NaiveDriftForecaster {
    fn fit(&mut self, series: &TimeSeries, _future_covariates: Option<&TimeSeries>) -> Result<()> {
        let anchor = FitAnchor::capture(series)?;
        let values = series.values(0)?;
        if values.len() < 2 {
            return Err(Error::Data(
                "drift requires at least 2 observations".to_string(),
            ));
        }
        let first = values[0];
        let last = values[values.len() - 1];
        self.slope = Some((last - first) / (values.len() - 1) as f64);
        self.last = Some(last);
        self.anchor = Some(anchor);
        Ok(())
    }

    fn predict(&self, n: usize, _future_covariates: Option<&TimeSeries>) -> Result<TimeSeries> {
        check_horizon(n)?;
        let anchor = self.anchor.as_ref().ok_or_else(|| not_fitted(self.name()))?;
        let last = self.last.ok_or_else(|| not_fitted(self.name()))?;
        let slope = self.slope.ok_or_else(|| not_fitted(self.name()))?;
        let values = (1..=n).map(|h| last + slope * h as f64).collect();
        anchor.forecast_series(values)
    }

    fn untrained(&self) -> Result<Box<dyn LocalForecaster>> {
        Ok(Box::new(Self::new()))
    }

    fn name(&self) -> &str {
        "NaiveDrift"
    }
}

/// Rolling mean of the trailing `window` values, applied autoregressively:
/// each forecast step feeds back into the window for the next step.
#[derive(Debug, Clone)]
pub struct NaiveMovingAverageForecaster {
    window: usize,
    anchor: Option<FitAnchor>,
    tail: Option<Vec<f64>>,
}

impl NaiveMovingAverageForecaster {
    pub fn new(window: usize) -> Self {
        NaiveMovingAverageForecaster {
            window,
            anchor: None,
            tail: None,
        }
    }

    fn validate_config(&self) -> Result<()> {
        if self.window == 0 {
            return Err(Error::Configuration(
                "moving average window must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl LocalForecaster for NaiveMovingAverageForecaster {
    fn fit(&mut self, series: &TimeSeries, _future_covariates: Option<&TimeSeries>) -> Result<()> {
        self.validate_config()?;
        let anchor = FitAnchor::capture(series)?;
        let values = series.values(0)?;
        if values.len() < self.window {
            return Err(Error::Data(format!(
                "need at least window = {} observations, got {}",
                self.window,
                values.len()
            )));
        }
        self.tail = Some(values[values.len() - self.window..].to_vec());
        self.anchor = Some(anchor);
        Ok(())
    }

    fn predict(&self, n: usize, _future_covariates: Option<&TimeSeries>) -> Result<TimeSeries> {
        check_horizon(n)?;
        let anchor = self.anchor.as_ref().ok_or_else(|| not_fitted(self.name()))?;
        let tail = self.tail.as_ref().ok_or_else(|| not_fitted(self.name()))?;

        let mut buffer = tail.clone();
        let mut values = Vec::with_capacity(n);
        for _ in 0..n {
            let window = &buffer[buffer.len() - self.window..];
            let next = window.iter().sum::<f64>() / self.window as f64;
            values.push(next);
            buffer.push(next);
        }
        anchor.forecast_series(values)
    }

    fn untrained(&self) -> Result<Box<dyn LocalForecaster>> {
        self.validate_config()?;
        Ok(Box::new(Self::new(self.window)))
    }

    fn name(&self) -> &str {
        "NaiveMovingAverage"
    }

    fn parameters(&self) -> HashMap<String, f64> {
        HashMap::from([("window".to_string(), self.window as f64)])
    }
}

/// Simple exponential smoothing, optionally with Holt's linear trend.
///
/// Without a trend coefficient the forecast is the flat final level; with
/// one it is the level extrapolated along the smoothed trend.
#[derive(Debug, Clone)]
pub struct ExponentialSmoothingForecaster {
    alpha: f64,
    beta: Option<f64>,
    anchor: Option<FitAnchor>,
    level: Option<f64>,
    trend: Option<f64>,
}

impl ExponentialSmoothingForecaster {
    pub fn new(alpha: f64) -> Self {
        ExponentialSmoothingForecaster {
            alpha,
            beta: None,
            anchor: None,
            level: None,
            trend: None,
        }
    }

    /// Enable Holt's linear trend with smoothing coefficient `beta`.
    pub fn with_trend(mut self, beta: f64) -> Self {
        self.beta = Some(beta);
        self
    }

    fn validate_config(&self) -> Result<()> {
        if !(self.alpha > 0.0 && self.alpha <= 1.0) {
            return Err(Error::Configuration(format!(
                "alpha must be in (0, 1], got {}",
                self.alpha
            )));
        }
        if let Some(beta) = self.beta {
            if !(beta > 0.0 && beta <= 1.0) {
                return Err(Error::Configuration(format!(
                    "beta must be in (0, 1], got {}",
                    beta
                )));
            }
        }
        Ok(())
    }
}

impl LocalForecaster for ExponentialSmoothingForecaster {
    fn fit(&mut self, series: &TimeSeries, _future_covariates: Option<&TimeSeries>) -> Result<()> {
        self.validate_config()?;
        let anchor = FitAnchor::capture(series)?;
        let values = series.values(0)?;

        match self.beta {
            None => {
                let mut level = values[0];
                for &v in &values[1..] {
                    level = self.alpha * v + (1.0 - self.alpha) * level;
                }
                self.level = Some(level);
                self.trend = None;
            }
            Some(beta) => {
                if values.len() < 2 {
                    return Err(Error::Data(
                        "trended smoothing requires at least 2 observations".to_string(),
                    ));
                }
                let mut level = values[0];
                let mut trend = values[1] - values[0];
                for &v in &values[1..] {
                    let prev_level = level;
                    level = self.alpha * v + (1.0 - self.alpha) * (level + trend);
                    trend = beta * (level - prev_level) + (1.0 - beta) * trend;
                }
                self.level = Some(level);
                self.trend = Some(trend);
            }
        }
        self.anchor = Some(anchor);
        Ok(())
    }

    fn predict(&self, n: usize, _future_covariates: Option<&TimeSeries>) -> Result<TimeSeries> {
        check_horizon(n)?;
        let anchor = self.anchor.as_ref().ok_or_else(|| not_fitted(self.name()))?;
        let level = self.level.ok_or_else(|| not_fitted(self.name()))?;
        let values = match self.trend {
            Some(trend) => (1..=n).map(|h| level + trend * h as f64).collect(),
            None => vec![level; n],
        };
        anchor.forecast_series(values)
    }

    fn untrained(&self) -> Result<Box<dyn LocalForecaster>> {
        self.validate_config()?;
        let mut model = Self::new(self.alpha);
        model.beta = self.beta;
        Ok(Box::new(model))
    }

    fn name(&self) -> &str {
        "ExponentialSmoothing"
    }

    fn parameters(&self) -> HashMap<String, f64> {
        let mut params = HashMap::from([("alpha".to_string(), self.alpha)]);
        if let Some(beta) = self.beta {
            params.insert("beta".to_string(), beta);
        }
        params
    }
}

/// Ordinary least squares of the target on an intercept plus the future
/// covariate columns, aligned by timestamp.
///
/// Fitted with covariates, predicting requires covariates covering the
/// forecast horizon. Fitted without, it degrades to an intercept-only
/// (mean) model and ignores covariates at predict time.
#[derive(Debug, Clone, Default)]
pub struct CovariateRegressionForecaster {
    anchor: Option<FitAnchor>,
    /// Intercept followed by one coefficient per covariate column.
    /// Length 1 means the intercept-only fallback.
    coefficients: Option<Vec<f64>>,
}

impl CovariateRegressionForecaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gather the covariate row for `timestamp`, prefixed with the
    /// intercept column.
    fn covariate_row(
        covariates: &TimeSeries,
        timestamp: &chrono::DateTime<chrono::Utc>,
        what: &str,
    ) -> Result<Vec<f64>> {
        let pos = covariates.index().position(timestamp).ok_or_else(|| {
            Error::Data(format!(
                "future covariates do not cover the {} (missing {})",
                what, timestamp
            ))
        })?;
        let mut row = Vec::with_capacity(covariates.n_components() + 1);
        row.push(1.0);
        for j in 0..covariates.n_components() {
            row.push(covariates.value_at(pos, j)?);
        }
        Ok(row)
    }
}

impl LocalForecaster for CovariateRegressionForecaster {
    fn fit(&mut self, series: &TimeSeries, future_covariates: Option<&TimeSeries>) -> Result<()> {
        let anchor = FitAnchor::capture(series)?;
        let y = series.values(0)?;

        self.coefficients = Some(match future_covariates {
            None => {
                vec![y.iter().sum::<f64>() / y.len() as f64]
            }
            Some(covariates) => {
                let mut rows = Vec::with_capacity(y.len());
                for timestamp in anchor.index.timestamps() {
                    rows.push(Self::covariate_row(covariates, timestamp, "training range")?);
                }
                least_squares(&rows, y)?
            }
        });
        self.anchor = Some(anchor);
        Ok(())
    }

    fn predict(&self, n: usize, future_covariates: Option<&TimeSeries>) -> Result<TimeSeries> {
        check_horizon(n)?;
        let anchor = self.anchor.as_ref().ok_or_else(|| not_fitted(self.name()))?;
        let coefficients = self
            .coefficients
            .as_ref()
            .ok_or_else(|| not_fitted(self.name()))?;

        if coefficients.len() == 1 {
            return anchor.forecast_series(vec![coefficients[0]; n]);
        }

        let covariates = future_covariates.ok_or_else(|| {
            Error::Data(
                "model was fitted with future covariates, predicting requires them too"
                    .to_string(),
            )
        })?;
        if covariates.n_components() != coefficients.len() - 1 {
            return Err(Error::Data(format!(
                "expected {} covariate components, got {}",
                coefficients.len() - 1,
                covariates.n_components()
            )));
        }

        let forecast_index = anchor.index.shift_ahead(n)?;
        let mut values = Vec::with_capacity(n);
        for timestamp in forecast_index.timestamps() {
            let row = Self::covariate_row(covariates, timestamp, "forecast horizon")?;
            values.push(row.iter().zip(coefficients).map(|(x, b)| x * b).sum());
        }
        anchor.forecast_series(values)
    }

    fn supports_future_covariates(&self) -> bool {
        true
    }

    fn untrained(&self) -> Result<Box<dyn LocalForecaster>> {
        Ok(Box::new(Self::new()))
    }

    fn name(&self) -> &str {
        "CovariateRegression"
    }
}

/// Solve the normal equations `X^T X b = X^T y` by Gaussian elimination
/// with partial pivoting. `rows` holds X row-major, intercept included.
fn least_squares(rows: &[Vec<f64>], y: &[f64]) -> Result<Vec<f64>> {
    let p = rows.first().map(|r| r.len()).unwrap_or(0);
    if p == 0 || rows.len() < p {
        return Err(Error::Data(format!(
            "need at least {} observations to estimate {} coefficients",
            p, p
        )));
    }

    // Augmented system [X^T X | X^T y]
    let mut a = vec![vec![0.0; p + 1]; p];
    for i in 0..p {
        for j in 0..p {
            a[i][j] = rows.iter().map(|r| r[i] * r[j]).sum();
        }
        a[i][p] = rows.iter().zip(y).map(|(r, &v)| r[i] * v).sum();
    }

    for col in 0..p {
        let mut pivot = col;
        for row in col + 1..p {
            if a[row][col].abs() > a[pivot][col].abs() {
                pivot = row;
            }
        }
        if a[pivot][col].abs() < 1e-12 {
            return Err(Error::Data(
                "covariate matrix is singular, cannot estimate coefficients".to_string(),
            ));
        }
        a.swap(col, pivot);
        for row in col + 1..p {
            let factor = a[row][col] / a[col][col];
            for k in col..=p {
                a[row][k] -= factor * a[col][k];
            }
        }
    }

    let mut beta = vec![0.0; p];
    for row in (0..p).rev() {
        let mut sum = a[row][p];
        for k in row + 1..p {
            sum -= a[row][k] * beta[k];
        }
        beta[row] = sum / a[row][row];
    }
    Ok(beta)
}
