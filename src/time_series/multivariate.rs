//! Composition adapter applying a local model to a multi-component series.
//!
//! [`MultivariateForecastingModelWrapper`] takes a model that only knows how
//! to forecast a single component and applies it to a series with any number
//! of components: the series is decomposed, one untrained copy of the base
//! model is fitted per component on that component's values alone, and the
//! per-component forecasts are stacked back in the original order.
//!
//! Components never interact: no parameters are shared, no component ever
//! observes another component's values. For univariate input the wrapper is
//! numerically a no-op over using the base model directly.
//!
//! Per-component fit and predict are independent, so they run on rayon; the
//! results are then consumed in component order, which keeps error reporting
//! deterministic (the lowest failing component index wins).

use crate::error::{Error, Result};
use crate::time_series::forecasting::LocalForecaster;
use crate::time_series::core::TimeSeries;
use log::debug;
use rayon::prelude::*;
use std::collections::HashMap;

/// Adapter that fits one independent copy of a local model per component.
///
/// The wrapped base model is held as a configuration template only; it is
/// never fitted or mutated. After `fit`, the wrapper exclusively owns one
/// fitted instance per component, in component order.
///
/// Implements [`LocalForecaster`] itself, so it can stand in wherever a base
/// model is expected.
pub struct MultivariateForecastingModelWrapper {
    base: Box<dyn LocalForecaster>,
    fitted: Vec<Box<dyn LocalForecaster>>,
    name: String,
}

impl MultivariateForecastingModelWrapper {
    /// Wrap an untrained base model configuration.
    pub fn new(base: Box<dyn LocalForecaster>) -> Self {
        let name = format!("Multivariate({})", base.name());
        MultivariateForecastingModelWrapper {
            base,
            fitted: Vec::new(),
            name,
        }
    }

    /// Whether `fit` has completed successfully.
    pub fn is_fitted(&self) -> bool {
        !self.fitted.is_empty()
    }

    /// Component count seen at fit time; 0 before fitting.
    pub fn n_fitted_components(&self) -> usize {
        self.fitted.len()
    }

    /// Fit one untrained copy of the base model per component.
    ///
    /// Component `i`'s copy observes only component `i`'s values. Covariates
    /// are forwarded to a copy only if it reports support for them, and are
    /// silently discarded otherwise. On success any previously fitted
    /// sequence is replaced wholesale; on failure the wrapper's prior state
    /// is left untouched and the first failing component's error is returned
    /// tagged with its index.
    pub fn fit(
        &mut self,
        series: &TimeSeries,
        future_covariates: Option<&TimeSeries>,
    ) -> Result<()> {
        let n_components = series.n_components();
        debug!(
            "fitting {} over {} component(s), {} point(s)",
            self.base.name(),
            n_components,
            series.len()
        );

        let results: Vec<Result<Box<dyn LocalForecaster>>> = (0..n_components)
            .into_par_iter()
            .map(|i| self.fit_component(i, series, future_covariates))
            .collect();

        let mut fitted = Vec::with_capacity(n_components);
        for (i, result) in results.into_iter().enumerate() {
            fitted.push(result.map_err(|e| Error::for_component(i, e))?);
        }
        self.fitted = fitted;
        Ok(())
    }

    fn fit_component(
        &self,
        i: usize,
        series: &TimeSeries,
        future_covariates: Option<&TimeSeries>,
    ) -> Result<Box<dyn LocalForecaster>> {
        let component = series.univariate_component(i)?;
        let mut model = self.base.untrained()?;
        let covariates = if model.supports_future_covariates() {
            future_covariates
        } else {
            None
        };
        model.fit(&component, covariates)?;
        Ok(model)
    }

    /// Forecast `n` steps for every fitted component and stack the results.
    ///
    /// `series` is optional; the wrapper remembers the fitted component
    /// count. When supplied, its component count must match. All
    /// per-component predictions must agree on their time index; a
    /// disagreement is a wrapped-model contract violation and surfaces as
    /// `Error::Consistency`, never a silently repaired result.
    pub fn predict(
        &self,
        n: usize,
        series: Option<&TimeSeries>,
        future_covariates: Option<&TimeSeries>,
    ) -> Result<TimeSeries> {
        if !self.is_fitted() {
            return Err(Error::NotFitted(
                "wrapper must be fitted before predicting".to_string(),
            ));
        }
        if n == 0 {
            return Err(Error::InvalidInput(
                "forecast horizon must be positive".to_string(),
            ));
        }
        if let Some(series) = series {
            if series.n_components() != self.fitted.len() {
                return Err(Error::Data(format!(
                    "series has {} component(s) but the wrapper was fitted on {}",
                    series.n_components(),
                    self.fitted.len()
                )));
            }
        }
        debug!(
            "predicting {} step(s) over {} component(s)",
            n,
            self.fitted.len()
        );

        let results: Vec<Result<TimeSeries>> = self
            .fitted
            .par_iter()
            .map(|model| {
                let covariates = if model.supports_future_covariates() {
                    future_covariates
                } else {
                    None
                };
                model.predict(n, covariates)
            })
            .collect();

        let mut predictions = Vec::with_capacity(self.fitted.len());
        for (i, result) in results.into_iter().enumerate() {
            predictions.push(result.map_err(|e| Error::for_component(i, e))?);
        }

        for (i, prediction) in predictions.iter().enumerate().skip(1) {
            if prediction.index() != predictions[0].index() {
                return Err(Error::Consistency(format!(
                    "component {} predicted a time index differing from component 0 \
                     (lengths {} and {})",
                    i,
                    prediction.len(),
                    predictions[0].len()
                )));
            }
        }

        TimeSeries::from_components(predictions)
    }
}

impl LocalForecaster for MultivariateForecastingModelWrapper {
    fn fit(&mut self, series: &TimeSeries, future_covariates: Option<&TimeSeries>) -> Result<()> {
        MultivariateForecastingModelWrapper::fit(self, series, future_covariates)
    }

    fn predict(&self, n: usize, future_covariates: Option<&TimeSeries>) -> Result<TimeSeries> {
        MultivariateForecastingModelWrapper::predict(self, n, None, future_covariates)
    }

    fn supports_future_covariates(&self) -> bool {
        self.base.supports_future_covariates()
    }

    fn untrained(&self) -> Result<Box<dyn LocalForecaster>> {
        Ok(Box::new(Self::new(self.base.untrained()?)))
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn parameters(&self) -> HashMap<String, f64> {
        self.base.parameters()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time_series::forecasting::{NaiveMeanForecaster, NaiveSeasonalForecaster};
    use crate::time_series::generation::constant_series;

    fn two_component_series() -> TimeSeries {
        let a = constant_series(10, 5.0).unwrap().with_name("a").unwrap();
        let b = constant_series(10, 9.0).unwrap().with_name("b").unwrap();
        a.stack(&b).unwrap()
    }

    #[test]
    fn test_fit_tracks_component_count() {
        let mut wrapper =
            MultivariateForecastingModelWrapper::new(Box::new(NaiveMeanForecaster::new()));
        assert!(!wrapper.is_fitted());

        wrapper.fit(&two_component_series(), None).unwrap();
        assert_eq!(wrapper.n_fitted_components(), 2);
    }

    #[test]
    fn test_refit_replaces_fitted_sequence() {
        let series = two_component_series();
        let mut wrapper =
            MultivariateForecastingModelWrapper::new(Box::new(NaiveMeanForecaster::new()));
        wrapper.fit(&series, None).unwrap();
        assert_eq!(wrapper.n_fitted_components(), 2);

        let univariate = series.univariate_component(0).unwrap();
        wrapper.fit(&univariate, None).unwrap();
        assert_eq!(wrapper.n_fitted_components(), 1);
        assert_eq!(wrapper.predict(3, None, None).unwrap().n_components(), 1);
    }

    #[test]
    fn test_failed_fit_keeps_prior_state() {
        let series = two_component_series();
        let mut wrapper =
            MultivariateForecastingModelWrapper::new(Box::new(NaiveSeasonalForecaster::new(5)));
        wrapper.fit(&series, None).unwrap();

        // Too short for k = 5: every component fails, component 0 reported.
        let short_a = constant_series(2, 1.0).unwrap().with_name("a").unwrap();
        let short_b = constant_series(2, 2.0).unwrap().with_name("b").unwrap();
        let err = wrapper
            .fit(&short_a.stack(&short_b).unwrap(), None)
            .unwrap_err();
        assert_eq!(err.component_index(), Some(0));

        // The earlier fit is still usable.
        assert!(wrapper.predict(3, None, None).is_ok());
    }

    #[test]
    fn test_predict_component_count_mismatch() {
        let series = two_component_series();
        let mut wrapper =
            MultivariateForecastingModelWrapper::new(Box::new(NaiveMeanForecaster::new()));
        wrapper.fit(&series, None).unwrap();

        let univariate = series.univariate_component(0).unwrap();
        assert!(matches!(
            wrapper.predict(3, Some(&univariate), None),
            Err(Error::Data(_))
        ));
    }

    #[test]
    fn test_output_carries_component_names() {
        let series = two_component_series();
        let mut wrapper =
            MultivariateForecastingModelWrapper::new(Box::new(NaiveMeanForecaster::new()));
        wrapper.fit(&series, None).unwrap();
        let pred = wrapper.predict(4, Some(&series), None).unwrap();
        assert_eq!(pred.component_names(), series.component_names());
        assert_eq!(pred.len(), 4);
    }

    #[test]
    fn test_wrapper_is_substitutable_as_local_forecaster() {
        let wrapper =
            MultivariateForecastingModelWrapper::new(Box::new(NaiveMeanForecaster::new()));
        let mut boxed: Box<dyn LocalForecaster> = wrapper.untrained().unwrap();
        assert!(!boxed.supports_future_covariates());

        let series = two_component_series();
        boxed.fit(&series, None).unwrap();
        let pred = boxed.predict(2, None).unwrap();
        assert_eq!(pred.n_components(), 2);
        assert_eq!(boxed.name(), "Multivariate(NaiveMean)");
    }
}
