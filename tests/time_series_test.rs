//! End-to-end tests of the public time series API.

use chrono::{TimeZone, Utc};
use trendrs::time_series::forecasting::ExponentialSmoothingForecaster;
use trendrs::time_series::generation::linear_series;
use trendrs::{
    Frequency, LocalForecaster, MultivariateForecastingModelWrapper, TimeSeries, TimeSeriesBuilder,
};

#[test]
fn test_builder_to_forecast_round_trip() {
    let mut builder = TimeSeriesBuilder::new().name("temperature");
    for i in 0..30 {
        let timestamp = Utc
            .timestamp_opt(1_640_995_200 + i as i64 * 3600, 0)
            .unwrap();
        builder = builder.add_point(timestamp, 15.0 + (i as f64 * 0.3).sin());
    }
    let series = builder.frequency(Frequency::Hourly).build().unwrap();

    let mut model = ExponentialSmoothingForecaster::new(0.5);
    model.fit(&series, None).unwrap();
    let pred = model.predict(6, None).unwrap();

    assert_eq!(pred.len(), 6);
    assert_eq!(pred.component_names(), &["temperature".to_string()]);
    let step = *pred.index().get(0).unwrap() - *series.index().end().unwrap();
    assert_eq!(step, Frequency::Hourly.to_duration());
}

#[test]
fn test_wrapper_over_stacked_series() {
    let trend_up = linear_series(40, 0.0, 1.0).unwrap().with_name("up").unwrap();
    let trend_down = linear_series(40, 100.0, -0.5)
        .unwrap()
        .with_name("down")
        .unwrap();
    let series = trend_up.stack(&trend_down).unwrap();
    assert_eq!(series.n_components(), 2);

    let base = ExponentialSmoothingForecaster::new(0.8).with_trend(0.5);
    let mut wrapper = MultivariateForecastingModelWrapper::new(Box::new(base));
    wrapper.fit(&series, None).unwrap();
    let pred = wrapper.predict(5, Some(&series), None).unwrap();

    // Holt's trend follows each component's own slope.
    let up = pred.values(0).unwrap();
    let down = pred.values(1).unwrap();
    assert!(up.windows(2).all(|w| w[1] > w[0]));
    assert!(down.windows(2).all(|w| w[1] < w[0]));
}

#[test]
fn test_version_is_exposed() {
    assert!(!trendrs::VERSION.is_empty());
}

#[test]
fn test_series_json_round_trip() {
    let series = linear_series(5, 2.0, 0.5).unwrap();
    let json = serde_json::to_string(&series).unwrap();
    let back: TimeSeries = serde_json::from_str(&json).unwrap();
    assert_eq!(back, series);
}
