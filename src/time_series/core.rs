//! Core time series data structures.
//!
//! Provides the timestamp index, sampling frequency, and the (possibly
//! multi-component) `TimeSeries` container all forecasting code operates on.

use crate::error::{Error, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sampling frequency of a time series.
///
/// Month, quarter and year steps are approximated with fixed day counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Frequency {
    Secondly,
    Minutely,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
    /// Custom step, in seconds.
    Custom(i64),
}

impl Frequency {
    /// Parse a frequency from a pandas-style alias ("D", "W", "monthly", ...).
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "S" | "SEC" | "SECOND" | "SECONDS" => Some(Frequency::Secondly),
            "T" | "MIN" | "MINUTE" | "MINUTES" => Some(Frequency::Minutely),
            "H" | "HOUR" | "HOURS" => Some(Frequency::Hourly),
            "D" | "DAY" | "DAYS" | "DAILY" => Some(Frequency::Daily),
            "W" | "WEEK" | "WEEKS" | "WEEKLY" => Some(Frequency::Weekly),
            "M" | "MONTH" | "MONTHS" | "MONTHLY" => Some(Frequency::Monthly),
            "Q" | "QUARTER" | "QUARTERS" | "QUARTERLY" => Some(Frequency::Quarterly),
            "Y" | "YEAR" | "YEARS" | "A" | "ANNUAL" | "ANNUALLY" | "YEARLY" => {
                Some(Frequency::Yearly)
            }
            _ => None,
        }
    }

    /// Approximate step length in seconds.
    pub fn to_seconds(&self) -> i64 {
        match self {
            Frequency::Secondly => 1,
            Frequency::Minutely => 60,
            Frequency::Hourly => 3600,
            Frequency::Daily => 86400,
            Frequency::Weekly => 604800,
            Frequency::Monthly => 2_592_000,   // 30 days
            Frequency::Quarterly => 7_776_000, // 90 days
            Frequency::Yearly => 31_536_000,   // 365 days
            Frequency::Custom(seconds) => *seconds,
        }
    }

    /// Step length as a `chrono::Duration`.
    pub fn to_duration(&self) -> Duration {
        Duration::seconds(self.to_seconds())
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frequency::Secondly => write!(f, "S"),
            Frequency::Minutely => write!(f, "T"),
            Frequency::Hourly => write!(f, "H"),
            Frequency::Daily => write!(f, "D"),
            Frequency::Weekly => write!(f, "W"),
            Frequency::Monthly => write!(f, "M"),
            Frequency::Quarterly => write!(f, "Q"),
            Frequency::Yearly => write!(f, "Y"),
            Frequency::Custom(seconds) => write!(f, "{}s", seconds),
        }
    }
}

/// Ordered timestamp index shared by every component of a series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateTimeIndex {
    timestamps: Vec<DateTime<Utc>>,
    /// Sampling frequency, if known. Required for forecasting, since the
    /// forecast index is built by stepping beyond the last timestamp.
    pub frequency: Option<Frequency>,
}

impl DateTimeIndex {
    /// Create an index without a declared frequency.
    ///
    /// Timestamps must be strictly increasing.
    pub fn new(timestamps: Vec<DateTime<Utc>>) -> Result<Self> {
        if let Some(pair) = timestamps.windows(2).find(|w| w[0] >= w[1]) {
            return Err(Error::Data(format!(
                "time index must be strictly increasing, found {} followed by {}",
                pair[0], pair[1]
            )));
        }
        Ok(DateTimeIndex {
            timestamps,
            frequency: None,
        })
    }

    /// Create an index with a declared frequency.
    pub fn with_frequency(timestamps: Vec<DateTime<Utc>>, frequency: Frequency) -> Result<Self> {
        let mut index = Self::new(timestamps)?;
        index.frequency = Some(frequency);
        Ok(index)
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    pub fn get(&self, i: usize) -> Option<&DateTime<Utc>> {
        self.timestamps.get(i)
    }

    pub fn start(&self) -> Option<&DateTime<Utc>> {
        self.timestamps.first()
    }

    pub fn end(&self) -> Option<&DateTime<Utc>> {
        self.timestamps.last()
    }

    /// Position of a timestamp in the index, if present.
    pub fn position(&self, timestamp: &DateTime<Utc>) -> Option<usize> {
        self.timestamps.binary_search(timestamp).ok()
    }

    /// Build the index of the `n` steps immediately after the last timestamp.
    ///
    /// This is how forecast indexes are constructed. Requires a declared
    /// frequency and a non-empty index.
    pub fn shift_ahead(&self, n: usize) -> Result<DateTimeIndex> {
        let last = *self.end().ok_or_else(|| {
            Error::EmptyData("cannot extend an empty time index".to_string())
        })?;
        let frequency = self.frequency.ok_or_else(|| {
            Error::Data("time index has no frequency, cannot build a forecast index".to_string())
        })?;
        let step = frequency.to_duration();
        let timestamps = (1..=n).map(|i| last + step * i as i32).collect();
        DateTimeIndex::with_frequency(timestamps, frequency)
    }
}

/// A time-indexed series holding one or more named float components.
///
/// All components share one `DateTimeIndex`; each holds exactly one value per
/// time point. Values are stored column-major, one `Vec<f64>` per component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    index: DateTimeIndex,
    columns: Vec<Vec<f64>>,
    names: Vec<String>,
}

impl TimeSeries {
    /// Create a series from an index and column-major values.
    ///
    /// Requires at least one component, one column length equal to the index
    /// length, and unique component names. When `names` is `None` the
    /// components are named `component_0`, `component_1`, ...
    pub fn new(
        index: DateTimeIndex,
        columns: Vec<Vec<f64>>,
        names: Option<Vec<String>>,
    ) -> Result<Self> {
        if columns.is_empty() {
            return Err(Error::EmptyData(
                "a time series requires at least one component".to_string(),
            ));
        }
        for column in &columns {
            if column.len() != index.len() {
                return Err(Error::LengthMismatch {
                    expected: index.len(),
                    actual: column.len(),
                });
            }
        }
        let names = match names {
            Some(names) => {
                if names.len() != columns.len() {
                    return Err(Error::LengthMismatch {
                        expected: columns.len(),
                        actual: names.len(),
                    });
                }
                for (i, name) in names.iter().enumerate() {
                    if names[..i].contains(name) {
                        return Err(Error::InvalidInput(format!(
                            "duplicate component name: {}",
                            name
                        )));
                    }
                }
                names
            }
            None => (0..columns.len()).map(|i| format!("component_{}", i)).collect(),
        };
        Ok(TimeSeries {
            index,
            columns,
            names,
        })
    }

    /// Create a single-component series.
    pub fn univariate(index: DateTimeIndex, values: Vec<f64>) -> Result<Self> {
        Self::new(index, vec![values], None)
    }

    /// Rename the single component of a univariate series.
    pub fn with_name(mut self, name: &str) -> Result<Self> {
        if !self.is_univariate() {
            return Err(Error::InvalidInput(format!(
                "with_name requires a univariate series, got {} components",
                self.n_components()
            )));
        }
        self.names[0] = name.to_string();
        Ok(self)
    }

    pub fn index(&self) -> &DateTimeIndex {
        &self.index
    }

    /// Number of time points.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Number of components.
    pub fn n_components(&self) -> usize {
        self.columns.len()
    }

    pub fn is_univariate(&self) -> bool {
        self.n_components() == 1
    }

    pub fn component_names(&self) -> &[String] {
        &self.names
    }

    /// Values of component `i`.
    pub fn values(&self, i: usize) -> Result<&[f64]> {
        self.columns
            .get(i)
            .map(|c| c.as_slice())
            .ok_or(Error::IndexOutOfBounds {
                index: i,
                size: self.columns.len(),
            })
    }

    /// Value at time point `row` of component `component`.
    pub fn value_at(&self, row: usize, component: usize) -> Result<f64> {
        let column = self.values(component)?;
        column.get(row).copied().ok_or(Error::IndexOutOfBounds {
            index: row,
            size: column.len(),
        })
    }

    /// Project component `i` into a univariate series.
    ///
    /// The time index and the component name are preserved exactly.
    pub fn univariate_component(&self, i: usize) -> Result<TimeSeries> {
        let column = self.values(i)?.to_vec();
        TimeSeries::new(
            self.index.clone(),
            vec![column],
            Some(vec![self.names[i].clone()]),
        )
    }

    /// Append `other`'s components after this series' components.
    ///
    /// Both series must share an identical time index. Colliding component
    /// names get a numeric suffix.
    pub fn stack(&self, other: &TimeSeries) -> Result<TimeSeries> {
        if self.index != other.index {
            return Err(Error::Data(
                "cannot stack series with different time indexes".to_string(),
            ));
        }
        let mut columns = self.columns.clone();
        let mut names = self.names.clone();
        for (column, name) in other.columns.iter().zip(other.names.iter()) {
            columns.push(column.clone());
            names.push(dedup_name(&names, name));
        }
        TimeSeries::new(self.index.clone(), columns, Some(names))
    }

    /// Stack an ordered sequence of series into one multi-component series.
    ///
    /// Component order follows the input order. All parts must share an
    /// identical time index.
    pub fn from_components(components: Vec<TimeSeries>) -> Result<TimeSeries> {
        let mut parts = components.into_iter();
        let first = parts.next().ok_or_else(|| {
            Error::EmptyData("from_components requires at least one series".to_string())
        })?;
        parts.try_fold(first, |stacked, part| stacked.stack(&part))
    }
}

/// Pick a component name not already in `existing`.
fn dedup_name(existing: &[String], candidate: &str) -> String {
    if !existing.iter().any(|n| n == candidate) {
        return candidate.to_string();
    }
    let mut k = 1;
    loop {
        let name = format!("{}_{}", candidate, k);
        if !existing.iter().any(|n| n == &name) {
            return name;
        }
        k += 1;
    }
}

/// Point-at-a-time builder for univariate series.
#[derive(Debug, Clone, Default)]
pub struct TimeSeriesBuilder {
    points: Vec<(DateTime<Utc>, f64)>,
    frequency: Option<Frequency>,
    name: Option<String>,
}

impl TimeSeriesBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_point(mut self, timestamp: DateTime<Utc>, value: f64) -> Self {
        self.points.push((timestamp, value));
        self
    }

    pub fn frequency(mut self, frequency: Frequency) -> Self {
        self.frequency = Some(frequency);
        self
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn build(self) -> Result<TimeSeries> {
        let (timestamps, values): (Vec<_>, Vec<_>) = self.points.into_iter().unzip();
        let index = match self.frequency {
            Some(frequency) => DateTimeIndex::with_frequency(timestamps, frequency)?,
            None => DateTimeIndex::new(timestamps)?,
        };
        let names = self.name.map(|n| vec![n]);
        TimeSeries::new(index, vec![values], names)
    }
}
