use thiserror::Error;

/// Error type covering all trendrs operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A model configuration cannot be instantiated (e.g. it does not allow
    /// being re-created once per component).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Malformed input data: empty or multivariate series where a univariate
    /// one is required, missing frequency, covariates not covering the
    /// required time range, and similar.
    #[error("data error: {0}")]
    Data(String),

    /// A forecast was requested from a model that has not been fitted.
    #[error("model not fitted: {0}")]
    NotFitted(String),

    /// Independently produced per-component predictions disagree on their
    /// time index. This indicates a bug in a wrapped model, not a user error.
    #[error("consistency error: {0}")]
    Consistency(String),

    #[error("index out of bounds: index {index}, size {size}")]
    IndexOutOfBounds { index: usize, size: usize },

    #[error("length mismatch: expected {expected}, actual {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("empty data: {0}")]
    EmptyData(String),

    /// An error raised while fitting or predicting a single component,
    /// tagged with that component's position.
    #[error("component {index}: {source}")]
    Component {
        index: usize,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Tag an error with the component index it originated from.
    pub fn for_component(index: usize, source: Error) -> Self {
        Error::Component {
            index,
            source: Box::new(source),
        }
    }

    /// The component index attached to this error, if any.
    pub fn component_index(&self) -> Option<usize> {
        match self {
            Error::Component { index, .. } => Some(*index),
            _ => None,
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
