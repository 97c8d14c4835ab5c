//! Error types for geokrige

use thiserror::Error;

/// Main error type for geokrige operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A required input (catalog, field name, geometry) was not supplied at setup.
    #[error("Missing required input: {0}")]
    MissingInput(&'static str),

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    /// The empirical variogram cannot be used to derive default parameters.
    #[error("Malformed empirical variogram: {0}")]
    MalformedVariogram(String),

    #[error("Unknown variogram model: {0}")]
    UnknownModel(String),

    /// Parameters outside the domain a variogram model accepts.
    #[error("{model} model rejects parameters: {reason}")]
    ModelDomain { model: &'static str, reason: String },

    #[error("Algorithm error: {0}")]
    Algorithm(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for geokrige operations
pub type Result<T> = std::result::Result<T, Error>;
