//! Error types for xmljson
//!
//! This module defines all error types used throughout the library.
//! Scalar coercion never fails, so every variant here describes either a
//! structural problem with the input or a feature the conventions cannot
//! express.

use thiserror::Error;

/// Result type alias using xmljson Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for xmljson operations
#[derive(Error, Debug)]
pub enum Error {
    /// The data uses a construct the selected convention cannot express
    #[error("unsupported feature: {0}")]
    UnsupportedFeature(String),

    /// The data tree does not have the shape the conversion expects
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// Limit exceeded error
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    /// Name error (invalid XML name)
    #[error("name error: {0}")]
    Name(String),

    /// Namespace error
    #[error("namespace error: {0}")]
    Namespace(String),

    /// XML parsing or writing error
    #[error("XML error: {0}")]
    Xml(String),

    /// Convention name not recognised
    #[error("unknown convention: {0}")]
    UnknownConvention(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn xml(err: impl std::fmt::Display) -> Self {
        Self::Xml(err.to_string())
    }
}
