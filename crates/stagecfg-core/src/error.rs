use thiserror::Error;

use crate::types::ValueKind;

/// Boxed error produced by a caller-supplied converter.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Unified error type for stage loading and value resolution.
#[derive(Error, Debug)]
pub enum StageError {
    // ── Resolution errors ──────────────────────────────────────
    #[error("stage config '{key}' is missing")]
    MissingConfiguration { key: String },

    #[error("stage config '{key}' could not be converted to {kind}: {source}")]
    Conversion {
        key: String,
        kind: ValueKind,
        #[source]
        source: ConversionError,
    },

    // ── Stage errors ───────────────────────────────────────────
    #[error("stage not found: {0}")]
    StageNotFound(String),

    #[error("config error: {0}")]
    Config(String),

    // ── Generic wrappers ───────────────────────────────────────
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StageError {
    /// True for [`StageError::MissingConfiguration`].
    pub fn is_missing(&self) -> bool {
        matches!(self, StageError::MissingConfiguration { .. })
    }
}

/// Failure while turning a raw string into a typed value.
#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("invalid integer: {0}")]
    Int(#[from] std::num::ParseIntError),

    #[error("invalid number: {0}")]
    Float(#[from] std::num::ParseFloatError),

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    #[error("{0}")]
    Custom(BoxError),
}

pub type Result<T> = std::result::Result<T, StageError>;
