//! Error types for sketch conversion.

use serde::Serialize;
use thiserror::Error;

use crate::component::ComponentId;

/// Result type for sketch operations.
pub type SketchResult<T> = Result<T, SketchError>;

/// Errors that can occur while converting a sketch.
#[derive(Debug, Error)]
pub enum SketchError {
    /// A single observation could not be used. Only that shape is dropped.
    #[error("Malformed shape at index {index}: {reason}")]
    MalformedShape {
        /// Position of the shape in the request payload.
        index: usize,
        /// What was wrong with it.
        reason: String,
    },

    /// The text recognition collaborator failed.
    #[error("Text recognition failed: {0}")]
    Recognition(String),

    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Configuration serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A conservation violation found after deduplication or layout.
///
/// These are reported, never returned as `Err`: a degraded layout is still
/// handed back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum IntegrityError {
    /// A component id was placed in more than one leaf, or offered twice.
    #[error("Component {0} placed more than once")]
    DuplicatePlacement(ComponentId),

    /// A component from the input never reached a leaf.
    #[error("Component {0} missing from layout")]
    MissingComponent(ComponentId),

    /// A leaf holds a component that was not in the input.
    #[error("Component {0} in layout but not in input")]
    UnexpectedComponent(ComponentId),
}
