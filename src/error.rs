//! Error Handling Module
//!
//! Defines the error type shared by artifact loading, feature
//! reconstruction, and inference. Uses thiserror for ergonomic error
//! definitions.

use thiserror::Error;

/// Main error type for crop stress inference operations
#[derive(Error, Debug)]
pub enum CropStressError {
    /// One or more model artifacts are missing; predictions are impossible
    /// until the process is restarted with the artifacts in place.
    #[error("Model not loaded")]
    ModelNotLoaded,

    /// The model document is syntactically valid JSON but not a model this
    /// server can score.
    #[error("Unsupported model: {0}")]
    UnsupportedModel(String),

    /// The model document is structurally broken (array lengths disagree,
    /// node references out of range, unparseable numeric parameters).
    #[error("Malformed model document: {0}")]
    MalformedModel(String),

    /// Error reading or parsing the reference training table.
    #[error("Reference table error: {0}")]
    Table(String),

    /// A column required by the classifier schema is absent from the
    /// reconstructed feature row.
    #[error("Missing feature column '{0}'")]
    MissingFeature(String),

    /// The feature row length does not match what the classifier expects.
    #[error("Feature count mismatch: model expects {expected}, row has {actual}")]
    SchemaMismatch { expected: usize, actual: usize },

    /// The classifier produced a class index outside the known label set.
    #[error("Unknown class index {0}")]
    UnknownClass(usize),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV parsing error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Convenience Result type for crop stress inference operations
pub type Result<T> = std::result::Result<T, CropStressError>;
