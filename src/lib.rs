//! # Crop Stress Inference Server
//!
//! A thin HTTP inference gateway for a pre-trained tabular crop stress
//! classifier (Healthy / Moderate Stress / Severe Stress). Three artifacts
//! are loaded once at process start — the serialized classifier, a
//! reference training table, and the ordered feature column list — and held
//! read-only for the process lifetime. Each request is turned into a full
//! feature row against the reference-table baseline, scored, and answered
//! with the label, confidence, and per-class probabilities.
//!
//! ## Modules
//!
//! - `model`: classifier loading and single-row inference, reference table
//!   statistics, and the startup model store
//! - `features`: reconstruction of a complete feature row from a sparse
//!   request plus the baseline
//! - `routes`: the HTTP surface (`/`, `/api/health`, `/api/predict`)
//! - `state`: process-wide shared state
//! - `error`: the crate error type

pub mod error;
pub mod features;
pub mod model;
pub mod routes;
pub mod state;

// Re-export commonly used items for convenience
pub use error::{CropStressError, Result};
pub use features::PredictionRequest;
pub use model::gbtree::GbtModel;
pub use model::store::ModelStore;
pub use model::table::ReferenceTable;
pub use state::{AppState, ServerConfig, SharedState};

/// Number of stress classes predicted by the classifier
pub const NUM_CLASSES: usize = 3;

/// Stress class labels, indexed by the classifier's class indices 0..2
pub const STRESS_CLASSES: [&str; NUM_CLASSES] = ["Healthy", "Moderate Stress", "Severe Stress"];

/// Version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
