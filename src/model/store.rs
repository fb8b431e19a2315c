//! Model Store Module
//!
//! Loads the three serving artifacts once at process start and holds them as
//! read-only state for the process lifetime:
//!
//! - the serialized classifier
//! - the reference training table, reduced to per-column means (the
//!   baseline row for feature reconstruction)
//! - the ordered feature column list defining the classifier's schema
//!
//! Each load is independent: a failure leaves that slot empty and is logged,
//! but does not prevent attempting the other two. There is no reload path;
//! a store with missing artifacts stays degraded until the process is
//! restarted.

use std::collections::HashMap;
use std::path::Path;

use tracing::{info, warn};

use crate::error::Result;
use crate::model::gbtree::GbtModel;
use crate::model::table::ReferenceTable;

/// Classifier artifact file name inside the models directory.
pub const MODEL_FILE: &str = "crop_stress_model.json";

/// Reference training table file name inside the models directory.
pub const TRAIN_DATA_FILE: &str = "X_train.csv";

/// Feature column list file name inside the models directory.
pub const FEATURE_COLUMNS_FILE: &str = "feature_columns.json";

/// Read-only holder of the serving artifacts.
#[derive(Debug, Clone)]
pub struct ModelStore {
    classifier: Option<GbtModel>,
    baseline: Option<HashMap<String, f64>>,
    feature_columns: Option<Vec<String>>,
}

impl ModelStore {
    /// Attempt to load all three artifacts from a models directory,
    /// emitting one status line per artifact.
    pub fn load(models_dir: &Path) -> Self {
        let model_path = models_dir.join(MODEL_FILE);
        let classifier = match GbtModel::from_path(&model_path) {
            Ok(model) => {
                info!(
                    "Model loaded: {} trees, {} classes, {} features",
                    model.num_trees(),
                    model.num_class(),
                    model.num_feature()
                );
                Some(model)
            }
            Err(e) => {
                warn!("Failed to load model from {:?}: {}", model_path, e);
                None
            }
        };

        let table_path = models_dir.join(TRAIN_DATA_FILE);
        let baseline = match ReferenceTable::from_path(&table_path) {
            Ok(table) => {
                info!(
                    "Training data loaded: {} rows, {} columns",
                    table.n_rows(),
                    table.columns().len()
                );
                Some(table.into_column_means())
            }
            Err(e) => {
                warn!("Failed to load training data from {:?}: {}", table_path, e);
                None
            }
        };

        let columns_path = models_dir.join(FEATURE_COLUMNS_FILE);
        let feature_columns = match load_feature_columns(&columns_path) {
            Ok(columns) => {
                info!("Feature columns loaded: {}", columns.len());
                Some(columns)
            }
            Err(e) => {
                warn!("Failed to load feature columns from {:?}: {}", columns_path, e);
                None
            }
        };

        Self::from_parts(classifier, baseline, feature_columns)
    }

    /// Assemble a store from already-loaded artifacts.
    pub fn from_parts(
        classifier: Option<GbtModel>,
        baseline: Option<HashMap<String, f64>>,
        feature_columns: Option<Vec<String>>,
    ) -> Self {
        Self {
            classifier,
            baseline,
            feature_columns,
        }
    }

    /// A store with no artifacts; every prediction fails until restart.
    pub fn unavailable() -> Self {
        Self::from_parts(None, None, None)
    }

    /// The trained classifier, if it loaded.
    pub fn classifier(&self) -> Option<&GbtModel> {
        self.classifier.as_ref()
    }

    /// Precomputed mean of every reference-table column, if the table
    /// loaded. Cached for the process lifetime.
    pub fn baseline(&self) -> Option<&HashMap<String, f64>> {
        self.baseline.as_ref()
    }

    /// Ordered feature schema expected by the classifier, if it loaded.
    pub fn feature_columns(&self) -> Option<&[String]> {
        self.feature_columns.as_deref()
    }

    /// Whether the classifier artifact loaded; drives the health endpoint.
    pub fn model_loaded(&self) -> bool {
        self.classifier.is_some()
    }

    /// Whether all three artifacts are present and predictions can run.
    pub fn is_ready(&self) -> bool {
        self.classifier.is_some() && self.baseline.is_some() && self.feature_columns.is_some()
    }
}

fn load_feature_columns(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
