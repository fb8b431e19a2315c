//! Application state for the crop stress server
//!
//! The state is constructed once before the listener binds and is read-only
//! afterwards: handlers share it through an `Arc` with no locks, since no
//! request mutates it.

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::model::store::ModelStore;

/// Server configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Directory containing the model artifacts
    pub models_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            models_dir: PathBuf::from("models"),
        }
    }
}

/// Shared application state
pub struct AppState {
    /// Server configuration
    pub config: ServerConfig,
    /// Model artifacts, loaded once at startup
    pub store: ModelStore,
}

impl AppState {
    /// Load the model store from the configured models directory.
    pub fn new(config: ServerConfig) -> Self {
        let store = ModelStore::load(&config.models_dir);
        Self { config, store }
    }

    /// Build state around an existing store.
    pub fn with_store(config: ServerConfig, store: ModelStore) -> Self {
        Self { config, store }
    }
}

pub type SharedState = Arc<AppState>;
