//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum.

use crate::config::environment::EnvironmentConfig;
use crate::repositories::SharedStore;
use crate::services::ManifestExporter;

#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    pub config: EnvironmentConfig,
    pub manifests: ManifestExporter,
}

impl AppState {
    pub fn new(store: SharedStore, config: EnvironmentConfig) -> Self {
        let manifests = ManifestExporter::new(config.manifest_dir.clone());
        Self {
            store,
            config,
            manifests,
        }
    }
}
