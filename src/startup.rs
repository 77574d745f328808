//! Startup loading
//!
//! The class registry and the model are loaded once before anything is
//! served. Any error here should stop the process.

use std::sync::Arc;

use tracing::info;

use crate::backend::{backend_name, default_device, InferenceBackend};
use crate::config::ServerConfig;
use crate::dataset::ClassRegistry;
use crate::inference::{BurnClassifier, Classifier};
use crate::model::PlantClassifierConfig;
use crate::utils::error::{Error, Result};

/// Resolve the class registry from the configured sources
pub fn load_registry(config: &ServerConfig) -> Result<ClassRegistry> {
    let registry = ClassRegistry::load(&config.class_source())?;
    if registry.is_empty() {
        return Err(Error::Classes("class registry is empty".to_string()));
    }
    Ok(registry)
}

/// The model must emit one probability per registered class
pub fn ensure_compatible(classifier: &dyn Classifier, registry: &ClassRegistry) -> Result<()> {
    if classifier.num_classes() != registry.len() {
        return Err(Error::Model(format!(
            "model has {} outputs but {} classes are registered",
            classifier.num_classes(),
            registry.len()
        )));
    }
    Ok(())
}

/// Load the trained model sized for `registry` on the default backend
pub fn load_classifier(
    config: &ServerConfig,
    registry: &ClassRegistry,
) -> Result<Arc<dyn Classifier>> {
    let model_config = PlantClassifierConfig::new().with_num_classes(registry.len());

    info!("Loading model on {}", backend_name());
    let classifier = BurnClassifier::<InferenceBackend>::load(
        &config.model_source(),
        &model_config,
        default_device(),
    )?;
    ensure_compatible(&classifier, registry)?;

    Ok(Arc::new(classifier))
}
