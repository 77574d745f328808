//! Application state for the diagnosis server
//!
//! Everything here is read-only after startup and shared by all requests.

use std::sync::Arc;

use crate::dataset::ClassRegistry;
use crate::inference::{Classifier, DiagnosisPipeline, PreprocessConfig, Preprocessor};
use crate::utils::error::{Error, Result};

/// Shared application state
pub struct AppState {
    /// Loaded classifier, `None` if no model is available
    pub classifier: Option<Arc<dyn Classifier>>,
    /// Class labels indexed by model output position
    pub registry: Arc<ClassRegistry>,
    /// Preprocessing applied to every upload
    pub preprocessor: Preprocessor,
}

impl AppState {
    pub fn new(
        classifier: Option<Arc<dyn Classifier>>,
        registry: ClassRegistry,
        preprocess: PreprocessConfig,
    ) -> Self {
        Self {
            classifier,
            registry: Arc::new(registry),
            preprocessor: Preprocessor::new(preprocess),
        }
    }

    pub fn model_loaded(&self) -> bool {
        self.classifier.is_some()
    }

    pub fn num_classes(&self) -> usize {
        self.registry.len()
    }

    /// Pipeline for one request; fails if the model or classes are missing
    pub fn pipeline(&self) -> Result<DiagnosisPipeline> {
        let classifier = self.classifier.clone().ok_or(Error::ModelNotLoaded)?;
        if self.registry.is_empty() {
            return Err(Error::ClassesNotLoaded);
        }
        Ok(DiagnosisPipeline::new(
            self.preprocessor.clone(),
            classifier,
            Arc::clone(&self.registry),
        ))
    }
}

pub type SharedState = Arc<AppState>;
