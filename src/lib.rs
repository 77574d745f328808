//! # Plant Disease Diagnosis
//!
//! An HTTP service that classifies an uploaded leaf image with a Burn CNN and
//! returns a structured diagnosis: crop, disease, severity, confidence,
//! treatment advice and the top-5 alternative classes.
//!
//! ## Modules
//!
//! - `dataset`: Class labels and the class registry
//! - `model`: CNN architecture and weight loading
//! - `inference`: Preprocessing, the classifier seam and result derivation
//! - `server`: axum routes, shared state and the JSON error envelope
//! - `config`: Server configuration
//! - `startup`: Registry and model loading with fail-fast checks
//! - `utils`: Error type and logging
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use plant_diagnosis::{ClassRegistry, DiagnosisPipeline, Preprocessor};
//!
//! let pipeline = DiagnosisPipeline::new(
//!     Preprocessor::default(),
//!     Arc::new(classifier),
//!     Arc::new(ClassRegistry::builtin()),
//! );
//! let diagnosis = pipeline.diagnose(&std::fs::read("leaf.jpg")?)?;
//! println!("{} / {} ({:.2}%)", diagnosis.crop, diagnosis.disease, diagnosis.confidence);
//! ```

pub mod backend;
pub mod config;
pub mod dataset;
pub mod inference;
pub mod model;
pub mod server;
pub mod startup;
pub mod utils;

// Re-export commonly used items for convenience
pub use config::ServerConfig;
pub use dataset::{parse_label, ClassRegistry, ClassSource, ParsedLabel};
pub use inference::{
    BurnClassifier, Classifier, Diagnosis, DiagnosisPipeline, ImageTensor, PreprocessConfig,
    Preprocessor, Severity, TopPrediction,
};
pub use model::{ModelSource, PlantClassifier, PlantClassifierConfig};
pub use utils::error::{Error, Result};

/// Default model input size (square)
pub const IMAGE_SIZE: u32 = 128;

/// API version reported by `GET /`
pub const API_VERSION: &str = "1.0.0";

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
