//! Model module for the Burn CNN used to classify leaf images
//!
//! This module provides:
//! - The CNN architecture and its configuration
//! - Loading trained weights from disk, with a fallback artifact
//!
//! ## Artifacts
//!
//! The primary artifact is written by Burn's `CompactRecorder`
//! (half precision, gzip'd MessagePack). The fallback artifact uses the
//! full-precision `NamedMpkFileRecorder`. Both recorders append their own
//! file extension to the configured path.

pub mod cnn;

use std::path::PathBuf;

use burn::module::Module;
use burn::record::{CompactRecorder, FullPrecisionSettings, NamedMpkFileRecorder};
use burn::tensor::backend::Backend;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::utils::error::{Error, Result};

pub use cnn::{PlantClassifier, PlantClassifierConfig};

/// Paths of the trained model artifacts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSource {
    /// Primary artifact (compact recorder)
    pub path: PathBuf,
    /// Tried when the primary artifact fails to load (full-precision recorder)
    pub fallback_path: Option<PathBuf>,
}

/// Load trained weights into a freshly initialized model.
///
/// Tries the primary artifact first, then the fallback. Both failing is fatal.
pub fn load_model<B: Backend>(
    source: &ModelSource,
    config: &PlantClassifierConfig,
    device: &B::Device,
) -> Result<PlantClassifier<B>> {
    let primary = PlantClassifier::<B>::new(config, device)
        .load_file(source.path.clone(), &CompactRecorder::new(), device);

    let primary_err = match primary {
        Ok(model) => {
            info!("Model loaded from {:?}", source.path);
            return Ok(model);
        }
        Err(e) => {
            warn!("Failed to load model from {:?}: {:?}", source.path, e);
            format!("{:?}", e)
        }
    };

    let Some(fallback) = &source.fallback_path else {
        return Err(Error::Model(format!(
            "failed to load {}: {}",
            source.path.display(),
            primary_err
        )));
    };

    let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();
    match PlantClassifier::<B>::new(config, device).load_file(fallback.clone(), &recorder, device) {
        Ok(model) => {
            info!("Fallback: model loaded from {:?}", fallback);
            Ok(model)
        }
        Err(e) => Err(Error::Model(format!(
            "failed to load {} ({}) and fallback {} ({:?})",
            source.path.display(),
            primary_err,
            fallback.display(),
            e
        ))),
    }
}
