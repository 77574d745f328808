//! Inference module: preprocessing, classification and result derivation
//!
//! This module provides:
//! - Image preprocessing into a fixed-shape NHWC tensor
//! - The `Classifier` seam and its Burn implementation
//! - Derivation of the structured diagnosis from class probabilities
//! - `DiagnosisPipeline`, which chains the three stages for one upload

pub mod classifier;
pub mod diagnosis;
pub mod preprocess;

use std::sync::Arc;
use std::time::Instant;

use tracing::debug;

use crate::dataset::ClassRegistry;
use crate::utils::error::{Error, Result};

// Re-export main types for convenience
pub use classifier::{BurnClassifier, Classifier};
pub use diagnosis::{recommendations, Diagnosis, Severity, TopPrediction};
pub use preprocess::{ImageTensor, PreprocessConfig, Preprocessor};

/// Preprocess, classify and derive a diagnosis for one image
#[derive(Clone)]
pub struct DiagnosisPipeline {
    preprocessor: Preprocessor,
    classifier: Arc<dyn Classifier>,
    registry: Arc<ClassRegistry>,
}

impl DiagnosisPipeline {
    pub fn new(
        preprocessor: Preprocessor,
        classifier: Arc<dyn Classifier>,
        registry: Arc<ClassRegistry>,
    ) -> Self {
        Self {
            preprocessor,
            classifier,
            registry,
        }
    }

    /// Run the whole pipeline on raw image bytes.
    ///
    /// Preprocessing errors surface as `PreprocessingFailed`; classifier and
    /// derivation errors as `InferenceFailed`.
    pub fn diagnose(&self, bytes: &[u8]) -> Result<Diagnosis> {
        let start = Instant::now();

        let input = self.preprocessor.preprocess_bytes(bytes)?;
        let probabilities = self
            .classifier
            .predict(&input)
            .map_err(into_inference_error)?;
        let diagnosis = Diagnosis::from_probabilities(&probabilities, &self.registry)
            .map_err(into_inference_error)?;

        debug!(
            "Diagnosed {} ({:.2}%) in {:.2} ms",
            diagnosis.class_name,
            diagnosis.confidence,
            start.elapsed().as_secs_f64() * 1000.0
        );

        Ok(diagnosis)
    }

    pub fn registry(&self) -> &ClassRegistry {
        &self.registry
    }
}

fn into_inference_error(err: Error) -> Error {
    match err {
        Error::InferenceFailed(_) => err,
        other => Error::InferenceFailed(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    struct FixedClassifier(Vec<f32>);

    impl Classifier for FixedClassifier {
        fn predict(&self, input: &ImageTensor) -> Result<Vec<f32>> {
            assert_eq!(input.dims(), [1, 128, 128, 3]);
            Ok(self.0.clone())
        }

        fn num_classes(&self) -> usize {
            self.0.len()
        }
    }

    struct BrokenClassifier;

    impl Classifier for BrokenClassifier {
        fn predict(&self, _input: &ImageTensor) -> Result<Vec<f32>> {
            Err(Error::Model("device lost".to_string()))
        }

        fn num_classes(&self) -> usize {
            38
        }
    }

    fn png() -> Vec<u8> {
        let img = RgbImage::from_pixel(32, 32, Rgb([40, 160, 40]));
        let mut buffer = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut buffer, ImageFormat::Png)
            .unwrap();
        buffer.into_inner()
    }

    fn pipeline(classifier: Arc<dyn Classifier>) -> DiagnosisPipeline {
        DiagnosisPipeline::new(
            Preprocessor::default(),
            classifier,
            Arc::new(ClassRegistry::builtin()),
        )
    }

    #[test]
    fn test_diagnose() {
        let mut probs = vec![0.0; 38];
        probs[3] = 1.0;
        let diagnosis = pipeline(Arc::new(FixedClassifier(probs)))
            .diagnose(&png())
            .unwrap();
        assert_eq!(diagnosis.class_name, "Apple___healthy");
        assert_eq!(diagnosis.severity, Severity::Healthy);
    }

    #[test]
    fn test_preprocessing_error_kept_distinct() {
        let err = pipeline(Arc::new(BrokenClassifier))
            .diagnose(b"not an image")
            .unwrap_err();
        assert!(matches!(err, Error::PreprocessingFailed(_)));
    }

    #[test]
    fn test_classifier_error_is_inference_failure() {
        let err = pipeline(Arc::new(BrokenClassifier))
            .diagnose(&png())
            .unwrap_err();
        assert!(matches!(err, Error::InferenceFailed(_)));
    }

    #[test]
    fn test_wrong_output_length_is_inference_failure() {
        let err = pipeline(Arc::new(FixedClassifier(vec![0.5, 0.5])))
            .diagnose(&png())
            .unwrap_err();
        assert!(matches!(err, Error::InferenceFailed(_)));
    }
}
