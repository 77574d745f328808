//! Classifier abstraction
//!
//! Request handlers only see `dyn Classifier`, so the Burn model can be
//! swapped for a stub in tests.

use std::sync::{Mutex, PoisonError};

use burn::tensor::{backend::Backend, Tensor, TensorData};

use super::preprocess::ImageTensor;
use crate::model::{load_model, ModelSource, PlantClassifier, PlantClassifierConfig};
use crate::utils::error::{Error, Result};

/// Something that maps a preprocessed image to class probabilities
pub trait Classifier: Send + Sync {
    /// Probability vector with one entry per class
    fn predict(&self, input: &ImageTensor) -> Result<Vec<f32>>;

    /// Length of the vectors returned by `predict`
    fn num_classes(&self) -> usize;
}

/// Classifier backed by the Burn CNN
pub struct BurnClassifier<B: Backend> {
    // Guarded so the model can be shared across request threads on every backend.
    model: Mutex<PlantClassifier<B>>,
    device: B::Device,
    num_classes: usize,
}

impl<B: Backend> BurnClassifier<B> {
    pub fn new(model: PlantClassifier<B>, device: B::Device) -> Self {
        let num_classes = model.num_classes();
        Self {
            model: Mutex::new(model),
            device,
            num_classes,
        }
    }

    /// Load trained weights (primary artifact, then fallback)
    pub fn load(
        source: &ModelSource,
        config: &PlantClassifierConfig,
        device: B::Device,
    ) -> Result<Self> {
        let model = load_model::<B>(source, config, &device)?;
        Ok(Self::new(model, device))
    }
}

impl<B: Backend> Classifier for BurnClassifier<B> {
    fn predict(&self, input: &ImageTensor) -> Result<Vec<f32>> {
        let data = TensorData::new(input.data().to_vec(), input.dims());
        let tensor = Tensor::<B, 4>::from_data(data, &self.device);

        // Weights are never mutated, so a poisoned lock is still usable
        let model = self.model.lock().unwrap_or_else(PoisonError::into_inner);
        let output = model.forward_softmax(tensor);

        let [batch, classes] = output.dims();
        if batch != 1 || classes != self.num_classes {
            return Err(Error::InferenceFailed(format!(
                "unexpected output shape [{}, {}]",
                batch, classes
            )));
        }

        output
            .into_data()
            .to_vec::<f32>()
            .map_err(|e| Error::InferenceFailed(format!("{:?}", e)))
    }

    fn num_classes(&self) -> usize {
        self.num_classes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    #[test]
    fn test_burn_classifier_predict() {
        let device = Default::default();
        let config = PlantClassifierConfig::new()
            .with_num_classes(6)
            .with_base_filters(2);
        let model = PlantClassifier::<NdArray>::new(&config, &device);
        let classifier = BurnClassifier::new(model, device);

        let input = ImageTensor::new([1, 16, 16, 3], vec![128.0; 16 * 16 * 3]).unwrap();
        let probs = classifier.predict(&input).unwrap();

        assert_eq!(classifier.num_classes(), 6);
        assert_eq!(probs.len(), 6);
        assert!(probs.iter().all(|p| p.is_finite() && *p >= 0.0));
        assert!((probs.iter().sum::<f32>() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_predict_after_poisoned_lock() {
        let device = Default::default();
        let config = PlantClassifierConfig::new()
            .with_num_classes(4)
            .with_base_filters(2);
        let model = PlantClassifier::<NdArray>::new(&config, &device);
        let classifier = BurnClassifier::new(model, device);

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = classifier.model.lock().unwrap();
            panic!("forward pass failed");
        }));
        assert!(result.is_err());
        assert!(classifier.model.is_poisoned());

        let input = ImageTensor::new([1, 16, 16, 3], vec![64.0; 16 * 16 * 3]).unwrap();
        let probs = classifier.predict(&input).unwrap();
        assert_eq!(probs.len(), 4);
    }
}
