//! Image preprocessing
//!
//! Turns uploaded image bytes into a single-image NHWC batch of shape
//! `[1, H, W, 3]`. Decoding works from an in-memory buffer, so there is no
//! temporary file to clean up on any path.

use image::{imageops::FilterType, DynamicImage};
use serde::{Deserialize, Serialize};

use crate::utils::error::{Error, Result};
use crate::IMAGE_SIZE;

/// Preprocessing parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PreprocessConfig {
    /// Target height in pixels
    pub height: u32,
    /// Target width in pixels
    pub width: u32,
    /// Multiplier applied to raw 0-255 channel values
    pub rescale: f32,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            height: IMAGE_SIZE,
            width: IMAGE_SIZE,
            rescale: 1.0,
        }
    }
}

impl PreprocessConfig {
    pub fn square(size: u32) -> Self {
        Self {
            height: size,
            width: size,
            ..Self::default()
        }
    }
}

/// A batch of one RGB image in NHWC layout
#[derive(Debug, Clone, PartialEq)]
pub struct ImageTensor {
    shape: [usize; 4],
    data: Vec<f32>,
}

impl ImageTensor {
    /// Wrap raw NHWC data; the length must match the shape
    pub fn new(shape: [usize; 4], data: Vec<f32>) -> Result<Self> {
        let expected: usize = shape.iter().product();
        if data.len() != expected {
            return Err(Error::PreprocessingFailed(format!(
                "tensor data has {} values, shape {:?} needs {}",
                data.len(),
                shape,
                expected
            )));
        }
        Ok(Self { shape, data })
    }

    /// `[batch, height, width, channels]`
    pub fn dims(&self) -> [usize; 4] {
        self.shape
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|v| v.is_finite())
    }
}

/// Preprocessing pipeline: decode, resize, RGB, batch
#[derive(Debug, Clone, Default)]
pub struct Preprocessor {
    config: PreprocessConfig,
}

impl Preprocessor {
    pub fn new(config: PreprocessConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PreprocessConfig {
        &self.config
    }

    /// Decode and preprocess an uploaded image
    pub fn preprocess_bytes(&self, bytes: &[u8]) -> Result<ImageTensor> {
        if bytes.is_empty() {
            return Err(Error::PreprocessingFailed("empty image data".to_string()));
        }
        let image = image::load_from_memory(bytes)?;
        self.preprocess(&image)
    }

    /// Preprocess an already decoded image
    pub fn preprocess(&self, image: &DynamicImage) -> Result<ImageTensor> {
        let PreprocessConfig {
            height,
            width,
            rescale,
        } = self.config;

        if height == 0 || width == 0 {
            return Err(Error::PreprocessingFailed(format!(
                "invalid target size {}x{}",
                width, height
            )));
        }
        if image.width() == 0 || image.height() == 0 {
            return Err(Error::PreprocessingFailed("image has no pixels".to_string()));
        }

        // Aspect ratio is not preserved
        let rgb = image
            .resize_exact(width, height, FilterType::Triangle)
            .to_rgb8();

        let data: Vec<f32> = rgb
            .as_raw()
            .iter()
            .map(|&channel| channel as f32 * rescale)
            .collect();

        ImageTensor::new([1, height as usize, width as usize, 3], data)
    }
}
