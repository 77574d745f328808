//! Error Handling Module
//!
//! Defines the error type shared by the diagnosis pipeline and the HTTP layer.
//! Uses thiserror for ergonomic error definitions.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for plant diagnosis operations
#[derive(Error, Debug)]
pub enum Error {
    /// No classifier is available to serve predictions
    #[error("Model not loaded")]
    ModelNotLoaded,

    /// The class registry is empty
    #[error("Class names not loaded")]
    ClassesNotLoaded,

    /// The request did not carry an `image` file part
    #[error("No image file uploaded")]
    MissingImage,

    /// The `image` file part had an empty filename
    #[error("No image file selected")]
    EmptyFilename,

    /// The multipart body could not be read
    #[error("Invalid upload: {0}")]
    InvalidUpload(String),

    /// Decoding or resizing the uploaded image failed
    #[error("Image preprocessing failed: {0}")]
    PreprocessingFailed(String),

    /// Running the classifier or deriving the result failed
    #[error("Prediction failed: {0}")]
    InferenceFailed(String),

    /// Catch-all for failures outside the pipeline stages
    #[error("Server error: {0}")]
    Unhandled(String),

    /// Class index lookup past the end of the registry
    #[error("Class index {index} out of range for {len} classes")]
    ClassIndexOutOfRange { index: usize, len: usize },

    /// Error loading the class registry
    #[error("Class registry error: {0}")]
    Classes(String),

    /// Error loading or running the model
    #[error("Model error: {0}")]
    Model(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Path not found
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether the failure was caused by the client's request
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::MissingImage
                | Error::EmptyFilename
                | Error::InvalidUpload(_)
                | Error::PreprocessingFailed(_)
        )
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::PreprocessingFailed(err.to_string())
    }
}

/// Convenience Result type for plant diagnosis operations
pub type Result<T> = std::result::Result<T, Error>;
