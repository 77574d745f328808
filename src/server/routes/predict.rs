//! Prediction endpoint

use axum::{
    body::Bytes,
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tracing::info;

use crate::inference::Diagnosis;
use crate::server::error::ApiError;
use crate::server::state::SharedState;
use crate::utils::error::Error;

/// Name of the multipart field carrying the upload
pub const IMAGE_FIELD: &str = "image";

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub success: bool,
    #[serde(flatten)]
    pub diagnosis: Diagnosis,
}

/// POST /api/predict - Diagnose an uploaded leaf image
pub async fn predict(
    State(state): State<SharedState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    let pipeline = state.pipeline()?;

    // A body that is not multipart carries no image field
    let mut multipart = multipart.map_err(|_| Error::MissingImage)?;
    let image = read_image_field(&mut multipart).await?;

    let diagnosis = tokio::task::spawn_blocking(move || pipeline.diagnose(&image))
        .await
        .map_err(|e| Error::Unhandled(e.to_string()))??;

    info!(
        "Predicted {} (index {}) with {:.2}% confidence",
        diagnosis.class_name, diagnosis.predicted_index, diagnosis.confidence
    );

    Ok(Json(PredictResponse {
        success: true,
        diagnosis,
    }))
}

/// Find the `image` file part. Non-file parts with that name are skipped.
async fn read_image_field(multipart: &mut Multipart) -> Result<Bytes, Error> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(upload_error)?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let Some(file_name) = field.file_name() else {
            continue;
        };
        if file_name.is_empty() {
            return Err(Error::EmptyFilename);
        }

        return field
            .bytes()
            .await
            .map_err(upload_error);
    }

    Err(Error::MissingImage)
}

fn upload_error(e: MultipartError) -> Error {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        Error::InvalidUpload("request body exceeds the upload size limit".to_string())
    } else {
        Error::InvalidUpload(e.body_text())
    }
}
