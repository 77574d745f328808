//! Health check endpoint

use axum::{extract::State, Json};
use chrono::Utc;
use serde::Serialize;

use crate::server::state::SharedState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub success: bool,
    pub message: &'static str,
    pub model_loaded: bool,
    pub class_names_loaded: bool,
    pub num_classes: usize,
    pub timestamp: String,
}

/// GET /api/health - Health check endpoint
pub async fn health_check(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        success: true,
        message: "Plant Disease Detection API is running",
        model_loaded: state.model_loaded(),
        class_names_loaded: !state.registry.is_empty(),
        num_classes: state.num_classes(),
        timestamp: Utc::now().format("%Y-%m-%dT%H:%M:%S").to_string(),
    })
}
