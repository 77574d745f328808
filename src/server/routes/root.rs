//! API information endpoint

use axum::{extract::State, Json};
use serde::Serialize;

use crate::server::state::SharedState;
use crate::API_VERSION;

#[derive(Debug, Serialize)]
pub struct Endpoints {
    pub health: &'static str,
    pub predict: &'static str,
}

#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub success: bool,
    pub message: &'static str,
    pub version: &'static str,
    pub endpoints: Endpoints,
    pub status: &'static str,
    pub model_loaded: bool,
    pub num_classes: usize,
}

/// GET / - API information
pub async fn index(State(state): State<SharedState>) -> Json<RootResponse> {
    Json(RootResponse {
        success: true,
        message: "Plant Disease Detection API",
        version: API_VERSION,
        endpoints: Endpoints {
            health: "/api/health",
            predict: "/api/predict",
        },
        status: "online",
        model_loaded: state.model_loaded(),
        num_classes: state.num_classes(),
    })
}
