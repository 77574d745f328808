//! HTTP server
//!
//! Routes:
//! - `GET /` API information
//! - `GET /api/health` health check
//! - `POST /api/predict` multipart upload (field `image`) -> diagnosis

pub mod error;
pub mod routes;
pub mod state;

use std::net::SocketAddr;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::ServerConfig;
use crate::utils::error::{Error, Result};

pub use error::ApiError;
pub use state::{AppState, SharedState};

/// CORS layer for the configured origins; `*` allows any origin
pub fn cors_layer(config: &ServerConfig) -> Result<CorsLayer> {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if config.allows_any_origin() {
        return Ok(layer.allow_origin(Any));
    }

    let origins = config
        .allowed_origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin)
                .map_err(|e| Error::Config(format!("invalid origin '{}': {}", origin, e)))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(layer.allow_origin(AllowOrigin::list(origins)))
}

/// Build the application router
pub fn build_router(state: SharedState, config: &ServerConfig) -> Result<Router> {
    let router = Router::new()
        .route("/", get(routes::root::index))
        .route("/api/health", get(routes::health::health_check))
        .route("/api/predict", post(routes::predict::predict))
        .with_state(state)
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(config)?);

    Ok(router)
}

/// Bind and serve until the process exits
pub async fn serve(state: SharedState, config: &ServerConfig) -> Result<()> {
    let app = build_router(state, config)?;

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| Error::Config(format!("invalid bind address: {}", e)))?;
    info!("Starting server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
