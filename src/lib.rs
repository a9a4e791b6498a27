// This file allows the components to be used as a library as well
pub mod audit;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod response;
pub mod rsa_service;
pub mod state;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

// Re-export important types for easier use
pub use audit::{ErrorLog, FileLog, TracingLog};
pub use config::Config;
pub use error::ServiceError;
pub use models::{ErrorEvent, ErrorKind, OperationRequest, OperationResult};
pub use rsa_service::{CryptoError, KeyMaterial, RsaService};
pub use state::AppState;

/// Builds the application with routes.
pub fn router(state: Arc<AppState>, body_limit: usize) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/encrypt", post(handlers::encrypt))
        .route("/decrypt", post(handlers::decrypt))
        .route("/health", get(handlers::health))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
