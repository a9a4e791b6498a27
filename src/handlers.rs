use axum::{
    Json,
    body::Bytes,
    extract::{State, rejection::BytesRejection},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::error::ServiceError;
use crate::models::{HealthResponse, OperationRequest, OperationResult};
use crate::response::PlainTextResponse;
use crate::rsa_service::RsaService;
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Encrypt,
    Decrypt,
}

impl Operation {
    fn apply(self, rsa: &RsaService, data: &str) -> Result<OperationResult, ServiceError> {
        let out = match self {
            Operation::Encrypt => rsa.encrypt(data)?,
            Operation::Decrypt => rsa.decrypt(data)?,
        };
        Ok(OperationResult(out))
    }
}

pub async fn root() -> &'static str {
    "RSA Encryption Service API\n\nEndpoints:\n- POST /encrypt: Encrypt {\"data\": \"<text>\"}\n- POST /decrypt: Decrypt {\"data\": \"<base64>\"}\n- GET /health: Service health"
}

// Handler to encrypt the `data` field with the public key
pub async fn encrypt(
    State(state): State<Arc<AppState>>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    handle(&state, Operation::Encrypt, body).await
}

// Handler to decrypt the base64 `data` field with the private key
pub async fn decrypt(
    State(state): State<Arc<AppState>>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    handle(&state, Operation::Decrypt, body).await
}

/// Decode, transform, respond. Failures are logged once, then answered.
///
/// A body the framework could not buffer (over the size limit, or a broken
/// stream) is answered through the same failure path as a crypto error.
pub async fn handle(
    state: &AppState,
    op: Operation,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let outcome = match body {
        Ok(body) => run(state, op, &body).await,
        Err(rejection) => Err(ServiceError::Internal(format!(
            "failed to read request body: {}",
            rejection.body_text()
        ))),
    };

    let response = match outcome {
        Ok(result) => PlainTextResponse::success(result, state.server_name.clone()),
        Err(e) => {
            state.log.record_event("ERROR", &e.to_event());
            PlainTextResponse::failure(&e, state.server_name.clone())
        }
    };
    response.into_response()
}

pub async fn run(
    state: &AppState,
    op: Operation,
    body: &[u8],
) -> Result<OperationResult, ServiceError> {
    let request = OperationRequest::from_body(body)?;

    // openssl work is blocking and serialized, keep it off the async workers
    let rsa = Arc::clone(&state.rsa);
    tokio::task::spawn_blocking(move || op.apply(&rsa, &request.data))
        .await
        .map_err(|e| ServiceError::Internal(format!("crypto worker failed: {}", e)))?
}

// Service health check
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        uptime_seconds: state.started.elapsed().as_secs(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
