use serde::Serialize;
use serde_json::Value;

use crate::error::ServiceError;

// Request/Response models for the RSA endpoints

/// The single field read from an encrypt or decrypt request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationRequest {
    pub data: String,
}

impl OperationRequest {
    /// Decodes `{"data": "<string>"}` from a raw request body.
    ///
    /// Only syntax and the presence/type of `data` are checked here; size and
    /// encoding problems surface later from the RSA transform.
    pub fn from_body(body: &[u8]) -> Result<Self, ServiceError> {
        let parsed: Value = serde_json::from_slice(body)
            .map_err(|e| ServiceError::MalformedPayload(e.to_string()))?;

        match parsed.get("data") {
            Some(Value::String(data)) => Ok(Self { data: data.clone() }),
            Some(other) => Err(ServiceError::MissingOrWrongTypeField(format!(
                "field `data` must be a string, found {}",
                json_type(other)
            ))),
            None => Err(ServiceError::MissingOrWrongTypeField(
                "missing field `data`".to_string(),
            )),
        }
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Base64 ciphertext for encrypt, recovered plaintext for decrypt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationResult(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MalformedPayload,
    MissingOrWrongTypeField,
    CryptoOrServerFailure,
}

/// What a failed request hands to the error log. The timestamp belongs to the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorEvent {
    pub kind: ErrorKind,
    pub message: String,
}

// Model for service health
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_seconds: u64,
    pub version: String,
}
