use axum::http::StatusCode;
use thiserror::Error;

use crate::models::{ErrorEvent, ErrorKind};
use crate::rsa_service::CryptoError;

/// Everything that can go wrong while serving one encrypt/decrypt request.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("JSON Parsing error: {0}")]
    MalformedPayload(String),

    #[error("JSON Data access error: {0}")]
    MissingOrWrongTypeField(String),

    #[error("Server error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("Server error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::MalformedPayload(_) => ErrorKind::MalformedPayload,
            ServiceError::MissingOrWrongTypeField(_) => ErrorKind::MissingOrWrongTypeField,
            ServiceError::Crypto(_) | ServiceError::Internal(_) => ErrorKind::CryptoOrServerFailure,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::MalformedPayload | ErrorKind::MissingOrWrongTypeField => {
                StatusCode::BAD_REQUEST
            }
            ErrorKind::CryptoOrServerFailure => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn to_event(&self) -> ErrorEvent {
        ErrorEvent {
            kind: self.kind(),
            message: self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_errors_are_bad_request() {
        let err = ServiceError::MalformedPayload("expected value".into());
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "JSON Parsing error: expected value");

        let err = ServiceError::MissingOrWrongTypeField("missing field `data`".into());
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.kind(), ErrorKind::MissingOrWrongTypeField);
    }

    #[test]
    fn crypto_errors_are_internal() {
        let err = ServiceError::from(CryptoError::Decryption);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Server error: decryption failed");

        let err = ServiceError::Internal("worker panicked".into());
        assert_eq!(err.kind(), ErrorKind::CryptoOrServerFailure);
    }

    #[test]
    fn event_carries_kind_and_message() {
        let event = ServiceError::from(CryptoError::TooLarge(300, 214)).to_event();
        assert_eq!(event.kind, ErrorKind::CryptoOrServerFailure);
        assert_eq!(
            event.message,
            "Server error: plaintext too large: 300 bytes (max: 214 bytes)"
        );
    }
}
