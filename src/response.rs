use axum::{
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::error::ServiceError;
use crate::models::OperationResult;

/// The one shape every encrypt/decrypt response takes: a status and a plain-text body.
pub struct PlainTextResponse {
    pub status: StatusCode,
    pub body: String,
    pub server: HeaderValue,
}

impl PlainTextResponse {
    pub fn success(result: OperationResult, server: HeaderValue) -> Self {
        Self {
            status: StatusCode::OK,
            body: result.0,
            server,
        }
    }

    pub fn failure(err: &ServiceError, server: HeaderValue) -> Self {
        Self {
            status: err.status(),
            body: err.to_string(),
            server,
        }
    }
}

impl IntoResponse for PlainTextResponse {
    fn into_response(self) -> Response {
        let mut headers = HeaderMap::new();
        headers.insert(header::SERVER, self.server);
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain"),
        );
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(self.body.len()));

        (self.status, headers, self.body).into_response()
    }
}
