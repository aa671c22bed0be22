//! Error → HTTP response mapping.
//!
//! This is the outermost boundary: every error is logged here with its full
//! cause, and the response body only ever carries
//! [`CertVerifyError::public_message`].

use crate::error::{CertVerifyError, ErrorKind};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use std::any::Any;
use tracing::{error, warn};

/// JSON body of every failed request.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
}

/// A [`CertVerifyError`] on its way out of a handler.
#[derive(Debug)]
pub struct ApiError(pub CertVerifyError);

impl From<CertVerifyError> for ApiError {
    fn from(e: CertVerifyError) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        match err.kind() {
            ErrorKind::Input => warn!("Rejected request: {}", err),
            ErrorKind::Upstream => warn!("Upstream model failure: {}", err),
            ErrorKind::Internal => error!("Internal failure: {}", err),
        }

        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ErrorBody {
            detail: err.public_message().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Response for a panic caught by `CatchPanicLayer`.
pub fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = payload
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| payload.downcast_ref::<&str>().copied())
        .unwrap_or("<non-string panic payload>");
    error!("Handler panicked: {}", detail);

    ApiError(CertVerifyError::Internal(detail.to_string())).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_error_kind() {
        let cases = [
            (
                CertVerifyError::InvalidMimeType { mimetype: None },
                StatusCode::BAD_REQUEST,
            ),
            (CertVerifyError::EmptyModelReply, StatusCode::BAD_GATEWAY),
            (
                CertVerifyError::LlmApiError {
                    message: "boom".into(),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError(err).into_response().status(), status);
        }
    }

    #[test]
    fn panic_maps_to_500() {
        let resp = panic_response(Box::new("index out of bounds"));
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
