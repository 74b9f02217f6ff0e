use crate::error::{FieldError, ShopError};
use axum::Json;
use axum::extract::FromRequest;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::{error, warn};

/// JSON body extractor whose rejections use the same error body as every other failure.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ShopError))]
pub struct ApiJson<T>(pub T);

impl From<JsonRejection> for ShopError {
    fn from(rejection: JsonRejection) -> Self {
        ShopError::invalid("body", rejection.body_text())
    }
}

/// Error response body.
///
/// ```json
/// { "kind": "InsufficientStock", "message": "Insufficient stock for Mug. Available: 1, Requested: 2" }
/// ```
#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    kind: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<&'a [FieldError]>,
}

impl IntoResponse for ShopError {
    fn into_response(self) -> Response {
        let status = match &self {
            ShopError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ShopError::NotFound { .. } => StatusCode::NOT_FOUND,
            ShopError::InsufficientStock { .. } => StatusCode::BAD_REQUEST,
            ShopError::Forbidden(_) => StatusCode::FORBIDDEN,
            ShopError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ShopError::Timeout => StatusCode::SERVICE_UNAVAILABLE,
            ShopError::RequestTimeout => StatusCode::REQUEST_TIMEOUT,
            ShopError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = match &self {
            ShopError::InternalError(e) => {
                error!(error = %e, "internal error");
                "Internal server error".to_string()
            }
            ShopError::Timeout => {
                warn!("store call timed out");
                self.to_string()
            }
            ShopError::Unauthorized(reason) => reason.clone(),
            other => other.to_string(),
        };

        let errors = match &self {
            ShopError::ValidationError(fields) => Some(fields.as_slice()),
            _ => None,
        };

        let body = ErrorBody {
            kind: self.kind(),
            message,
            errors,
        };
        (status, Json(body)).into_response()
    }
}

/// Replaces the bare 408 produced by the request timeout layer with the common error body.
pub async fn timeout_body(response: Response) -> Response {
    if response.status() == StatusCode::REQUEST_TIMEOUT {
        ShopError::RequestTimeout.into_response()
    } else {
        response
    }
}
