use super::AppState;
use crate::domain::identity::Identity;
use crate::error::ShopError;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use tracing::warn;

/// Authenticates the caller from the `Authorization: Bearer` header.
///
/// Handlers that take an `Identity` argument reject anonymous requests with 401.
impl FromRequestParts<AppState> for Identity {
    type Rejection = ShopError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(header) = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
        else {
            return Err(ShopError::Unauthorized(
                "No authentication token provided".to_string(),
            ));
        };

        let token = header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ShopError::Unauthorized("Invalid authorization header".to_string()))?;

        state.identity.verify(token).inspect_err(|e| {
            warn!(uri = %parts.uri, error = %e, "authentication failed");
        })
    }
}
