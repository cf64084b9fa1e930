//! Bearer-token authentication middleware
//!
//! Protected routes require `Authorization: Bearer <token>` signed by the
//! account controller's issuer. Verified claims are stored in the request
//! extensions for handlers that need the caller's identity.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use taskboard_core::services::TokenClaims;

use crate::http_error::HttpError;
use crate::AppState;

/// Reject requests without a valid bearer token
pub async fn require_bearer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, HttpError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| HttpError::unauthorized("Missing bearer token"))?;

    let claims: TokenClaims = state.accounts.tokens().verify(token).map_err(|e| {
        tracing::warn!(error = %e, path = %req.uri().path(), "rejected bearer token");
        HttpError::unauthorized("Invalid or expired token")
    })?;

    tracing::debug!(account_id = claims.id, "request authenticated");
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}
