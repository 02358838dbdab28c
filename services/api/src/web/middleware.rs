//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::debug;

use crate::web::error::HttpError;
use crate::web::state::AppState;
use crate::web::token;

/// Middleware that validates the bearer token and extracts the caller's
/// identity.
///
/// If valid, inserts the [`udaan_core::domain::Identity`] into request
/// extensions for handlers to use. If invalid or missing, returns 401.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, HttpError> {
    // 1. Extract the Authorization header
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| HttpError::unauthorized("Missing Authorization header"))?;

    // 2. Parse the bearer token
    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| HttpError::unauthorized("Expected 'Bearer <token>'"))?;

    // 3. Resolve the token to an identity
    let identity = token::verify(token, &state.config.jwt_secret).map_err(|e| {
        debug!("rejected bearer token: {}", e);
        HttpError::unauthorized("Invalid or expired token")
    })?;

    // 4. Insert the identity into request extensions
    req.extensions_mut().insert(identity);

    // 5. Continue to the handler
    Ok(next.run(req).await)
}
