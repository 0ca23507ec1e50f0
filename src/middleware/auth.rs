use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::Response,
    Json,
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

use crate::api::models::ErrorResponse;
use crate::state::AppState;

/// Claims carried by the session token the identity provider issues.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionClaims {
    pub sub: String,
    pub email: String,
    pub name: String,
    pub exp: i64,
    pub iat: i64,
}

/// Identity consumed by the handlers: email plus display name. Everything
/// else about the session stays the identity provider's business.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub email: String,
    pub name: String,
}

pub const JWT_ALGORITHM: Algorithm = Algorithm::HS256;

fn unauthorized(error: &str, message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse {
            error: error.to_string(),
            message: message.to_string(),
        }),
    )
}

/// Validates the bearer token and stashes a [`CurrentUser`] in the request
/// extensions for the handlers.
pub async fn require_session(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or_else(|| {
            warn!("Missing Authorization header");
            unauthorized(
                "missing_authorization",
                "Authentication required. Please provide a valid Bearer token.",
            )
        })?;

    let token = auth_header.strip_prefix("Bearer ").map(str::trim).ok_or_else(|| {
        warn!("Invalid Authorization header format");
        unauthorized(
            "invalid_authorization",
            "Authorization header must start with 'Bearer '.",
        )
    })?;
    if token.is_empty() {
        return Err(unauthorized("empty_token", "Please provide a valid session token."));
    }

    let decoding_key = DecodingKey::from_secret(state.auth.jwt_secret.as_bytes());
    let validation = Validation::new(JWT_ALGORITHM);

    let token_data = decode::<SessionClaims>(token, &decoding_key, &validation).map_err(|e| {
        warn!("Session token validation failed: {}", e);
        match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => unauthorized(
                "token_expired",
                "Your session has expired. Please log in again.",
            ),
            _ => unauthorized(
                "invalid_token",
                "Could not validate credentials. Please log in again.",
            ),
        }
    })?;

    let claims = token_data.claims;
    request.extensions_mut().insert(CurrentUser {
        email: claims.email,
        name: claims.name,
    });

    Ok(next.run(request).await)
}
