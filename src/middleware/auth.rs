use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use thiserror::Error;

use crate::app::AppState;
use crate::auth::{Identity, TokenService};
use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Authentication token is required")]
    MissingToken,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Invalid email or password")]
    InvalidCredentials,
}

/// Identity of the caller, verified from the bearer token.
///
/// Taking this as a handler argument makes the route protected: the handler body
/// only runs once the token has passed signature and expiration checks.
#[derive(Debug, Clone)]
pub struct Authenticated(pub Identity);

#[async_trait]
impl FromRequestParts<AppState> for Authenticated {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authorize(&parts.headers, &state.tokens).map(Authenticated)
    }
}

/// Verify the bearer token in `headers` and return the caller's identity
pub fn authorize(headers: &HeaderMap, tokens: &TokenService) -> Result<Identity, ApiError> {
    let token = extract_bearer_token(headers).ok_or_else(|| {
        tracing::info!("Rejected request without bearer token");
        AuthError::MissingToken
    })?;

    let identity = tokens.verify(token)?;
    tracing::debug!("Bearer token verified for user {}", identity.user_id);

    Ok(identity)
}

/// Token from `Authorization: Bearer <token>`, if one is present
fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    let auth_str = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = auth_str.strip_prefix("Bearer ")?.trim();

    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}
