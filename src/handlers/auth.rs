use axum::{extract::State, Json};
use serde::Serialize;

use crate::app::AppState;
use crate::auth::{password, Identity};
use crate::database::UserView;
use crate::error::{ApiError, ApiResult};
use crate::middleware::{AuthError, Validated};
use crate::validation::LoginCredentials;

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
    pub token: String,
    pub user: UserView,
}

/// POST /login - Authenticate with email and password and receive a JWT
///
/// Unknown emails and wrong passwords produce the same 401 body.
pub async fn login(
    State(state): State<AppState>,
    Validated(credentials): Validated<LoginCredentials>,
) -> ApiResult<Json<LoginResponse>> {
    let LoginCredentials { email, password } = credentials;

    let user = state.users.find_user_by_email(&email).await?;

    let stored_hash = user.as_ref().map(|u| u.password_hash.clone());
    let matches = password::verify_password_blocking(password, stored_hash).await?;

    let user = match user {
        Some(user) if matches => user,
        _ => {
            tracing::info!("Login failed for {}", email);
            return Err(ApiError::from(AuthError::InvalidCredentials));
        }
    };

    let credential = state.tokens.issue(&Identity {
        user_id: user.id,
        email: user.email.clone(),
    })?;

    tracing::info!("User {} logged in", user.id);

    Ok(Json(LoginResponse {
        message: "Login successful",
        token: credential.into_string(),
        user: user.into(),
    }))
}
