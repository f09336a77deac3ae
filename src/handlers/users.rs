use axum::{extract::State, http::StatusCode, Json};

use crate::app::AppState;
use crate::auth::password;
use crate::database::{NewUser, UserView};
use crate::error::{ApiError, ApiResult};
use crate::middleware::{Authenticated, ValidUserId, Validated};
use crate::validation::Registration;

/// GET /users - list every user (bearer token required)
pub async fn list_users(
    State(state): State<AppState>,
    Authenticated(identity): Authenticated,
) -> ApiResult<Json<Vec<UserView>>> {
    let users = state.users.list_users().await?;
    tracing::debug!("User {} listed {} users", identity.user_id, users.len());

    Ok(Json(users.into_iter().map(UserView::from).collect()))
}

/// POST /users - register a user
///
/// Users registered without a password get the configured default one.
pub async fn create_user(
    State(state): State<AppState>,
    Validated(registration): Validated<Registration>,
) -> ApiResult<(StatusCode, Json<UserView>)> {
    let Registration {
        email,
        name,
        password,
    } = registration;

    let plaintext = password.unwrap_or_else(|| state.default_user_password.to_string());
    let password_hash = password::hash_password_blocking(plaintext).await?;

    let user = state
        .users
        .create_user(NewUser {
            email,
            name,
            password_hash,
        })
        .await?;

    tracing::info!("Registered user {} <{}>", user.id, user.email);

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// GET /users/:id - show one user (bearer token required)
///
/// The id is validated before the token, and both before the store is touched.
pub async fn get_user(
    State(state): State<AppState>,
    ValidUserId(id): ValidUserId,
    Authenticated(_identity): Authenticated,
) -> ApiResult<Json<UserView>> {
    let user = state
        .users
        .find_user_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(user.into()))
}
