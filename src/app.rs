use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::TokenService;
use crate::config::SecurityConfig;
use crate::database::UserStore;
use crate::handlers;

/// Shared, read-only state handed to every request
#[derive(Clone)]
pub struct AppState {
    pub tokens: Arc<TokenService>,
    pub users: Arc<dyn UserStore>,
    /// Assigned to users who register without a password
    pub default_user_password: Arc<str>,
}

impl AppState {
    pub fn new(security: &SecurityConfig, users: Arc<dyn UserStore>) -> Self {
        Self {
            tokens: Arc::new(TokenService::from_config(security)),
            users,
            default_user_password: Arc::from(security.default_user_password.as_str()),
        }
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(handlers::health::root))
        .route("/health", get(handlers::health::health))
        .route("/login", post(handlers::auth::login))
        // Registration is public, listing requires a bearer token
        .route(
            "/users",
            get(handlers::users::list_users).post(handlers::users::create_user),
        )
        .route("/users/:id", get(handlers::users::get_user))
        .with_state(state)
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
