//! Authentication routes

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

/// Creates and returns the authentication router
///
/// # Routes
/// - `GET /` - Landing page
/// - `GET /auth/login` - Start the Google OAuth flow
/// - `GET /auth/callback` - OAuth redirect target, establishes the session
/// - `POST /logout` - Clear the session cookie
pub fn auth_routes() -> Router {
    Router::new()
        .route("/", get(handlers::home))
        .route("/auth/login", get(handlers::login))
        .route("/auth/callback", get(handlers::callback))
        .route("/logout", post(handlers::logout))
}
