// src/app.rs
//! Router composition

use axum::{extract::Extension, middleware, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::auth::auth_routes;
use crate::common::AppState;
use crate::expenses::expenses_routes;
use crate::logging_middleware;

/// Builds the full application router around an already constructed state.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Landing page, login, callback, logout
        .merge(auth_routes())
        // Dashboard and expense actions
        .merge(expenses_routes())
        .layer(middleware::from_fn(logging_middleware::log_request_response))
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
}
