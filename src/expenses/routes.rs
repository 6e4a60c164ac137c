use super::handlers;
use axum::{
    routing::{get, post},
    Router,
};

/// Creates the expenses router with the dashboard and expense actions
pub fn expenses_routes() -> Router {
    Router::new()
        .route("/dashboard", get(handlers::dashboard))
        .route("/api/expenses", get(handlers::list_expenses))
        .route("/expenses", post(handlers::add_expense))
        .route("/expenses/:id/delete", post(handlers::delete_expense))
}
