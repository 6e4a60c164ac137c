use axum::{
    extract::{rejection::JsonRejection, rejection::PathRejection, Extension, Path},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Json,
};
use std::sync::Arc;
use tracing::warn;

use super::models::{AddExpenseRequest, DashboardData, StatusResponse};
use super::services::{compute_totals, ExpenseService};
use super::views::{display_picture_url, render_dashboard};
use crate::auth::SessionUser;
use crate::common::{ApiError, AppState};

async fn load_dashboard(state: &AppState, user: SessionUser) -> Result<DashboardData, ApiError> {
    let expense_service = ExpenseService::new(state.db.clone());

    expense_service
        .register_or_get_user(&user.google_id, &user.name, &user.email, &user.picture)
        .await?;

    let expenses = expense_service.list_expenses(&user.google_id).await?;
    let totals = compute_totals(&expenses);

    Ok(DashboardData {
        picture_url: display_picture_url(&user.picture),
        user,
        expenses,
        totals,
    })
}

/// GET /dashboard - Render the signed-in user's expenses
pub async fn dashboard(
    Extension(state): Extension<Arc<AppState>>,
    user: Option<SessionUser>,
) -> Result<Response, ApiError> {
    let Some(user) = user else {
        return Ok(Redirect::to("/").into_response());
    };

    let data = load_dashboard(&state, user).await?;
    Ok(Html(render_dashboard(&data)?).into_response())
}

/// GET /api/expenses - Dashboard data as JSON
pub async fn list_expenses(
    Extension(state): Extension<Arc<AppState>>,
    user: SessionUser,
) -> Result<Json<DashboardData>, ApiError> {
    let data = load_dashboard(&state, user).await?;
    Ok(Json(data))
}

/// POST /expenses - Add an expense for the signed-in user
pub async fn add_expense(
    Extension(state): Extension<Arc<AppState>>,
    user: SessionUser,
    payload: Result<Json<AddExpenseRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        warn!(error = %rejection.body_text(), "Rejected malformed expense payload");
        ApiError::BadRequest("Request body must be a JSON expense".to_string())
    })?;

    let expense_service = ExpenseService::new(state.db.clone());

    // The user row may not exist yet if the dashboard was never rendered.
    expense_service
        .register_or_get_user(&user.google_id, &user.name, &user.email, &user.picture)
        .await?;

    let id = expense_service
        .add_expense(&user.google_id, &request)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(StatusResponse::success("Expense added successfully", Some(id))),
    ))
}

/// POST /expenses/:id/delete - Delete one of the caller's expenses
pub async fn delete_expense(
    Extension(state): Extension<Arc<AppState>>,
    user: Option<SessionUser>,
    expense_id: Result<Path<i64>, PathRejection>,
) -> Result<Response, ApiError> {
    let Some(user) = user else {
        return Ok(Redirect::to("/").into_response());
    };

    let Path(expense_id) =
        expense_id.map_err(|_| ApiError::BadRequest("Invalid expense ID".to_string()))?;

    let expense_service = ExpenseService::new(state.db.clone());
    expense_service
        .delete_expense(&user.google_id, expense_id)
        .await?;

    Ok(Redirect::to("/dashboard").into_response())
}
