//! Loan API routes
//!
//! - `GET /api/v1/loans` - List visible loans (`status`, paging)
//! - `GET /api/v1/loans/:id` - Get a visible loan
//! - `PATCH /api/v1/loans/:id` - Change due date or notes
//! - `DELETE /api/v1/loans/:id` - Delete a loan
//! - `POST /api/v1/loans/:id/return` - Return the book
//! - `POST /api/v1/loans/mark-overdue` - Flag loans past due (staff)
//!
//! Staff see every loan; other users only their own.

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use super::{
    commands::{DeleteLoanCommand, MarkOverdueCommand, ReturnLoanCommand, UpdateLoanCommand},
    error::LoanError,
    queries::{GetLoanQuery, ListLoansQuery},
    visible_to,
};
use crate::api::response::ApiResponse;
use crate::audit::ClientInfo;
use crate::features::FeatureState;
use crate::middleware::AuthUser;

pub fn loans_routes() -> Router<FeatureState> {
    Router::new()
        .route("/", get(list_loans))
        .route("/mark-overdue", post(mark_overdue))
        .route("/:id", get(get_loan).patch(update_loan).delete(delete_loan))
        .route("/:id/return", post(return_loan))
}

#[tracing::instrument(skip(state, query), fields(user = %user.username))]
async fn list_loans(
    State(state): State<FeatureState>,
    user: AuthUser,
    Query(mut query): Query<ListLoansQuery>,
) -> Result<Response, LoanError> {
    query.borrower = visible_to(&user);
    let (loans, pagination) = super::queries::list::handle(&state.db, query).await?;

    Ok(ApiResponse::paginated(loans, pagination).into_response())
}

#[tracing::instrument(skip(state), fields(user = %user.username))]
async fn get_loan(
    State(state): State<FeatureState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Response, LoanError> {
    let query = GetLoanQuery {
        id,
        borrower: visible_to(&user),
    };
    let loan = super::queries::get::handle(&state.db, query).await?;
    Ok(ApiResponse::success(loan).into_response())
}

#[tracing::instrument(skip(state, client, command), fields(user = %user.username))]
async fn update_loan(
    State(state): State<FeatureState>,
    user: AuthUser,
    client: ClientInfo,
    Path(id): Path<Uuid>,
    Json(mut command): Json<UpdateLoanCommand>,
) -> Result<Response, LoanError> {
    command.id = id;

    let loan = super::commands::update::handle(
        &state.db,
        &state.recorder,
        &client.context_for(&user),
        visible_to(&user),
        command,
    )
    .await?;

    Ok(ApiResponse::success(loan).into_response())
}

#[tracing::instrument(skip(state, client), fields(user = %user.username))]
async fn delete_loan(
    State(state): State<FeatureState>,
    user: AuthUser,
    client: ClientInfo,
    Path(id): Path<Uuid>,
) -> Result<Response, LoanError> {
    let loan = super::commands::delete::handle(
        &state.db,
        &state.recorder,
        &client.context_for(&user),
        visible_to(&user),
        DeleteLoanCommand { id },
    )
    .await?;

    Ok(ApiResponse::success(loan).into_response())
}

/// Return a loan
///
/// # Response
///
/// - `200 OK` - The returned loan
/// - `400 Bad Request` - Loan already returned
/// - `403 Forbidden` - Caller is neither the borrower nor staff
/// - `404 Not Found` - No such loan
#[tracing::instrument(skip(state, client), fields(user = %user.username))]
async fn return_loan(
    State(state): State<FeatureState>,
    user: AuthUser,
    client: ClientInfo,
    Path(id): Path<Uuid>,
) -> Result<Response, LoanError> {
    let loan = super::commands::return_loan::handle(
        &state.db,
        &state.recorder,
        &client.context_for(&user),
        &user,
        ReturnLoanCommand { id },
    )
    .await?;

    Ok(ApiResponse::success(loan).into_response())
}

#[tracing::instrument(skip(state, client), fields(user = %user.username))]
async fn mark_overdue(
    State(state): State<FeatureState>,
    user: AuthUser,
    client: ClientInfo,
) -> Result<Response, LoanError> {
    let command = MarkOverdueCommand {
        today: Utc::now().date_naive(),
    };
    let loans = super::commands::mark_overdue::handle(
        &state.db,
        &state.recorder,
        &client.context_for(&user),
        &user,
        command,
    )
    .await?;

    Ok(ApiResponse::success(json!({ "updated": loans.len() })).into_response())
}
