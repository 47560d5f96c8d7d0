//! Audit API routes
//!
//! - `GET /api/v1/audit/logs` - Filtered list of visible entries
//! - `GET /api/v1/audit/logs/:id` - One visible entry
//! - `GET /api/v1/audit/logs/export` - XLSX export of visible entries
//! - `GET /api/v1/audit/logs/statistics` - Aggregate counts
//! - `POST /api/v1/audit/auth` - Record a login or logout
//!
//! Entries are read-only through the API.

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use super::{
    client::ClientInfo,
    export::{build_workbook, export_filename, XLSX_CONTENT_TYPE},
    models::{AuditAction, AuditQuery, AuditScope},
    queries, statistics,
};
use crate::api::response::{ApiResponse, ApiResult};
use crate::error::{AppError, ServerError};
use crate::features::FeatureState;
use crate::middleware::AuthUser;
use crate::models::User;

pub fn audit_routes() -> Router<FeatureState> {
    Router::new()
        .route("/logs", get(list_logs))
        .route("/logs/export", get(export_logs))
        .route("/logs/statistics", get(get_statistics))
        .route("/logs/:id", get(get_log))
        .route("/auth", post(record_session))
}

impl AuditScope {
    pub fn for_user(user: &AuthUser) -> Self {
        if user.is_staff() {
            Self::All
        } else {
            Self::User(user.id)
        }
    }
}

#[tracing::instrument(skip(state, query), fields(user = %user.username))]
async fn list_logs(
    State(state): State<FeatureState>,
    user: AuthUser,
    Query(query): Query<AuditQuery>,
) -> ApiResult<Response> {
    let entries = queries::query_audit_logs(&state.db, &query, AuditScope::for_user(&user)).await?;

    let meta = json!({
        "count": entries.len(),
        "limit": query.effective_limit(),
        "offset": query.effective_offset(),
    });

    Ok(ApiResponse::success_with_meta(entries, meta).into_response())
}

#[tracing::instrument(skip(state), fields(user = %user.username))]
async fn get_log(
    State(state): State<FeatureState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Response> {
    let entry = queries::get_audit_entry(&state.db, id, AuditScope::for_user(&user))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Audit log '{}' not found", id)))?;

    Ok(ApiResponse::success(entry).into_response())
}

#[tracing::instrument(skip(state), fields(user = %user.username))]
async fn export_logs(State(state): State<FeatureState>, user: AuthUser) -> ApiResult<Response> {
    let entries = queries::export_rows(
        &state.db,
        AuditScope::for_user(&user),
        state.audit.export_max_rows,
    )
    .await?;
    let exported = entries.len();

    let workbook = tokio::task::spawn_blocking(move || build_workbook(&entries))
        .await
        .map_err(|e| AppError::Internal(format!("Export task failed: {}", e)))?
        .map_err(ServerError::from)?;

    tracing::info!(
        target: "audit",
        user = %user.username,
        exported_records = exported,
        "Audit log exported"
    );

    let disposition = format!("attachment; filename={}", export_filename(Utc::now()));
    Ok((
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        workbook,
    )
        .into_response())
}

#[tracing::instrument(skip(state), fields(user = %user.username))]
async fn get_statistics(State(state): State<FeatureState>, user: AuthUser) -> ApiResult<Response> {
    let stats = statistics::collect(
        &state.db,
        AuditScope::for_user(&user),
        state.audit.statistics_window_days,
        Utc::now(),
    )
    .await?;

    Ok(ApiResponse::success(stats).into_response())
}

/// Record a login or logout of the calling user
///
/// Open endpoint: anonymous callers, unknown actions and unreadable bodies
/// are accepted and simply not recorded.
#[tracing::instrument(skip(state, user, client, body))]
async fn record_session(
    State(state): State<FeatureState>,
    user: Option<AuthUser>,
    client: ClientInfo,
    body: Option<Json<Value>>,
) -> ApiResult<Response> {
    let action = match session_action(body.as_ref().map(|Json(value)| value)) {
        Some("login") => Some(AuditAction::Login),
        Some("logout") => Some(AuditAction::Logout),
        _ => None,
    };

    if let (Some(action), Some(user)) = (action, user) {
        if let Some(account) = User::find(&state.db, user.id).await? {
            state
                .recorder
                .session(&client.context_for(&user), action, &account)
                .await;
        }
    }

    Ok(Json(json!({"status": "success"})).into_response())
}

fn session_action(body: Option<&Value>) -> Option<&str> {
    body?.get("action").and_then(Value::as_str)
}
