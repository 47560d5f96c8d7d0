//! User API routes
//!
//! - `POST /api/v1/users/register` - Create an account (open)
//! - `POST /api/v1/users/login` - Get an API token (open)
//! - `POST /api/v1/users/logout` - Revoke the caller's token
//! - `GET /api/v1/users` - List users
//! - `GET /api/v1/users/:id` - Get a user

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use uuid::Uuid;

use super::{
    commands::{LoginCommand, LogoutCommand, RegisterCommand},
    error::UserError,
    queries::{GetUserQuery, ListUsersQuery},
};
use crate::api::response::ApiResponse;
use crate::audit::ClientInfo;
use crate::features::FeatureState;
use crate::middleware::AuthUser;

pub fn users_routes() -> Router<FeatureState> {
    Router::new()
        .route("/", get(list_users))
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/:id", get(get_user))
}

/// Register a new member
///
/// # Response
///
/// - `201 Created` - `{token, user, profile}`
/// - `400 Bad Request` - Validation error or staff tier requested
/// - `409 Conflict` - Username taken
#[tracing::instrument(skip(state, client, command))]
async fn register(
    State(state): State<FeatureState>,
    client: ClientInfo,
    Json(command): Json<RegisterCommand>,
) -> Result<Response, UserError> {
    let session = super::commands::register::handle(
        &state.db,
        &state.recorder,
        &client.anonymous(),
        command,
    )
    .await?;

    Ok(ApiResponse::created(session))
}

#[tracing::instrument(skip(state, command))]
async fn login(
    State(state): State<FeatureState>,
    Json(command): Json<LoginCommand>,
) -> Result<Response, UserError> {
    let session = super::commands::login::handle(&state.db, command).await?;
    Ok(ApiResponse::success(session).into_response())
}

#[tracing::instrument(skip(state), fields(user = %user.username))]
async fn logout(State(state): State<FeatureState>, user: AuthUser) -> Result<Response, UserError> {
    super::commands::logout::handle(&state.db, LogoutCommand { user_id: user.id }).await?;
    Ok(ApiResponse::success(json!({ "message": "Logged out" })).into_response())
}

#[tracing::instrument(skip(state, _user))]
async fn list_users(
    State(state): State<FeatureState>,
    _user: AuthUser,
    Query(query): Query<ListUsersQuery>,
) -> Result<Response, UserError> {
    let (users, pagination) = super::queries::list::handle(&state.db, query).await?;
    Ok(ApiResponse::paginated(users, pagination).into_response())
}

#[tracing::instrument(skip(state, _user))]
async fn get_user(
    State(state): State<FeatureState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Response, UserError> {
    let user = super::queries::get::handle(&state.db, GetUserQuery { id }).await?;
    Ok(ApiResponse::success(user).into_response())
}
