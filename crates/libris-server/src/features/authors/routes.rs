//! Author API routes
//!
//! - `POST /api/v1/authors` - Create an author
//! - `GET /api/v1/authors` - List authors (`page`, `per_page`, `search`)
//! - `GET /api/v1/authors/:id` - Get an author
//! - `PATCH /api/v1/authors/:id` - Update an author
//! - `DELETE /api/v1/authors/:id` - Delete an author and their books

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use super::{
    commands::{CreateAuthorCommand, DeleteAuthorCommand, UpdateAuthorCommand},
    error::AuthorError,
    queries::{GetAuthorQuery, ListAuthorsQuery},
};
use crate::api::response::ApiResponse;
use crate::audit::ClientInfo;
use crate::features::FeatureState;
use crate::middleware::AuthUser;

pub fn authors_routes() -> Router<FeatureState> {
    Router::new()
        .route("/", get(list_authors).post(create_author))
        .route(
            "/:id",
            get(get_author).patch(update_author).delete(delete_author),
        )
}

#[tracing::instrument(skip(state, client, command), fields(user = %user.username))]
async fn create_author(
    State(state): State<FeatureState>,
    user: AuthUser,
    client: ClientInfo,
    Json(command): Json<CreateAuthorCommand>,
) -> Result<Response, AuthorError> {
    let author = super::commands::create::handle(
        &state.db,
        &state.recorder,
        &client.context_for(&user),
        command,
    )
    .await?;

    Ok(ApiResponse::created(author))
}

#[tracing::instrument(skip(state, _user))]
async fn list_authors(
    State(state): State<FeatureState>,
    _user: AuthUser,
    Query(query): Query<ListAuthorsQuery>,
) -> Result<Response, AuthorError> {
    let (authors, pagination) = super::queries::list::handle(&state.db, query).await?;

    Ok(ApiResponse::paginated(authors, pagination).into_response())
}

#[tracing::instrument(skip(state, _user))]
async fn get_author(
    State(state): State<FeatureState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Response, AuthorError> {
    let author = super::queries::get::handle(&state.db, GetAuthorQuery { id }).await?;
    Ok(ApiResponse::success(author).into_response())
}

#[tracing::instrument(skip(state, client, command), fields(user = %user.username))]
async fn update_author(
    State(state): State<FeatureState>,
    user: AuthUser,
    client: ClientInfo,
    Path(id): Path<Uuid>,
    Json(mut command): Json<UpdateAuthorCommand>,
) -> Result<Response, AuthorError> {
    command.id = id;

    let author = super::commands::update::handle(
        &state.db,
        &state.recorder,
        &client.context_for(&user),
        command,
    )
    .await?;

    Ok(ApiResponse::success(author).into_response())
}

#[tracing::instrument(skip(state, client), fields(user = %user.username))]
async fn delete_author(
    State(state): State<FeatureState>,
    user: AuthUser,
    client: ClientInfo,
    Path(id): Path<Uuid>,
) -> Result<Response, AuthorError> {
    let author = super::commands::delete::handle(
        &state.db,
        &state.recorder,
        &client.context_for(&user),
        DeleteAuthorCommand { id },
    )
    .await?;

    Ok(ApiResponse::success(author).into_response())
}
