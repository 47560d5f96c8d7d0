//! Genre API routes
//!
//! - `POST /api/v1/genres` - Create a genre
//! - `GET /api/v1/genres` - List genres (`page`, `per_page`)
//! - `GET /api/v1/genres/:id` - Get a genre
//! - `PATCH /api/v1/genres/:id` - Update a genre
//! - `DELETE /api/v1/genres/:id` - Delete a genre

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use super::{
    commands::{CreateGenreCommand, DeleteGenreCommand, UpdateGenreCommand},
    error::GenreError,
    queries::{GetGenreQuery, ListGenresQuery},
};
use crate::api::response::ApiResponse;
use crate::audit::ClientInfo;
use crate::features::FeatureState;
use crate::middleware::AuthUser;

pub fn genres_routes() -> Router<FeatureState> {
    Router::new()
        .route("/", get(list_genres).post(create_genre))
        .route(
            "/:id",
            get(get_genre).patch(update_genre).delete(delete_genre),
        )
}

#[tracing::instrument(skip(state, client, command), fields(user = %user.username))]
async fn create_genre(
    State(state): State<FeatureState>,
    user: AuthUser,
    client: ClientInfo,
    Json(command): Json<CreateGenreCommand>,
) -> Result<Response, GenreError> {
    let genre = super::commands::create::handle(
        &state.db,
        &state.recorder,
        &client.context_for(&user),
        command,
    )
    .await?;

    Ok(ApiResponse::created(genre))
}

#[tracing::instrument(skip(state, _user))]
async fn list_genres(
    State(state): State<FeatureState>,
    _user: AuthUser,
    Query(query): Query<ListGenresQuery>,
) -> Result<Response, GenreError> {
    let (genres, pagination) = super::queries::list::handle(&state.db, query).await?;

    Ok(ApiResponse::paginated(genres, pagination).into_response())
}

#[tracing::instrument(skip(state, _user))]
async fn get_genre(
    State(state): State<FeatureState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Response, GenreError> {
    let genre = super::queries::get::handle(&state.db, GetGenreQuery { id }).await?;
    Ok(ApiResponse::success(genre).into_response())
}

#[tracing::instrument(skip(state, client, command), fields(user = %user.username))]
async fn update_genre(
    State(state): State<FeatureState>,
    user: AuthUser,
    client: ClientInfo,
    Path(id): Path<Uuid>,
    Json(mut command): Json<UpdateGenreCommand>,
) -> Result<Response, GenreError> {
    command.id = id;

    let genre = super::commands::update::handle(
        &state.db,
        &state.recorder,
        &client.context_for(&user),
        command,
    )
    .await?;

    Ok(ApiResponse::success(genre).into_response())
}

#[tracing::instrument(skip(state, client), fields(user = %user.username))]
async fn delete_genre(
    State(state): State<FeatureState>,
    user: AuthUser,
    client: ClientInfo,
    Path(id): Path<Uuid>,
) -> Result<Response, GenreError> {
    let genre = super::commands::delete::handle(
        &state.db,
        &state.recorder,
        &client.context_for(&user),
        DeleteGenreCommand { id },
    )
    .await?;

    Ok(ApiResponse::success(genre).into_response())
}
