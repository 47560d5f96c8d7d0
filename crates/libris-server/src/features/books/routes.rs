//! Book API routes
//!
//! - `POST /api/v1/books` - Add a book to the catalogue
//! - `GET /api/v1/books` - List books (`status`, `author_id`, `genre_id`, `search`, paging)
//! - `GET /api/v1/books/:id` - Get a book
//! - `PATCH /api/v1/books/:id` - Update a book
//! - `DELETE /api/v1/books/:id` - Delete a book
//! - `POST /api/v1/books/:id/lend` - Lend the book to the caller

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use super::{
    commands::{CreateBookCommand, DeleteBookCommand, LendBookCommand, UpdateBookCommand},
    error::BookError,
    queries::{GetBookQuery, ListBooksQuery},
};
use crate::api::response::ApiResponse;
use crate::audit::ClientInfo;
use crate::features::FeatureState;
use crate::middleware::AuthUser;

pub fn books_routes() -> Router<FeatureState> {
    Router::new()
        .route("/", get(list_books).post(create_book))
        .route("/:id", get(get_book).patch(update_book).delete(delete_book))
        .route("/:id/lend", post(lend_book))
}

#[tracing::instrument(skip(state, client, command), fields(user = %user.username))]
async fn create_book(
    State(state): State<FeatureState>,
    user: AuthUser,
    client: ClientInfo,
    Json(command): Json<CreateBookCommand>,
) -> Result<Response, BookError> {
    let book = super::commands::create::handle(
        &state.db,
        &state.recorder,
        &client.context_for(&user),
        command,
    )
    .await?;

    Ok(ApiResponse::created(book))
}

#[tracing::instrument(skip(state, _user))]
async fn list_books(
    State(state): State<FeatureState>,
    _user: AuthUser,
    Query(query): Query<ListBooksQuery>,
) -> Result<Response, BookError> {
    let (books, pagination) = super::queries::list::handle(&state.db, query).await?;

    tracing::debug!(count = books.len(), total = pagination.total, "Books listed");

    Ok(ApiResponse::paginated(books, pagination).into_response())
}

#[tracing::instrument(skip(state, _user))]
async fn get_book(
    State(state): State<FeatureState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Response, BookError> {
    let book = super::queries::get::handle(&state.db, GetBookQuery { id }).await?;
    Ok(ApiResponse::success(book).into_response())
}

#[tracing::instrument(skip(state, client, command), fields(user = %user.username))]
async fn update_book(
    State(state): State<FeatureState>,
    user: AuthUser,
    client: ClientInfo,
    Path(id): Path<Uuid>,
    Json(mut command): Json<UpdateBookCommand>,
) -> Result<Response, BookError> {
    command.id = id;

    let book = super::commands::update::handle(
        &state.db,
        &state.recorder,
        &client.context_for(&user),
        command,
    )
    .await?;

    Ok(ApiResponse::success(book).into_response())
}

#[tracing::instrument(skip(state, client), fields(user = %user.username))]
async fn delete_book(
    State(state): State<FeatureState>,
    user: AuthUser,
    client: ClientInfo,
    Path(id): Path<Uuid>,
) -> Result<Response, BookError> {
    let book = super::commands::delete::handle(
        &state.db,
        &state.recorder,
        &client.context_for(&user),
        DeleteBookCommand { id },
    )
    .await?;

    Ok(ApiResponse::success(book).into_response())
}

/// Lend a book to the caller
///
/// # Response
///
/// - `201 Created` - The new loan
/// - `400 Bad Request` - Book not available, loan limit reached, bad due date
/// - `404 Not Found` - No such book
#[tracing::instrument(skip(state, client, command), fields(user = %user.username))]
async fn lend_book(
    State(state): State<FeatureState>,
    user: AuthUser,
    client: ClientInfo,
    Path(id): Path<Uuid>,
    Json(mut command): Json<LendBookCommand>,
) -> Result<Response, BookError> {
    command.book_id = id;

    let loan = super::commands::lend::handle(
        &state.db,
        &state.recorder,
        &client.context_for(&user),
        &user,
        command,
    )
    .await?;

    Ok(ApiResponse::created(loan))
}
