//! Profile API routes
//!
//! - `GET /api/v1/profiles` - List visible profiles (`tier`, `active`, paging)
//! - `GET /api/v1/profiles/:id` - Get a visible profile
//! - `PATCH /api/v1/profiles/:id` - Update contact details; tier changes are staff-only
//!
//! Members only see their own profile.

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use super::{
    commands::UpdateProfileCommand,
    error::ProfileError,
    queries::{GetProfileQuery, ListProfilesQuery},
};
use crate::api::response::ApiResponse;
use crate::audit::ClientInfo;
use crate::features::FeatureState;
use crate::middleware::AuthUser;

pub fn profiles_routes() -> Router<FeatureState> {
    Router::new()
        .route("/", get(list_profiles))
        .route("/:id", get(get_profile).patch(update_profile))
}

fn owner_filter(user: &AuthUser) -> Option<Uuid> {
    (!user.is_staff()).then_some(user.id)
}

#[tracing::instrument(skip(state, query), fields(user = %user.username))]
async fn list_profiles(
    State(state): State<FeatureState>,
    user: AuthUser,
    Query(mut query): Query<ListProfilesQuery>,
) -> Result<Response, ProfileError> {
    query.owner = owner_filter(&user);
    let (profiles, pagination) = super::queries::list::handle(&state.db, query).await?;

    Ok(ApiResponse::paginated(profiles, pagination).into_response())
}

#[tracing::instrument(skip(state), fields(user = %user.username))]
async fn get_profile(
    State(state): State<FeatureState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Response, ProfileError> {
    let query = GetProfileQuery {
        id,
        owner: owner_filter(&user),
    };
    let profile = super::queries::get::handle(&state.db, query).await?;
    Ok(ApiResponse::success(profile).into_response())
}

/// Update a profile
///
/// # Response
///
/// - `200 OK` - Updated profile
/// - `400 Bad Request` - Validation error or unknown tier
/// - `403 Forbidden` - Tier change by a non-staff user
/// - `404 Not Found` - Profile missing or not the caller's
#[tracing::instrument(skip(state, client, command), fields(user = %user.username))]
async fn update_profile(
    State(state): State<FeatureState>,
    user: AuthUser,
    client: ClientInfo,
    Path(id): Path<Uuid>,
    Json(mut command): Json<UpdateProfileCommand>,
) -> Result<Response, ProfileError> {
    command.id = id;

    let profile = super::commands::update::handle(
        &state.db,
        &state.recorder,
        &client.context_for(&user),
        &user,
        command,
    )
    .await?;

    Ok(ApiResponse::success(profile).into_response())
}
