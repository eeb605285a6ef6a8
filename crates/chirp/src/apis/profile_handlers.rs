use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use super::{api_models::query::ProfileFeedQuery, middlewares::security::Viewer};
use crate::{
    models::{profiles::ProfileResponse, tweets::TweetPage},
    utils::errors::{app_error::AppError, error_payload::ErrorPayload},
    AppState,
};

pub const TAG: &str = "profiles";

/// Get a profile by user id
#[utoipa::path(
    get,
    tag = TAG,
    path = "/{id}",
    operation_id = "getProfile",
    responses(
        (status = 200, description = "Profile retrieved successfully", body = ProfileResponse),
        (status = 404, description = "User not found", body = ErrorPayload),
        (status = 500, description = "Internal server error", body = ErrorPayload)
    ),
    params(
        ("id" = Uuid, Path, description = "User ID")
    )
)]
pub(super) async fn get_profile(
    State(app_state): State<Arc<AppState>>,
    Viewer(viewer_id): Viewer,
    Path(user_id): Path<Uuid>,
) -> Result<(StatusCode, Json<ProfileResponse>), AppError> {
    let profile = app_state
        .profile_service
        .get_profile(viewer_id, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;
    Ok((StatusCode::OK, Json(profile)))
}

/// Get one page of a user's tweets
#[utoipa::path(
    get,
    tag = TAG,
    path = "/{id}/tweets",
    operation_id = "getProfileFeedPage",
    responses(
        (status = 200, description = "Profile feed page retrieved successfully", body = TweetPage),
        (status = 400, description = "Invalid limit or cursor", body = ErrorPayload),
        (status = 500, description = "Internal server error", body = ErrorPayload)
    ),
    params(
        ("id" = Uuid, Path, description = "User ID"),
        ProfileFeedQuery
    )
)]
pub(super) async fn get_profile_feed(
    State(app_state): State<Arc<AppState>>,
    Viewer(viewer_id): Viewer,
    Path(user_id): Path<Uuid>,
    Query(query): Query<ProfileFeedQuery>,
) -> Result<(StatusCode, Json<TweetPage>), AppError> {
    let page = app_state
        .feed_service
        .profile_feed_page(viewer_id, user_id, query.limit, query.cursor()?)
        .await?;
    Ok((StatusCode::OK, Json(page)))
}
