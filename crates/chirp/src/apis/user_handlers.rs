use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use super::middlewares::security::Actor;
use crate::{
    models::user_follows::FollowToggle,
    utils::errors::{app_error::AppError, error_payload::ErrorPayload},
    AppState,
};

const TAG: &str = "users";

/// Follow or unfollow a user
#[utoipa::path(
    post,
    tag = TAG,
    path = "/{id}/follow",
    operation_id = "toggleFollow",
    responses(
        (status = 200, description = "Follow toggled", body = FollowToggle),
        (status = 400, description = "Cannot follow yourself", body = ErrorPayload),
        (status = 401, description = "Sign in required", body = ErrorPayload),
        (status = 404, description = "User not found", body = ErrorPayload),
        (status = 500, description = "Internal server error", body = ErrorPayload)
    ),
    params(
        ("id" = Uuid, Path, description = "User ID to follow or unfollow")
    )
)]
pub(super) async fn toggle_follow(
    State(app_state): State<Arc<AppState>>,
    Actor(actor_id): Actor,
    Path(user_id): Path<Uuid>,
) -> Result<(StatusCode, Json<FollowToggle>), AppError> {
    let toggle = app_state
        .profile_service
        .toggle_follow(actor_id, user_id)
        .await?;
    Ok((StatusCode::OK, Json(toggle)))
}
