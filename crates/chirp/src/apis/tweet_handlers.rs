use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use super::{
    api_models::{query::FeedQuery, request::CreateTweetRequest},
    middlewares::security::{Actor, Viewer},
};
use crate::{
    models::{
        likes::LikeToggle,
        tweets::{Tweet, TweetPage},
    },
    utils::errors::{app_error::AppError, error_payload::ErrorPayload},
    AppState,
};

pub const TAG: &str = "tweets";

/// Get one page of the global feed
#[utoipa::path(
    get,
    tag = TAG,
    path = "/feed",
    operation_id = "getFeedPage",
    responses(
        (status = 200, description = "Feed page retrieved successfully", body = TweetPage),
        (status = 400, description = "Invalid limit or cursor", body = ErrorPayload),
        (status = 500, description = "Internal server error", body = ErrorPayload)
    ),
    params(FeedQuery)
)]
pub(super) async fn get_feed(
    State(app_state): State<Arc<AppState>>,
    Viewer(viewer_id): Viewer,
    Query(query): Query<FeedQuery>,
) -> Result<(StatusCode, Json<TweetPage>), AppError> {
    let page = app_state
        .feed_service
        .feed_page(viewer_id, query.limit, query.cursor()?, query.only_following)
        .await?;
    Ok((StatusCode::OK, Json(page)))
}

/// Create a tweet
#[utoipa::path(
    post,
    tag = TAG,
    path = "/tweets",
    operation_id = "createTweet",
    request_body = CreateTweetRequest,
    responses(
        (status = 201, description = "Tweet created", body = Tweet),
        (status = 400, description = "Empty or overlong content", body = ErrorPayload),
        (status = 401, description = "Sign in required", body = ErrorPayload),
        (status = 500, description = "Internal server error", body = ErrorPayload)
    )
)]
pub(super) async fn create_tweet(
    State(app_state): State<Arc<AppState>>,
    Actor(actor_id): Actor,
    Json(body): Json<CreateTweetRequest>,
) -> Result<(StatusCode, Json<Tweet>), AppError> {
    let tweet = app_state
        .tweet_service
        .create_tweet(actor_id, &body.content)
        .await?;
    Ok((StatusCode::CREATED, Json(tweet)))
}

/// Delete a tweet owned by the caller
#[utoipa::path(
    delete,
    tag = TAG,
    path = "/tweets/{id}",
    operation_id = "deleteTweet",
    responses(
        (status = 200, description = "true when deleted, false when missing or not owned", body = bool),
        (status = 401, description = "Sign in required", body = ErrorPayload),
        (status = 500, description = "Internal server error", body = ErrorPayload)
    ),
    params(
        ("id" = Uuid, Path, description = "Tweet ID")
    )
)]
pub(super) async fn delete_tweet(
    State(app_state): State<Arc<AppState>>,
    Actor(actor_id): Actor,
    Path(tweet_id): Path<Uuid>,
) -> Result<(StatusCode, Json<bool>), AppError> {
    let deleted = app_state
        .tweet_service
        .delete_tweet(actor_id, tweet_id)
        .await?;
    Ok((StatusCode::OK, Json(deleted)))
}

/// Like or unlike a tweet
#[utoipa::path(
    post,
    tag = TAG,
    path = "/tweets/{id}/like",
    operation_id = "toggleLike",
    responses(
        (status = 200, description = "Like toggled", body = LikeToggle),
        (status = 401, description = "Sign in required", body = ErrorPayload),
        (status = 404, description = "Tweet not found", body = ErrorPayload),
        (status = 500, description = "Internal server error", body = ErrorPayload)
    ),
    params(
        ("id" = Uuid, Path, description = "Tweet ID")
    )
)]
pub(super) async fn toggle_like(
    State(app_state): State<Arc<AppState>>,
    Actor(actor_id): Actor,
    Path(tweet_id): Path<Uuid>,
) -> Result<(StatusCode, Json<LikeToggle>), AppError> {
    let toggle = app_state
        .tweet_service
        .toggle_like(actor_id, tweet_id)
        .await?;
    Ok((StatusCode::OK, Json(toggle)))
}
