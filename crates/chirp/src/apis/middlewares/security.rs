//! Actor resolution. Sessions are handled upstream; the authenticated user id
//! arrives in the `x-user-id` header.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::HeaderName, request::Parts},
};
use tracing::warn;
use uuid::Uuid;

use crate::utils::errors::app_error::AppError;

pub const USER_ID_HEADER: HeaderName = HeaderName::from_static("x-user-id");

fn user_id_from_parts(parts: &Parts) -> Result<Option<Uuid>, AppError> {
    let Some(value) = parts.headers.get(&USER_ID_HEADER) else {
        return Ok(None);
    };

    value
        .to_str()
        .ok()
        .and_then(|v| Uuid::parse_str(v.trim()).ok())
        .map(Some)
        .ok_or_else(|| {
            warn!("Rejecting malformed {} header", USER_ID_HEADER);
            AppError::Unauthorized("Invalid user id header".to_string())
        })
}

/// The current viewer, if any. Used by public reads.
#[derive(Debug, Clone, Copy)]
pub struct Viewer(pub Option<Uuid>);

#[async_trait]
impl<S> FromRequestParts<S> for Viewer
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Viewer(user_id_from_parts(parts)?))
    }
}

/// The authenticated actor. Rejects anonymous requests before the handler runs.
#[derive(Debug, Clone, Copy)]
pub struct Actor(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        user_id_from_parts(parts)?
            .map(Actor)
            .ok_or_else(|| AppError::Unauthorized("Sign in required".to_string()))
    }
}
