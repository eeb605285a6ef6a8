use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    models::tweets::{FeedCursor, TweetPage, TweetResponse, TweetRow},
    utils::errors::app_error::AppError,
};

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    pub default_size: u32,
    pub max_size: u32,
}

impl Default for PageLimits {
    fn default() -> Self {
        PageLimits {
            default_size: DEFAULT_PAGE_SIZE,
            max_size: MAX_PAGE_SIZE,
        }
    }
}

impl PageLimits {
    /// Resolves the requested page size: missing means the default, anything
    /// above the maximum is clamped, zero is rejected.
    pub fn resolve(&self, requested: Option<u32>) -> Result<usize, AppError> {
        match requested {
            None => Ok(self.default_size as usize),
            Some(0) => Err(AppError::BadRequest(
                "limit must be greater than zero".to_string(),
            )),
            Some(limit) => Ok(limit.min(self.max_size) as usize),
        }
    }
}

/// Rebuilds a cursor from its two query-string halves.
pub fn cursor_from_parts(
    id: Option<Uuid>,
    created_at: Option<DateTime<Utc>>,
) -> Result<Option<FeedCursor>, AppError> {
    match (id, created_at) {
        (Some(id), Some(created_at)) => Ok(Some(FeedCursor { id, created_at })),
        (None, None) => Ok(None),
        _ => Err(AppError::BadRequest(
            "cursorId and cursorCreatedAt must be given together".to_string(),
        )),
    }
}

/// Turns up to `limit + 1` ordered rows into a page. The extra row only
/// signals that more items exist; the cursor is the last returned item.
pub fn into_page(mut rows: Vec<TweetRow>, limit: usize) -> TweetPage {
    let next_cursor = if rows.len() > limit {
        rows.truncate(limit);
        rows.last().map(FeedCursor::from)
    } else {
        None
    };

    TweetPage {
        tweets: rows.into_iter().map(TweetResponse::from).collect(),
        next_cursor,
    }
}
