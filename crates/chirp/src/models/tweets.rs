use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use super::users::UserSummary;

/// A stored tweet, as returned by `tweet.create`.
#[derive(Clone, Debug, PartialEq, Eq, FromRow, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Tweet {
    pub id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Tweet {
    pub fn cursor(&self) -> FeedCursor {
        FeedCursor {
            id: self.id,
            created_at: self.created_at,
        }
    }
}

/// One feed row: the tweet joined with its author and like aggregates.
#[derive(Clone, Debug, PartialEq, FromRow)]
pub struct TweetRow {
    pub id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub like_count: i64,
    pub liked_by_me: bool,
    pub user_id: Uuid,
    pub user_name: Option<String>,
    pub user_image: Option<String>,
}

#[derive(Serialize, Deserialize, ToSchema, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TweetResponse {
    pub id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub like_count: i64,
    pub liked_by_me: bool,
    pub user: UserSummary,
}

impl From<TweetRow> for TweetResponse {
    fn from(row: TweetRow) -> Self {
        TweetResponse {
            id: row.id,
            content: row.content,
            created_at: row.created_at,
            like_count: row.like_count,
            liked_by_me: row.liked_by_me,
            user: UserSummary {
                id: row.user_id,
                name: row.user_name,
                image: row.user_image,
            },
        }
    }
}

impl TweetResponse {
    /// Builds the record a client shows right after `tweet.create` succeeds,
    /// using the locally known author instead of refetching.
    pub fn from_created(tweet: Tweet, author: UserSummary) -> Self {
        TweetResponse {
            id: tweet.id,
            content: tweet.content,
            created_at: tweet.created_at,
            like_count: 0,
            liked_by_me: false,
            user: author,
        }
    }

    pub fn cursor(&self) -> FeedCursor {
        FeedCursor {
            id: self.id,
            created_at: self.created_at,
        }
    }
}

/// Position of the last item seen; the next page resumes strictly after it.
#[derive(Serialize, Deserialize, ToSchema, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct FeedCursor {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl FeedCursor {
    /// Orders positions the way feeds are sorted: newest first, ties broken
    /// by the higher id first. `Ordering::Less` means `self` comes earlier.
    pub fn feed_order(&self, other: &FeedCursor) -> Ordering {
        other
            .created_at
            .cmp(&self.created_at)
            .then_with(|| other.id.cmp(&self.id))
    }
}

impl From<&TweetRow> for FeedCursor {
    fn from(row: &TweetRow) -> Self {
        FeedCursor {
            id: row.id,
            created_at: row.created_at,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TweetPage {
    pub tweets: Vec<TweetResponse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<FeedCursor>,
}

/// Which tweets a page query may return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedFilter {
    All,
    Author(Uuid),
    /// Tweets authored by someone the given user follows.
    FollowedBy(Uuid),
}

#[derive(Debug, Clone)]
pub struct PageQuery {
    pub viewer_id: Option<Uuid>,
    pub filter: FeedFilter,
    pub cursor: Option<FeedCursor>,
    /// Rows to fetch, one more than the page size.
    pub take: usize,
}
