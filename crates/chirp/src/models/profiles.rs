use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Viewer-independent part of a profile page. This is what the profile
/// cache stores.
#[derive(Clone, Debug, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct ProfileStats {
    pub id: Uuid,
    pub name: Option<String>,
    pub image: Option<String>,
    pub follower_count: i64,
    pub following_count: i64,
    pub tweet_count: i64,
}

#[derive(Serialize, Deserialize, ToSchema, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub name: Option<String>,
    pub image: Option<String>,
    pub is_following: bool,
    pub follower_count: i64,
    pub following_count: i64,
    pub tweet_count: i64,
}

impl ProfileResponse {
    pub fn new(stats: ProfileStats, is_following: bool) -> Self {
        ProfileResponse {
            name: stats.name,
            image: stats.image,
            is_following,
            follower_count: stats.follower_count,
            following_count: stats.following_count,
            tweet_count: stats.tweet_count,
        }
    }
}
