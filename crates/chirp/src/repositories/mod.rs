use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    models::{
        profiles::ProfileStats,
        tweets::{PageQuery, Tweet, TweetRow},
        users::User,
    },
    utils::errors::app_error::AppError,
};

pub mod memory;
pub mod tweet_repository;
pub mod user_repository;

pub(crate) const LIKE_LOCK_NAMESPACE: u8 = 1;
pub(crate) const FOLLOW_LOCK_NAMESPACE: u8 = 2;

/// Key for `pg_advisory_xact_lock` guarding one (actor, target) pair.
/// FNV-1a over the namespace and both ids, stable across processes.
pub(crate) fn pair_lock_key(namespace: u8, first: Uuid, second: Uuid) -> i64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    let bytes = std::iter::once(namespace)
        .chain(first.as_bytes().iter().copied())
        .chain(second.as_bytes().iter().copied());
    for byte in bytes {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash as i64
}

#[async_trait]
pub trait TweetRepository: Send + Sync {
    /// Up to `query.take` rows matching the filter, strictly after the
    /// cursor, ordered by `(created_at DESC, id DESC)`.
    async fn find_page(&self, query: &PageQuery) -> Result<Vec<TweetRow>, AppError>;

    async fn create(&self, user_id: Uuid, content: &str) -> Result<Tweet, AppError>;

    async fn find_author(&self, tweet_id: Uuid) -> Result<Option<Uuid>, AppError>;

    /// Returns whether a row was removed.
    async fn delete(&self, tweet_id: Uuid) -> Result<bool, AppError>;

    /// Inserts the like if absent, removes it if present, in one step.
    /// `None` when the tweet does not exist, otherwise `Some(added)`.
    async fn toggle_like(&self, user_id: Uuid, tweet_id: Uuid) -> Result<Option<bool>, AppError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;

    async fn profile_stats(&self, id: Uuid) -> Result<Option<ProfileStats>, AppError>;

    async fn is_following(&self, follower_id: Uuid, followed_id: Uuid) -> Result<bool, AppError>;

    /// Inserts the follow edge if absent, removes it if present, in one step.
    /// `None` when the followed user does not exist, otherwise `Some(added)`.
    async fn toggle_follow(
        &self,
        follower_id: Uuid,
        followed_id: Uuid,
    ) -> Result<Option<bool>, AppError>;
}
