use std::sync::Arc;

use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::cache_service::{get_cached, set_cached, PageCache};
use crate::{
    models::{
        profiles::{ProfileResponse, ProfileStats},
        user_follows::FollowToggle,
    },
    repositories::UserRepository,
    utils::{errors::app_error::AppError, redis_keys::RedisKeys},
};

#[derive(Clone)]
pub struct ProfileService {
    user_repository: Arc<dyn UserRepository>,
    cache: Arc<dyn PageCache>,
    cache_ttl: u64,
}

impl ProfileService {
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        cache: Arc<dyn PageCache>,
        cache_ttl: u64,
    ) -> Self {
        ProfileService {
            user_repository,
            cache,
            cache_ttl,
        }
    }

    /// `None` when the user does not exist.
    #[instrument(skip(self))]
    pub async fn get_profile(
        &self,
        viewer_id: Option<Uuid>,
        user_id: Uuid,
    ) -> Result<Option<ProfileResponse>, AppError> {
        let Some(stats) = self.profile_stats(user_id).await? else {
            return Ok(None);
        };

        let is_following = match viewer_id {
            Some(viewer_id) => {
                self.user_repository
                    .is_following(viewer_id, user_id)
                    .await?
            }
            None => false,
        };

        Ok(Some(ProfileResponse::new(stats, is_following)))
    }

    /// Adds the follow edge when absent, removes it when present.
    #[instrument(skip(self))]
    pub async fn toggle_follow(
        &self,
        actor_id: Uuid,
        user_id: Uuid,
    ) -> Result<FollowToggle, AppError> {
        if actor_id == user_id {
            return Err(AppError::BadRequest("Users cannot follow themselves".to_string()));
        }

        let added = self
            .user_repository
            .toggle_follow(actor_id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;

        info!("User {} {} user {}", actor_id, if added { "followed" } else { "unfollowed" }, user_id);

        self.revalidate_profile(user_id).await;
        self.revalidate_profile(actor_id).await;

        Ok(FollowToggle { added })
    }

    /// Moves the profile to a new cache generation, so entries written by
    /// reads that started earlier are never served. Failures are logged and
    /// swallowed: the entry expires on its own.
    pub async fn revalidate_profile(&self, user_id: Uuid) {
        let generation_key = RedisKeys::get_profile_generation_key(user_id);
        match self.cache.increment(&generation_key).await {
            Ok(generation) => {
                let previous = RedisKeys::get_profile_key(user_id, generation.saturating_sub(1));
                if let Err(e) = self.cache.invalidate(&previous).await {
                    warn!("Failed to drop stale profile {}: {}", user_id, e);
                }
            }
            Err(e) => warn!("Failed to revalidate profile {}: {}", user_id, e),
        }
    }

    /// Current cache generation, or `None` when the cache is unreachable.
    async fn profile_generation(&self, user_id: Uuid) -> Option<u64> {
        let key = RedisKeys::get_profile_generation_key(user_id);
        match get_cached::<u64>(self.cache.as_ref(), &key).await {
            Ok(generation) => Some(generation.unwrap_or(0)),
            Err(e) => {
                warn!("Profile cache read failed for {}: {}", user_id, e);
                None
            }
        }
    }

    async fn profile_stats(&self, user_id: Uuid) -> Result<Option<ProfileStats>, AppError> {
        // generation must be read before the row
        let key = self
            .profile_generation(user_id)
            .await
            .map(|generation| RedisKeys::get_profile_key(user_id, generation));

        if let Some(key) = &key {
            match get_cached::<ProfileStats>(self.cache.as_ref(), key).await {
                Ok(Some(stats)) => {
                    debug!("Profile cache hit for {}", user_id);
                    return Ok(Some(stats));
                }
                Ok(None) => {}
                Err(e) => warn!("Profile cache read failed for {}: {}", user_id, e),
            }
        }

        let stats = self.user_repository.profile_stats(user_id).await?;
        if let (Some(stats), Some(key)) = (&stats, &key) {
            if let Err(e) = set_cached(self.cache.as_ref(), key, stats, self.cache_ttl).await {
                warn!("Profile cache write failed for {}: {}", user_id, e);
            }
        }

        Ok(stats)
    }
}
