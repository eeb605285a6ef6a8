use std::sync::Arc;

use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::profile_service::ProfileService;
use crate::{
    models::{likes::LikeToggle, tweets::Tweet},
    repositories::TweetRepository,
    utils::errors::app_error::AppError,
};

pub const DEFAULT_MAX_TWEET_LENGTH: usize = 280;

#[derive(Clone)]
pub struct TweetService {
    tweet_repository: Arc<dyn TweetRepository>,
    profile_service: ProfileService,
    max_tweet_length: usize,
}

impl TweetService {
    pub fn new(
        tweet_repository: Arc<dyn TweetRepository>,
        profile_service: ProfileService,
        max_tweet_length: usize,
    ) -> Self {
        TweetService {
            tweet_repository,
            profile_service,
            max_tweet_length,
        }
    }

    #[instrument(skip(self, content))]
    pub async fn create_tweet(&self, actor_id: Uuid, content: &str) -> Result<Tweet, AppError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(AppError::BadRequest("Tweet content cannot be empty".to_string()));
        }
        if content.chars().count() > self.max_tweet_length {
            return Err(AppError::BadRequest(format!(
                "Tweet content cannot exceed {} characters",
                self.max_tweet_length
            )));
        }

        let tweet = self.tweet_repository.create(actor_id, content).await?;
        info!("User {} created tweet {}", actor_id, tweet.id);

        self.profile_service.revalidate_profile(actor_id).await;
        Ok(tweet)
    }

    /// Deletes the tweet when `actor_id` owns it. Returns false, not an
    /// error, when the tweet is missing or owned by someone else.
    #[instrument(skip(self))]
    pub async fn delete_tweet(&self, actor_id: Uuid, tweet_id: Uuid) -> Result<bool, AppError> {
        let author_id = self.tweet_repository.find_author(tweet_id).await?;
        if author_id != Some(actor_id) {
            warn!("User {} may not delete tweet {}", actor_id, tweet_id);
            return Ok(false);
        }

        let deleted = self.tweet_repository.delete(tweet_id).await?;
        if deleted {
            self.profile_service.revalidate_profile(actor_id).await;
        }
        Ok(deleted)
    }

    #[instrument(skip(self))]
    pub async fn toggle_like(&self, actor_id: Uuid, tweet_id: Uuid) -> Result<LikeToggle, AppError> {
        let added = self
            .tweet_repository
            .toggle_like(actor_id, tweet_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Tweet {} not found", tweet_id)))?;

        Ok(LikeToggle { added })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::users::User,
        repositories::memory::MemoryStore,
        services::{cache_service::InMemoryPageCache, feed_service::FeedService},
        utils::{pagination::PageLimits, redis_keys::RedisKeys},
    };
    use chrono::Utc;
    use rstest::rstest;

    struct Fixture {
        store: Arc<MemoryStore>,
        cache: Arc<InMemoryPageCache>,
        tweets: TweetService,
        feed: FeedService,
        profiles: ProfileService,
        ana: Uuid,
        bob: Uuid,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let cache = Arc::new(InMemoryPageCache::new());
        let ana = Uuid::new_v4();
        let bob = Uuid::new_v4();
        for (id, name) in [(ana, "ana"), (bob, "bob")] {
            store
                .insert_user(User {
                    id,
                    name: Some(name.to_string()),
                    image: None,
                    created_at: Utc::now(),
                })
                .await;
        }
        let profiles = ProfileService::new(store.clone(), cache.clone(), 60);
        let tweets = TweetService::new(store.clone(), profiles.clone(), DEFAULT_MAX_TWEET_LENGTH);
        let feed = FeedService::new(store.clone(), PageLimits::default());
        Fixture {
            store,
            cache,
            tweets,
            feed,
            profiles,
            ana,
            bob,
        }
    }

    #[tokio::test]
    async fn created_tweet_heads_the_next_global_page() {
        let f = fixture().await;
        f.tweets.create_tweet(f.bob, "older").await.unwrap();
        let tweet = f.tweets.create_tweet(f.ana, "  hello world  ").await.unwrap();
        assert_eq!(tweet.content, "hello world");
        assert_eq!(tweet.user_id, f.ana);

        let page = f.feed.feed_page(None, None, None, false).await.unwrap();
        assert_eq!(page.tweets[0].id, tweet.id);
        assert_eq!(page.tweets[0].like_count, 0);
        assert_eq!(page.tweets[0].user.name.as_deref(), Some("ana"));
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[tokio::test]
    async fn blank_tweets_are_rejected(#[case] content: &str) {
        let f = fixture().await;
        assert!(matches!(
            f.tweets.create_tweet(f.ana, content).await,
            Err(AppError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn overlong_tweets_are_rejected() {
        let f = fixture().await;
        let content = "a".repeat(DEFAULT_MAX_TWEET_LENGTH + 1);
        assert!(f.tweets.create_tweet(f.ana, &content).await.is_err());
        let content = "a".repeat(DEFAULT_MAX_TWEET_LENGTH);
        assert!(f.tweets.create_tweet(f.ana, &content).await.is_ok());
    }

    #[tokio::test]
    async fn creating_a_tweet_revalidates_the_author_profile() {
        let f = fixture().await;
        let before = f.profiles.get_profile(None, f.ana).await.unwrap().unwrap();
        assert_eq!(before.tweet_count, 0);

        f.tweets.create_tweet(f.ana, "hi").await.unwrap();

        assert!(!f.cache.contains(&RedisKeys::get_profile_key(f.ana, 0)).await);
        let after = f.profiles.get_profile(None, f.ana).await.unwrap().unwrap();
        assert_eq!(after.tweet_count, 1);
    }

    #[tokio::test]
    async fn non_owner_cannot_delete() {
        let f = fixture().await;
        let tweet = f.tweets.create_tweet(f.ana, "mine").await.unwrap();

        assert!(!f.tweets.delete_tweet(f.bob, tweet.id).await.unwrap());
        assert!(f.store.contains_tweet(tweet.id).await);

        assert!(f.tweets.delete_tweet(f.ana, tweet.id).await.unwrap());
        assert!(!f.store.contains_tweet(tweet.id).await);
    }

    #[tokio::test]
    async fn deleting_a_missing_tweet_returns_false() {
        let f = fixture().await;
        assert!(!f.tweets.delete_tweet(f.ana, Uuid::new_v4()).await.unwrap());
    }

    #[tokio::test]
    async fn double_toggle_like_restores_state() {
        let f = fixture().await;
        let tweet = f.tweets.create_tweet(f.ana, "like me").await.unwrap();

        let first = f.tweets.toggle_like(f.bob, tweet.id).await.unwrap();
        assert!(first.added);
        let page = f.feed.feed_page(Some(f.bob), None, None, false).await.unwrap();
        assert_eq!(page.tweets[0].like_count, 1);
        assert!(page.tweets[0].liked_by_me);

        let second = f.tweets.toggle_like(f.bob, tweet.id).await.unwrap();
        assert!(!second.added);
        let page = f.feed.feed_page(Some(f.bob), None, None, false).await.unwrap();
        assert_eq!(page.tweets[0].like_count, 0);
        assert!(!page.tweets[0].liked_by_me);
    }

    #[tokio::test]
    async fn concurrent_likes_never_duplicate() {
        let f = fixture().await;
        let tweet = f.tweets.create_tweet(f.ana, "race").await.unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let tweets = f.tweets.clone();
                let bob = f.bob;
                tokio::spawn(async move { tweets.toggle_like(bob, tweet.id).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        // An even number of toggles lands back on "not liked".
        let page = f.feed.feed_page(Some(f.bob), None, None, false).await.unwrap();
        assert_eq!(page.tweets[0].like_count, 0);
        assert!(!page.tweets[0].liked_by_me);
    }

    #[tokio::test]
    async fn liking_a_missing_tweet_is_not_found() {
        let f = fixture().await;
        assert!(matches!(
            f.tweets.toggle_like(f.ana, Uuid::new_v4()).await,
            Err(AppError::NotFound(_))
        ));
    }
}
