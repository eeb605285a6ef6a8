//! In-memory store implementing the same repository traits as the Postgres
//! adapters. Used by the test suites and for running the API without a
//! database. Every toggle runs under one write lock, so it is atomic.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{TweetRepository, UserRepository};
use crate::{
    models::{
        likes::Like,
        profiles::ProfileStats,
        tweets::{FeedFilter, PageQuery, Tweet, TweetRow},
        user_follows::UserFollow,
        users::User,
    },
    utils::errors::app_error::AppError,
};

#[derive(Default)]
struct MemoryState {
    users: HashMap<Uuid, User>,
    tweets: HashMap<Uuid, Tweet>,
    likes: HashMap<(Uuid, Uuid), Like>,
    follows: HashMap<(Uuid, Uuid), UserFollow>,
}

impl MemoryState {
    fn matches(&self, tweet: &Tweet, filter: FeedFilter) -> bool {
        match filter {
            FeedFilter::All => true,
            FeedFilter::Author(author_id) => tweet.user_id == author_id,
            FeedFilter::FollowedBy(follower_id) => {
                self.follows.contains_key(&(follower_id, tweet.user_id))
            }
        }
    }

    fn row(&self, tweet: &Tweet, viewer_id: Option<Uuid>) -> TweetRow {
        let author = self.users.get(&tweet.user_id);
        TweetRow {
            id: tweet.id,
            content: tweet.content.clone(),
            created_at: tweet.created_at,
            like_count: self.likes.keys().filter(|(_, t)| *t == tweet.id).count() as i64,
            liked_by_me: viewer_id
                .map(|viewer| self.likes.contains_key(&(viewer, tweet.id)))
                .unwrap_or(false),
            user_id: tweet.user_id,
            user_name: author.and_then(|u| u.name.clone()),
            user_image: author.and_then(|u| u.image.clone()),
        }
    }
}

#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_user(&self, user: User) {
        self.state.write().await.users.insert(user.id, user);
    }

    /// Inserts a tweet with a caller-chosen id and timestamp.
    pub async fn insert_tweet(&self, tweet: Tweet) {
        self.state.write().await.tweets.insert(tweet.id, tweet);
    }

    pub async fn contains_tweet(&self, tweet_id: Uuid) -> bool {
        self.state.read().await.tweets.contains_key(&tweet_id)
    }
}

#[async_trait]
impl TweetRepository for MemoryStore {
    async fn find_page(&self, query: &PageQuery) -> Result<Vec<TweetRow>, AppError> {
        let state = self.state.read().await;
        let mut tweets: Vec<&Tweet> = state
            .tweets
            .values()
            .filter(|t| state.matches(t, query.filter))
            .filter(|t| match query.cursor {
                Some(cursor) => t.cursor().feed_order(&cursor).is_gt(),
                None => true,
            })
            .collect();
        tweets.sort_by(|a, b| a.cursor().feed_order(&b.cursor()));

        Ok(tweets
            .into_iter()
            .take(query.take)
            .map(|t| state.row(t, query.viewer_id))
            .collect())
    }

    async fn create(&self, user_id: Uuid, content: &str) -> Result<Tweet, AppError> {
        let mut state = self.state.write().await;
        if !state.users.contains_key(&user_id) {
            return Err(AppError::NotFound(format!("User {} not found", user_id)));
        }
        let tweet = Tweet {
            id: Uuid::new_v4(),
            user_id,
            content: content.to_string(),
            created_at: Utc::now(),
        };
        state.tweets.insert(tweet.id, tweet.clone());
        Ok(tweet)
    }

    async fn find_author(&self, tweet_id: Uuid) -> Result<Option<Uuid>, AppError> {
        Ok(self
            .state
            .read()
            .await
            .tweets
            .get(&tweet_id)
            .map(|t| t.user_id))
    }

    async fn delete(&self, tweet_id: Uuid) -> Result<bool, AppError> {
        let mut state = self.state.write().await;
        let removed = state.tweets.remove(&tweet_id).is_some();
        if removed {
            state.likes.retain(|(_, t), _| *t != tweet_id);
        }
        Ok(removed)
    }

    async fn toggle_like(&self, user_id: Uuid, tweet_id: Uuid) -> Result<Option<bool>, AppError> {
        let mut state = self.state.write().await;
        if !state.tweets.contains_key(&tweet_id) {
            return Ok(None);
        }
        let key = (user_id, tweet_id);
        if state.likes.remove(&key).is_some() {
            return Ok(Some(false));
        }
        state.likes.insert(
            key,
            Like {
                user_id,
                tweet_id,
                created_at: Utc::now(),
            },
        );
        Ok(Some(true))
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn profile_stats(&self, id: Uuid) -> Result<Option<ProfileStats>, AppError> {
        let state = self.state.read().await;
        Ok(state.users.get(&id).map(|user| ProfileStats {
            id: user.id,
            name: user.name.clone(),
            image: user.image.clone(),
            follower_count: state.follows.keys().filter(|(_, f)| *f == id).count() as i64,
            following_count: state.follows.keys().filter(|(f, _)| *f == id).count() as i64,
            tweet_count: state.tweets.values().filter(|t| t.user_id == id).count() as i64,
        }))
    }

    async fn is_following(&self, follower_id: Uuid, followed_id: Uuid) -> Result<bool, AppError> {
        Ok(self
            .state
            .read()
            .await
            .follows
            .contains_key(&(follower_id, followed_id)))
    }

    async fn toggle_follow(
        &self,
        follower_id: Uuid,
        followed_id: Uuid,
    ) -> Result<Option<bool>, AppError> {
        let mut state = self.state.write().await;
        if !state.users.contains_key(&followed_id) {
            return Ok(None);
        }
        let key = (follower_id, followed_id);
        if state.follows.remove(&key).is_some() {
            return Ok(Some(false));
        }
        state.follows.insert(
            key,
            UserFollow {
                follower_id,
                followed_id,
                created_at: Utc::now(),
            },
        );
        Ok(Some(true))
    }
}
