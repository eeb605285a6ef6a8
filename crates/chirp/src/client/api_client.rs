use std::{
    collections::HashSet,
    future::Future,
    sync::{Arc, Mutex, PoisonError},
};

use async_trait::async_trait;
use chrono::SecondsFormat;
use reqwest::{Method, RequestBuilder};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use super::{
    error::ClientError,
    infinite_feed::FeedSource,
    query_cache::{QueryCache, QueryKey},
    reconcile::MutationResult,
};
use crate::{
    apis::middlewares::security::USER_ID_HEADER,
    models::{
        likes::LikeToggle,
        profiles::ProfileResponse,
        tweets::{FeedCursor, Tweet, TweetPage},
        user_follows::FollowToggle,
        users::UserSummary,
    },
    utils::errors::error_payload::ErrorPayload,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum PendingKey {
    Like(Uuid),
    Follow(Uuid),
    Delete(Uuid),
}

/// Removes its key from the pending set when the call completes or is dropped.
struct PendingGuard<'a> {
    pending: &'a Mutex<HashSet<PendingKey>>,
    key: PendingKey,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}

/// HTTP client for the `/api/v1` surface. Confirmed mutations are folded
/// into the shared `QueryCache`; failed ones leave it untouched.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    viewer: Option<UserSummary>,
    cache: Arc<QueryCache>,
    pending: Mutex<HashSet<PendingKey>>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, cache: Arc<QueryCache>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            viewer: None,
            cache,
            pending: Mutex::new(HashSet::new()),
        }
    }

    /// Acts as `viewer` on every request. The summary is also what new
    /// tweets are attributed to in the cache.
    pub fn with_viewer(mut self, viewer: UserSummary) -> Self {
        self.viewer = Some(viewer);
        self
    }

    pub fn cache(&self) -> &Arc<QueryCache> {
        &self.cache
    }

    #[instrument(skip(self))]
    pub async fn get_profile(&self, user_id: Uuid) -> Result<ProfileResponse, ClientError> {
        let path = format!("/api/v1/profiles/{user_id}");
        let profile: ProfileResponse = self.send(self.request(Method::GET, &path)).await?;
        self.cache.set_profile(user_id, profile.clone()).await;
        Ok(profile)
    }

    #[instrument(skip(self, content))]
    pub async fn create_tweet(&self, content: &str) -> Result<Tweet, ClientError> {
        let body = serde_json::json!({ "content": content });
        let tweet: Tweet = self
            .send(self.request(Method::POST, "/api/v1/tweets").json(&body))
            .await?;

        match &self.viewer {
            Some(author) => {
                self.cache
                    .apply(&MutationResult::TweetCreated {
                        tweet: tweet.clone(),
                        author: author.clone(),
                    })
                    .await
            }
            None => self.cache.invalidate(&QueryKey::global_feed()).await,
        }
        Ok(tweet)
    }

    #[instrument(skip(self))]
    pub async fn delete_tweet(&self, tweet_id: Uuid) -> Result<bool, ClientError> {
        self.exclusive(PendingKey::Delete(tweet_id), async {
            let path = format!("/api/v1/tweets/{tweet_id}");
            let deleted: bool = self.send(self.request(Method::DELETE, &path)).await?;
            if deleted {
                self.cache
                    .apply(&MutationResult::TweetDeleted { tweet_id })
                    .await;
            }
            Ok(deleted)
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn toggle_like(&self, tweet_id: Uuid) -> Result<LikeToggle, ClientError> {
        self.exclusive(PendingKey::Like(tweet_id), async {
            let path = format!("/api/v1/tweets/{tweet_id}/like");
            let toggle: LikeToggle = self.send(self.request(Method::POST, &path)).await?;
            self.cache
                .apply(&MutationResult::LikeToggled {
                    tweet_id,
                    added: toggle.added,
                })
                .await;
            Ok(toggle)
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn toggle_follow(&self, user_id: Uuid) -> Result<FollowToggle, ClientError> {
        self.exclusive(PendingKey::Follow(user_id), async {
            let path = format!("/api/v1/users/{user_id}/follow");
            let toggle: FollowToggle = self.send(self.request(Method::POST, &path)).await?;
            if let Some(viewer) = &self.viewer {
                self.cache
                    .apply(&MutationResult::FollowToggled {
                        follower_id: viewer.id,
                        followed_id: user_id,
                        added: toggle.added,
                    })
                    .await;
            }
            Ok(toggle)
        })
        .await
    }

    async fn exclusive<T, F>(&self, key: PendingKey, call: F) -> Result<T, ClientError>
    where
        F: Future<Output = Result<T, ClientError>>,
    {
        let inserted = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key);
        if !inserted {
            debug!("Refusing {:?}, previous call still pending", key);
            return Err(ClientError::MutationPending);
        }

        let _guard = PendingGuard {
            pending: &self.pending,
            key,
        };
        call.await
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .http
            .request(method, format!("{}{}", self.base_url, path));
        match &self.viewer {
            Some(viewer) => builder.header(USER_ID_HEADER, viewer.id.to_string()),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ClientError> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let message = match response.json::<ErrorPayload>().await {
            Ok(payload) => payload.message,
            Err(_) => status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string(),
        };
        warn!("Request failed with {}: {}", status, message);
        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PageParams {
    limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    cursor_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cursor_created_at: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    only_following: bool,
}

#[async_trait]
impl FeedSource for ApiClient {
    async fn fetch_page(
        &self,
        key: &QueryKey,
        cursor: Option<FeedCursor>,
        limit: u32,
    ) -> Result<TweetPage, ClientError> {
        let (path, only_following) = match key {
            QueryKey::Feed { only_following } => ("/api/v1/feed".to_string(), *only_following),
            QueryKey::ProfileFeed { user_id } => (format!("/api/v1/profiles/{user_id}/tweets"), false),
            QueryKey::Profile { .. } => return Err(ClientError::NotAFeed(*key)),
        };
        let params = PageParams {
            limit,
            cursor_id: cursor.map(|c| c.id),
            cursor_created_at: cursor
                .map(|c| c.created_at.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            only_following,
        };
        self.send(self.request(Method::GET, &path).query(&params))
            .await
    }
}
