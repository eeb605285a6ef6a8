use std::sync::Arc;

use tracing::{debug, instrument};
use uuid::Uuid;

use crate::{
    models::tweets::{FeedCursor, FeedFilter, PageQuery, TweetPage},
    repositories::TweetRepository,
    utils::{
        errors::app_error::AppError,
        pagination::{into_page, PageLimits},
    },
};

#[derive(Clone)]
pub struct FeedService {
    tweet_repository: Arc<dyn TweetRepository>,
    limits: PageLimits,
}

impl FeedService {
    pub fn new(tweet_repository: Arc<dyn TweetRepository>, limits: PageLimits) -> Self {
        FeedService {
            tweet_repository,
            limits,
        }
    }

    /// Global feed. `only_following` narrows it to authors the viewer
    /// follows; without a viewer it has no effect.
    #[instrument(skip(self))]
    pub async fn feed_page(
        &self,
        viewer_id: Option<Uuid>,
        limit: Option<u32>,
        cursor: Option<FeedCursor>,
        only_following: bool,
    ) -> Result<TweetPage, AppError> {
        let filter = match (only_following, viewer_id) {
            (true, Some(viewer_id)) => FeedFilter::FollowedBy(viewer_id),
            _ => FeedFilter::All,
        };
        self.page(viewer_id, filter, limit, cursor).await
    }

    #[instrument(skip(self))]
    pub async fn profile_feed_page(
        &self,
        viewer_id: Option<Uuid>,
        user_id: Uuid,
        limit: Option<u32>,
        cursor: Option<FeedCursor>,
    ) -> Result<TweetPage, AppError> {
        self.page(viewer_id, FeedFilter::Author(user_id), limit, cursor)
            .await
    }

    async fn page(
        &self,
        viewer_id: Option<Uuid>,
        filter: FeedFilter,
        limit: Option<u32>,
        cursor: Option<FeedCursor>,
    ) -> Result<TweetPage, AppError> {
        let limit = self.limits.resolve(limit)?;
        let query = PageQuery {
            viewer_id,
            filter,
            cursor,
            take: limit + 1,
        };

        let rows = self.tweet_repository.find_page(&query).await?;
        let page = into_page(rows, limit);
        debug!(
            "Fetched {} tweets, has next page: {}",
            page.tweets.len(),
            page.next_cursor.is_some()
        );

        Ok(page)
    }
}
