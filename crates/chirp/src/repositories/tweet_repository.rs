use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use super::{pair_lock_key, TweetRepository, LIKE_LOCK_NAMESPACE};
use crate::{
    models::tweets::{FeedFilter, PageQuery, Tweet, TweetRow},
    utils::errors::app_error::AppError,
};

/// A missing author surfaces as the tweets.user_id foreign key violation.
fn create_error(e: sqlx::Error, user_id: Uuid) -> AppError {
    match e {
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
            AppError::NotFound(format!("User {} not found", user_id))
        }
        e => AppError::DatabaseError(e),
    }
}

pub struct PgTweetRepository {
    db: Arc<PgPool>,
}

impl PgTweetRepository {
    pub fn new(db: Arc<PgPool>) -> Self {
        PgTweetRepository { db }
    }
}

#[async_trait]
impl TweetRepository for PgTweetRepository {
    async fn find_page(&self, query: &PageQuery) -> Result<Vec<TweetRow>, AppError> {
        let sql = r#"
        SELECT
            t.id,
            t.content,
            t.created_at,
            (SELECT COUNT(*) FROM likes l WHERE l.tweet_id = t.id) AS like_count,
            CASE
                WHEN $1::uuid IS NULL THEN FALSE
                ELSE EXISTS (SELECT 1 FROM likes l WHERE l.tweet_id = t.id AND l.user_id = $1)
            END AS liked_by_me,
            u.id AS user_id,
            u.name AS user_name,
            u.image AS user_image
        FROM
            tweets t
        INNER JOIN
            users u ON u.id = t.user_id
        WHERE ($2::timestamptz IS NULL OR (t.created_at, t.id) < ($2::timestamptz, $3::uuid))
            AND ($4::uuid IS NULL OR t.user_id = $4)
            AND ($5::uuid IS NULL OR EXISTS (
                SELECT 1 FROM follows f WHERE f.follower_id = $5 AND f.followed_id = t.user_id
            ))
        ORDER BY t.created_at DESC, t.id DESC
        LIMIT $6
        "#;

        let (author_id, follower_id) = match query.filter {
            FeedFilter::All => (None, None),
            FeedFilter::Author(id) => (Some(id), None),
            FeedFilter::FollowedBy(id) => (None, Some(id)),
        };
        let cursor_created_at: Option<DateTime<Utc>> = query.cursor.map(|c| c.created_at);
        let cursor_id: Option<Uuid> = query.cursor.map(|c| c.id);

        let rows = sqlx::query_as::<_, TweetRow>(sql)
            .bind(query.viewer_id)
            .bind(cursor_created_at)
            .bind(cursor_id)
            .bind(author_id)
            .bind(follower_id)
            .bind(query.take as i64)
            .fetch_all(self.db.as_ref())
            .await?;

        Ok(rows)
    }

    async fn create(&self, user_id: Uuid, content: &str) -> Result<Tweet, AppError> {
        let tweet = sqlx::query_as::<_, Tweet>(
            r#"
            INSERT INTO tweets (id, user_id, content)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, content, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(content)
        .fetch_one(self.db.as_ref())
        .await
        .map_err(|e| create_error(e, user_id))?;

        Ok(tweet)
    }

    async fn find_author(&self, tweet_id: Uuid) -> Result<Option<Uuid>, AppError> {
        let author = sqlx::query_scalar::<_, Uuid>("SELECT user_id FROM tweets WHERE id = $1")
            .bind(tweet_id)
            .fetch_optional(self.db.as_ref())
            .await?;

        Ok(author)
    }

    async fn delete(&self, tweet_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM tweets WHERE id = $1")
            .bind(tweet_id)
            .execute(self.db.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn toggle_like(&self, user_id: Uuid, tweet_id: Uuid) -> Result<Option<bool>, AppError> {
        // Delete the existing like, or insert one when nothing was deleted.
        // The advisory lock serialises toggles on the same pair, so each
        // statement sees the previous toggle's committed row.
        let query = r#"
        WITH target AS (
            SELECT id FROM tweets WHERE id = $2
        ),
        removed AS (
            DELETE FROM likes WHERE user_id = $1 AND tweet_id = $2
            RETURNING tweet_id
        ),
        added AS (
            INSERT INTO likes (user_id, tweet_id)
            SELECT $1, id FROM target
            WHERE NOT EXISTS (SELECT 1 FROM removed)
            ON CONFLICT (user_id, tweet_id) DO NOTHING
            RETURNING tweet_id
        )
        SELECT
            EXISTS (SELECT 1 FROM target) AS found,
            EXISTS (SELECT 1 FROM added) AS added
        "#;

        let mut tx = self.db.begin().await?;
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(pair_lock_key(LIKE_LOCK_NAMESPACE, user_id, tweet_id))
            .execute(&mut *tx)
            .await?;
        let (found, added) = sqlx::query_as::<_, (bool, bool)>(query)
            .bind(user_id)
            .bind(tweet_id)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(found.then_some(added))
    }
}
