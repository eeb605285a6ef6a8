use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use super::{pair_lock_key, UserRepository, FOLLOW_LOCK_NAMESPACE};
use crate::{
    models::{profiles::ProfileStats, users::User},
    utils::errors::app_error::AppError,
};

pub struct PgUserRepository {
    db: Arc<PgPool>,
}

impl PgUserRepository {
    pub fn new(db: Arc<PgPool>) -> Self {
        PgUserRepository { db }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, image, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.db.as_ref())
        .await?;

        Ok(user)
    }

    async fn profile_stats(&self, id: Uuid) -> Result<Option<ProfileStats>, AppError> {
        let query = r#"
        SELECT
            u.id,
            u.name,
            u.image,
            (SELECT COUNT(*) FROM follows f WHERE f.followed_id = u.id) AS follower_count,
            (SELECT COUNT(*) FROM follows f WHERE f.follower_id = u.id) AS following_count,
            (SELECT COUNT(*) FROM tweets t WHERE t.user_id = u.id) AS tweet_count
        FROM
            users u
        WHERE u.id = $1
        "#;
        let stats = sqlx::query_as::<_, ProfileStats>(query)
            .bind(id)
            .fetch_optional(self.db.as_ref())
            .await?;

        Ok(stats)
    }

    async fn is_following(&self, follower_id: Uuid, followed_id: Uuid) -> Result<bool, AppError> {
        let query = r#"
        SELECT EXISTS (SELECT 1 FROM follows WHERE follower_id = $1 AND followed_id = $2)
        "#;
        let following = sqlx::query_scalar::<_, bool>(query)
            .bind(follower_id)
            .bind(followed_id)
            .fetch_one(self.db.as_ref())
            .await?;

        Ok(following)
    }

    async fn toggle_follow(
        &self,
        follower_id: Uuid,
        followed_id: Uuid,
    ) -> Result<Option<bool>, AppError> {
        let query = r#"
        WITH target AS (
            SELECT id FROM users WHERE id = $2
        ),
        removed AS (
            DELETE FROM follows WHERE follower_id = $1 AND followed_id = $2
            RETURNING followed_id
        ),
        added AS (
            INSERT INTO follows (follower_id, followed_id)
            SELECT $1, id FROM target
            WHERE NOT EXISTS (SELECT 1 FROM removed)
            ON CONFLICT (follower_id, followed_id) DO NOTHING
            RETURNING followed_id
        )
        SELECT
            EXISTS (SELECT 1 FROM target) AS found,
            EXISTS (SELECT 1 FROM added) AS added
        "#;

        let mut tx = self.db.begin().await?;
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(pair_lock_key(FOLLOW_LOCK_NAMESPACE, follower_id, followed_id))
            .execute(&mut *tx)
            .await?;
        let (found, added) = sqlx::query_as::<_, (bool, bool)>(query)
            .bind(follower_id)
            .bind(followed_id)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(found.then_some(added))
    }
}
