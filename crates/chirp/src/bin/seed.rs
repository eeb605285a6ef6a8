use anyhow::Context;
use dotenv::dotenv;
use std::env;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let db_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let db = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&db_url)
        .await?;

    seed::apply_schema(&db).await?;
    seed::seed_data(&db).await?;

    Ok(())
}

mod seed {
    use chrono::{Duration, Utc};
    use fake::{
        faker::{lorem::en::Sentence, name::en::Name},
        Fake, Faker,
    };
    use sqlx::PgPool;
    use uuid::Uuid;

    const SCHEMA: &str = include_str!("../../schema.sql");

    pub async fn apply_schema(db: &PgPool) -> anyhow::Result<()> {
        sqlx::raw_sql(SCHEMA).execute(db).await?;
        Ok(())
    }

    pub async fn seed_data(db: &PgPool) -> anyhow::Result<()> {
        let user_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(db)
            .await?;
        if user_count > 0 {
            println!("Data already exists, skipping seed");
            return Ok(());
        }

        let user_ids = seed_users(db, 10).await?;
        let tweet_ids = seed_tweets(db, &user_ids, 60).await?;
        seed_follows(db, &user_ids, 20).await?;
        seed_likes(db, &user_ids, &tweet_ids, 120).await?;

        println!("Seed data inserted successfully");
        Ok(())
    }

    async fn seed_users(db: &PgPool, count: usize) -> anyhow::Result<Vec<Uuid>> {
        let mut user_ids = Vec::new();

        for _ in 0..count {
            let id = Uuid::new_v4();
            let name: String = Name().fake();
            let image = Faker
                .fake::<bool>()
                .then(|| format!("https://i.pravatar.cc/150?u={id}"));

            sqlx::query("INSERT INTO users (id, name, image) VALUES ($1, $2, $3)")
                .bind(id)
                .bind(name)
                .bind(image)
                .execute(db)
                .await?;

            user_ids.push(id);
        }

        Ok(user_ids)
    }

    async fn seed_tweets(
        db: &PgPool,
        user_ids: &[Uuid],
        count: usize,
    ) -> anyhow::Result<Vec<Uuid>> {
        let mut tweet_ids = Vec::new();
        let now = Utc::now();

        for n in 0..count {
            let id = Uuid::new_v4();
            let user_id = user_ids[Faker.fake::<usize>() % user_ids.len()];
            let content: String = Sentence(3..12).fake();
            // pairs share a timestamp so paging has ties to break
            let created_at = now - Duration::minutes((n / 2) as i64 * 7);

            sqlx::query(
                "INSERT INTO tweets (id, user_id, content, created_at) VALUES ($1, $2, $3, $4)",
            )
            .bind(id)
            .bind(user_id)
            .bind(content)
            .bind(created_at)
            .execute(db)
            .await?;

            tweet_ids.push(id);
        }

        Ok(tweet_ids)
    }

    async fn seed_follows(db: &PgPool, user_ids: &[Uuid], count: usize) -> anyhow::Result<()> {
        for _ in 0..count {
            let follower_id = user_ids[Faker.fake::<usize>() % user_ids.len()];
            let followed_id = user_ids[Faker.fake::<usize>() % user_ids.len()];
            if follower_id == followed_id {
                continue;
            }

            sqlx::query(
                "INSERT INTO follows (follower_id, followed_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            )
            .bind(follower_id)
            .bind(followed_id)
            .execute(db)
            .await?;
        }

        Ok(())
    }

    async fn seed_likes(
        db: &PgPool,
        user_ids: &[Uuid],
        tweet_ids: &[Uuid],
        count: usize,
    ) -> anyhow::Result<()> {
        for _ in 0..count {
            let user_id = user_ids[Faker.fake::<usize>() % user_ids.len()];
            let tweet_id = tweet_ids[Faker.fake::<usize>() % tweet_ids.len()];

            sqlx::query(
                "INSERT INTO likes (user_id, tweet_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            )
            .bind(user_id)
            .bind(tweet_id)
            .execute(db)
            .await?;
        }

        Ok(())
    }

}
