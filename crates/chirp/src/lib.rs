use std::sync::Arc;

use apis::setup_routes;
use axum::Router;
use repositories::{tweet_repository::PgTweetRepository, user_repository::PgUserRepository};
use services::{
    cache_service::PageCache, feed_service::FeedService, profile_service::ProfileService,
    redis_service::RedisService, tweet_service::TweetService,
};
use sqlx::postgres::PgPool;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod apis;
pub mod client;
pub mod models;
pub mod repositories;
pub mod services;
pub mod settings;
pub mod utils;

pub struct AppState {
    pub feed_service: FeedService,
    pub tweet_service: TweetService,
    pub profile_service: ProfileService,
}

pub async fn setup_database(database_url: &str) -> Result<Arc<PgPool>, sqlx::Error> {
    let pool = PgPool::connect(database_url).await?;
    Ok(Arc::new(pool))
}

pub async fn setup_router(settings: &settings::Settings) -> anyhow::Result<Router> {
    let db = setup_database(&settings.database_url).await?;
    let cache: Arc<dyn PageCache> = Arc::new(RedisService::new(&settings.redis_url).await?);
    let state = setup_services(db, cache, settings);

    Ok(build_router(Arc::new(state)))
}

pub fn setup_services(
    db: Arc<PgPool>,
    cache: Arc<dyn PageCache>,
    settings: &settings::Settings,
) -> AppState {
    let tweet_repository = Arc::new(PgTweetRepository::new(db.clone()));
    let user_repository = Arc::new(PgUserRepository::new(db));

    let profile_service =
        ProfileService::new(user_repository, cache, settings.profile_cache_ttl());
    let tweet_service = TweetService::new(
        tweet_repository.clone(),
        profile_service.clone(),
        settings.max_tweet_length(),
    );
    let feed_service = FeedService::new(tweet_repository, settings.page_limits());

    AppState {
        feed_service,
        tweet_service,
        profile_service,
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    setup_routes()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub fn init_tracing(settings: &settings::Settings) {
    let level = if settings.is_prod() {
        tracing::Level::INFO
    } else {
        tracing::Level::DEBUG
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_thread_names(true)
        .with_ansi(!settings.is_prod())
        .init();
}
