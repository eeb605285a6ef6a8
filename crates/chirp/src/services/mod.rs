pub mod cache_service;
pub mod feed_service;
pub mod profile_service;
pub mod redis_service;
pub mod tweet_service;
