use config::{Config, Environment};
use serde::Deserialize;

use crate::{
    services::tweet_service::DEFAULT_MAX_TWEET_LENGTH,
    utils::{
        pagination::{PageLimits, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE},
        redis_keys::RedisKeys,
    },
};

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub environment: Option<String>,
    pub database_url: String,
    pub redis_url: String,
    pub port: Option<u16>,
    pub default_page_size: Option<u32>,
    pub max_page_size: Option<u32>,
    pub max_tweet_length: Option<usize>,
    /// Seconds a cached profile page stays valid
    pub profile_cache_ttl: Option<u64>,
}

impl Settings {
    pub fn is_prod(&self) -> bool {
        self.environment.as_deref() == Some("PROD")
    }

    pub fn page_limits(&self) -> PageLimits {
        let max_size = self.max_page_size.unwrap_or(MAX_PAGE_SIZE).max(1);
        PageLimits {
            default_size: self
                .default_page_size
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .clamp(1, max_size),
            max_size,
        }
    }

    pub fn max_tweet_length(&self) -> usize {
        self.max_tweet_length.unwrap_or(DEFAULT_MAX_TWEET_LENGTH)
    }

    pub fn profile_cache_ttl(&self) -> u64 {
        self.profile_cache_ttl
            .unwrap_or(RedisKeys::PROFILE_CACHE_TTL)
    }
}

pub fn load_settings() -> Result<Settings, config::ConfigError> {
    let settings = Config::builder();
    let settings = settings.add_source(Environment::default().try_parsing(true));
    settings.build()?.try_deserialize()
}
