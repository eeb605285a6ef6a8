use async_trait::async_trait;
use redis::{aio::MultiplexedConnection, Client, RedisError};

use super::cache_service::PageCache;
use crate::utils::errors::app_error::AppError;

pub struct RedisService {
    connection: MultiplexedConnection,
}

impl RedisService {
    pub async fn new(redis_url: &str) -> Result<Self, RedisError> {
        let client = Client::open(redis_url)?;
        let connection = client.get_multiplexed_async_connection().await?;

        Ok(Self { connection })
    }

    pub async fn get(&self, key: &str) -> Result<Option<String>, RedisError> {
        let mut connection = self.connection.clone();
        redis::cmd("GET")
            .arg(key)
            .query_async(&mut connection)
            .await
    }

    pub async fn set_ex(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), RedisError> {
        let mut connection = self.connection.clone();
        let _: () = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("EX")
            .arg(ttl_seconds)
            .query_async(&mut connection)
            .await?;
        Ok(())
    }

    pub async fn incr(&self, key: &str) -> Result<u64, RedisError> {
        let mut connection = self.connection.clone();
        redis::cmd("INCR")
            .arg(key)
            .query_async(&mut connection)
            .await
    }

    pub async fn delete(&self, key: &str) -> Result<(), RedisError> {
        let mut connection = self.connection.clone();
        let _: () = redis::cmd("DEL")
            .arg(key)
            .query_async(&mut connection)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl PageCache for RedisService {
    async fn get_raw(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(self.get(key).await?)
    }

    async fn set_raw(&self, key: &str, value: String, ttl_seconds: u64) -> Result<(), AppError> {
        Ok(self.set_ex(key, &value, ttl_seconds).await?)
    }

    async fn invalidate(&self, key: &str) -> Result<(), AppError> {
        Ok(self.delete(key).await?)
    }

    async fn increment(&self, key: &str) -> Result<u64, AppError> {
        Ok(self.incr(key).await?)
    }
}
