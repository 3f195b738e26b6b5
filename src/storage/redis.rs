use async_trait::async_trait;
use redis::{ AsyncCommands, Client };

use super::{ KeyValueStore, StorageError };

pub struct RedisStore {
    client: Client,
}

impl RedisStore {
    pub fn new(host: &str) -> Result<Self, StorageError> {
        Ok(Self {
            client: Client::open(host)?,
        })
    }

    async fn get_connection(&self) -> Result<redis::aio::MultiplexedConnection, redis::RedisError> {
        self.client.get_multiplexed_async_connection().await
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut conn = self.get_connection().await?;
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut conn = self.get_connection().await?;
        let _: () = conn.set(key, value).await?;
        Ok(())
    }

    async fn multi_remove(&self, keys: &[String]) -> Result<(), StorageError> {
        if keys.is_empty() {
            return Ok(());
        }
        let mut conn = self.get_connection().await?;
        let _: i64 = conn.del(keys).await?;
        Ok(())
    }
}
