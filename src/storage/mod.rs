mod file;
mod memory;
mod redis;

pub use self::file::FileStore;
pub use self::memory::MemoryStore;
pub use self::redis::RedisStore;

use async_trait::async_trait;
use log::info;
use std::sync::Arc;
use thiserror::Error;

use crate::cli::Args;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Redis error: {0}")]
    Redis(#[from] ::redis::RedisError),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Unsupported store type: {0}")]
    UnsupportedType(String),
}

/// Opaque string key-value persistence. Every `set` replaces the whole value.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    async fn multi_remove(&self, keys: &[String]) -> Result<(), StorageError>;
}

pub fn create_store(args: &Args) -> Result<Arc<dyn KeyValueStore>, StorageError> {
    match args.store_type.to_lowercase().as_str() {
        "memory" => Ok(Arc::new(MemoryStore::new())),
        "file" => Ok(Arc::new(FileStore::new(&args.store_path)?)),
        "redis" => Ok(Arc::new(RedisStore::new(&args.store_host)?)),
        other => Err(StorageError::UnsupportedType(other.to_string())),
    }
}

pub fn initialize_store(args: &Args) -> Result<Arc<dyn KeyValueStore>, StorageError> {
    let location = match args.store_type.to_lowercase().as_str() {
        "file" => args.store_path.as_str(),
        "redis" => args.store_host.as_str(),
        _ => "process memory",
    };
    info!("Assistant memory will be stored in: {} at {}", args.store_type, location);
    create_store(args)
}
