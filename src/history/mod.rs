use log::{ info, warn };
use serde::de::DeserializeOwned;
use std::sync::Arc;

use crate::models::chat::{ ChatMessage, ConversationHistory };
use crate::models::context::UserContextModel;
use crate::storage::{ KeyValueStore, StorageError };

/// Persists one user's conversation log and context model. The pair is
/// always cleared together.
#[derive(Clone)]
pub struct ConversationStore {
    store: Arc<dyn KeyValueStore>,
    history_key: String,
    context_key: String,
}

impl ConversationStore {
    pub fn new(store: Arc<dyn KeyValueStore>, key_prefix: &str, user_id: &str) -> Self {
        Self {
            store,
            history_key: format!("{}{}:conversation", key_prefix, user_id),
            context_key: format!("{}{}:context", key_prefix, user_id),
        }
    }

    pub fn keys(&self) -> [String; 2] {
        [self.history_key.clone(), self.context_key.clone()]
    }

    async fn read_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                return None;
            }
            Err(e) => {
                warn!("Failed to read '{}', starting fresh: {}", key, e);
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Corrupt data under '{}', starting fresh: {}", key, e);
                None
            }
        }
    }

    /// Never fails: missing, unreadable or corrupt data all load as an empty log.
    pub async fn load(&self) -> ConversationHistory {
        self.read_json(&self.history_key).await.unwrap_or_default()
    }

    pub async fn save(&self, history: &ConversationHistory) -> Result<(), StorageError> {
        let json = serde_json::to_string(history)?;
        self.store.set(&self.history_key, &json).await
    }

    pub async fn append(&self, message: ChatMessage) -> Result<ConversationHistory, StorageError> {
        let mut history = self.load().await;
        history.push(message);
        self.save(&history).await?;
        Ok(history)
    }

    pub async fn load_context(&self) -> Option<UserContextModel> {
        self.read_json(&self.context_key).await
    }

    pub async fn save_context(&self, context: &UserContextModel) -> Result<(), StorageError> {
        let json = serde_json::to_string(context)?;
        self.store.set(&self.context_key, &json).await
    }

    pub async fn clear(&self) -> Result<(), StorageError> {
        self.store.multi_remove(&self.keys()).await?;
        info!("Cleared conversation and context for '{}'", self.history_key);
        Ok(())
    }
}
