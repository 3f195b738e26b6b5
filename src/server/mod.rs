pub mod api;

use log::info;
use std::collections::HashMap;
use std::sync::{ Arc, Weak };
use thiserror::Error;
use tokio::sync::Mutex;

use crate::agent::HealthAssistant;
use crate::config::AssistantConfig;
use crate::config::prompt::PromptConfig;
use crate::llm::chat::ChatClient;
use crate::storage::KeyValueStore;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Invalid server address '{0}': {1}")]
    InvalidAddress(String, std::net::AddrParseError),
    #[error("Server IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One live `HealthAssistant` per user id. Each assistant serializes its own
/// turns, which gives the per-user single writer the stored data relies on.
/// Only weak handles are kept: a session lives while a request holds it and
/// is reloaded from the store afterwards.
pub struct SessionRegistry {
    config: AssistantConfig,
    prompts: Arc<PromptConfig>,
    chat_client: Option<Arc<dyn ChatClient>>,
    store: Arc<dyn KeyValueStore>,
    sessions: Mutex<HashMap<String, Weak<HealthAssistant>>>,
}

impl SessionRegistry {
    pub fn new(
        config: AssistantConfig,
        prompts: Arc<PromptConfig>,
        chat_client: Option<Arc<dyn ChatClient>>,
        store: Arc<dyn KeyValueStore>
    ) -> Self {
        Self {
            config,
            prompts,
            chat_client,
            store,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub async fn session(&self, user_id: &str) -> Arc<HealthAssistant> {
        let mut sessions = self.sessions.lock().await;
        if let Some(existing) = sessions.get(user_id).and_then(Weak::upgrade) {
            return existing;
        }
        sessions.retain(|_, session| session.strong_count() > 0);
        info!("Opening assistant session for '{}'", user_id);
        let assistant = Arc::new(
            HealthAssistant::new(
                user_id,
                self.config.clone(),
                Arc::clone(&self.prompts),
                self.chat_client.clone(),
                Arc::clone(&self.store)
            )
        );
        sessions.insert(user_id.to_string(), Arc::downgrade(&assistant));
        assistant
    }

    pub async fn active_sessions(&self) -> usize {
        self.sessions
            .lock().await
            .values()
            .filter(|session| session.strong_count() > 0)
            .count()
    }
}

pub struct Server {
    addr: String,
    registry: Arc<SessionRegistry>,
    api_key: Option<String>,
}

impl Server {
    pub fn new(addr: String, registry: Arc<SessionRegistry>, api_key: Option<String>) -> Self {
        Self {
            addr,
            registry,
            api_key,
        }
    }

    pub async fn run(&self) -> Result<(), ServerError> {
        api::start_http_server(&self.addr, Arc::clone(&self.registry), self.api_key.clone()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[tokio::test]
    async fn same_user_gets_same_session() {
        let registry = SessionRegistry::new(
            AssistantConfig::default(),
            Arc::new(PromptConfig::default()),
            None,
            Arc::new(MemoryStore::new())
        );
        let a = registry.session("alice").await;
        let again = registry.session("alice").await;
        let b = registry.session("bob").await;
        assert!(Arc::ptr_eq(&a, &again));
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(registry.active_sessions().await, 2);
    }

    #[tokio::test]
    async fn released_sessions_are_not_retained() {
        let registry = SessionRegistry::new(
            AssistantConfig::default(),
            Arc::new(PromptConfig::default()),
            None,
            Arc::new(MemoryStore::new())
        );
        for i in 0..50 {
            registry.session(&format!("user-{}", i)).await;
        }
        assert_eq!(registry.active_sessions().await, 0);

        let held = registry.session("alice").await;
        assert_eq!(registry.sessions.lock().await.len(), 1);
        assert!(Arc::ptr_eq(&held, &registry.session("alice").await));
        drop(held);
        assert_eq!(registry.active_sessions().await, 0);
    }
}
