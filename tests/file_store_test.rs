mod common;

use std::sync::Arc;

use common::{ assistant_with, ScriptedClient };
use health_assistant::agent::HealthAssistant;
use health_assistant::config::AssistantConfig;
use health_assistant::config::prompt::PromptConfig;
use health_assistant::llm::chat::ChatClient;
use health_assistant::models::chat::{ ChatRole, IntentTag };
use health_assistant::models::health::HealthSnapshot;
use health_assistant::storage::{ FileStore, KeyValueStore };

#[tokio::test]
async fn conversation_survives_process_restart() {
    let dir = tempfile::tempdir().unwrap();
    let client = ScriptedClient::new();
    client.reply("Try a short walk after meals.");

    {
        let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(dir.path()).unwrap());
        let assistant = assistant_with(Some(client.clone()), store, AssistantConfig::default());
        assistant.converse("Any exercise ideas?", &HealthSnapshot::default()).await;
    }

    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(dir.path()).unwrap());
    let restarted = assistant_with(None, store, AssistantConfig::default());

    let history = restarted.history().await;
    assert_eq!(history.len(), 2);
    assert_eq!(history.messages[0].role, ChatRole::User);
    assert_eq!(history.messages[1].content, "Try a short walk after meals.");

    let context = restarted.user_context().await.unwrap();
    assert_eq!(context.preferred_topics, vec![IntentTag::FitnessGuidance]);
}

#[tokio::test]
async fn reset_removes_files_for_that_user_only() {
    let dir = tempfile::tempdir().unwrap();
    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(dir.path()).unwrap());
    let client = ScriptedClient::new();

    let alice = assistant_with(Some(client.clone()), store.clone(), AssistantConfig::default());
    alice.converse("How can I relax?", &HealthSnapshot::default()).await;

    let prefix = AssistantConfig::default().key_prefix;
    store.set(&format!("{}bob:conversation", prefix), "[]").await.unwrap();

    alice.reset_memory().await.unwrap();

    let remaining: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(remaining.len(), 1);
    assert!(remaining[0].contains("bob"));
}

#[tokio::test]
async fn lookalike_user_ids_do_not_share_history() {
    let dir = tempfile::tempdir().unwrap();
    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(dir.path()).unwrap());
    let client = ScriptedClient::new();
    client.reply("reply to a:b");
    let open = |user_id: &str| {
        HealthAssistant::new(
            user_id,
            AssistantConfig::default(),
            Arc::new(PromptConfig::default()),
            Some(client.clone() as Arc<dyn ChatClient>),
            store.clone()
        )
    };

    open("a:b").converse("my private LDL question", &HealthSnapshot::default()).await;

    let other = open("a_b");
    assert!(other.history().await.is_empty());
    assert!(other.user_context().await.is_none());
    assert_eq!(open("a:b").history().await.len(), 2);
}
