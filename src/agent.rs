use chrono::NaiveDate;
use log::{ debug, error, info };
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::analysis::{ classify_intent, extract_topics, infer_style };
use crate::config::AssistantConfig;
use crate::config::prompt::PromptConfig;
use crate::context::{ build_briefing, build_system_prompt, update_context };
use crate::history::ConversationStore;
use crate::insight::InsightEngine;
use crate::llm::chat::{ ChatClient, CompletionRequest, PromptMessage };
use crate::models::chat::{ ChatMessage, ConversationHistory, MessageMetadata };
use crate::models::context::UserContextModel;
use crate::models::health::HealthSnapshot;
use crate::models::insight::{ DailyInsight, HealthAssistantResponse };
use crate::storage::{ KeyValueStore, StorageError };

pub const NO_CREDENTIAL_REPLY: &str =
    "The health assistant isn't set up yet. Add a language model API key to enable personalized conversations.";

pub const APOLOGY_REPLY: &str =
    "I'm sorry, I'm having trouble responding right now. Please try again in a moment.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    Idle,
    Classifying,
    BuildingContext,
    AwaitingProvider,
    Persisting,
}

#[derive(Default)]
struct SessionState {
    history: ConversationHistory,
    context: Option<UserContextModel>,
}

/// Prompt list of `[system]` followed by the last `window` turns. The newest
/// turn is always included.
pub fn assemble_messages(
    system_prompt: String,
    history: &ConversationHistory,
    window: usize
) -> Vec<PromptMessage> {
    let turns = history.window(window);
    let mut messages = Vec::with_capacity(turns.len() + 1);
    messages.push(PromptMessage::system(system_prompt));
    messages.extend(turns.iter().map(PromptMessage::from));
    messages
}

/// One user's assistant session. The session lock is held for a whole turn,
/// so turns and their persistence never interleave.
pub struct HealthAssistant {
    user_id: String,
    config: AssistantConfig,
    prompts: Arc<PromptConfig>,
    chat_client: Option<Arc<dyn ChatClient>>,
    store: ConversationStore,
    insights: InsightEngine,
    session: Mutex<Option<SessionState>>,
}

impl HealthAssistant {
    pub fn new(
        user_id: &str,
        config: AssistantConfig,
        prompts: Arc<PromptConfig>,
        chat_client: Option<Arc<dyn ChatClient>>,
        kv_store: Arc<dyn KeyValueStore>
    ) -> Self {
        let store = ConversationStore::new(kv_store, &config.key_prefix, user_id);
        let insights = InsightEngine::new(
            chat_client.clone(),
            Arc::clone(&prompts),
            config.insight_sampling
        );
        Self {
            user_id: user_id.to_string(),
            config,
            prompts,
            chat_client,
            store,
            insights,
            session: Mutex::new(None),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn is_configured(&self) -> bool {
        self.chat_client.is_some()
    }

    fn transition(&self, state: TurnState) {
        debug!("[{}] turn state -> {:?}", self.user_id, state);
    }

    async fn load_session(&self) -> SessionState {
        let history = self.store.load().await;
        let context = self.store.load_context().await;
        info!("[{}] loaded {} stored messages", self.user_id, history.len());
        SessionState { history, context }
    }

    async fn persist(&self, history: &ConversationHistory, context: &UserContextModel) {
        if let Err(e) = self.store.save(history).await {
            error!("[{}] failed to persist conversation: {}", self.user_id, e);
        }
        if let Err(e) = self.store.save_context(context).await {
            error!("[{}] failed to persist user context: {}", self.user_id, e);
        }
    }

    pub async fn converse(&self, message: &str, snapshot: &HealthSnapshot) -> String {
        let Some(client) = self.chat_client.clone() else {
            info!("[{}] no provider credential configured, returning setup notice", self.user_id);
            return NO_CREDENTIAL_REPLY.to_string();
        };

        let mut guard = self.session.lock().await;
        if guard.is_none() {
            let loaded = self.load_session().await;
            *guard = Some(loaded);
        }
        let session = guard.get_or_insert_with(SessionState::default);

        self.transition(TurnState::Classifying);
        let intent = classify_intent(message);
        let topics = extract_topics(message);
        let context = update_context(
            session.context.clone(),
            intent,
            &topics,
            &snapshot.biomarkers,
            infer_style(message)
        );
        info!("[{}] intent={} topics={:?}", self.user_id, intent, topics);

        let mut history = session.history.clone();
        history.push(
            ChatMessage::user(message, MessageMetadata {
                intent,
                topics,
                health_summary: snapshot.summary(),
            })
        );

        self.transition(TurnState::BuildingContext);
        let briefing = build_briefing(
            snapshot.profile.as_ref(),
            &snapshot.biomarkers,
            snapshot.health_score.as_ref()
        );
        let system_prompt = build_system_prompt(&self.prompts, &briefing, Some(&context));
        let request = CompletionRequest {
            messages: assemble_messages(system_prompt, &history, self.config.history_window),
            params: self.config.chat_sampling,
        };

        self.transition(TurnState::AwaitingProvider);
        match client.complete(&request).await {
            Ok(completion) => {
                self.transition(TurnState::Persisting);
                history.push(ChatMessage::assistant(completion.response.clone()));
                self.persist(&history, &context).await;
                session.history = history;
                session.context = Some(context);
                self.transition(TurnState::Idle);
                completion.response
            }
            Err(e) => {
                error!("[{}] assistant request failed: {}", self.user_id, e);
                self.transition(TurnState::Idle);
                APOLOGY_REPLY.to_string()
            }
        }
    }

    pub async fn generate_insights(
        &self,
        snapshot: &HealthSnapshot,
        recent_insights: &[String]
    ) -> HealthAssistantResponse {
        self.insights.generate_insights(snapshot, recent_insights).await
    }

    pub async fn generate_daily_recommendations(
        &self,
        snapshot: &HealthSnapshot,
        date: NaiveDate
    ) -> Vec<DailyInsight> {
        self.insights.generate_daily_recommendations(snapshot, date).await
    }

    /// Drops the conversation and the context model together, in memory and
    /// in storage.
    pub async fn reset_memory(&self) -> Result<(), StorageError> {
        let mut guard = self.session.lock().await;
        *guard = Some(SessionState::default());
        self.store.clear().await
    }

    pub async fn history(&self) -> ConversationHistory {
        let mut guard = self.session.lock().await;
        if guard.is_none() {
            let loaded = self.load_session().await;
            *guard = Some(loaded);
        }
        guard.as_ref().map(|s| s.history.clone()).unwrap_or_default()
    }

    pub async fn user_context(&self) -> Option<UserContextModel> {
        let mut guard = self.session.lock().await;
        if guard.is_none() {
            let loaded = self.load_session().await;
            *guard = Some(loaded);
        }
        guard.as_ref().and_then(|s| s.context.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::chat::PromptRole;

    #[test]
    fn assembled_window_keeps_newest_turns() {
        let mut history = ConversationHistory::default();
        for i in 0..30 {
            history.push(ChatMessage::assistant(format!("turn {}", i)));
        }
        let messages = assemble_messages("sys".to_string(), &history, 20);
        assert_eq!(messages.len(), 21);
        assert_eq!(messages[0].role, PromptRole::System);
        assert_eq!(messages[1].content, "turn 10");
        assert_eq!(messages[20].content, "turn 29");
    }

    #[test]
    fn zero_window_sends_newest_turn() {
        let mut history = ConversationHistory::default();
        history.push(ChatMessage::assistant("older"));
        history.push(ChatMessage::assistant("newest"));
        let messages = assemble_messages("sys".to_string(), &history, 0);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].content, "newest");
    }
}
