pub mod ollama;
pub mod openai;

use async_trait::async_trait;
use serde::{ Deserialize, Serialize };
use std::sync::Arc;

use super::{ LlmConfig, LlmError, LlmType };
use self::ollama::OllamaClient;
use self::openai::OpenAIChatClient;
use crate::models::chat::{ ChatMessage, ChatRole };

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptRole {
    System,
    User,
    Assistant,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PromptMessage {
    pub role: PromptRole,
    pub content: String,
}

impl PromptMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: PromptRole::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: PromptRole::User, content: content.into() }
    }
}

impl From<&ChatMessage> for PromptMessage {
    fn from(message: &ChatMessage) -> Self {
        let role = match message.role {
            ChatRole::User => PromptRole::User,
            ChatRole::Assistant => PromptRole::Assistant,
        };
        Self { role, content: message.content.clone() }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SamplingParams {
    pub temperature: f32,
    pub max_tokens: u32,
    pub presence_penalty: Option<f32>,
    pub frequency_penalty: Option<f32>,
}

impl SamplingParams {
    /// Multi-turn chat: mild penalties keep the model from drifting or repeating.
    pub fn conversation() -> Self {
        Self {
            temperature: 0.6,
            max_tokens: 1000,
            presence_penalty: Some(0.1),
            frequency_penalty: Some(0.1),
        }
    }

    pub fn insight() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 1500,
            presence_penalty: None,
            frequency_penalty: None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct CompletionRequest {
    pub messages: Vec<PromptMessage>,
    pub params: SamplingParams,
}

#[derive(Deserialize, Debug, Clone)]
pub struct CompletionResponse {
    pub response: String,
}

#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError>;

    fn get_model(&self) -> String;
    fn get_base_url(&self) -> Option<String>;
}

pub fn new_client(config: &LlmConfig) -> Result<Arc<dyn ChatClient>, LlmError> {
    let client: Arc<dyn ChatClient> = match config.llm_type {
        LlmType::Ollama => {
            let specific_client = OllamaClient::from_config(config)?;
            Arc::new(specific_client)
        }
        LlmType::OpenAI | LlmType::DeepSeek | LlmType::XAI | LlmType::Groq => {
            let specific_client = OpenAIChatClient::from_config(config)?;
            Arc::new(specific_client)
        }
    };
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_roles_map_to_prompt_roles() {
        let user = ChatMessage::new(ChatRole::User, "hi");
        let reply = ChatMessage::assistant("hello");
        assert_eq!(PromptMessage::from(&user).role, PromptRole::User);
        assert_eq!(PromptMessage::from(&reply).role, PromptRole::Assistant);
    }

    #[test]
    fn openai_family_needs_a_key() {
        let config = LlmConfig { llm_type: LlmType::Groq, ..Default::default() };
        assert!(matches!(new_client(&config), Err(LlmError::Config(_))));
    }

    #[test]
    fn ollama_needs_no_key() {
        let client = new_client(&LlmConfig::default()).unwrap();
        assert_eq!(client.get_base_url().as_deref(), Some("http://localhost:11434"));
    }
}
