#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{ Arc, Mutex };

use health_assistant::agent::HealthAssistant;
use health_assistant::config::AssistantConfig;
use health_assistant::config::prompt::PromptConfig;
use health_assistant::llm::chat::{ ChatClient, CompletionRequest, CompletionResponse };
use health_assistant::llm::LlmError;
use health_assistant::storage::KeyValueStore;

pub enum Scripted {
    Reply(String),
    Status(u16),
}

/// Provider double that replays queued outcomes and records every request.
#[derive(Default)]
pub struct ScriptedClient {
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply(&self, text: &str) {
        self.script.lock().unwrap().push_back(Scripted::Reply(text.to_string()));
    }

    pub fn fail(&self, status: u16) {
        self.script.lock().unwrap().push_back(Scripted::Status(status));
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> CompletionRequest {
        self.requests().pop().expect("no request was sent")
    }
}

#[async_trait]
impl ChatClient for ScriptedClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Scripted::Reply(text)) => Ok(CompletionResponse { response: text }),
            Some(Scripted::Status(status)) =>
                Err(LlmError::Status { status, body: "scripted failure".to_string() }),
            None => Ok(CompletionResponse { response: "ok".to_string() }),
        }
    }

    fn get_model(&self) -> String {
        "scripted".to_string()
    }

    fn get_base_url(&self) -> Option<String> {
        None
    }
}

pub fn assistant_with(
    client: Option<Arc<ScriptedClient>>,
    store: Arc<dyn KeyValueStore>,
    config: AssistantConfig
) -> HealthAssistant {
    let client = client.map(|c| c as Arc<dyn ChatClient>);
    HealthAssistant::new("alice", config, Arc::new(PromptConfig::default()), client, store)
}
