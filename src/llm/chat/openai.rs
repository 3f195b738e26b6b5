use async_trait::async_trait;
use log::debug;
use reqwest::{ Client as HttpClient, header::{ HeaderMap, HeaderValue, CONTENT_TYPE, AUTHORIZATION } };
use serde::{ Deserialize, Serialize };
use std::time::Duration;

use super::{ ChatClient, CompletionRequest, CompletionResponse, PromptMessage };
use crate::llm::{ LlmConfig, LlmError, LlmType };

/// Client for any provider exposing the OpenAI chat-completions shape.
pub struct OpenAIChatClient {
    http: HttpClient,
    model: String,
    base_url: String,
}

#[derive(Serialize)]
struct OpenAIChatRequest<'a> {
    model: &'a str,
    messages: &'a [PromptMessage],
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    frequency_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    presence_penalty: Option<f32>,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
}

#[derive(Deserialize)]
struct OpenAIResponseMessage {
    content: Option<String>,
}

fn provider_defaults(llm_type: LlmType) -> (&'static str, &'static str) {
    match llm_type {
        LlmType::DeepSeek => ("https://api.deepseek.com", "deepseek-chat"),
        LlmType::XAI => ("https://api.x.ai", "grok-2-latest"),
        LlmType::Groq => ("https://api.groq.com/openai", "llama-3.1-8b-instant"),
        LlmType::OpenAI | LlmType::Ollama => ("https://api.openai.com", "gpt-4o-mini"),
    }
}

fn completions_url(base_url: &str) -> String {
    let trimmed = base_url.trim_end_matches('/');
    if trimmed.ends_with("/chat/completions") {
        trimmed.to_string()
    } else {
        format!("{}/v1/chat/completions", trimmed)
    }
}

impl OpenAIChatClient {
    pub fn new(
        api_key: String,
        model: String,
        base_url: String,
        timeout: Duration
    ) -> Result<Self, LlmError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key))
                .map_err(|e| LlmError::Config(format!("Invalid API key format: {}", e)))?
        );

        let http = HttpClient::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            model,
            base_url,
        })
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let api_key = config.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| LlmError::Config(format!("{} API key is required", config.llm_type)))?;
        let (default_url, default_model) = provider_defaults(config.llm_type);

        Self::new(
            api_key,
            config.completion_model.clone().unwrap_or_else(|| default_model.to_string()),
            config.base_url.clone().unwrap_or_else(|| default_url.to_string()),
            config.request_timeout,
        )
    }
}

#[async_trait]
impl ChatClient for OpenAIChatClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let url = completions_url(&self.base_url);
        let req = OpenAIChatRequest {
            model: &self.model,
            messages: &request.messages,
            temperature: request.params.temperature,
            max_tokens: request.params.max_tokens,
            frequency_penalty: request.params.frequency_penalty,
            presence_penalty: request.params.presence_penalty,
        };
        debug!("Sending {} messages to {}", request.messages.len(), url);

        let resp = self.http.post(&url).json(&req).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(LlmError::Status { status: status.as_u16(), body });
        }

        let data = resp.json::<OpenAIResponse>().await?;
        let content = data.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(LlmError::EmptyResponse)?;

        Ok(CompletionResponse { response: content })
    }

    fn get_model(&self) -> String {
        self.model.clone()
    }

    fn get_base_url(&self) -> Option<String> {
        Some(self.base_url.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::chat::SamplingParams;

    #[test]
    fn completions_url_is_not_doubled() {
        assert_eq!(completions_url("https://api.openai.com/"), "https://api.openai.com/v1/chat/completions");
        assert_eq!(
            completions_url("https://proxy.local/v1/chat/completions"),
            "https://proxy.local/v1/chat/completions"
        );
    }

    #[test]
    fn request_body_carries_sampling() {
        let messages = vec![PromptMessage::system("sys"), PromptMessage::user("hi")];
        let params = SamplingParams::conversation();
        let req = OpenAIChatRequest {
            model: "m",
            messages: &messages,
            temperature: params.temperature,
            max_tokens: params.max_tokens,
            frequency_penalty: params.frequency_penalty,
            presence_penalty: params.presence_penalty,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["max_tokens"], 1000);
        assert!(json.get("presence_penalty").is_some());
    }

    #[test]
    fn provider_defaults_fill_missing_model() {
        let config = LlmConfig {
            llm_type: LlmType::DeepSeek,
            api_key: Some("key".to_string()),
            ..Default::default()
        };
        let client = OpenAIChatClient::from_config(&config).unwrap();
        assert_eq!(client.get_model(), "deepseek-chat");
        assert_eq!(client.get_base_url().as_deref(), Some("https://api.deepseek.com"));
    }
}
