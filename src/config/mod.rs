pub mod prompt;

use crate::cli::Args;
use crate::llm::chat::SamplingParams;

pub const DEFAULT_HISTORY_WINDOW: usize = 20;

/// Explicit configuration handed to the assistant engine and insight engine.
#[derive(Debug, Clone)]
pub struct AssistantConfig {
    pub history_window: usize,
    pub chat_sampling: SamplingParams,
    pub insight_sampling: SamplingParams,
    pub key_prefix: String,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            history_window: DEFAULT_HISTORY_WINDOW,
            chat_sampling: SamplingParams::conversation(),
            insight_sampling: SamplingParams::insight(),
            key_prefix: "health_assistant:".to_string(),
        }
    }
}

impl AssistantConfig {
    pub fn from_args(args: &Args) -> Self {
        Self {
            history_window: args.history_window.max(1),
            key_prefix: args.store_prefix.clone(),
            ..Self::default()
        }
    }
}
