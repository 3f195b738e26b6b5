use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Run mode: `server` exposes the HTTP API, `repl` chats on stdin/stdout
    #[arg(long, env = "MODE", default_value = "server")]
    pub mode: String,

    // --- Chat LLM Provider Args ---
    /// Type of LLM provider for chat completion (ollama, openai, deepseek, xai, groq)
    #[arg(long, env = "CHAT_LLM_TYPE", default_value = "openai")]
    pub chat_llm_type: String,

    /// Base URL for the Chat LLM provider API (e.g., http://localhost:11434 for Ollama)
    #[arg(long, env = "CHAT_BASE_URL")] // No default, let adapters handle defaults if None
    pub chat_base_url: Option<String>,

    /// API Key for the Chat LLM provider. Leave empty to run with fallback replies only.
    #[arg(long, env = "CHAT_API_KEY", default_value = "")]
    pub chat_api_key: String,

    /// Model name for chat completion (e.g., gpt-4o-mini, llama3.1)
    #[arg(long, env = "CHAT_MODEL")] // No default, rely on adapter defaults if None
    pub chat_model: Option<String>,

    /// Seconds before a provider request is abandoned.
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value = "30")]
    pub request_timeout_secs: u64,

    /// Number of most recent messages sent to the model on each turn.
    #[arg(long, env = "HISTORY_WINDOW", default_value = "20")]
    pub history_window: usize,

    // --- Assistant Memory Store Args ---
    /// Where conversation history and user context are kept (memory, file, redis)
    #[arg(long, env = "STORE_TYPE", default_value = "file")]
    pub store_type: String,

    /// Directory for the file store.
    #[arg(long, env = "STORE_PATH", default_value = "data/assistant")]
    pub store_path: String,

    /// Redis endpoint for the redis store (e.g., redis://127.0.0.1:6379)
    #[arg(long, env = "STORE_HOST", default_value = "redis://127.0.0.1:6379")]
    pub store_host: String,

    /// Prefix for every persisted key.
    #[arg(long, env = "STORE_PREFIX", default_value = "health_assistant:")]
    pub store_prefix: String,

    // --- General App Args ---
    /// User whose memory the REPL session reads and writes.
    #[arg(long, env = "USER_ID", default_value = "local")]
    pub user_id: String,

    /// Optional JSON file overriding the built-in prompt templates.
    #[arg(long, env = "PROMPTS_PATH")]
    pub prompts_path: Option<String>,

    /// Optional JSON health snapshot (profile, biomarkers, health_score) used by the REPL.
    #[arg(long, env = "SNAPSHOT_PATH")]
    pub snapshot_path: Option<String>,

    /// Host address and port for the HTTP API to listen on.
    #[arg(long, env = "SERVER_ADDR", default_value = "127.0.0.1:4000")]
    pub server_addr: String,

    /// Optional API key clients must send in the `x-api-key` header.
    #[arg(long, env = "SERVER_API_KEY")]
    pub server_api_key: Option<String>,
}
