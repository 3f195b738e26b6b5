pub mod agent;
pub mod analysis;
pub mod cli;
pub mod config;
pub mod context;
pub mod history;
pub mod insight;
pub mod llm;
pub mod models;
pub mod repl;
pub mod server;
pub mod storage;

use agent::HealthAssistant;
use cli::Args;
use config::AssistantConfig;
use config::prompt::load_prompts_or_default;
use llm::chat::{ new_client as new_chat_client, ChatClient };
use llm::{ LlmConfig, LlmType };
use log::{ info, warn };
use server::{ Server, SessionRegistry };
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

fn initialize_chat_client(
    args: &Args
) -> Result<Option<Arc<dyn ChatClient>>, Box<dyn Error + Send + Sync>> {
    let llm_type: LlmType = args.chat_llm_type.parse()?;
    let chat_config = LlmConfig {
        llm_type,
        api_key: Some(args.chat_api_key.clone()).filter(|k| !k.is_empty()),
        completion_model: args.chat_model.clone(),
        base_url: args.chat_base_url.clone(),
        request_timeout: Duration::from_secs(args.request_timeout_secs.max(1)),
    };
    if !chat_config.has_credential() {
        warn!("No API key configured for '{}'; the assistant will answer with fallback content only.", llm_type);
        return Ok(None);
    }
    let chat_client = new_chat_client(&chat_config)?;
    info!(
        "Chat client configured: Type={}, Model={}, BaseURL={}",
        llm_type,
        chat_client.get_model(),
        chat_client.get_base_url().as_deref().unwrap_or("adapter default")
    );
    Ok(Some(chat_client))
}

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Core Configuration ---");
    info!("Mode: {}", args.mode);
    info!("Chat LLM Type: {}", args.chat_llm_type);
    info!("Request Timeout: {}s", args.request_timeout_secs);
    info!("History Window: {}", args.history_window);
    info!("Store Type: {}", args.store_type);
    info!("Store Prefix: {}", args.store_prefix);
    info!("Prompts Path: {}", args.prompts_path.as_deref().unwrap_or("built-in"));
    if args.mode.eq_ignore_ascii_case("server") {
        info!("Server Address: {}", args.server_addr);
        info!("Server API Key Required: {}", args.server_api_key.is_some());
    }
    info!("-------------------------");

    let chat_client = initialize_chat_client(&args)?;
    let store = storage::initialize_store(&args)?;
    let prompts = load_prompts_or_default(args.prompts_path.as_deref())?;
    let config = AssistantConfig::from_args(&args);

    match args.mode.to_lowercase().as_str() {
        "repl" => {
            let snapshot = repl::load_snapshot(args.snapshot_path.as_deref())?;
            let assistant = HealthAssistant::new(&args.user_id, config, prompts, chat_client, store);
            repl::run_repl(assistant, snapshot).await
        }
        "server" => {
            let registry = Arc::new(SessionRegistry::new(config, prompts, chat_client, store));
            let server = Server::new(args.server_addr.clone(), registry, args.server_api_key.clone());
            server.run().await?;
            Ok(())
        }
        other => Err(format!("Unsupported mode: {}", other).into()),
    }
}
