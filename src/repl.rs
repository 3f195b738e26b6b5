use chrono::Utc;
use log::info;
use std::error::Error;
use std::fs;
use tokio::io::{ AsyncBufReadExt, AsyncWriteExt, BufReader };

use crate::agent::HealthAssistant;
use crate::models::health::HealthSnapshot;
use crate::models::insight::HealthAssistantResponse;

pub fn load_snapshot(path: Option<&str>) -> Result<HealthSnapshot, Box<dyn Error + Send + Sync>> {
    let Some(path) = path.filter(|p| !p.trim().is_empty()) else {
        return Ok(HealthSnapshot::default());
    };
    let content = fs
        ::read_to_string(path)
        .map_err(|e| format!("Failed to read snapshot file '{}': {}", path, e))?;
    let snapshot: HealthSnapshot = serde_json
        ::from_str(&content)
        .map_err(|e| format!("Failed to parse snapshot file '{}': {}", path, e))?;
    info!("Loaded health snapshot from {} ({} biomarkers)", path, snapshot.biomarkers.len());
    Ok(snapshot)
}

fn render_insights(response: &HealthAssistantResponse) -> String {
    let mut out = String::new();
    let sections = [
        ("Insights", &response.insights),
        ("Recommendations", &response.recommendations),
        ("Next actions", &response.next_actions),
        ("Questions to consider", &response.follow_up_questions),
    ];
    for (title, items) in sections {
        if items.is_empty() {
            continue;
        }
        out.push_str(&format!("{}:\n", title));
        for item in items {
            out.push_str(&format!("  - {}\n", item));
        }
    }
    out
}

/// Line-oriented chat on stdin/stdout. `/insights`, `/daily`, `/reset` and
/// `/quit` are handled locally; anything else is a chat turn.
pub async fn run_repl(
    assistant: HealthAssistant,
    snapshot: HealthSnapshot
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut shared_insights: Vec<String> = Vec::new();

    stdout.write_all(b"Health assistant ready. Commands: /insights /daily /reset /quit\n> ").await?;
    stdout.flush().await?;

    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        let output = match input {
            "" => String::new(),
            "/quit" | "/exit" => {
                break;
            }
            "/reset" => {
                match assistant.reset_memory().await {
                    Ok(()) => "Memory cleared.\n".to_string(),
                    Err(e) => format!("Could not clear memory: {}\n", e),
                }
            }
            "/insights" => {
                let response = assistant.generate_insights(&snapshot, &shared_insights).await;
                shared_insights.extend(response.insights.iter().cloned());
                render_insights(&response)
            }
            "/daily" => {
                let today = Utc::now().date_naive();
                assistant
                    .generate_daily_recommendations(&snapshot, today).await
                    .iter()
                    .map(|tip| format!("[{:?}] {}: {}\n", tip.priority, tip.title, tip.description))
                    .collect::<String>()
            }
            message => format!("{}\n", assistant.converse(message, &snapshot).await),
        };
        stdout.write_all(output.as_bytes()).await?;
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;
    }
    Ok(())
}
