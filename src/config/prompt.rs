use serde::Deserialize;
use std::fs;
use std::sync::Arc;
use log::info;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("Prompt file IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Prompt JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
}

const DEFAULT_SYSTEM_TEMPLATE: &str = "You are a knowledgeable and supportive personal health assistant. \
Use the user's health data below to give grounded, practical guidance. \
Never diagnose; suggest consulting a healthcare professional for anything that needs medical attention.

CURRENT HEALTH DATA:
{briefing}

USER CONTEXT:
{user_context}

{style_instruction}";

const DEFAULT_INSIGHTS_TEMPLATE: &str = "Analyze the following health data and respond with exactly 8 numbered lines and nothing else: \
lines 1-3 are key insights, lines 4-6 are specific recommendations, lines 7-8 are concrete next actions.

HEALTH DATA:
{briefing}

Insights already shared with the user (do not repeat them):
{recent_insights}";

const DEFAULT_DAILY_TEMPLATE: &str = "Create 3 personalized daily health recommendations for {date} based on the data below. \
Respond with exactly 3 lines in the form `Title: description` and nothing else.

HEALTH DATA:
{briefing}";

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct PromptConfig {
    pub system_template: String,
    pub insights_template: String,
    pub daily_template: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            system_template: DEFAULT_SYSTEM_TEMPLATE.to_string(),
            insights_template: DEFAULT_INSIGHTS_TEMPLATE.to_string(),
            daily_template: DEFAULT_DAILY_TEMPLATE.to_string(),
        }
    }
}

/// Loads template overrides; fields missing from the file keep their defaults.
pub fn load_prompts(path: &str) -> Result<Arc<PromptConfig>, PromptError> {
    let file_content = fs::read_to_string(path)?;
    let config: PromptConfig = serde_json::from_str(&file_content)?;
    info!("Loaded prompt templates from: {}", path);
    Ok(Arc::new(config))
}

pub fn load_prompts_or_default(path: Option<&str>) -> Result<Arc<PromptConfig>, PromptError> {
    match path {
        Some(p) if !p.trim().is_empty() => load_prompts(p),
        _ => Ok(Arc::new(PromptConfig::default())),
    }
}

pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    vars.iter().fold(template.to_string(), |acc, (key, value)| {
        acc.replace(&format!("{{{}}}", key), value)
    })
}

pub fn get_system_prompt(
    config: &PromptConfig,
    briefing: &str,
    user_context: &str,
    style_instruction: &str
) -> String {
    render(&config.system_template, &[
        ("briefing", briefing),
        ("user_context", user_context),
        ("style_instruction", style_instruction),
    ])
}

pub fn get_insights_prompt(config: &PromptConfig, briefing: &str, recent_insights: &[String]) -> String {
    let recent = if recent_insights.is_empty() {
        "None".to_string()
    } else {
        recent_insights
            .iter()
            .map(|i| format!("- {}", i))
            .collect::<Vec<_>>()
            .join("\n")
    };
    render(&config.insights_template, &[("briefing", briefing), ("recent_insights", &recent)])
}

pub fn get_daily_prompt(config: &PromptConfig, briefing: &str, date: &str) -> String {
    render(&config.daily_template, &[("briefing", briefing), ("date", date)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn render_replaces_every_placeholder() {
        let out = render("{a} and {b} and {a}", &[("a", "x"), ("b", "y")]);
        assert_eq!(out, "x and y and x");
    }

    #[test]
    fn insights_prompt_lists_recent_insights() {
        let config = PromptConfig::default();
        let prompt = get_insights_prompt(&config, "BRIEF", &["Drink water".to_string()]);
        assert!(prompt.contains("BRIEF"));
        assert!(prompt.contains("- Drink water"));

        let prompt = get_insights_prompt(&config, "BRIEF", &[]);
        assert!(prompt.contains("None"));
    }

    #[test]
    fn partial_override_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"daily_template": "Tips for {{date}}: {{briefing}}"}}"#).unwrap();
        let config = load_prompts(file.path().to_str().unwrap()).unwrap();
        assert_eq!(get_daily_prompt(&config, "data", "2026-01-02"), "Tips for 2026-01-02: data");
        assert_eq!(config.system_template, DEFAULT_SYSTEM_TEMPLATE);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_prompts("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, PromptError::IoError(_)));
    }
}
