//! One-shot structured prompts turned into typed insights.
//!
//! Model prose is parsed by position, not meaning: the reply's non-empty
//! lines are sliced into fixed buckets. Parsing is total. Anything that
//! yields no usable lines falls back to the fixed mock content.

use chrono::NaiveDate;
use log::{ error, info, warn };
use std::sync::Arc;

use crate::config::prompt::{ get_daily_prompt, get_insights_prompt, PromptConfig };
use crate::context::build_briefing;
use crate::llm::chat::{ ChatClient, CompletionRequest, PromptMessage, SamplingParams };
use crate::llm::LlmError;
use crate::models::health::HealthSnapshot;
use crate::models::insight::{ DailyInsight, HealthAssistantResponse, Priority, RiskAssessment, RiskLevel };

const INSIGHT_COUNT: usize = 3;
const RECOMMENDATION_COUNT: usize = 3;
const NEXT_ACTION_COUNT: usize = 2;
const DAILY_COUNT: usize = 3;
const DAILY_CATEGORIES: [&str; 2] = ["nutrition", "fitness"];
const DAILY_PRIORITIES: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

#[derive(Clone)]
pub struct InsightEngine {
    chat_client: Option<Arc<dyn ChatClient>>,
    prompts: Arc<PromptConfig>,
    sampling: SamplingParams,
}

fn strip_list_marker(line: &str) -> &str {
    let trimmed = line.trim();
    let digits = trimmed.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        let rest = &trimmed[digits..];
        if let Some(stripped) = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')')) {
            // "2.5 liters" is content, not a marker
            if stripped.is_empty() || stripped.starts_with(char::is_whitespace) {
                return stripped.trim_start();
            }
        }
    }
    trimmed
        .strip_prefix("- ")
        .or_else(|| trimmed.strip_prefix("* "))
        .map(str::trim_start)
        .unwrap_or(trimmed)
}

pub fn reply_lines(reply: &str) -> Vec<String> {
    reply
        .lines()
        .map(strip_list_marker)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Slices a reply into insights (first 3 lines), recommendations (next 3)
/// and next actions (last 2). `None` when there is nothing to slice.
pub fn parse_insight_reply(reply: &str) -> Option<HealthAssistantResponse> {
    let lines = reply_lines(reply);
    if lines.is_empty() {
        return None;
    }
    let tail_start = lines.len().saturating_sub(NEXT_ACTION_COUNT);
    Some(HealthAssistantResponse {
        insights: lines.iter().take(INSIGHT_COUNT).cloned().collect(),
        recommendations: lines.iter().skip(INSIGHT_COUNT).take(RECOMMENDATION_COUNT).cloned().collect(),
        risk_assessment: RiskAssessment::default(),
        next_actions: lines[tail_start..].to_vec(),
        follow_up_questions: Vec::new(),
    })
}

pub fn mock_insights() -> HealthAssistantResponse {
    HealthAssistantResponse {
        insights: vec![
            "Your health data shows areas where steady habits can make a measurable difference.".to_string(),
            "Consistent sleep, movement and nutrition are the strongest levers for most biomarkers.".to_string(),
            "Tracking your results over time gives a clearer picture than any single reading.".to_string(),
        ],
        recommendations: vec![
            "Aim for 7-9 hours of sleep on a regular schedule.".to_string(),
            "Include at least 150 minutes of moderate activity each week.".to_string(),
            "Build meals around vegetables, lean protein and whole grains.".to_string(),
        ],
        risk_assessment: RiskAssessment {
            level: RiskLevel::Low,
            concerns: Vec::new(),
            improvements: Vec::new(),
        },
        next_actions: vec![
            "Schedule your next lab panel to track progress.".to_string(),
            "Discuss any out-of-range results with your healthcare provider.".to_string(),
        ],
        follow_up_questions: vec![
            "Which health goal matters most to you right now?".to_string(),
            "How have your energy levels been lately?".to_string(),
        ],
    }
}

fn daily_insight(date: NaiveDate, index: usize, title: String, description: String) -> DailyInsight {
    DailyInsight {
        id: format!("daily-{}-{}", date, index + 1),
        title,
        description,
        category: DAILY_CATEGORIES[index % DAILY_CATEGORIES.len()].to_string(),
        priority: DAILY_PRIORITIES[index.min(DAILY_PRIORITIES.len() - 1)],
        actionable: true,
    }
}

pub fn mock_daily(date: NaiveDate) -> Vec<DailyInsight> {
    let tips = [
        ("Hydrate early", "Start your day with a large glass of water before coffee."),
        ("Move after meals", "Take a 10-minute walk after lunch to help steady blood sugar."),
        ("Wind down", "Dim screens an hour before bed to protect your sleep quality."),
    ];
    tips.iter()
        .enumerate()
        .map(|(i, (title, description))| daily_insight(date, i, title.to_string(), description.to_string()))
        .collect()
}

fn split_title(line: &str, index: usize) -> (String, String) {
    if let Some((title, description)) = line.split_once(':') {
        let title = title.trim().trim_matches('*').trim();
        let description = description.trim();
        if !title.is_empty() && title.len() <= 80 && !description.is_empty() {
            return (title.to_string(), description.to_string());
        }
    }
    (format!("Daily Tip {}", index + 1), line.to_string())
}

/// First 3 reply lines as daily insights, padded from the mock when the
/// reply is short.
pub fn parse_daily_reply(reply: &str, date: NaiveDate) -> Vec<DailyInsight> {
    let mut insights: Vec<DailyInsight> = reply_lines(reply)
        .into_iter()
        .take(DAILY_COUNT)
        .enumerate()
        .map(|(i, line)| {
            let (title, description) = split_title(&line, i);
            daily_insight(date, i, title, description)
        })
        .collect();
    if insights.len() < DAILY_COUNT {
        insights.extend(mock_daily(date).into_iter().skip(insights.len()));
    }
    insights
}

impl InsightEngine {
    pub fn new(
        chat_client: Option<Arc<dyn ChatClient>>,
        prompts: Arc<PromptConfig>,
        sampling: SamplingParams
    ) -> Self {
        Self { chat_client, prompts, sampling }
    }

    async fn one_shot(&self, client: &dyn ChatClient, prompt: String) -> Result<String, LlmError> {
        let request = CompletionRequest {
            messages: vec![PromptMessage::user(prompt)],
            params: self.sampling,
        };
        Ok(client.complete(&request).await?.response)
    }

    fn briefing(snapshot: &HealthSnapshot) -> String {
        build_briefing(snapshot.profile.as_ref(), &snapshot.biomarkers, snapshot.health_score.as_ref())
    }

    pub async fn generate_insights(
        &self,
        snapshot: &HealthSnapshot,
        recent_insights: &[String]
    ) -> HealthAssistantResponse {
        let Some(client) = &self.chat_client else {
            info!("No provider credential configured, returning default insights");
            return mock_insights();
        };
        let prompt = get_insights_prompt(&self.prompts, &Self::briefing(snapshot), recent_insights);
        match self.one_shot(client.as_ref(), prompt).await {
            Ok(reply) =>
                parse_insight_reply(&reply).unwrap_or_else(|| {
                    warn!("Insight reply had no usable lines, returning default insights");
                    mock_insights()
                }),
            Err(e) => {
                error!("Insight generation failed: {}", e);
                mock_insights()
            }
        }
    }

    pub async fn generate_daily_recommendations(
        &self,
        snapshot: &HealthSnapshot,
        date: NaiveDate
    ) -> Vec<DailyInsight> {
        let Some(client) = &self.chat_client else {
            info!("No provider credential configured, returning default daily tips");
            return mock_daily(date);
        };
        let prompt = get_daily_prompt(&self.prompts, &Self::briefing(snapshot), &date.to_string());
        match self.one_shot(client.as_ref(), prompt).await {
            Ok(reply) => parse_daily_reply(&reply, date),
            Err(e) => {
                error!("Daily recommendation generation failed: {}", e);
                mock_daily(date)
            }
        }
    }
}
