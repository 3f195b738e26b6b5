use chrono::{ DateTime, Utc };
use serde::{ Deserialize, Serialize };
use std::collections::BTreeSet;
use std::fmt;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// Coarse purpose of a user message. Declaration order is the classifier's
/// check order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentTag {
    BiomarkerAnalysis,
    NutritionGuidance,
    FitnessGuidance,
    SleepOptimization,
    StressManagement,
    SupplementGuidance,
    SymptomDiscussion,
    GeneralHealth,
}

impl IntentTag {
    pub const ALL: [IntentTag; 8] = [
        IntentTag::BiomarkerAnalysis,
        IntentTag::NutritionGuidance,
        IntentTag::FitnessGuidance,
        IntentTag::SleepOptimization,
        IntentTag::StressManagement,
        IntentTag::SupplementGuidance,
        IntentTag::SymptomDiscussion,
        IntentTag::GeneralHealth,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IntentTag::BiomarkerAnalysis => "biomarker_analysis",
            IntentTag::NutritionGuidance => "nutrition_guidance",
            IntentTag::FitnessGuidance => "fitness_guidance",
            IntentTag::SleepOptimization => "sleep_optimization",
            IntentTag::StressManagement => "stress_management",
            IntentTag::SupplementGuidance => "supplement_guidance",
            IntentTag::SymptomDiscussion => "symptom_discussion",
            IntentTag::GeneralHealth => "general_health",
        }
    }
}

impl fmt::Display for IntentTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopicTag {
    Cardiovascular,
    Metabolic,
    Nutrition,
    Exercise,
    Sleep,
    Stress,
    Supplements,
    Liver,
    Kidney,
}

impl TopicTag {
    pub const ALL: [TopicTag; 9] = [
        TopicTag::Cardiovascular,
        TopicTag::Metabolic,
        TopicTag::Nutrition,
        TopicTag::Exercise,
        TopicTag::Sleep,
        TopicTag::Stress,
        TopicTag::Supplements,
        TopicTag::Liver,
        TopicTag::Kidney,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TopicTag::Cardiovascular => "cardiovascular",
            TopicTag::Metabolic => "metabolic",
            TopicTag::Nutrition => "nutrition",
            TopicTag::Exercise => "exercise",
            TopicTag::Sleep => "sleep",
            TopicTag::Stress => "stress",
            TopicTag::Supplements => "supplements",
            TopicTag::Liver => "liver",
            TopicTag::Kidney => "kidney",
        }
    }
}

impl fmt::Display for TopicTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MessageMetadata {
    pub intent: IntentTag,
    pub topics: BTreeSet<TopicTag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_summary: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: ChatRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MessageMetadata>,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
            metadata: None,
        }
    }

    pub fn user(content: impl Into<String>, metadata: MessageMetadata) -> Self {
        Self { metadata: Some(metadata), ..Self::new(ChatRole::User, content) }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(ChatRole::Assistant, content)
    }
}

/// Chat log, oldest first.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationHistory {
    pub messages: Vec<ChatMessage>,
}

impl ConversationHistory {
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// The most recent `size` messages, never fewer than one when the history
    /// is non-empty. Truncation only ever drops from the head.
    pub fn window(&self, size: usize) -> &[ChatMessage] {
        let start = self.messages.len().saturating_sub(size.max(1));
        &self.messages[start..]
    }
}
