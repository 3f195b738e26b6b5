use chrono::{ DateTime, Utc };
use serde::{ Deserialize, Serialize };
use std::collections::BTreeMap;
use std::fmt;

use super::chat::{ IntentTag, TopicTag };
use super::health::{ Significance, Trend };

pub const MAX_PREFERRED_TOPICS: usize = 10;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationStyle {
    #[default]
    Detailed,
    Concise,
    Technical,
}

impl fmt::Display for ConversationStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConversationStyle::Detailed => "detailed",
            ConversationStyle::Concise => "concise",
            ConversationStyle::Technical => "technical",
        };
        write!(f, "{}", s)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BiomarkerTrendRecord {
    pub trend: Trend,
    pub significance: Significance,
    pub last_value: f64,
    pub change_percent: f64,
    pub updated_at: DateTime<Utc>,
}

/// Rolling model of what the user cares about. Replaced wholesale on every
/// successful turn.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserContextModel {
    #[serde(default)]
    pub preferred_topics: Vec<IntentTag>,
    #[serde(default)]
    pub health_concerns: Vec<String>,
    #[serde(default)]
    pub goals_focus: Vec<TopicTag>,
    #[serde(default)]
    pub conversation_style: ConversationStyle,
    pub last_data_update: DateTime<Utc>,
    #[serde(default)]
    pub biomarker_trends: BTreeMap<String, BiomarkerTrendRecord>,
}

impl Default for UserContextModel {
    fn default() -> Self {
        Self {
            preferred_topics: Vec::new(),
            health_concerns: Vec::new(),
            goals_focus: Vec::new(),
            conversation_style: ConversationStyle::default(),
            last_data_update: Utc::now(),
            biomarker_trends: BTreeMap::new(),
        }
    }
}
