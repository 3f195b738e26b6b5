use std::collections::BTreeSet;

use crate::models::chat::{ IntentTag, TopicTag };
use crate::models::context::ConversationStyle;

/// Checked top to bottom; the first set with a hit decides the intent.
const INTENT_KEYWORDS: &[(IntentTag, &[&str])] = &[
    (
        IntentTag::BiomarkerAnalysis,
        &["biomarker", "lab result", "blood test", "bloodwork", "test result", "cholesterol", "glucose", "marker", "level"],
    ),
    (IntentTag::NutritionGuidance, &["diet", "food", "nutrition", "meal", "eating", "calorie", "protein"]),
    (IntentTag::FitnessGuidance, &["exercise", "workout", "fitness", "training", "running", "gym", "cardio"]),
    (IntentTag::SleepOptimization, &["sleep", "insomnia", "tired", "fatigue", "nap"]),
    (IntentTag::StressManagement, &["stress", "anxiety", "anxious", "relax", "meditation", "burnout"]),
    (IntentTag::SupplementGuidance, &["supplement", "vitamin", "mineral", "omega", "magnesium"]),
    (IntentTag::SymptomDiscussion, &["symptom", "pain", "ache", "feel sick", "dizzy", "headache", "nausea"]),
];

const TOPIC_KEYWORDS: &[(TopicTag, &[&str])] = &[
    (TopicTag::Cardiovascular, &["heart", "cholesterol", "blood pressure", "cardio", "ldl", "hdl", "triglyceride"]),
    (TopicTag::Metabolic, &["glucose", "insulin", "blood sugar", "metabolic", "hba1c", "diabetes", "weight"]),
    (TopicTag::Nutrition, &["diet", "food", "nutrition", "meal", "eating", "calorie"]),
    (TopicTag::Exercise, &["exercise", "workout", "fitness", "training", "gym", "running"]),
    (TopicTag::Sleep, &["sleep", "insomnia", "nap"]),
    (TopicTag::Stress, &["stress", "anxiety", "cortisol", "relax", "burnout"]),
    (TopicTag::Supplements, &["supplement", "vitamin", "mineral", "omega", "magnesium"]),
    (TopicTag::Liver, &["liver", "hepat", "alanine", "bilirubin", "ggt"]),
    (TopicTag::Kidney, &["kidney", "renal", "creatinine", "egfr", "urea"]),
];

const CONCISE_CUES: &[&str] = &["briefly", "short answer", "in short", "tl;dr", "keep it short", "quick answer"];
const TECHNICAL_CUES: &[&str] = &["mechanism", "technical", "pathway", "clinical study", "research shows", "in detail"];

pub fn classify_intent(text: &str) -> IntentTag {
    let normalized = text.to_lowercase();
    INTENT_KEYWORDS.iter()
        .find(|(_, keywords)| keywords.iter().any(|k| normalized.contains(k)))
        .map(|(intent, _)| *intent)
        .unwrap_or(IntentTag::GeneralHealth)
}

pub fn extract_topics(text: &str) -> BTreeSet<TopicTag> {
    let normalized = text.to_lowercase();
    TOPIC_KEYWORDS.iter()
        .filter(|(_, keywords)| keywords.iter().any(|k| normalized.contains(k)))
        .map(|(topic, _)| *topic)
        .collect()
}

/// Explicit style requests only; `None` leaves the stored style alone.
pub fn infer_style(text: &str) -> Option<ConversationStyle> {
    let normalized = text.to_lowercase();
    if CONCISE_CUES.iter().any(|c| normalized.contains(c)) {
        Some(ConversationStyle::Concise)
    } else if TECHNICAL_CUES.iter().any(|c| normalized.contains(c)) {
        Some(ConversationStyle::Technical)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_listed_category_wins() {
        assert_eq!(classify_intent("I can't sleep because of stress"), IntentTag::SleepOptimization);
        assert_eq!(classify_intent("Is my glucose affected by my diet?"), IntentTag::BiomarkerAnalysis);
    }

    #[test]
    fn matching_ignores_case() {
        assert_eq!(classify_intent("WHICH SUPPLEMENT should I take?"), IntentTag::SupplementGuidance);
        assert_eq!(classify_intent("How is my sleep?"), IntentTag::SleepOptimization);
    }

    #[test]
    fn unmatched_text_is_general_health() {
        assert_eq!(classify_intent("hello there"), IntentTag::GeneralHealth);
        assert_eq!(classify_intent(""), IntentTag::GeneralHealth);
    }

    #[test]
    fn topics_collect_every_match() {
        let topics = extract_topics("Does sleep and stress affect my LDL?");
        let expected: BTreeSet<_> = [TopicTag::Cardiovascular, TopicTag::Sleep, TopicTag::Stress].into_iter().collect();
        assert_eq!(topics, expected);
    }

    #[test]
    fn topic_free_text_has_no_topics() {
        assert!(extract_topics("good morning").is_empty());
    }

    #[test]
    fn style_cues() {
        assert_eq!(infer_style("Briefly, what does HDL do?"), Some(ConversationStyle::Concise));
        assert_eq!(infer_style("Explain the mechanism behind insulin resistance"), Some(ConversationStyle::Technical));
        assert_eq!(infer_style("what about eggs"), None);
    }
}
