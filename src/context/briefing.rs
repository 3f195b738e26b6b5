use std::fmt::Write;

use crate::analysis::assess_status;
use crate::analysis::reference::name_matches;
use crate::config::prompt::{ get_system_prompt, PromptConfig };
use crate::models::context::{ ConversationStyle, UserContextModel };
use crate::models::health::{ BiomarkerSnapshot, HealthScore, ProfileSnapshot, Significance };

pub const NO_HEALTH_DATA: &str = "No current health data available.";

/// Briefing sections in output order. A biomarker lands in the first
/// category with a keyword matching its name.
const CATEGORIES: &[(&str, &[&str])] = &[
    ("CARDIOVASCULAR MARKERS", &["cholesterol", "ldl", "hdl", "triglyceride", "apob", "lp(a)", "blood pressure"]),
    ("METABOLIC MARKERS", &["glucose", "insulin", "hba1c", "a1c"]),
    ("LIVER FUNCTION", &["alt", "ast", "ggt", "bilirubin", "albumin", "alkaline phosphatase"]),
    ("KIDNEY FUNCTION", &["creatinine", "egfr", "bun", "urea", "uric acid"]),
    ("INFLAMMATORY MARKERS", &["crp", "esr", "homocysteine", "interleukin", "fibrinogen"]),
];

const OTHER_CATEGORY: &str = "OTHER BIOMARKERS";

fn category_of(name: &str) -> usize {
    let normalized = name.to_lowercase();
    CATEGORIES.iter()
        .position(|(_, keywords)| keywords.iter().any(|k| name_matches(&normalized, k)))
        .unwrap_or(CATEGORIES.len())
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 { format!("{:.0}", value) } else { format!("{:.1}", value) }
}

fn write_profile(out: &mut String, profile: &ProfileSnapshot) {
    if profile.is_empty() {
        return;
    }
    out.push_str("PATIENT PROFILE:\n");
    if let Some(age) = profile.age {
        let _ = writeln!(out, "- Age: {}", age);
    }
    if let Some(gender) = &profile.gender {
        let _ = writeln!(out, "- Gender: {}", gender);
    }
    if let Some(height) = profile.height_cm {
        let _ = writeln!(out, "- Height: {} cm", format_number(height));
    }
    if let Some(weight) = profile.weight_kg {
        let _ = writeln!(out, "- Weight: {} kg", format_number(weight));
    }
    if let Some(bmi) = profile.bmi() {
        let _ = writeln!(out, "- BMI: {:.1}", bmi);
    }
    out.push('\n');
}

fn write_scores(out: &mut String, score: &HealthScore) {
    let entries = score.entries();
    if entries.is_empty() {
        return;
    }
    out.push_str("HEALTH SCORES:\n");
    for (label, value) in entries {
        let _ = writeln!(out, "- {}: {}/100", label, format_number(value));
    }
    out.push('\n');
}

fn write_biomarkers(out: &mut String, biomarkers: &[BiomarkerSnapshot]) {
    let mut groups: Vec<Vec<&BiomarkerSnapshot>> = vec![Vec::new(); CATEGORIES.len() + 1];
    for biomarker in biomarkers {
        groups[category_of(&biomarker.name)].push(biomarker);
    }

    for (index, group) in groups.iter().enumerate() {
        if group.is_empty() {
            continue;
        }
        let title = CATEGORIES.get(index).map(|(t, _)| *t).unwrap_or(OTHER_CATEGORY);
        let _ = writeln!(out, "{}:", title);
        for biomarker in group {
            let unit = if biomarker.unit.is_empty() { String::new() } else { format!(" {}", biomarker.unit) };
            let _ = writeln!(
                out,
                "- {}: {}{} ({})",
                biomarker.name,
                format_number(biomarker.value),
                unit,
                assess_status(biomarker)
            );
        }
        out.push('\n');
    }
}

/// Deterministic plain-text summary of the health snapshot. Never empty.
pub fn build_briefing(
    profile: Option<&ProfileSnapshot>,
    biomarkers: &[BiomarkerSnapshot],
    health_score: Option<&HealthScore>
) -> String {
    let mut out = String::new();
    if let Some(profile) = profile {
        write_profile(&mut out, profile);
    }
    if let Some(score) = health_score {
        write_scores(&mut out, score);
    }
    write_biomarkers(&mut out, biomarkers);

    let trimmed = out.trim_end();
    if trimmed.is_empty() {
        NO_HEALTH_DATA.to_string()
    } else {
        trimmed.to_string()
    }
}

pub fn describe_user_context(context: Option<&UserContextModel>) -> String {
    let Some(context) = context else {
        return "New conversation; no prior context.".to_string();
    };
    let mut lines = Vec::new();
    if !context.preferred_topics.is_empty() {
        let recent: Vec<&str> = context.preferred_topics.iter().rev().map(|t| t.as_str()).collect();
        lines.push(format!("- Recent interests (most recent first): {}", recent.join(", ")));
    }
    if !context.goals_focus.is_empty() {
        let focus: Vec<&str> = context.goals_focus.iter().map(|t| t.as_str()).collect();
        lines.push(format!("- Focus areas: {}", focus.join(", ")));
    }
    let flagged: Vec<String> = context.biomarker_trends
        .iter()
        .filter(|(_, record)| record.significance != Significance::Normal)
        .map(|(name, record)| format!("{} ({}, {})", name, record.significance, record.trend))
        .collect();
    if !flagged.is_empty() {
        lines.push(format!("- Flagged biomarkers: {}", flagged.join("; ")));
    }
    lines.push(format!("- Preferred style: {}", context.conversation_style));
    lines.join("\n")
}

pub fn style_instruction(style: ConversationStyle) -> &'static str {
    match style {
        ConversationStyle::Detailed =>
            "Give thorough, well-structured explanations with practical examples.",
        ConversationStyle::Concise => "Keep answers short: a few sentences or bullet points.",
        ConversationStyle::Technical =>
            "Use precise clinical terminology and explain underlying physiological mechanisms.",
    }
}

pub fn build_system_prompt(
    prompts: &PromptConfig,
    briefing: &str,
    context: Option<&UserContextModel>
) -> String {
    let style = context.map(|c| c.conversation_style).unwrap_or_default();
    get_system_prompt(prompts, briefing, &describe_user_context(context), style_instruction(style))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::chat::IntentTag;

    #[test]
    fn no_data_yields_sentinel() {
        assert_eq!(build_briefing(None, &[], None), NO_HEALTH_DATA);
        let empty_profile = ProfileSnapshot::default();
        assert_eq!(build_briefing(Some(&empty_profile), &[], Some(&HealthScore::default())), NO_HEALTH_DATA);
    }

    #[test]
    fn profile_includes_bmi_when_possible() {
        let profile = ProfileSnapshot {
            age: Some(41),
            gender: Some("female".to_string()),
            height_cm: Some(170.0),
            weight_kg: Some(65.0),
        };
        let briefing = build_briefing(Some(&profile), &[], None);
        assert!(briefing.starts_with("PATIENT PROFILE:"));
        assert!(briefing.contains("- Age: 41"));
        assert!(briefing.contains("- BMI: 22.5"));
    }

    #[test]
    fn only_present_scores_are_listed() {
        let score = HealthScore { overall: Some(82.0), sleep: Some(70.5), ..Default::default() };
        let briefing = build_briefing(None, &[], Some(&score));
        assert_eq!(briefing, "HEALTH SCORES:\n- Overall: 82/100\n- Sleep: 70.5/100");
    }

    #[test]
    fn biomarkers_are_grouped_with_status() {
        let markers = vec![
            BiomarkerSnapshot::new("Zonulin", 40.0, "ng/mL"),
            BiomarkerSnapshot::new("Fasting Glucose", 95.0, "mg/dL"),
            BiomarkerSnapshot::new("LDL Cholesterol", 90.0, "mg/dL"),
        ];
        let briefing = build_briefing(None, &markers, None);
        let expected = "CARDIOVASCULAR MARKERS:\n- LDL Cholesterol: 90 mg/dL (Optimal)\n\n\
METABOLIC MARKERS:\n- Fasting Glucose: 95 mg/dL (Normal)\n\n\
OTHER BIOMARKERS:\n- Zonulin: 40 ng/mL (Within range)";
        assert_eq!(briefing, expected);
    }

    #[test]
    fn abbreviations_do_not_capture_longer_names() {
        assert_eq!(category_of("ALT"), 2);
        assert_eq!(category_of("Fasting C-Peptide"), CATEGORIES.len());
        assert_eq!(category_of("Gastrin"), CATEGORIES.len());
        let markers = vec![BiomarkerSnapshot::new("Gastrin", 50.0, "pg/mL")];
        assert!(build_briefing(None, &markers, None).starts_with("OTHER BIOMARKERS:"));
    }

    #[test]
    fn briefing_is_deterministic() {
        let markers = vec![BiomarkerSnapshot::new("CRP", 2.0, "mg/L")];
        assert_eq!(build_briefing(None, &markers, None), build_briefing(None, &markers, None));
        assert!(build_briefing(None, &markers, None).starts_with("INFLAMMATORY MARKERS:"));
    }

    #[test]
    fn system_prompt_carries_briefing_and_style() {
        let mut context = UserContextModel::default();
        context.preferred_topics = vec![IntentTag::NutritionGuidance, IntentTag::SleepOptimization];
        context.conversation_style = ConversationStyle::Concise;
        let prompt = build_system_prompt(&PromptConfig::default(), "BRIEFING", Some(&context));
        assert!(prompt.contains("BRIEFING"));
        assert!(prompt.contains("sleep_optimization, nutrition_guidance"));
        assert!(prompt.contains("Keep answers short"));
    }
}
