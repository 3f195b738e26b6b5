use chrono::Utc;
use std::collections::BTreeSet;

use crate::analysis::{ assess_significance, assess_trend };
use crate::models::chat::{ IntentTag, TopicTag };
use crate::models::context::{
    BiomarkerTrendRecord,
    ConversationStyle,
    UserContextModel,
    MAX_PREFERRED_TOPICS,
};
use crate::models::health::{ BiomarkerSnapshot, Significance };

/// Moves `value` to the back of `list` and evicts from the head past `cap`.
fn touch_recent<T: PartialEq + Copy>(list: &mut Vec<T>, value: T, cap: usize) {
    if list.last() == Some(&value) {
        return;
    }
    list.retain(|existing| *existing != value);
    list.push(value);
    if list.len() > cap {
        let overflow = list.len() - cap;
        list.drain(..overflow);
    }
}

/// Folds one user turn into the context model. Never touches storage; the
/// caller persists the result.
pub fn update_context(
    current: Option<UserContextModel>,
    intent: IntentTag,
    topics: &BTreeSet<TopicTag>,
    biomarkers: &[BiomarkerSnapshot],
    style_hint: Option<ConversationStyle>
) -> UserContextModel {
    let mut context = current.unwrap_or_default();
    let now = Utc::now();

    touch_recent(&mut context.preferred_topics, intent, MAX_PREFERRED_TOPICS);
    for topic in topics {
        touch_recent(&mut context.goals_focus, *topic, MAX_PREFERRED_TOPICS);
    }

    if let Some(style) = style_hint {
        context.conversation_style = style;
    }

    for biomarker in biomarkers {
        let (trend, change_percent) = assess_trend(
            context.biomarker_trends.get(&biomarker.name),
            biomarker
        );
        context.biomarker_trends.insert(biomarker.name.clone(), BiomarkerTrendRecord {
            trend,
            significance: assess_significance(biomarker),
            last_value: biomarker.value,
            change_percent,
            updated_at: now,
        });
    }

    context.health_concerns = context.biomarker_trends
        .iter()
        .filter(|(_, record)| record.significance != Significance::Normal)
        .map(|(name, _)| name.clone())
        .collect();

    context.last_data_update = now;
    context
}
