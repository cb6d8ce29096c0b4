// File: warden-core/src/services/moderation/gate.rs

use warden_common::models::{AccountAction, ClassificationResult, Decision, JudgmentResult, MessageAction};

use crate::config::GateConfig;

/// The only place classification/judgment output becomes enforcement.
///
/// CLEAN never acts. Otherwise the classifier's confidence, mapped through
/// the configured scale, must reach the floor for its category; below it the
/// decision is suppressed. Above it, DELETE deletes and any account action
/// other than DISMISS notifies.
pub fn decide(
    classification: ClassificationResult,
    judgment: Option<JudgmentResult>,
    gate: &GateConfig,
) -> Decision {
    if classification.is_clean() {
        return Decision::clean(classification);
    }

    let Some(judgment) = judgment else {
        let mut decision = Decision::clean(classification);
        decision.suppressed = Some("no judgment available".to_string());
        return decision;
    };

    let confidence = gate.confidence_scale.map(classification.confidence);
    let floor = gate.floor_for(classification.category);

    if confidence < floor {
        let reason = format!(
            "{} confidence {} ({}) is below the floor {}",
            classification.category, classification.confidence, confidence, floor
        );
        return Decision {
            classification,
            judgment: Some(judgment),
            should_notify: false,
            should_delete: false,
            suppressed: Some(reason),
        };
    }

    let should_delete = judgment.message_action == MessageAction::Delete;
    let should_notify = judgment.account_action != AccountAction::Dismiss;
    Decision {
        classification,
        judgment: Some(judgment),
        should_notify,
        should_delete,
        suppressed: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_common::models::{Category, Rating, RepetitionSignal};

    fn classification(category: Category, confidence: Rating) -> ClassificationResult {
        ClassificationResult {
            category,
            confidence,
            severity: Rating::Medium,
            evidence: None,
            reasoning: None,
            repetition: RepetitionSignal::default(),
        }
    }

    fn judgment(account: AccountAction, message: MessageAction) -> JudgmentResult {
        JudgmentResult {
            account_action: account,
            message_action: message,
            reasoning: "test".to_string(),
            message_to_user: None,
        }
    }

    #[test]
    fn clean_never_acts() {
        let d = decide(classification(Category::Clean, Rating::High), None, &GateConfig::default());
        assert!(!d.should_delete && !d.should_notify);
        assert!(d.suppressed.is_none());
    }

    #[test]
    fn irrelevant_needs_stricter_confidence() {
        let gate = GateConfig::default();
        let j = judgment(AccountAction::Restrict, MessageAction::Delete);

        let below = decide(classification(Category::IrrelevantToGroup, Rating::Medium), Some(j.clone()), &gate);
        assert!(!below.should_delete && !below.should_notify);
        assert!(below.suppressed.is_some());

        let at = decide(classification(Category::IrrelevantToGroup, Rating::High), Some(j.clone()), &gate);
        assert!(at.should_delete && at.should_notify);

        // same confidence clears the ordinary floor for other categories
        let spam = decide(classification(Category::Spam, Rating::Medium), Some(j), &gate);
        assert!(spam.should_delete && spam.should_notify);
    }

    #[test]
    fn low_confidence_is_suppressed_everywhere() {
        let d = decide(
            classification(Category::Insult, Rating::Low),
            Some(judgment(AccountAction::Ban, MessageAction::Delete)),
            &GateConfig::default(),
        );
        assert!(!d.requires_action());
    }

    #[test]
    fn actions_map_independently() {
        let gate = GateConfig::default();
        let keep_but_warn = decide(
            classification(Category::Flirt, Rating::High),
            Some(judgment(AccountAction::Restrict, MessageAction::Dismiss)),
            &gate,
        );
        assert!(!keep_but_warn.should_delete && keep_but_warn.should_notify);

        let delete_quietly = decide(
            classification(Category::Advertisement, Rating::High),
            Some(judgment(AccountAction::Dismiss, MessageAction::Delete)),
            &gate,
        );
        assert!(delete_quietly.should_delete && !delete_quietly.should_notify);
    }
}
