// File: warden-core/src/services/moderation/executor.rs

use async_trait::async_trait;
use warden_common::models::{Decision, Message, OutboundAction};

use crate::config::NoticeConfig;
use crate::Error;

/// Side-effect boundary: the transport turns these into platform calls.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ActionExecutor: Send + Sync {
    async fn execute(&self, action: &OutboundAction) -> Result<(), Error>;
}

/// Outbound request for a gated decision, if it asks for anything.
pub fn moderation_action(message: &Message, decision: &Decision, notice: &NoticeConfig) -> Option<OutboundAction> {
    if !decision.requires_action() {
        return None;
    }

    let send_text = if decision.should_notify {
        let body = decision
            .judgment
            .as_ref()
            .and_then(|j| j.message_to_user.as_deref())
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(notice.fallback_text.as_str());
        Some(format!("{} {}", notice.prefix, body).trim().to_string())
    } else {
        None
    };

    Some(OutboundAction {
        chat_id: message.group_id,
        message_id: message.message_id,
        delete_original: decision.should_delete,
        send_text,
        reply_to_sender: decision.should_notify && !decision.should_delete,
    })
}

/// Tool replies go back as a reply to the asking message.
pub fn tool_reply_action(message: &Message, reply: &str) -> OutboundAction {
    OutboundAction {
        chat_id: message.group_id,
        message_id: message.message_id,
        delete_original: false,
        send_text: Some(reply.to_string()),
        reply_to_sender: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use warden_common::models::{
        AccountAction, Category, ClassificationResult, JudgmentResult, MessageAction, Rating, RepetitionSignal,
    };

    fn message() -> Message {
        Message {
            message_id: Some(55),
            user_id: 1,
            group_id: -100,
            sender_name: "Mina".to_string(),
            text: "buy followers".to_string(),
            created_at: Utc::now(),
            reply_to_id: None,
            reply_to_text: None,
        }
    }

    fn decision(delete: bool, notify: bool, notice: Option<&str>) -> Decision {
        Decision {
            classification: ClassificationResult {
                category: Category::Spam,
                confidence: Rating::High,
                severity: Rating::High,
                evidence: None,
                reasoning: None,
                repetition: RepetitionSignal::default(),
            },
            judgment: Some(JudgmentResult {
                account_action: if notify { AccountAction::Restrict } else { AccountAction::Dismiss },
                message_action: if delete { MessageAction::Delete } else { MessageAction::Dismiss },
                reasoning: "r".to_string(),
                message_to_user: notice.map(str::to_string),
            }),
            should_notify: notify,
            should_delete: delete,
            suppressed: None,
        }
    }

    #[test]
    fn delete_and_notify_with_prefix() {
        let action = moderation_action(&message(), &decision(true, true, Some("Please stop.")), &NoticeConfig::default()).unwrap();
        assert!(action.delete_original);
        assert_eq!(action.send_text.as_deref(), Some("Smart moderator: Please stop."));
        assert_eq!(action.chat_id, -100);
        assert!(!action.reply_to_sender);
    }

    #[test]
    fn missing_notice_uses_fallback() {
        let notice = NoticeConfig::default();
        let action = moderation_action(&message(), &decision(false, true, None), &notice).unwrap();
        assert_eq!(action.send_text, Some(format!("{} {}", notice.prefix, notice.fallback_text)));
        assert!(action.reply_to_sender);
    }

    #[test]
    fn no_action_for_inert_decision() {
        assert!(moderation_action(&message(), &decision(false, false, None), &NoticeConfig::default()).is_none());
    }

    #[tokio::test]
    async fn mock_executor_receives_action() {
        let mut mock = MockActionExecutor::new();
        mock.expect_execute()
            .withf(|a: &OutboundAction| a.delete_original && a.send_text.is_none())
            .times(1)
            .returning(|_| Ok(()));

        let action = moderation_action(&message(), &decision(true, false, None), &NoticeConfig::default()).unwrap();
        mock.execute(&action).await.unwrap();
    }
}
