use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplyContext {
    pub message_id: Option<i64>,
    pub text: Option<String>,
}

/// One inbound chat event as delivered by the transport collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundEvent {
    pub sender_id: i64,
    pub sender_name: String,
    pub chat_id: i64,
    pub chat_is_group: bool,
    #[serde(default)]
    pub chat_title: Option<String>,
    #[serde(default)]
    pub message_id: Option<i64>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub reply_context: Option<ReplyContext>,
    pub timestamp: DateTime<Utc>,
}

/// Outbound request for the transport: delete the original and/or send a text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundAction {
    pub chat_id: i64,
    pub message_id: Option<i64>,
    pub delete_original: bool,
    pub send_text: Option<String>,
    pub reply_to_sender: bool,
}

impl OutboundAction {
    pub fn is_noop(&self) -> bool {
        !self.delete_original && self.send_text.is_none()
    }
}
