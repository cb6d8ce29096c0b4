use std::sync::Arc;
use tracing::{debug, info, warn};
use warden_common::models::{GroupContext, InboundEvent, Message};
use warden_common::traits::repository_traits::{GroupContextRepository, UserRepository};

use crate::config::GroupDefaults;
use crate::services::moderation::{ModerationPipeline, PipelineOutcome};

/// Prefix of the in-chat admin commands handled by the transport.
pub const COMMAND_PREFIX: &str = "warden:";

/// The MessageService turns inbound transport events into pipeline runs:
/// it filters out what should never be moderated, registers the sender,
/// resolves the group context and hands the message to the pipeline.
pub struct MessageService {
    pipeline: Arc<ModerationPipeline>,
    groups: Arc<dyn GroupContextRepository>,
    users: Arc<dyn UserRepository>,
    defaults: GroupDefaults,
}

impl MessageService {
    pub fn new(
        pipeline: Arc<ModerationPipeline>,
        groups: Arc<dyn GroupContextRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        debug!("MessageService::new() called");
        let defaults = pipeline.config().defaults.clone();
        Self {
            pipeline,
            groups,
            users,
            defaults,
        }
    }

    /// Converts an event into a `Message`, or `None` if it is not a
    /// moderatable group text: private chats, empty or missing text, and
    /// commands (`/...` or `warden:...`) are dropped.
    pub fn to_message(event: &InboundEvent) -> Option<Message> {
        if !event.chat_is_group {
            return None;
        }
        let text = event.text.as_deref()?.trim();
        if text.is_empty() || is_command(text) {
            return None;
        }

        let (reply_to_id, reply_to_text) = match &event.reply_context {
            Some(ctx) => (ctx.message_id, ctx.text.clone()),
            None => (None, None),
        };

        Some(Message {
            message_id: event.message_id,
            user_id: event.sender_id,
            group_id: event.chat_id,
            sender_name: event.sender_name.clone(),
            text: text.to_string(),
            created_at: event.timestamp,
            reply_to_id,
            reply_to_text,
        })
    }

    /// Registered context, or the documented defaults. A lookup failure is
    /// logged and treated like an unregistered group.
    pub async fn group_context(&self, group_id: i64, chat_title: Option<&str>) -> GroupContext {
        let found = self
            .groups
            .get_context(group_id, &self.defaults.group_title, &self.defaults.group_rules)
            .await;

        match found {
            Ok(Some(ctx)) => ctx,
            Ok(None) => {
                debug!(group_id, "Group not registered, using default context");
                self.default_context(group_id, chat_title)
            }
            Err(e) => {
                warn!(group_id, "Group context lookup failed, using defaults: {}", e);
                self.default_context(group_id, chat_title)
            }
        }
    }

    fn default_context(&self, group_id: i64, chat_title: Option<&str>) -> GroupContext {
        let title = chat_title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(self.defaults.group_title.as_str())
            .to_string();
        GroupContext {
            group_id,
            title,
            rules_text: self.defaults.group_rules.clone(),
        }
    }

    /// Processes one inbound event. Returns `None` when the event was
    /// filtered out before reaching the pipeline.
    pub async fn handle_event(&self, event: InboundEvent) -> Option<PipelineOutcome> {
        let Some(message) = Self::to_message(&event) else {
            debug!(chat_id = event.chat_id, "Event dropped before moderation");
            return None;
        };

        if let Err(e) = self.users.upsert_user(message.user_id, &message.sender_name).await {
            warn!(user_id = message.user_id, "Failed to register user: {}", e);
        }

        let group = self.group_context(message.group_id, event.chat_title.as_deref()).await;
        let outcome = self.pipeline.process(&message, &group).await;
        info!(
            user_id = message.user_id,
            group_id = message.group_id,
            state = %outcome.state,
            actions = outcome.actions.len(),
            "Message handled"
        );
        Some(outcome)
    }
}

fn is_command(text: &str) -> bool {
    text.starts_with('/')
        || text
            .get(..COMMAND_PREFIX.len())
            .is_some_and(|p| p.eq_ignore_ascii_case(COMMAND_PREFIX))
}
