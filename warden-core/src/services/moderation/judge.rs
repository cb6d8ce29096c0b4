// File: warden-core/src/services/moderation/judge.rs

use serde::Deserialize;
use tracing::warn;
use warden_ai::{AiClient, ResponseSchema, SchemaField, StructuredOutput};
use warden_common::models::{AccountAction, ClassificationResult, GroupContext, JudgmentResult, MessageAction};
use warden_common::CapabilityError;

use crate::Error;
use super::prompts::JUDGE_PROMPT;

const SCHEMA_NAME: &str = "moderation_judgment";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JudgeOutput {
    pub account_action: AccountAction,
    pub message_action: MessageAction,
    pub reasoning: String,
    pub message_to_user: Option<String>,
}

impl StructuredOutput for JudgeOutput {
    fn response_schema() -> ResponseSchema {
        ResponseSchema::object(
            SCHEMA_NAME,
            "Stage-2 enforcement decision for a flagged message",
            &[
                SchemaField::one_of("account_action", "What happens to the sender", &["DISMISS", "RESTRICT", "REMOVE", "BAN"]),
                SchemaField::one_of("message_action", "What happens to the message", &["DISMISS", "DELETE"]),
                SchemaField::string("reasoning", "Why this action is proportionate"),
                SchemaField::string("message_to_user", "Notice for the sender, in the sender's language").nullable(),
            ],
        )
    }
}

impl JudgeOutput {
    /// A notice, when present, must say something.
    fn validate(self) -> Result<JudgmentResult, CapabilityError> {
        if let Some(text) = &self.message_to_user {
            if text.trim().is_empty() {
                return Err(CapabilityError::schema_violation(
                    SCHEMA_NAME,
                    "message_to_user",
                    "notice must be non-empty when present",
                ));
            }
        }
        Ok(JudgmentResult {
            account_action: self.account_action,
            message_action: self.message_action,
            reasoning: self.reasoning,
            message_to_user: self.message_to_user,
        })
    }
}

/// Stage-2 decision maker. Only called for non-clean classifications.
#[derive(Clone)]
pub struct Judge {
    ai: AiClient,
}

impl Judge {
    pub fn new(ai: AiClient) -> Self {
        Self { ai }
    }

    pub async fn judge(
        &self,
        message_text: &str,
        sender_name: &str,
        group: &GroupContext,
        classification: &ClassificationResult,
    ) -> Result<JudgmentResult, Error> {
        let analysis = serde_json::to_string_pretty(classification)?;

        let result = self
            .ai
            .invoke::<JudgeOutput>(
                &JUDGE_PROMPT,
                &[
                    ("GROUP_TITLE", group.title.as_str()),
                    ("GROUP_RULES", group.rules_text.as_str()),
                    ("FIRST_NAME", sender_name),
                    ("INPUT", message_text),
                    ("WARDEN_ANALYSIS", analysis.as_str()),
                ],
            )
            .await
            .and_then(JudgeOutput::validate);

        result.map_err(|e| {
            warn!(group_id = group.group_id, category = %classification.category, "Judgment failed: {}", e);
            Error::Judgment(e)
        })
    }
}
