// File: warden-core/src/services/moderation/classifier.rs

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, warn};
use warden_ai::{AiClient, ResponseSchema, SchemaField, StructuredOutput};
use warden_common::models::{Category, ClassificationResult, GroupContext, HistoryRecord, Message, Rating};

use crate::Error;
use super::prompts::CLASSIFIER_PROMPT;
use super::repetition;

/// Raw stage-1 answer as the model must produce it.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClassifierOutput {
    pub category: Category,
    pub confidence: Rating,
    pub severity: Rating,
    pub evidence: Option<String>,
    pub reasoning: Option<String>,
}

pub(crate) const RATINGS: [&str; 3] = ["Low", "Medium", "High"];

impl StructuredOutput for ClassifierOutput {
    fn response_schema() -> ResponseSchema {
        let categories: Vec<&str> = Category::ALL.iter().map(|c| c.as_str()).collect();
        ResponseSchema::object(
            "message_classification",
            "Stage-1 moderation label for a single group message",
            &[
                SchemaField::one_of("category", "The single best matching category", &categories),
                SchemaField::one_of("confidence", "How certain the category is", &RATINGS),
                SchemaField::one_of("severity", "How harmful the message is", &RATINGS),
                SchemaField::string("evidence", "The decisive quote from the message").nullable(),
                SchemaField::string("reasoning", "Step-by-step reasoning, citing repetition if any").nullable(),
            ],
        )
    }
}

/// Stage-1 content classifier.
#[derive(Clone)]
pub struct Classifier {
    ai: AiClient,
}

impl Classifier {
    pub fn new(ai: AiClient) -> Self {
        Self { ai }
    }

    /// Labels `message`. `history` is the sender's recent window, oldest
    /// first, not including `message` itself.
    pub async fn classify(
        &self,
        message: &Message,
        group: &GroupContext,
        history: &[HistoryRecord],
        now: DateTime<Utc>,
    ) -> Result<ClassificationResult, Error> {
        let signal = repetition::detect(&message.text, history);
        if signal.is_repetitive() {
            debug!(
                user_id = message.user_id,
                group_id = message.group_id,
                repeated = signal.repeated_count,
                "Sender is repeating themselves"
            );
        }

        let history_text = render_history(history);
        let repetition_text = repetition::describe(&signal);
        let reply_context = message.reply_to_text.as_deref().unwrap_or("(not a reply)");
        let now_text = now.format("%Y-%m-%d %H:%M:%S UTC").to_string();

        let output: ClassifierOutput = self
            .ai
            .invoke(
                &CLASSIFIER_PROMPT,
                &[
                    ("GROUP_TITLE", group.title.as_str()),
                    ("GROUP_RULES", group.rules_text.as_str()),
                    ("NOW", now_text.as_str()),
                    ("HISTORY", history_text.as_str()),
                    ("REPETITION", repetition_text.as_str()),
                    ("FIRST_NAME", message.sender_name.as_str()),
                    ("REPLY_CONTEXT", reply_context),
                    ("INPUT", message.text.as_str()),
                ],
            )
            .await
            .map_err(|e| {
                warn!(user_id = message.user_id, group_id = message.group_id, "Classification failed: {}", e);
                Error::Classification(e)
            })?;

        Ok(ClassificationResult {
            category: output.category,
            confidence: output.confidence,
            severity: output.severity,
            evidence: output.evidence,
            reasoning: output.reasoning,
            repetition: signal,
        })
    }
}

pub(crate) fn render_history(history: &[HistoryRecord]) -> String {
    if history.is_empty() {
        return "(no recent messages)".to_string();
    }
    history
        .iter()
        .map(|r| {
            let mut line = format!("[{}] {}", r.message_created_at.format("%H:%M:%S"), r.text);
            if let Some(reply) = &r.reply_to_text {
                line.push_str(&format!(" (in reply to: \"{}\")", reply));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}
