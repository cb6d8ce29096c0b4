// File: warden-core/src/services/moderation/tool_router.rs

use serde::Deserialize;
use tracing::{debug, info, warn};
use warden_ai::{AiClient, FunctionRegistry, ResponseSchema, SchemaField, StructuredOutput};
use warden_common::CapabilityError;

use crate::config::BotConfig;
use super::prompts::{MENTION_PROMPT, RESPONDER_PROMPT};
use super::repetition::normalize;

const STEP_SCHEMA: &str = "responder_step";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MentionCheck {
    pub is_direct_request_to_bot: bool,
    pub user_request: String,
}

impl StructuredOutput for MentionCheck {
    fn response_schema() -> ResponseSchema {
        ResponseSchema::object(
            "bot_mention_check",
            "Whether a message is a direct request to the bot",
            &[
                SchemaField::boolean("is_direct_request_to_bot", "True only for a direct question, command or request to the bot"),
                SchemaField::string("user_request", "The request restated concisely in the sender's language, or empty"),
            ],
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepAction {
    CallTool,
    Reply,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResponderStep {
    pub action: StepAction,
    pub tool: Option<String>,
    pub tool_input: Option<String>,
    pub reply: Option<String>,
}

impl StructuredOutput for ResponderStep {
    fn response_schema() -> ResponseSchema {
        ResponseSchema::object(
            STEP_SCHEMA,
            "One step of the responder: call a tool or give the final reply",
            &[
                SchemaField::one_of("action", "call_tool or reply", &["call_tool", "reply"]),
                SchemaField::string("tool", "Tool name when calling a tool").nullable(),
                SchemaField::string("tool_input", "Input for the tool").nullable(),
                SchemaField::string("reply", "Final answer for the user").nullable(),
            ],
        )
    }
}

/// Detects messages addressed to the bot and answers them, optionally with
/// the help of registered tools.
pub struct ToolRouter {
    ai: AiClient,
    tools: FunctionRegistry,
    bot: BotConfig,
}

impl ToolRouter {
    pub fn new(ai: AiClient, tools: FunctionRegistry, bot: BotConfig) -> Self {
        Self { ai, tools, bot }
    }

    /// Local check: does the text contain a bot name as a whole word or a
    /// mention marker? Without one there is nothing to ask the model.
    pub fn mentions_bot(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        if self
            .bot
            .mention_markers
            .iter()
            .any(|m| !m.is_empty() && lowered.contains(&m.to_lowercase()))
        {
            return true;
        }

        let padded = format!(" {} ", normalize(text));
        self.bot.names.iter().any(|name| {
            let name = normalize(name);
            !name.is_empty() && padded.contains(&format!(" {} ", name))
        })
    }

    /// Phase (a). Any failure counts as "not a request".
    pub async fn detect_request(&self, text: &str) -> Option<String> {
        if !self.mentions_bot(text) {
            return None;
        }

        let names = self.bot.names.join(", ");
        match self
            .ai
            .invoke::<MentionCheck>(&MENTION_PROMPT, &[("BOT_NAMES", names.as_str()), ("USER_MESSAGE", text)])
            .await
        {
            Ok(check) if check.is_direct_request_to_bot => {
                let request = check.user_request.trim();
                // fall back to the raw text if the model gave no summary
                Some(if request.is_empty() { text.to_string() } else { request.to_string() })
            }
            Ok(_) => {
                debug!("Bot mentioned but not addressed");
                None
            }
            Err(e) => {
                warn!("Mention check failed, staying silent: {}", e);
                None
            }
        }
    }

    /// Phase (b): a bounded call-tool / reply loop.
    pub async fn respond(&self, request: &str) -> Result<String, CapabilityError> {
        let tools = self.tools.describe_all().await;
        let mut scratchpad = String::new();
        let max_steps = self.bot.max_tool_steps.max(1);

        for step in 0..max_steps {
            let steps_left = (max_steps - step).to_string();
            let pad = if scratchpad.is_empty() { "(none)" } else { scratchpad.as_str() };

            let next: ResponderStep = self
                .ai
                .invoke(
                    &RESPONDER_PROMPT,
                    &[
                        ("TOOLS", tools.as_str()),
                        ("REQUEST", request),
                        ("SCRATCHPAD", pad),
                        ("STEPS_LEFT", steps_left.as_str()),
                    ],
                )
                .await?;

            match next.action {
                StepAction::Reply => {
                    return match next.reply.map(|r| r.trim().to_string()) {
                        Some(reply) if !reply.is_empty() => Ok(reply),
                        _ => Err(CapabilityError::schema_violation(STEP_SCHEMA, "reply", "reply action without text")),
                    };
                }
                StepAction::CallTool => {
                    let name = next
                        .tool
                        .ok_or_else(|| CapabilityError::schema_violation(STEP_SCHEMA, "tool", "call_tool without a tool name"))?;
                    let input = next.tool_input.unwrap_or_default();
                    debug!(tool = %name, step, "Responder calling tool");

                    let observation = match self.tools.execute(&name, input.clone()).await {
                        Ok(out) => out,
                        Err(CapabilityError::UnknownTool(n)) => return Err(CapabilityError::UnknownTool(n)),
                        Err(e) => format!("tool error: {}", e),
                    };
                    scratchpad.push_str(&format!("- called {}({}) -> {}\n", name, input, observation));
                }
            }
        }

        Err(CapabilityError::Provider(format!(
            "responder gave no reply within {} steps",
            max_steps
        )))
    }

    /// Both phases. `None` means no reply should be sent.
    pub async fn maybe_handle_direct_request(&self, text: &str) -> Option<String> {
        let request = self.detect_request(text).await?;
        info!("Direct request to bot detected");
        match self.respond(&request).await {
            Ok(reply) => Some(reply),
            Err(e) => {
                warn!("Responder failed, no reply sent: {}", e);
                None
            }
        }
    }
}
