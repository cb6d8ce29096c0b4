// File: warden-core/src/services/moderation/tools.rs

use std::sync::Arc;

use futures_util::future::BoxFuture;
use serde::Deserialize;
use tracing::info;
use warden_ai::{AiClient, Function, FunctionRegistry, ResponseSchema, SchemaField, StructuredOutput};
use warden_common::CapabilityError;

use super::prompts::GOLANG_PROMPT;

pub const GOLANG_TOOL: &str = "golang_question";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ToolAnswer {
    answer: String,
}

impl StructuredOutput for ToolAnswer {
    fn response_schema() -> ResponseSchema {
        ResponseSchema::object(
            "tool_answer",
            "Plain-text answer produced by a tool",
            &[SchemaField::string("answer", "The answer text")],
        )
    }
}

/// Answers questions about the Go programming language.
pub fn golang_question_tool(ai: AiClient) -> Function {
    Function::new(
        GOLANG_TOOL,
        "Answers a question about the Go (Golang) programming language.",
        "the user's question about Go, in their own words",
        Arc::new(move |question: String| -> BoxFuture<'static, Result<String, CapabilityError>> {
            let ai = ai.clone();
            Box::pin(async move {
                info!("Executing golang_question tool");
                if question.trim().is_empty() {
                    return Ok("No question provided for the Go tool.".to_string());
                }
                let out: ToolAnswer = ai
                    .invoke(&GOLANG_PROMPT, &[("QUESTION", question.as_str())])
                    .await?;
                Ok::<_, CapabilityError>(out.answer)
            })
        }),
    )
}

/// Registry with every tool the responder may use.
pub async fn default_tools(ai: &AiClient) -> FunctionRegistry {
    let registry = FunctionRegistry::new();
    registry.register(golang_question_tool(ai.clone())).await;
    registry
}
