use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use warden_common::CapabilityError;

use crate::models::ProviderConfig;
use crate::schema::ResponseSchema;
use crate::traits::ModelProvider;

const OPENAI_API_BASE: &str = "https://api.openai.com/v1";
const OPENROUTER_API_BASE: &str = "https://openrouter.ai/api/v1";

/// OpenAI-compatible chat-completions provider using strict JSON-schema output.
/// Works against OpenAI itself and OpenRouter.
pub struct OpenAiProvider {
    config: ProviderConfig,
    client: Client,
}

impl OpenAiProvider {
    /// Create a new provider with the given configuration
    pub fn new(config: ProviderConfig) -> Self {
        let client = Client::new();
        Self { config, client }
    }

    fn api_base(&self) -> String {
        self.config.api_base.clone().unwrap_or_else(|| {
            if self.config.provider_type.eq_ignore_ascii_case("openrouter") {
                OPENROUTER_API_BASE.to_string()
            } else {
                OPENAI_API_BASE.to_string()
            }
        })
    }

    fn build_payload(&self, prompt: &str, schema: &ResponseSchema) -> Value {
        let mut messages = Vec::new();
        if let Some(system_prompt) = self.config.options.get("system_prompt") {
            messages.push(json!({ "role": "system", "content": system_prompt }));
        }
        messages.push(json!({ "role": "user", "content": prompt }));

        json!({
            "model": self.config.default_model,
            "messages": messages,
            "max_tokens": self.config.max_tokens,
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": schema.name,
                    "description": schema.description,
                    "strict": true,
                    "schema": schema.schema,
                }
            }
        })
    }
}

/// Pulls the structured JSON object out of a chat-completions response body.
pub(crate) fn parse_completion(schema_name: &str, body: &str) -> Result<Value, CapabilityError> {
    let data: Value = serde_json::from_str(body).map_err(|e| {
        tracing::error!("Failed to parse API response as JSON: {:?}", e);
        CapabilityError::Provider(format!("API returned non-JSON response: {}", e))
    })?;

    if let Some(error) = data.get("error") {
        let error_message = error.get("message").and_then(|m| m.as_str()).unwrap_or("Unknown error");
        return Err(CapabilityError::Provider(format!("API error: {}", error_message)));
    }

    let choice = data
        .get("choices")
        .and_then(|c| c.as_array())
        .and_then(|choices| choices.first())
        .ok_or_else(|| CapabilityError::Provider("Response missing 'choices'".to_string()))?;

    let message = choice
        .get("message")
        .ok_or_else(|| CapabilityError::Provider("Response choice missing 'message'".to_string()))?;

    if let Some(refusal) = message.get("refusal").and_then(|r| r.as_str()) {
        return Err(CapabilityError::Provider(format!("Model refused: {}", refusal)));
    }

    let content = message
        .get("content")
        .and_then(|c| c.as_str())
        .ok_or_else(|| CapabilityError::schema_violation(schema_name, "$", "message has no content"))?;

    serde_json::from_str::<Value>(content)
        .map_err(|e| CapabilityError::schema_violation(schema_name, "$", format!("content is not JSON: {}", e)))
}

#[async_trait]
impl ModelProvider for OpenAiProvider {
    fn name(&self) -> &str {
        &self.config.provider_type
    }

    async fn invoke(&self, prompt: &str, schema: &ResponseSchema) -> Result<Value, CapabilityError> {
        let api_base = self.api_base();
        let request_payload = self.build_payload(prompt, schema);

        tracing::debug!(schema = %schema.name, model = %self.config.default_model, "Making API call to {}/chat/completions", api_base);

        let response = self
            .client
            .post(format!("{}/chat/completions", api_base))
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&request_payload)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let response_text = response.text().await.map_err(map_reqwest_error)?;
        tracing::trace!("Raw API response: {}", response_text);

        parse_completion(&schema.name, &response_text)
    }
}

fn map_reqwest_error(e: reqwest::Error) -> CapabilityError {
    if e.is_timeout() {
        CapabilityError::Timeout(0)
    } else {
        CapabilityError::Transport(e.to_string())
    }
}

/// Builds the provider named by `config.provider_type`.
pub fn create_provider(config: ProviderConfig) -> Result<Arc<dyn ModelProvider>, CapabilityError> {
    match config.provider_type.to_ascii_lowercase().as_str() {
        "openai" | "openrouter" => Ok(Arc::new(OpenAiProvider::new(config))),
        other => Err(CapabilityError::Provider(format!("Unsupported provider type: {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(provider_type: &str) -> ProviderConfig {
        ProviderConfig {
            provider_type: provider_type.to_string(),
            api_base: None,
            api_key: "test".to_string(),
            default_model: "test-model".to_string(),
            max_tokens: 200,
            options: HashMap::new(),
        }
    }

    #[test]
    fn extracts_structured_content() {
        let body = r#"{"choices":[{"message":{"content":"{\"ok\":true}"}}]}"#;
        let value = parse_completion("sample", body).unwrap();
        assert_eq!(value, json!({"ok": true}));
    }

    #[test]
    fn api_error_is_provider_error() {
        let body = r#"{"error":{"message":"rate limited"}}"#;
        let err = parse_completion("sample", body).unwrap_err();
        assert!(matches!(err, CapabilityError::Provider(msg) if msg.contains("rate limited")));
    }

    #[test]
    fn non_json_content_is_schema_violation() {
        let body = r#"{"choices":[{"message":{"content":"sure, here you go"}}]}"#;
        let err = parse_completion("sample", body).unwrap_err();
        assert!(matches!(err, CapabilityError::SchemaViolation { .. }));
    }

    #[test]
    fn payload_requests_strict_schema() {
        let provider = OpenAiProvider::new(config("openrouter"));
        let schema = ResponseSchema::object("sample", "d", &[]);
        let payload = provider.build_payload("hello", &schema);
        assert_eq!(payload["response_format"]["json_schema"]["strict"], json!(true));
        assert_eq!(payload["messages"][0]["content"], json!("hello"));
        assert_eq!(provider.api_base(), OPENROUTER_API_BASE);
    }

    #[test]
    fn unknown_provider_type_is_rejected() {
        assert!(create_provider(config("carrier-pigeon")).is_err());
        assert!(create_provider(config("openai")).is_ok());
    }
}
