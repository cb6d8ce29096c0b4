use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};
use warden_common::CapabilityError;

use crate::prompt::PromptTemplate;
use crate::traits::{ModelProvider, StructuredOutput};

/// Front door to the capability layer. Renders a prompt, calls the provider
/// under a deadline and decodes the answer into a typed result.
#[derive(Clone)]
pub struct AiClient {
    provider: Arc<dyn ModelProvider>,
    timeout: Duration,
}

impl AiClient {
    pub fn new(provider: Arc<dyn ModelProvider>, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    /// Renders `template` with `bindings`, invokes the provider against
    /// `T`'s schema and strictly decodes the result.
    pub async fn invoke<T: StructuredOutput>(
        &self,
        template: &PromptTemplate,
        bindings: &[(&str, &str)],
    ) -> Result<T, CapabilityError> {
        let prompt = template.render(bindings)?;
        let schema = T::response_schema();

        debug!(
            provider = %self.provider.name(),
            prompt = template.name,
            schema = %schema.name,
            "Invoking capability"
        );

        let value = match tokio::time::timeout(self.timeout, self.provider.invoke(&prompt, &schema)).await {
            Ok(Ok(value)) => value,
            Ok(Err(CapabilityError::Timeout(_))) | Err(_) => {
                warn!(prompt = template.name, "Capability call exceeded {:?}", self.timeout);
                return Err(CapabilityError::Timeout(self.timeout.as_secs()));
            }
            Ok(Err(e)) => return Err(e),
        };

        decode_strict(&schema.name, value)
    }
}

/// Decodes a capability answer, reporting the JSON path of the first
/// offending field on failure.
pub fn decode_strict<T: DeserializeOwned>(schema_name: &str, value: Value) -> Result<T, CapabilityError> {
    serde_path_to_error::deserialize(value).map_err(|e| {
        let path = e.path().to_string();
        CapabilityError::schema_violation(schema_name, path, e.into_inner().to_string())
    })
}
