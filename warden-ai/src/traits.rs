use async_trait::async_trait;
use serde::de::DeserializeOwned;
use warden_common::CapabilityError;

use crate::schema::ResponseSchema;

/// The capability layer: a rendered prompt plus a response schema in, a JSON
/// value out. Implementations must report timeouts and malformed output as
/// [`CapabilityError`] rather than hanging or guessing.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Name of this provider
    fn name(&self) -> &str;

    /// Run one structured call.
    async fn invoke(
        &self,
        prompt: &str,
        schema: &ResponseSchema,
    ) -> Result<serde_json::Value, CapabilityError>;
}

/// A typed capability result together with the schema it is decoded against.
pub trait StructuredOutput: DeserializeOwned + Send {
    fn response_schema() -> ResponseSchema;
}
