pub mod client;
pub mod function;
pub mod models;
pub mod prompt;
pub mod provider;
pub mod schema;
pub mod traits;

// Re-export public APIs
pub use client::{decode_strict, AiClient};
pub use function::{Function, FunctionRegistry};
pub use models::{ProviderConfig, SchemaField};
pub use prompt::PromptTemplate;
pub use provider::{create_provider, OpenAiProvider};
pub use schema::ResponseSchema;
pub use traits::{ModelProvider, StructuredOutput};
