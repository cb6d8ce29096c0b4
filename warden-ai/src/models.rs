use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Configuration for an AI provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// The type of provider ("openai", "openrouter")
    pub provider_type: String,

    /// Base URL for API requests
    pub api_base: Option<String>,

    /// API key for authentication
    pub api_key: String,

    /// Default model to use with this provider
    pub default_model: String,

    /// Upper bound on generated tokens per call
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Additional provider-specific configuration options
    #[serde(default)]
    pub options: HashMap<String, String>,
}

fn default_max_tokens() -> u32 {
    1000
}

/// One property of a response schema or tool input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaField {
    /// Name of the property
    pub name: String,

    /// Description the model sees for this property
    pub description: String,

    /// JSON type of the property (string, boolean, integer, ...)
    pub field_type: String,

    /// Whether `null` is an accepted value
    pub nullable: bool,

    /// For enum types, the possible values
    pub enum_values: Option<Vec<String>>,
}

impl SchemaField {
    pub fn new(name: &str, field_type: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            field_type: field_type.to_string(),
            nullable: false,
            enum_values: None,
        }
    }

    pub fn string(name: &str, description: &str) -> Self {
        Self::new(name, "string", description)
    }

    pub fn boolean(name: &str, description: &str) -> Self {
        Self::new(name, "boolean", description)
    }

    pub fn one_of(name: &str, description: &str, values: &[&str]) -> Self {
        let mut field = Self::string(name, description);
        field.enum_values = Some(values.iter().map(|v| v.to_string()).collect());
        field
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
}
