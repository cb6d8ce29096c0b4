use std::collections::HashMap;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use tokio::sync::RwLock;
use warden_common::CapabilityError;

/// Async handler behind a tool: free-text input in, free-text answer out.
pub type FunctionHandler =
    Arc<dyn Fn(String) -> BoxFuture<'static, Result<String, CapabilityError>> + Send + Sync>;

/// A tool the responder may call.
#[derive(Clone)]
pub struct Function {
    /// Name of the function
    pub name: String,

    /// Description of what the function does
    pub description: String,

    /// What the single text input should contain
    pub input_description: String,

    /// Function handler implementation
    pub handler: FunctionHandler,
}

impl Function {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_description: impl Into<String>,
        handler: FunctionHandler,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_description: input_description.into(),
            handler,
        }
    }

    pub async fn execute(&self, input: String) -> Result<String, CapabilityError> {
        (self.handler)(input).await
    }
}

/// Registry of tools. Built explicitly by whoever wires the service.
#[derive(Clone, Default)]
pub struct FunctionRegistry {
    functions: Arc<RwLock<HashMap<String, Function>>>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new function, replacing one with the same name
    pub async fn register(&self, function: Function) {
        let mut functions = self.functions.write().await;
        functions.insert(function.name.clone(), function);
    }

    pub async fn get(&self, name: &str) -> Option<Function> {
        let functions = self.functions.read().await;
        functions.get(name).cloned()
    }

    pub async fn get_all(&self) -> Vec<Function> {
        let functions = self.functions.read().await;
        let mut all: Vec<Function> = functions.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all
    }

    pub async fn names(&self) -> Vec<String> {
        self.get_all().await.into_iter().map(|f| f.name).collect()
    }

    /// One line per tool, for embedding in a prompt.
    pub async fn describe_all(&self) -> String {
        let all = self.get_all().await;
        if all.is_empty() {
            return "(no tools available)".to_string();
        }
        all.iter()
            .map(|f| format!("- {}: {} Input: {}", f.name, f.description, f.input_description))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub async fn execute(&self, name: &str, input: String) -> Result<String, CapabilityError> {
        let function = self
            .get(name)
            .await
            .ok_or_else(|| CapabilityError::UnknownTool(name.to_string()))?;
        function.execute(input).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn echo() -> Function {
        Function::new(
            "echo",
            "Repeats the input.",
            "any text",
            Arc::new(|input: String| -> BoxFuture<'static, Result<String, CapabilityError>> {
                Box::pin(async move { Ok::<_, CapabilityError>(format!("echo: {input}")) })
            }),
        )
    }

    #[tokio::test]
    async fn executes_registered_tool() {
        let registry = FunctionRegistry::new();
        registry.register(echo()).await;
        let out = registry.execute("echo", "hi".to_string()).await.unwrap();
        assert_eq!(out, "echo: hi");
    }

    #[tokio::test]
    async fn unknown_tool_is_an_error() {
        let registry = FunctionRegistry::new();
        let err = registry.execute("nope", String::new()).await.unwrap_err();
        assert!(matches!(err, CapabilityError::UnknownTool(name) if name == "nope"));
    }

    #[tokio::test]
    async fn describes_tools_for_prompts() {
        let registry = FunctionRegistry::new();
        assert_eq!(registry.describe_all().await, "(no tools available)");
        registry.register(echo()).await;
        assert!(registry.describe_all().await.starts_with("- echo: Repeats the input."));
    }
}
