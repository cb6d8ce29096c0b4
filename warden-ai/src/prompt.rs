use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use warden_common::CapabilityError;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{([A-Z][A-Z0-9_]*)\}").unwrap_or_else(|_| unreachable!("placeholder pattern is valid"))
});

/// A prompt with `{UPPER_CASE}` placeholders.
///
/// Rendering is a single pass over the template, so bound values are never
/// re-scanned for placeholders. Every placeholder must be bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    pub name: &'static str,
    pub template: &'static str,
}

impl PromptTemplate {
    pub const fn new(name: &'static str, template: &'static str) -> Self {
        Self { name, template }
    }

    pub fn placeholders(&self) -> Vec<String> {
        let mut names: Vec<String> = PLACEHOLDER
            .captures_iter(self.template)
            .map(|c| c[1].to_string())
            .collect();
        names.dedup();
        names
    }

    pub fn render(&self, bindings: &[(&str, &str)]) -> Result<String, CapabilityError> {
        let map: HashMap<&str, &str> = bindings.iter().copied().collect();
        let mut missing = Vec::new();

        let rendered = PLACEHOLDER.replace_all(self.template, |caps: &Captures| {
            let key = &caps[1];
            match map.get(key) {
                Some(value) => (*value).to_string(),
                None => {
                    missing.push(key.to_string());
                    String::new()
                }
            }
        });

        if !missing.is_empty() {
            return Err(CapabilityError::Prompt(format!(
                "template '{}' has unbound placeholders: {}",
                self.name,
                missing.join(", ")
            )));
        }

        Ok(rendered.into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GREETING: PromptTemplate = PromptTemplate::new("greeting", "Hi {NAME}, you said: {INPUT}");

    #[test]
    fn renders_all_bindings() {
        let out = GREETING.render(&[("NAME", "Ali"), ("INPUT", "hello")]).unwrap();
        assert_eq!(out, "Hi Ali, you said: hello");
    }

    #[test]
    fn bound_values_are_not_rescanned() {
        let out = GREETING.render(&[("NAME", "{INPUT}"), ("INPUT", "x")]).unwrap();
        assert_eq!(out, "Hi {INPUT}, you said: x");
    }

    #[test]
    fn missing_binding_is_an_error() {
        let err = GREETING.render(&[("NAME", "Ali")]).unwrap_err();
        assert!(matches!(err, CapabilityError::Prompt(msg) if msg.contains("INPUT")));
    }

    #[test]
    fn lists_placeholders() {
        assert_eq!(GREETING.placeholders(), vec!["NAME".to_string(), "INPUT".to_string()]);
    }
}
