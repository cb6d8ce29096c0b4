// File: warden-common/src/models/moderation.rs

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Closed set of stage-1 content categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Clean,
    Spam,
    Sexual,
    Advertisement,
    Flirt,
    Insult,
    Politics,
    IrrelevantToGroup,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Clean,
        Category::Spam,
        Category::Sexual,
        Category::Advertisement,
        Category::Flirt,
        Category::Insult,
        Category::Politics,
        Category::IrrelevantToGroup,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Clean => "CLEAN",
            Category::Spam => "SPAM",
            Category::Sexual => "SEXUAL",
            Category::Advertisement => "ADVERTISEMENT",
            Category::Flirt => "FLIRT",
            Category::Insult => "INSULT",
            Category::Politics => "POLITICS",
            Category::IrrelevantToGroup => "IRRELEVANT_TO_GROUP",
        }
    }

    pub fn is_clean(&self) -> bool {
        matches!(self, Category::Clean)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::Parse(format!("Unknown category: {}", s)))
    }
}

/// Three-level ordinal used for both confidence and severity (Low < Medium < High).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rating {
    Low,
    Medium,
    High,
}

impl Rating {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rating::Low => "Low",
            Rating::Medium => "Medium",
            Rating::High => "High",
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Locally computed cross-message signal: how many of the sender's latest
/// messages are near-duplicates of the one under evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepetitionSignal {
    pub repeated_count: u32,
    pub repeated_texts: Vec<String>,
}

impl RepetitionSignal {
    pub fn is_repetitive(&self) -> bool {
        self.repeated_count > 0
    }
}

/// Stage-1 output. Produced once per message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub category: Category,
    pub confidence: Rating,
    pub severity: Rating,
    pub evidence: Option<String>,
    pub reasoning: Option<String>,
    #[serde(default)]
    pub repetition: RepetitionSignal,
}

impl ClassificationResult {
    pub fn is_clean(&self) -> bool {
        self.category.is_clean()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountAction {
    Dismiss,
    Restrict,
    Remove,
    Ban,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageAction {
    Dismiss,
    Delete,
}

/// Stage-2 output. Produced at most once per message, only for non-clean flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgmentResult {
    pub account_action: AccountAction,
    pub message_action: MessageAction,
    pub reasoning: String,
    pub message_to_user: Option<String>,
}

/// Ephemeral enforcement decision handed to the action executor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub classification: ClassificationResult,
    pub judgment: Option<JudgmentResult>,
    pub should_notify: bool,
    pub should_delete: bool,
    /// Set when the gate withheld enforcement; carries the reason.
    pub suppressed: Option<String>,
}

impl Decision {
    pub fn clean(classification: ClassificationResult) -> Self {
        Self {
            classification,
            judgment: None,
            should_notify: false,
            should_delete: false,
            suppressed: None,
        }
    }

    pub fn requires_action(&self) -> bool {
        self.should_notify || self.should_delete
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_wire_names() {
        let json = serde_json::to_string(&Category::IrrelevantToGroup).unwrap();
        assert_eq!(json, "\"IRRELEVANT_TO_GROUP\"");
        let parsed: Category = serde_json::from_str("\"ADVERTISEMENT\"").unwrap();
        assert_eq!(parsed, Category::Advertisement);
        assert_eq!("spam".parse::<Category>().unwrap(), Category::Spam);
        assert!("SCAM".parse::<Category>().is_err());
    }

    #[test]
    fn rating_is_ordinal() {
        assert!(Rating::Low < Rating::Medium);
        assert!(Rating::Medium < Rating::High);
        let parsed: Rating = serde_json::from_str("\"Medium\"").unwrap();
        assert_eq!(parsed, Rating::Medium);
    }
}
