// File: warden-core/src/config.rs

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use warden_common::models::{Category, Rating};

use crate::Error;

/// Top-level moderation settings. Every field has a default, so an empty
/// JSON object (or no file at all) yields a working configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModerationConfig {
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub gate: GateConfig,
    #[serde(default)]
    pub bot: BotConfig,
    #[serde(default)]
    pub capability: CapabilityConfig,
    #[serde(default)]
    pub notice: NoticeConfig,
    #[serde(default)]
    pub defaults: GroupDefaults,
}

/// Longest history window a config may ask for (30 days).
pub const MAX_HISTORY_AGE_SECS: i64 = 30 * 24 * 60 * 60;

impl ModerationConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, Error> {
        let de = &mut serde_json::Deserializer::from_str(raw);
        let config: Self = serde_path_to_error::deserialize(de).map_err(|e| {
            Error::Configuration(format!("invalid moderation config at '{}': {}", e.path(), e.inner()))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the file if one is given; `None` means defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(p) => {
                let raw = std::fs::read_to_string(p)?;
                Self::from_json_str(&raw)
            }
            None => Ok(Self::default()),
        }
    }

    /// Rejects values that would empty the history window or break the
    /// Low < Medium < High ordering of the confidence scale.
    pub fn validate(&self) -> Result<(), Error> {
        let h = &self.history;
        if h.max_count == 0 {
            return Err(Error::Configuration("history.max_count must be at least 1".to_string()));
        }
        if h.max_age_secs <= 0 || h.max_age_secs > MAX_HISTORY_AGE_SECS {
            return Err(Error::Configuration(format!(
                "history.max_age_secs must be between 1 and {MAX_HISTORY_AGE_SECS}, got {}",
                h.max_age_secs
            )));
        }

        let scale = &self.gate.confidence_scale;
        if !(scale.low < scale.medium && scale.medium < scale.high) {
            return Err(Error::Configuration(format!(
                "gate.confidence_scale must be strictly increasing, got low={} medium={} high={}",
                scale.low, scale.medium, scale.high
            )));
        }
        Ok(())
    }
}

/// History window (read time) and prune bound (storage) are independent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryConfig {
    #[serde(default = "default_max_count")]
    pub max_count: usize,
    #[serde(default = "default_max_age_secs")]
    pub max_age_secs: i64,
    #[serde(default = "default_keep_count")]
    pub keep_count: usize,
    #[serde(default = "default_prune_interval_secs")]
    pub prune_interval_secs: u64,
}

fn default_max_count() -> usize {
    10
}

fn default_max_age_secs() -> i64 {
    300
}

fn default_keep_count() -> usize {
    50
}

fn default_prune_interval_secs() -> u64 {
    600
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_count: default_max_count(),
            max_age_secs: default_max_age_secs(),
            keep_count: default_keep_count(),
            prune_interval_secs: default_prune_interval_secs(),
        }
    }
}

impl HistoryConfig {
    /// Out-of-range values (only reachable by skipping `validate`) read
    /// as an empty window.
    pub fn max_age(&self) -> TimeDelta {
        TimeDelta::try_seconds(self.max_age_secs).unwrap_or_else(TimeDelta::zero)
    }

    pub fn prune_interval(&self) -> Duration {
        Duration::from_secs(self.prune_interval_secs)
    }
}

/// Integer mapping for the three-level confidence ordinal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceScale {
    #[serde(default = "default_low")]
    pub low: u8,
    #[serde(default = "default_medium")]
    pub medium: u8,
    #[serde(default = "default_high")]
    pub high: u8,
}

fn default_low() -> u8 {
    1
}

fn default_medium() -> u8 {
    2
}

fn default_high() -> u8 {
    3
}

impl Default for ConfidenceScale {
    fn default() -> Self {
        Self {
            low: default_low(),
            medium: default_medium(),
            high: default_high(),
        }
    }
}

impl ConfidenceScale {
    pub fn map(&self, rating: Rating) -> u8 {
        match rating {
            Rating::Low => self.low,
            Rating::Medium => self.medium,
            Rating::High => self.high,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateConfig {
    #[serde(default)]
    pub confidence_scale: ConfidenceScale,
    #[serde(default = "default_min_confidence")]
    pub min_confidence: u8,
    /// Stricter per-category floors, keyed by wire name.
    #[serde(default = "default_category_min_confidence")]
    pub category_min_confidence: HashMap<Category, u8>,
}

fn default_min_confidence() -> u8 {
    2
}

fn default_category_min_confidence() -> HashMap<Category, u8> {
    HashMap::from([(Category::IrrelevantToGroup, 3)])
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            confidence_scale: ConfidenceScale::default(),
            min_confidence: default_min_confidence(),
            category_min_confidence: default_category_min_confidence(),
        }
    }
}

impl GateConfig {
    /// Floor that applies to `category`: the larger of the global floor and
    /// any per-category override.
    pub fn floor_for(&self, category: Category) -> u8 {
        self.category_min_confidence
            .get(&category)
            .copied()
            .map_or(self.min_confidence, |c| c.max(self.min_confidence))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotConfig {
    #[serde(default = "default_bot_names")]
    pub names: Vec<String>,
    #[serde(default = "default_mention_markers")]
    pub mention_markers: Vec<String>,
    #[serde(default = "default_max_tool_steps")]
    pub max_tool_steps: usize,
}

fn default_bot_names() -> Vec<String> {
    vec!["warden".to_string(), "bot".to_string(), "gatekeeper".to_string()]
}

fn default_mention_markers() -> Vec<String> {
    vec!["@warden_bot".to_string()]
}

fn default_max_tool_steps() -> usize {
    3
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            names: default_bot_names(),
            mention_markers: default_mention_markers(),
            max_tool_steps: default_max_tool_steps(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilityConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub api_base: Option<String>,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_model() -> String {
    "openai/gpt-4o-mini".to_string()
}

fn default_max_tokens() -> u32 {
    1000
}

impl Default for CapabilityConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            model: default_model(),
            api_base: None,
            max_tokens: default_max_tokens(),
        }
    }
}

impl CapabilityConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoticeConfig {
    #[serde(default = "default_notice_prefix")]
    pub prefix: String,
    /// Sent when the judge asks for a notice but gives no text.
    #[serde(default = "default_fallback_text")]
    pub fallback_text: String,
}

fn default_notice_prefix() -> String {
    "Smart moderator:".to_string()
}

fn default_fallback_text() -> String {
    "This message was removed for breaking the group rules.".to_string()
}

impl Default for NoticeConfig {
    fn default() -> Self {
        Self {
            prefix: default_notice_prefix(),
            fallback_text: default_fallback_text(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupDefaults {
    #[serde(default = "default_group_title")]
    pub group_title: String,
    #[serde(default = "default_group_rules")]
    pub group_rules: String,
}

fn default_group_title() -> String {
    "Unknown Group".to_string()
}

fn default_group_rules() -> String {
    "No specific context provided for this group.".to_string()
}

impl Default for GroupDefaults {
    fn default() -> Self {
        Self {
            group_title: default_group_title(),
            group_rules: default_group_rules(),
        }
    }
}
