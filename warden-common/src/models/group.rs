use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Read-only view of a group's moderation context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupContext {
    pub group_id: i64,
    pub title: String,
    pub rules_text: String,
}

/// Persisted group configuration, owned by the administration flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct GroupInfo {
    pub group_id: i64,
    pub title: String,
    pub description: String,
    pub rules_text: String,
    pub owner_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GroupInfo {
    pub fn new(group_id: i64, title: &str, rules_text: &str, owner_id: Option<i64>) -> Self {
        let now = Utc::now();
        Self {
            group_id,
            title: title.to_string(),
            description: String::new(),
            rules_text: rules_text.to_string(),
            owner_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Projects the stored row into the pipeline view. Blank fields fall back
    /// to the supplied defaults.
    pub fn to_context(&self, default_title: &str, default_rules: &str) -> GroupContext {
        let title = if self.title.trim().is_empty() {
            default_title.to_string()
        } else {
            self.title.clone()
        };
        let rules_text = if self.rules_text.trim().is_empty() {
            default_rules.to_string()
        } else {
            self.rules_text.clone()
        };
        GroupContext {
            group_id: self.group_id,
            title,
            rules_text,
        }
    }
}
