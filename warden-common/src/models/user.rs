use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{ClassificationResult, Message};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub user_id: i64,
    pub first_name: String,
    pub social_credit: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A message the classifier did not consider clean.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SuspiciousMessage {
    pub suspicious_id: Uuid,
    pub user_id: i64,
    pub group_id: i64,
    pub text: String,
    pub category: String,
    pub confidence: String,
    pub severity: String,
    pub reasoning: Option<String>,
    pub flagged_at: DateTime<Utc>,
}

impl SuspiciousMessage {
    pub fn new(message: &Message, classification: &ClassificationResult) -> Self {
        Self {
            suspicious_id: Uuid::new_v4(),
            user_id: message.user_id,
            group_id: message.group_id,
            text: message.text.clone(),
            category: classification.category.as_str().to_string(),
            confidence: classification.confidence.as_str().to_string(),
            severity: classification.severity.as_str().to_string(),
            reasoning: classification.reasoning.clone(),
            flagged_at: Utc::now(),
        }
    }
}
