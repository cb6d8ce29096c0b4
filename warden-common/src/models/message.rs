use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Identifies one history window: a single sender inside a single group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HistoryKey {
    pub user_id: i64,
    pub group_id: i64,
}

impl HistoryKey {
    pub fn new(user_id: i64, group_id: i64) -> Self {
        Self { user_id, group_id }
    }
}

/// Oldest message time still inside a window of `max_age` ending at `now`.
///
/// Saturates instead of overflowing: an age reaching past the representable
/// range yields the Unix epoch, a negative one reaching past it yields the
/// latest representable instant (an empty window).
pub fn window_cutoff(now: DateTime<Utc>, max_age: TimeDelta) -> DateTime<Utc> {
    now.checked_sub_signed(max_age).unwrap_or(if max_age > TimeDelta::zero() {
        DateTime::<Utc>::UNIX_EPOCH
    } else {
        DateTime::<Utc>::MAX_UTC
    })
}

/// A single group chat message as handed over by the transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub message_id: Option<i64>,
    pub user_id: i64,
    pub group_id: i64,
    pub sender_name: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub reply_to_id: Option<i64>,
    pub reply_to_text: Option<String>,
}

impl Message {
    pub fn key(&self) -> HistoryKey {
        HistoryKey::new(self.user_id, self.group_id)
    }
}

/// Persisted projection of a [`Message`]. `record_id` is assigned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct HistoryRecord {
    pub record_id: i64,
    pub user_id: i64,
    pub group_id: i64,
    pub message_id: Option<i64>,
    pub sender_name: String,
    pub text: String,
    pub message_created_at: DateTime<Utc>,
    pub reply_to_id: Option<i64>,
    pub reply_to_text: Option<String>,
    pub inserted_at: DateTime<Utc>,
}

impl HistoryRecord {
    pub fn from_message(msg: &Message) -> Self {
        Self {
            record_id: 0,
            user_id: msg.user_id,
            group_id: msg.group_id,
            message_id: msg.message_id,
            sender_name: msg.sender_name.clone(),
            text: msg.text.clone(),
            message_created_at: msg.created_at,
            reply_to_id: msg.reply_to_id,
            reply_to_text: msg.reply_to_text.clone(),
            inserted_at: Utc::now(),
        }
    }

    pub fn key(&self) -> HistoryKey {
        HistoryKey::new(self.user_id, self.group_id)
    }
}
