// File: warden-common/src/models/mod.rs
pub mod message;
pub mod moderation;
pub mod group;
pub mod user;
pub mod transport;

pub use message::{window_cutoff, HistoryKey, HistoryRecord, Message};
pub use moderation::{
    AccountAction, Category, ClassificationResult, Decision, JudgmentResult, MessageAction, Rating,
    RepetitionSignal,
};
pub use group::{GroupContext, GroupInfo};
pub use user::{SuspiciousMessage, User};
pub use transport::{InboundEvent, OutboundAction, ReplyContext};
