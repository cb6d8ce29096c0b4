// src/services/mod.rs

pub mod message_service;
pub mod moderation;

pub use message_service::MessageService;
pub use moderation::{ActionExecutor, ModerationPipeline, PipelineOutcome, PipelineState};
