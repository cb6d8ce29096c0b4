pub mod classifier;
pub mod executor;
pub mod gate;
pub mod judge;
pub mod pipeline;
pub mod prompts;
pub mod repetition;
pub mod tool_router;
pub mod tools;

pub use classifier::Classifier;
pub use executor::{moderation_action, tool_reply_action, ActionExecutor};
pub use judge::Judge;
pub use pipeline::{ModerationPipeline, PipelineOutcome, PipelineState};
pub use tool_router::ToolRouter;
pub use tools::{default_tools, golang_question_tool};
