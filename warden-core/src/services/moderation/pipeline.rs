// File: warden-core/src/services/moderation/pipeline.rs

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;
use warden_ai::{AiClient, FunctionRegistry};
use warden_common::models::{
    ClassificationResult, Decision, GroupContext, HistoryRecord, Message, OutboundAction, SuspiciousMessage,
};
use warden_common::traits::repository_traits::{HistoryRepository, SuspiciousMessageRepository};

use crate::config::ModerationConfig;
use crate::Error;
use super::classifier::Classifier;
use super::executor::{moderation_action, tool_reply_action, ActionExecutor};
use super::gate;
use super::judge::Judge;
use super::tool_router::ToolRouter;

/// Per-message lifecycle. Classification and routing run as parallel
/// branches after the history read; the main track follows classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineState {
    Received,
    HistoryLoaded,
    Classifying,
    Routing,
    Classified,
    Judging,
    Decided,
    Executing,
    Done,
    Failed,
}

impl PipelineState {
    /// Every legal transition out of `self`.
    pub fn successors(self) -> &'static [PipelineState] {
        use PipelineState::*;
        match self {
            Received => &[HistoryLoaded],
            HistoryLoaded => &[Classifying, Routing],
            Classifying => &[Classified, Failed],
            Routing => &[Done],
            Classified => &[Judging, Decided],
            Judging => &[Decided, Failed],
            Decided => &[Executing, Done],
            Executing => &[Done, Failed],
            Done | Failed => &[],
        }
    }

    pub fn can_transition_to(self, next: PipelineState) -> bool {
        self.successors().contains(&next)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Failed)
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PipelineState::Received => "RECEIVED",
            PipelineState::HistoryLoaded => "HISTORY_LOADED",
            PipelineState::Classifying => "CLASSIFYING",
            PipelineState::Routing => "ROUTING",
            PipelineState::Classified => "CLASSIFIED",
            PipelineState::Judging => "JUDGING",
            PipelineState::Decided => "DECIDED",
            PipelineState::Executing => "EXECUTING",
            PipelineState::Done => "DONE",
            PipelineState::Failed => "FAILED",
        };
        f.write_str(s)
    }
}

/// Records the main track and refuses illegal moves.
#[derive(Debug)]
struct StateTracker {
    execution_id: Uuid,
    trace: Vec<PipelineState>,
}

impl StateTracker {
    fn new(execution_id: Uuid) -> Self {
        Self {
            execution_id,
            trace: vec![PipelineState::Received],
        }
    }

    fn current(&self) -> PipelineState {
        self.trace.last().copied().unwrap_or(PipelineState::Received)
    }

    fn advance(&mut self, next: PipelineState) {
        let from = self.current();
        if from.can_transition_to(next) {
            debug!(execution_id = %self.execution_id, "{} -> {}", from, next);
            self.trace.push(next);
        } else {
            error!(execution_id = %self.execution_id, "Illegal pipeline transition {} -> {}", from, next);
        }
    }
}

/// Result of one pass through the pipeline.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub execution_id: Uuid,
    /// Terminal state of the main track.
    pub state: PipelineState,
    /// Every state the main track went through, in order.
    pub transitions: Vec<PipelineState>,
    /// `None` when classification or judgment failed.
    pub decision: Option<Decision>,
    pub tool_reply: Option<String>,
    /// Outbound actions that were handed to the executor.
    pub actions: Vec<OutboundAction>,
    pub history_recorded: bool,
    pub error: Option<String>,
}

/// Orchestrates history, classifier, judge and tool router for each message.
pub struct ModerationPipeline {
    history: Arc<dyn HistoryRepository>,
    flags: Arc<dyn SuspiciousMessageRepository>,
    classifier: Classifier,
    judge: Judge,
    router: ToolRouter,
    executor: Arc<dyn ActionExecutor>,
    config: ModerationConfig,
}

impl ModerationPipeline {
    pub fn new(
        ai: AiClient,
        tools: FunctionRegistry,
        history: Arc<dyn HistoryRepository>,
        flags: Arc<dyn SuspiciousMessageRepository>,
        executor: Arc<dyn ActionExecutor>,
        config: ModerationConfig,
    ) -> Self {
        Self {
            history,
            flags,
            classifier: Classifier::new(ai.clone()),
            judge: Judge::new(ai.clone()),
            router: ToolRouter::new(ai, tools, config.bot.clone()),
            executor,
            config,
        }
    }

    pub fn config(&self) -> &ModerationConfig {
        &self.config
    }

    /// Runs one message to a terminal state. Never returns an error: every
    /// failure is logged and reflected in the outcome.
    pub async fn process(&self, message: &Message, group: &GroupContext) -> PipelineOutcome {
        let execution_id = Uuid::new_v4();
        let mut tracker = StateTracker::new(execution_id);
        info!(
            %execution_id,
            user_id = message.user_id,
            group_id = message.group_id,
            "Moderating message"
        );

        let now = Utc::now();
        let history = self.load_history(message, now).await;
        tracker.advance(PipelineState::HistoryLoaded);
        tracker.advance(PipelineState::Classifying);

        let (decision, tool_reply, history_recorded) = tokio::join!(
            self.classify_and_judge(message, group, &history, now, &mut tracker),
            self.route(message, execution_id),
            self.record(message),
        );

        let mut actions = Vec::new();
        let mut failure = None;

        let decision = match decision {
            Ok(d) => {
                if let Some(reason) = &d.suppressed {
                    info!(%execution_id, category = %d.classification.category, "Enforcement suppressed: {}", reason);
                }
                Some(d)
            }
            Err(e) => {
                error!(
                    %execution_id,
                    user_id = message.user_id,
                    group_id = message.group_id,
                    message_id = ?message.message_id,
                    "No moderation decision: {}", e
                );
                failure = Some(e.to_string());
                None
            }
        };

        if let Some(d) = &decision {
            match moderation_action(message, d, &self.config.notice) {
                Some(action) => {
                    tracker.advance(PipelineState::Executing);
                    match self.executor.execute(&action).await {
                        Ok(()) => {
                            actions.push(action);
                            tracker.advance(PipelineState::Done);
                        }
                        Err(e) => {
                            error!(%execution_id, "Executor failed to apply moderation action: {:?}", e);
                            failure = Some(e.to_string());
                            tracker.advance(PipelineState::Failed);
                        }
                    }
                }
                None => tracker.advance(PipelineState::Done),
            }
        }

        // tool replies bypass the gate and go out even when moderation failed
        if let Some(reply) = &tool_reply {
            let action = tool_reply_action(message, reply);
            match self.executor.execute(&action).await {
                Ok(()) => actions.push(action),
                Err(e) => warn!(%execution_id, "Executor failed to send tool reply: {:?}", e),
            }
        }

        let state = tracker.current();
        debug!(%execution_id, %state, "Pipeline finished");
        PipelineOutcome {
            execution_id,
            state,
            transitions: tracker.trace,
            decision,
            tool_reply,
            actions,
            history_recorded,
            error: failure,
        }
    }

    /// A failed read degrades to an empty window.
    async fn load_history(&self, message: &Message, now: chrono::DateTime<Utc>) -> Vec<HistoryRecord> {
        let h = &self.config.history;
        match self
            .history
            .recent_window(message.user_id, message.group_id, h.max_count, h.max_age(), now)
            .await
        {
            Ok(records) => records,
            Err(e) => {
                warn!(
                    user_id = message.user_id,
                    group_id = message.group_id,
                    "History unavailable, classifying without it: {}", e
                );
                Vec::new()
            }
        }
    }

    async fn classify_and_judge(
        &self,
        message: &Message,
        group: &GroupContext,
        history: &[HistoryRecord],
        now: chrono::DateTime<Utc>,
        tracker: &mut StateTracker,
    ) -> Result<Decision, Error> {
        let classification = match self.classifier.classify(message, group, history, now).await {
            Ok(c) => c,
            Err(e) => {
                tracker.advance(PipelineState::Failed);
                return Err(e);
            }
        };
        tracker.advance(PipelineState::Classified);
        debug!(
            user_id = message.user_id,
            category = %classification.category,
            confidence = %classification.confidence,
            "Message classified"
        );

        if classification.is_clean() {
            tracker.advance(PipelineState::Decided);
            return Ok(gate::decide(classification, None, &self.config.gate));
        }

        tracker.advance(PipelineState::Judging);
        let (_, judged) = tokio::join!(
            self.flag(message, &classification),
            self.judge.judge(&message.text, &message.sender_name, group, &classification),
        );
        let judgment = match judged {
            Ok(j) => j,
            Err(e) => {
                tracker.advance(PipelineState::Failed);
                return Err(e);
            }
        };

        tracker.advance(PipelineState::Decided);
        Ok(gate::decide(classification, Some(judgment), &self.config.gate))
    }

    async fn route(&self, message: &Message, execution_id: Uuid) -> Option<String> {
        debug!(%execution_id, "{} -> {}", PipelineState::HistoryLoaded, PipelineState::Routing);
        let reply = self.router.maybe_handle_direct_request(&message.text).await;
        debug!(%execution_id, replied = reply.is_some(), "{} -> {}", PipelineState::Routing, PipelineState::Done);
        reply
    }

    /// Append with a single retry, then best-effort prune of the pair.
    async fn record(&self, message: &Message) -> bool {
        let record = HistoryRecord::from_message(message);
        for attempt in 1..=2 {
            match self.history.append(&record).await {
                Ok(stored) => {
                    debug!(record_id = stored.record_id, "Message recorded in history");
                    if let Err(e) = self
                        .history
                        .prune(message.user_id, message.group_id, self.config.history.keep_count)
                        .await
                    {
                        debug!("History prune after append failed: {}", e);
                    }
                    return true;
                }
                Err(e) if attempt == 1 => {
                    warn!(user_id = message.user_id, group_id = message.group_id, "History append failed, retrying: {}", e);
                }
                Err(e) => {
                    error!(
                        user_id = message.user_id,
                        group_id = message.group_id,
                        message_id = ?message.message_id,
                        "History append failed twice, message not recorded: {}", e
                    );
                }
            }
        }
        false
    }

    async fn flag(&self, message: &Message, classification: &ClassificationResult) {
        let entry = SuspiciousMessage::new(message, classification);
        if let Err(e) = self.flags.record(&entry).await {
            warn!(user_id = message.user_id, "Failed to log suspicious message: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use PipelineState::*;

    #[test]
    fn terminal_states_have_no_successors() {
        assert!(Done.successors().is_empty());
        assert!(Failed.successors().is_empty());
        assert!(Done.is_terminal() && Failed.is_terminal());
    }

    #[test]
    fn judging_is_only_reachable_after_classification() {
        assert!(Classified.can_transition_to(Judging));
        assert!(!Classifying.can_transition_to(Judging));
        assert!(!HistoryLoaded.can_transition_to(Decided));
    }

    #[test]
    fn tracker_ignores_illegal_moves() {
        let mut t = StateTracker::new(Uuid::new_v4());
        t.advance(Done);
        assert_eq!(t.current(), Received);
        t.advance(HistoryLoaded);
        assert_eq!(t.trace, vec![Received, HistoryLoaded]);
    }
}
