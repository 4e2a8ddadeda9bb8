//! Orchestrate use case
//!
//! Processes one incoming message per turn:
//!
//! 1. Route the message to an agent (or take the explicit override)
//! 2. Build the typed task from history and session context
//! 3. Open a step and persist
//! 4. `agent.handle()`
//! 5. Run auxiliary jobs for a successful response
//! 6. Close the step, append the answer to history and persist
//! 7. Compute the continuation agent for the following turn
//!
//! A turn is strictly sequential. Only persistence failures abort it.

pub mod auxiliary;
pub mod context_builder;
pub mod continuation;
pub mod routing;
mod types;

pub use types::{OrchestratorError, TurnInput, TurnOutcome};

use crate::agents::AgentRoster;
use crate::config::OrchestratorConfig;
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger,
};
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::ports::session_store::SessionStore;
use auxiliary::{AuxiliaryReport, plan_auxiliary, run_auxiliary};
use context_builder::build_task;
use continuation::determine_continuation_agent;
use forge_domain::{
    ConversationMessage, ResponseStatus, SessionRecord, StepStatus, StepUpdate,
};
use routing::route_user_message;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Use case driving the agent pipeline for one session at a time
pub struct OrchestrateUseCase {
    roster: AgentRoster,
    store: Arc<dyn SessionStore>,
    logger: Arc<dyn ConversationLogger>,
    config: OrchestratorConfig,
}

impl OrchestrateUseCase {
    pub fn new(roster: AgentRoster, store: Arc<dyn SessionStore>) -> Self {
        Self {
            roster,
            store,
            logger: Arc::new(NoConversationLogger),
            config: OrchestratorConfig::default(),
        }
    }

    pub fn with_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Load a persisted session
    pub async fn load_session(&self, id: &str) -> Result<Option<SessionRecord>, OrchestratorError> {
        Ok(self.store.load(id).await?)
    }

    pub async fn process_turn(&self, input: TurnInput) -> Result<TurnOutcome, OrchestratorError> {
        self.process_turn_with_progress(input, &NoProgress).await
    }

    /// Process one turn, reporting step transitions to `progress`.
    pub async fn process_turn_with_progress(
        &self,
        input: TurnInput,
        progress: &dyn ProgressNotifier,
    ) -> Result<TurnOutcome, OrchestratorError> {
        let mut record = self.open_session(input.session_id.as_deref()).await?;
        match input.message {
            Some(message) => record.push_message(ConversationMessage::user(message)),
            None if record.messages.is_empty() => {
                return Err(OrchestratorError::NothingToProcess(record.id));
            }
            None => {}
        }

        let target = input
            .agent
            .unwrap_or_else(|| route_user_message(&record.state, &record.messages));
        let agent = self
            .roster
            .get(target)
            .cloned()
            .ok_or(OrchestratorError::AgentUnavailable(target))?;
        let mut task = build_task(
            target,
            &record.state,
            &record.messages,
            self.config.history_window,
        )?;
        let task_type = task.task_type;

        // Open the step
        let input_summary = task.input.summary();
        if let Err(e) = record.state.update_step(
            StepUpdate::new(target).with_input_summary(&input_summary),
            StepStatus::InProgress,
            None,
        ) {
            warn!(error = %e, "Step transition rejected");
        }
        let sequence = record.state.last_step().map_or(0, |step| step.sequence);
        record.touch();
        self.store.save(&record).await?;

        info!(session = %record.id, agent = %target, sequence, task = %task.id, "Step started");
        self.logger.log(ConversationEvent::step_started(
            &record.id,
            sequence,
            target,
            &input_summary,
        ));
        progress.on_step_start(target, sequence);

        task.mark_in_progress();
        let response = agent.handle(&task).await;
        if response.status == ResponseStatus::Error {
            task.mark_failed();
        } else {
            task.mark_completed();
        }
        debug!(task = %task.id, status = response.status.as_str(), "Agent answered");

        // Auxiliary jobs see the context from before this step's output.
        let aux = if self.config.auxiliary_tasks {
            let queue = plan_auxiliary(target, &response, &record.state.context);
            run_auxiliary(queue, &self.roster, progress).await
        } else {
            AuxiliaryReport::default()
        };

        if let Some(data) = response
            .data
            .as_ref()
            .filter(|_| response.status != ResponseStatus::Error)
        {
            record.state.context.record_output(data, task_type);
        }
        for (kind, output) in &aux.outputs {
            record.state.context.record_output(output, None);
            self.logger.log(ConversationEvent::auxiliary_task(
                &record.id,
                kind.as_str(),
                true,
                &output.summary(),
            ));
        }
        if let Some(failure) = &aux.failure {
            self.logger.log(ConversationEvent::auxiliary_task(
                &record.id,
                failure.kind.as_str(),
                false,
                &failure.reason,
            ));
        }

        // Close the step. An auxiliary failure fails an otherwise successful step.
        let (status, error) = if response.status == ResponseStatus::Error {
            (StepStatus::Error, Some(response.message.clone()))
        } else if let Some(failure) = &aux.failure {
            (StepStatus::Error, Some(failure.to_string()))
        } else {
            (StepStatus::Completed, None)
        };
        let output_summary = response
            .data
            .as_ref()
            .map(|data| data.summary())
            .unwrap_or_else(|| response.message.clone());
        let step_status = match record.state.update_step(
            StepUpdate::new(target).with_output_summary(&output_summary),
            status,
            error.clone(),
        ) {
            Ok(step) => step.status,
            Err(e) => {
                warn!(error = %e, "Step transition rejected");
                status
            }
        };

        record.push_message(ConversationMessage::from_agent(
            target,
            response.message.clone(),
            response.data.clone(),
        ));

        let continuation = if step_status == StepStatus::Completed && response.is_success() {
            determine_continuation_agent(target, response.data.as_ref(), task_type)
        } else {
            None
        };

        self.store.save(&record).await?;

        info!(
            session = %record.id,
            agent = %target,
            sequence,
            status = %step_status,
            next = ?continuation,
            "Step finished"
        );
        self.logger.log(ConversationEvent::step_finished(
            &record.id,
            sequence,
            target,
            step_status,
            error.as_deref().unwrap_or(&output_summary),
        ));
        self.logger.log(ConversationEvent::continuation(
            &record.id,
            target,
            continuation,
        ));
        progress.on_step_complete(target, step_status, &output_summary);
        progress.on_continuation(target, continuation);

        Ok(TurnOutcome {
            session_id: record.id.clone(),
            agent: target,
            sequence,
            step_status,
            error,
            response,
            auxiliary: aux.outputs.into_iter().map(|(_, output)| output).collect(),
            continuation,
            session_status: record.status(),
        })
    }

    /// Process `input`, then follow continuations until the chain stops
    /// or `max_auto_steps` turns have run.
    pub async fn run_chain(
        &self,
        input: TurnInput,
        progress: &dyn ProgressNotifier,
    ) -> Result<Vec<TurnOutcome>, OrchestratorError> {
        let mut outcomes: Vec<TurnOutcome> = Vec::new();
        let mut next_input = Some(input);

        while let Some(turn) = next_input.take() {
            let outcome = self.process_turn_with_progress(turn, progress).await?;
            if let Some(next) = outcome.continuation {
                if outcomes.len() + 1 < self.config.max_auto_steps {
                    next_input = Some(TurnInput::continuation(&outcome.session_id, next));
                } else {
                    info!(
                        limit = self.config.max_auto_steps,
                        next = %next,
                        "Auto-continue limit reached"
                    );
                }
            }
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    async fn open_session(&self, id: Option<&str>) -> Result<SessionRecord, OrchestratorError> {
        let Some(id) = id else {
            return Ok(SessionRecord::create());
        };
        match self.store.load(id).await? {
            Some(mut record) => {
                close_interrupted_step(&mut record);
                Ok(record)
            }
            None => {
                info!(session = id, "Session not found, starting a new one");
                Ok(SessionRecord::new(id))
            }
        }
    }
}

/// A step still open on load belongs to a run that died mid-turn; close it
/// so that only one step is ever in progress.
fn close_interrupted_step(record: &mut SessionRecord) {
    let Some((sequence, agent)) = record
        .state
        .in_progress_step()
        .map(|step| (step.sequence, step.agent_type))
    else {
        return;
    };
    warn!(session = %record.id, sequence, agent = %agent, "Closing step left open by an interrupted run");
    if let Err(e) = record.state.update_step(
        StepUpdate::new(agent),
        StepStatus::Error,
        Some("interrupted before completion".to_string()),
    ) {
        warn!(error = %e, "Step transition rejected");
    }
}
