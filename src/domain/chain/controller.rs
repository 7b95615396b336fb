//! Step chain controller - gates, assembles and runs steps

use tracing::{info, warn};

use super::{
    assemble_message, default_step_definitions, ChainError, InstructionMode, SessionInitializer,
    StepDefinition, StepError, StepIndex, StepOutput, WorkflowState, CHAIN_LENGTH,
};
use crate::domain::conversation::WorkflowSession;
use crate::domain::DomainError;

/// Configuration for the chain controller
#[derive(Debug, Clone)]
pub struct ChainControllerConfig {
    /// Default prompt and mode per step
    pub steps: [StepDefinition; CHAIN_LENGTH],
    /// Keep the existing session when step 1 is re-run instead of starting
    /// a fresh one
    pub reuse_session_on_rerun: bool,
}

impl Default for ChainControllerConfig {
    fn default() -> Self {
        Self {
            steps: default_step_definitions(),
            reuse_session_on_rerun: false,
        }
    }
}

impl ChainControllerConfig {
    /// Build from a list of definitions, which must have one entry per step
    pub fn from_definitions(
        definitions: Vec<StepDefinition>,
        reuse_session_on_rerun: bool,
    ) -> Result<Self, DomainError> {
        let count = definitions.len();
        let steps: [StepDefinition; CHAIN_LENGTH] = definitions.try_into().map_err(|_| {
            DomainError::configuration(format!(
                "Expected {} step definitions, found {}",
                CHAIN_LENGTH, count
            ))
        })?;

        Ok(Self {
            steps,
            reuse_session_on_rerun,
        })
    }
}

/// A request to run one step
#[derive(Debug, Clone, PartialEq)]
pub struct StepRequest {
    pub step: usize,
    /// Overrides the step's default prompt
    pub prompt: Option<String>,
    /// Overrides the step's default mode
    pub mode: Option<InstructionMode>,
}

impl StepRequest {
    pub fn new(step: usize) -> Self {
        Self {
            step,
            prompt: None,
            mode: None,
        }
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    pub fn with_mode(mut self, mode: InstructionMode) -> Self {
        self.mode = Some(mode);
        self
    }
}

/// Runs steps against a [`WorkflowState`].
///
/// The controller holds no workflow data itself. Every invocation takes the
/// current state by reference and returns the next state on success, so a
/// failure can never leave a half-applied update behind.
#[derive(Debug)]
pub struct ChainController {
    initializer: SessionInitializer,
    config: ChainControllerConfig,
}

impl ChainController {
    pub fn new(initializer: SessionInitializer) -> Self {
        Self::with_config(initializer, ChainControllerConfig::default())
    }

    pub fn with_config(initializer: SessionInitializer, config: ChainControllerConfig) -> Self {
        Self {
            initializer,
            config,
        }
    }

    pub fn definition(&self, step: StepIndex) -> &StepDefinition {
        &self.config.steps[step.slot()]
    }

    pub fn definitions(&self) -> &[StepDefinition] {
        &self.config.steps
    }

    /// Run a single step (manual mode)
    pub async fn run_step(
        &self,
        state: &WorkflowState,
        request: StepRequest,
    ) -> Result<WorkflowState, StepError> {
        let step = StepIndex::new(request.step)?;
        let definition = self.definition(step);
        let prompt = request.prompt.unwrap_or_else(|| definition.prompt.clone());
        let mode = request.mode.unwrap_or(definition.mode);

        if let Some(previous) = step.previous() {
            if !state.is_complete(previous) {
                return Err(StepError::prerequisite_missing(step.get(), previous.get()));
            }
        }

        let session = self.acquire_session(state, step).await?;
        let message = assemble_message(&state.prior_results(step), &prompt, mode);

        info!(
            step = step.get(),
            mode = %mode,
            conversation = %session.handle(),
            message_len = message.len(),
            "Running step"
        );

        let text = session.send(&message).await.map_err(|e| {
            warn!(step = step.get(), error = %e, "Step failed");
            StepError::service(step.get(), e.to_string())
        })?;

        info!(step = step.get(), result_len = text.len(), "Step completed");

        Ok(state.commit(step, StepOutput::new(prompt, mode, text), session))
    }

    /// Run every step in order with default prompts (automatic mode)
    pub async fn run_chain(&self, state: &WorkflowState) -> Result<WorkflowState, ChainError> {
        let mut current = state.clone();

        for step in StepIndex::all() {
            match self.run_step(&current, StepRequest::new(step.get())).await {
                Ok(next) => current = next,
                Err(source) => {
                    return Err(ChainError {
                        step: step.get(),
                        source,
                        state: Box::new(current),
                    });
                }
            }
        }

        Ok(current)
    }

    async fn acquire_session(
        &self,
        state: &WorkflowState,
        step: StepIndex,
    ) -> Result<WorkflowSession, StepError> {
        if !step.is_first() {
            return state.session().cloned().ok_or_else(|| {
                StepError::session_unavailable("no active session; run step 1 first")
            });
        }

        if let Some(session) = state.session() {
            if self.config.reuse_session_on_rerun {
                return Ok(session.clone());
            }
        }

        let credentials = state
            .credentials()
            .ok_or_else(|| StepError::session_unavailable("no API key supplied"))?;
        let document = state
            .document()
            .ok_or_else(|| StepError::session_unavailable("no document uploaded"))?;

        Ok(self.initializer.initialize(credentials, document).await?)
    }
}
