//! Workflow state - session and result slots kept between step invocations

use chrono::{DateTime, Utc};

use super::{InstructionMode, StepIndex, CHAIN_LENGTH};
use crate::domain::conversation::{Credentials, Document, WorkflowSession};

/// Result of a completed step
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutput {
    /// Prompt the step was run with
    pub prompt: String,
    pub mode: InstructionMode,
    pub text: String,
    pub completed_at: DateTime<Utc>,
}

impl StepOutput {
    pub fn new(prompt: impl Into<String>, mode: InstructionMode, text: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            mode,
            text: text.into(),
            completed_at: Utc::now(),
        }
    }
}

/// Explicit workflow state.
///
/// Owned by the caller and passed to the controller on every invocation. A
/// step result at index i exists only when index i-1 has one; `commit` keeps
/// that true by clearing every later slot.
#[derive(Debug, Clone, Default)]
pub struct WorkflowState {
    credentials: Option<Credentials>,
    document: Option<Document>,
    session: Option<WorkflowSession>,
    slots: [Option<StepOutput>; CHAIN_LENGTH],
}

impl WorkflowState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the API key; a different key discards the session and all results
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        let changed = self
            .credentials
            .as_ref()
            .is_none_or(|current| current.api_key() != credentials.api_key());

        if changed {
            self.session = None;
            self.slots = Default::default();
        }

        self.credentials = Some(credentials);
        self
    }

    /// Replace the document; the old session and all results are discarded
    pub fn with_document(mut self, document: Document) -> Self {
        self.document = Some(document);
        self.session = None;
        self.slots = Default::default();
        self
    }

    /// Discard the session and every result, keeping credentials and document
    pub fn reset(&self) -> Self {
        Self {
            credentials: self.credentials.clone(),
            document: self.document.clone(),
            session: None,
            slots: Default::default(),
        }
    }

    /// Store a step result and clear every downstream slot
    pub(crate) fn commit(
        &self,
        step: StepIndex,
        output: StepOutput,
        session: WorkflowSession,
    ) -> Self {
        let mut next = self.clone();
        next.session = Some(session);
        next.slots[step.slot()] = Some(output);

        for slot in next.slots.iter_mut().skip(step.get()) {
            *slot = None;
        }

        next
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    pub fn session(&self) -> Option<&WorkflowSession> {
        self.session.as_ref()
    }

    pub fn output(&self, step: StepIndex) -> Option<&StepOutput> {
        self.slots[step.slot()].as_ref()
    }

    pub fn result(&self, step: StepIndex) -> Option<&str> {
        self.output(step).map(|o| o.text.as_str())
    }

    pub fn is_complete(&self, step: StepIndex) -> bool {
        self.output(step).is_some()
    }

    /// Results of every step before `step`, in chain order
    pub fn prior_results(&self, step: StepIndex) -> Vec<&str> {
        self.slots[..step.slot()]
            .iter()
            .filter_map(|slot| slot.as_ref().map(|o| o.text.as_str()))
            .collect()
    }

    /// Number of leading steps with a result
    pub fn completed_steps(&self) -> usize {
        self.slots.iter().take_while(|slot| slot.is_some()).count()
    }

    /// Result of the last step, if the chain is complete
    pub fn final_result(&self) -> Option<&str> {
        self.result(StepIndex::LAST)
    }

    /// Whether every present result is preceded by a present result
    pub fn is_consistent(&self) -> bool {
        self.slots
            .windows(2)
            .all(|pair| pair[1].is_none() || pair[0].is_some())
    }
}
