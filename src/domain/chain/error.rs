//! Chain error types

use thiserror::Error;

use super::WorkflowState;
use crate::domain::DomainError;

/// Failure to establish a document-seeded session
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConnectionError {
    #[error("Connection error: {0}")]
    Service(String),

    #[error("Document '{document}' was rejected: {reason}")]
    DocumentRejected { document: String, reason: String },

    #[error("Timed out after {waited_ms}ms waiting for document '{document}' to become ready")]
    TimedOut { document: String, waited_ms: u64 },
}

impl ConnectionError {
    pub fn service(message: impl Into<String>) -> Self {
        Self::Service(message.into())
    }

    pub fn document_rejected(document: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DocumentRejected {
            document: document.into(),
            reason: reason.into(),
        }
    }

    pub fn timed_out(document: impl Into<String>, waited_ms: u64) -> Self {
        Self::TimedOut {
            document: document.into(),
            waited_ms,
        }
    }
}

impl From<DomainError> for ConnectionError {
    fn from(err: DomainError) -> Self {
        Self::Service(err.to_string())
    }
}

/// Errors raised by a single step invocation
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StepError {
    #[error("Step {step} does not exist (valid steps are 1..={max})")]
    InvalidStep { step: usize, max: usize },

    #[error("Cannot run step {step}: step {missing} has no result yet")]
    PrerequisiteMissing { step: usize, missing: usize },

    #[error("Session unavailable: {0}")]
    SessionUnavailable(String),

    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error("Step {step} failed: {message}")]
    Service { step: usize, message: String },
}

impl StepError {
    pub fn prerequisite_missing(step: usize, missing: usize) -> Self {
        Self::PrerequisiteMissing { step, missing }
    }

    pub fn session_unavailable(message: impl Into<String>) -> Self {
        Self::SessionUnavailable(message.into())
    }

    pub fn service(step: usize, message: impl Into<String>) -> Self {
        Self::Service {
            step,
            message: message.into(),
        }
    }
}

/// An automatic run that stopped before the last step
#[derive(Debug, Error)]
#[error("Automatic chain stopped at step {step}: {source}")]
pub struct ChainError {
    pub step: usize,
    pub source: StepError,
    /// State reached by the steps that did complete
    pub state: Box<WorkflowState>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StepError::prerequisite_missing(3, 2);
        assert_eq!(err.to_string(), "Cannot run step 3: step 2 has no result yet");

        let err = StepError::session_unavailable("no API key supplied");
        assert_eq!(err.to_string(), "Session unavailable: no API key supplied");

        let err = ConnectionError::timed_out("files/abc", 5000);
        assert_eq!(
            err.to_string(),
            "Timed out after 5000ms waiting for document 'files/abc' to become ready"
        );
    }

    #[test]
    fn test_connection_error_is_transparent() {
        let err: StepError = ConnectionError::service("HTTP 403: forbidden").into();
        assert_eq!(err.to_string(), "Connection error: HTTP 403: forbidden");
    }

    #[test]
    fn test_domain_error_conversion() {
        let err: ConnectionError = DomainError::provider("gemini", "bad key").into();
        assert_eq!(
            err,
            ConnectionError::Service("Provider error: gemini - bad key".to_string())
        );
    }

    #[test]
    fn test_chain_error_display() {
        let err = ChainError {
            step: 2,
            source: StepError::service(2, "quota exceeded"),
            state: Box::default(),
        };
        assert_eq!(
            err.to_string(),
            "Automatic chain stopped at step 2: Step 2 failed: quota exceeded"
        );
    }
}
