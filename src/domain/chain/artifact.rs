//! Downloadable artifact built from the final step result

use serde::{Deserialize, Serialize};

use super::WorkflowState;

/// Format of the downloadable artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactFormat {
    #[default]
    Json,
    Text,
}

impl ArtifactFormat {
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Json => "chain_output.json",
            Self::Text => "chain_output.txt",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Text => "text/plain; charset=utf-8",
        }
    }
}

/// Final chain output packaged for download
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Artifact {
    pub file_name: String,
    pub mime_type: String,
    pub content: String,
}

impl Artifact {
    /// Package the last step's result, or None while the chain is incomplete.
    ///
    /// JSON artifacts have a surrounding markdown code fence removed, since
    /// models commonly wrap JSON replies in one.
    pub fn from_state(state: &WorkflowState, format: ArtifactFormat) -> Option<Self> {
        let result = state.final_result()?;

        let content = match format {
            ArtifactFormat::Json => strip_code_fence(result).to_string(),
            ArtifactFormat::Text => result.to_string(),
        };

        Some(Self {
            file_name: format.file_name().to_string(),
            mime_type: format.mime_type().to_string(),
            content,
        })
    }
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();

    let Some(rest) = trimmed.strip_prefix("```") else {
        return text;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return text;
    };

    // Drop the info string ("json") on the opening fence line
    match body.split_once('\n') {
        Some((_, inner)) => inner.trim(),
        None => body.trim(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::chain::{InstructionMode, StepIndex, StepOutput};
    use crate::domain::conversation::mock::MockConversationService;
    use crate::domain::conversation::{DocumentRef, SessionHandle, WorkflowSession};

    fn completed(final_text: &str) -> WorkflowState {
        let session = WorkflowSession::new(
            SessionHandle::new("conv-1"),
            DocumentRef::new("files/1", "mock://files/1", "application/pdf"),
            Arc::new(MockConversationService::new()),
        );

        StepIndex::all().fold(WorkflowState::new(), |state, step| {
            let text = if step.is_last() { final_text } else { "intermediate" };
            state.commit(
                step,
                StepOutput::new("p", InstructionMode::Continuation, text),
                session.clone(),
            )
        })
    }

    #[test]
    fn test_incomplete_chain_has_no_artifact() {
        assert!(Artifact::from_state(&WorkflowState::new(), ArtifactFormat::Json).is_none());
    }

    #[test]
    fn test_json_artifact_strips_fence() {
        let state = completed("```json\n{\"risks\": []}\n```");
        let artifact = Artifact::from_state(&state, ArtifactFormat::Json).unwrap();

        assert_eq!(artifact.file_name, "chain_output.json");
        assert_eq!(artifact.mime_type, "application/json");
        assert_eq!(artifact.content, "{\"risks\": []}");
    }

    #[test]
    fn test_text_artifact_is_verbatim() {
        let state = completed("```json\n{}\n```");
        let artifact = Artifact::from_state(&state, ArtifactFormat::Text).unwrap();

        assert_eq!(artifact.file_name, "chain_output.txt");
        assert_eq!(artifact.content, "```json\n{}\n```");
    }

    #[test]
    fn test_strip_code_fence_passthrough() {
        assert_eq!(strip_code_fence("{\"a\": 1}"), "{\"a\": 1}");
        assert_eq!(strip_code_fence("```unterminated"), "```unterminated");
    }
}
