//! Chain request and response types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    ArtifactFormat, Document, InstructionMode, StepDefinition, StepIndex, StepRequest,
    WorkflowSession, WorkflowState,
};

/// Body of `PUT /v1/chain/credentials`
#[derive(Debug, Clone, Deserialize)]
pub struct CredentialsRequest {
    pub api_key: String,
}

/// Body of `POST /v1/chain/steps/{step}`; omitted fields use the step defaults
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StepRequestBody {
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub mode: Option<InstructionMode>,
}

impl StepRequestBody {
    pub fn into_request(self, step: usize) -> StepRequest {
        let mut request = StepRequest::new(step);
        if let Some(prompt) = self.prompt {
            request = request.with_prompt(prompt);
        }
        if let Some(mode) = self.mode {
            request = request.with_mode(mode);
        }
        request
    }
}

/// Query of `GET /v1/chain/artifact`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArtifactQuery {
    #[serde(default)]
    pub format: ArtifactFormat,
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentSummary {
    pub display_name: String,
    pub mime_type: String,
    pub size_bytes: usize,
}

impl From<&Document> for DocumentSummary {
    fn from(document: &Document) -> Self {
        Self {
            display_name: document.display_name().to_string(),
            mime_type: document.mime_type().to_string(),
            size_bytes: document.size_bytes(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub conversation: String,
    pub document: String,
    pub provider: String,
    pub created_at: DateTime<Utc>,
}

impl From<&WorkflowSession> for SessionSummary {
    fn from(session: &WorkflowSession) -> Self {
        Self {
            conversation: session.handle().to_string(),
            document: session.document().name.clone(),
            provider: session.provider_name().to_string(),
            created_at: session.created_at(),
        }
    }
}

/// One step as shown to a client
#[derive(Debug, Clone, Serialize)]
pub struct StepView {
    pub step: usize,
    pub title: String,
    pub default_prompt: String,
    pub default_mode: InstructionMode,
    /// Whether the step's prerequisite is met
    pub runnable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<InstructionMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

/// Body of `GET /v1/chain` and of every state-changing endpoint
#[derive(Debug, Clone, Serialize)]
pub struct ChainStateResponse {
    pub has_credentials: bool,
    pub document: Option<DocumentSummary>,
    pub session: Option<SessionSummary>,
    pub completed_steps: usize,
    pub artifact_ready: bool,
    pub steps: Vec<StepView>,
}

impl ChainStateResponse {
    pub fn from_state(state: &WorkflowState, definitions: &[StepDefinition]) -> Self {
        let steps = StepIndex::all()
            .zip(definitions)
            .map(|(step, definition)| {
                let output = state.output(step);
                let runnable = step.previous().is_none_or(|prev| state.is_complete(prev));

                StepView {
                    step: step.get(),
                    title: definition.title.clone(),
                    default_prompt: definition.prompt.clone(),
                    default_mode: definition.mode,
                    runnable,
                    result: output.map(|o| o.text.clone()),
                    prompt: output.map(|o| o.prompt.clone()),
                    mode: output.map(|o| o.mode),
                    completed_at: output.map(|o| o.completed_at),
                }
            })
            .collect();

        Self {
            has_credentials: state.credentials().is_some(),
            document: state.document().map(DocumentSummary::from),
            session: state.session().map(SessionSummary::from),
            completed_steps: state.completed_steps(),
            artifact_ready: state.final_result().is_some(),
            steps,
        }
    }
}
