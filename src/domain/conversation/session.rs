use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ConversationService, DocumentRef};
use crate::domain::DomainError;

/// Opaque identifier of a remote conversation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionHandle(String);

impl SessionHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A live conversation seeded with a document.
///
/// Binds the handle to the service that owns its turn log, so every step
/// of a workflow run talks to the same conversation.
#[derive(Clone)]
pub struct WorkflowSession {
    handle: SessionHandle,
    document: DocumentRef,
    service: Arc<dyn ConversationService>,
    created_at: DateTime<Utc>,
}

impl WorkflowSession {
    pub fn new(
        handle: SessionHandle,
        document: DocumentRef,
        service: Arc<dyn ConversationService>,
    ) -> Self {
        Self {
            handle,
            document,
            service,
            created_at: Utc::now(),
        }
    }

    /// Append a user message to the conversation and return the reply
    pub async fn send(&self, content: &str) -> Result<String, DomainError> {
        self.service.send_message(&self.handle, content).await
    }

    pub fn handle(&self) -> &SessionHandle {
        &self.handle
    }

    pub fn document(&self) -> &DocumentRef {
        &self.document
    }

    pub fn provider_name(&self) -> &'static str {
        self.service.provider_name()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl std::fmt::Debug for WorkflowSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowSession")
            .field("handle", &self.handle)
            .field("document", &self.document.name)
            .field("provider", &self.service.provider_name())
            .field("created_at", &self.created_at)
            .finish()
    }
}
