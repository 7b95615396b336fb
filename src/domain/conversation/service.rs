use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use super::{Credentials, Document, DocumentRef, DocumentStatus, SessionHandle, Turn};
use crate::domain::DomainError;

/// Trait for stateful conversational services (Gemini, etc.)
#[async_trait]
pub trait ConversationService: Send + Sync + Debug {
    /// Transmit a document to the service
    async fn upload_document(&self, document: &Document) -> Result<DocumentRef, DomainError>;

    /// Report the processing state of an uploaded document
    async fn document_status(&self, document: &DocumentRef) -> Result<DocumentStatus, DomainError>;

    /// Start a conversation seeded with the given turns
    async fn create_conversation(&self, initial_turns: Vec<Turn>)
        -> Result<SessionHandle, DomainError>;

    /// Append a user message to a conversation and return the model reply
    async fn send_message(
        &self,
        session: &SessionHandle,
        content: &str,
    ) -> Result<String, DomainError>;

    /// Get the provider name
    fn provider_name(&self) -> &'static str;
}

/// Builds a conversation service configured with user credentials
#[cfg_attr(test, automock)]
pub trait ConversationServiceFactory: Send + Sync {
    fn configure(
        &self,
        credentials: &Credentials,
    ) -> Result<Arc<dyn ConversationService>, DomainError>;
}

#[cfg(test)]
pub mod mock {
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;

    use super::*;

    #[derive(Debug, Default)]
    struct MockState {
        uploads: Vec<String>,
        statuses: VecDeque<DocumentStatus>,
        status_calls: usize,
        conversations: HashMap<String, Vec<Turn>>,
        sent: Vec<(SessionHandle, String)>,
        replies: VecDeque<String>,
        upload_error: Option<String>,
        send_error: Option<String>,
    }

    /// In-memory conversation service recording every call
    #[derive(Debug, Default)]
    pub struct MockConversationService {
        state: Mutex<MockState>,
    }

    impl MockConversationService {
        pub fn new() -> Self {
            Self::default()
        }

        /// Statuses returned by successive status polls; `Ready` once drained
        pub fn with_statuses(self, statuses: Vec<DocumentStatus>) -> Self {
            self.state.lock().unwrap().statuses = statuses.into();
            self
        }

        /// Scripted replies; once drained, replies echo the message
        pub fn with_replies(self, replies: Vec<&str>) -> Self {
            self.state.lock().unwrap().replies =
                replies.into_iter().map(String::from).collect();
            self
        }

        pub fn with_upload_error(self, error: impl Into<String>) -> Self {
            self.state.lock().unwrap().upload_error = Some(error.into());
            self
        }

        pub fn with_send_error(self, error: impl Into<String>) -> Self {
            self.set_send_error(Some(error.into()));
            self
        }

        pub fn set_send_error(&self, error: Option<String>) {
            self.state.lock().unwrap().send_error = error;
        }

        pub fn upload_count(&self) -> usize {
            self.state.lock().unwrap().uploads.len()
        }

        pub fn status_calls(&self) -> usize {
            self.state.lock().unwrap().status_calls
        }

        pub fn conversation_count(&self) -> usize {
            self.state.lock().unwrap().conversations.len()
        }

        /// Message contents in send order
        pub fn sent_messages(&self) -> Vec<String> {
            self.state
                .lock()
                .unwrap()
                .sent
                .iter()
                .map(|(_, content)| content.clone())
                .collect()
        }

        pub fn last_sent(&self) -> Option<String> {
            self.sent_messages().pop()
        }

        pub fn turns(&self, session: &SessionHandle) -> Vec<Turn> {
            self.state
                .lock()
                .unwrap()
                .conversations
                .get(session.as_str())
                .cloned()
                .unwrap_or_default()
        }
    }

    #[async_trait]
    impl ConversationService for MockConversationService {
        async fn upload_document(&self, document: &Document) -> Result<DocumentRef, DomainError> {
            let mut state = self.state.lock().unwrap();

            if let Some(ref error) = state.upload_error {
                return Err(DomainError::provider("mock", error));
            }

            let name = format!("files/{}", state.uploads.len() + 1);
            state.uploads.push(document.display_name().to_string());

            Ok(DocumentRef::new(
                name.clone(),
                format!("mock://{}", name),
                document.mime_type(),
            ))
        }

        async fn document_status(
            &self,
            _document: &DocumentRef,
        ) -> Result<DocumentStatus, DomainError> {
            let mut state = self.state.lock().unwrap();
            state.status_calls += 1;
            Ok(state.statuses.pop_front().unwrap_or(DocumentStatus::Ready))
        }

        async fn create_conversation(
            &self,
            initial_turns: Vec<Turn>,
        ) -> Result<SessionHandle, DomainError> {
            let mut state = self.state.lock().unwrap();
            let handle = SessionHandle::new(format!("conv-{}", state.conversations.len() + 1));
            state
                .conversations
                .insert(handle.as_str().to_string(), initial_turns);
            Ok(handle)
        }

        async fn send_message(
            &self,
            session: &SessionHandle,
            content: &str,
        ) -> Result<String, DomainError> {
            let mut state = self.state.lock().unwrap();

            if let Some(ref error) = state.send_error {
                return Err(DomainError::provider("mock", error));
            }

            if !state.conversations.contains_key(session.as_str()) {
                return Err(DomainError::not_found(format!(
                    "Conversation '{}' not found",
                    session
                )));
            }

            let reply = state
                .replies
                .pop_front()
                .unwrap_or_else(|| format!("reply to: {}", content));

            state.sent.push((session.clone(), content.to_string()));

            let log = state
                .conversations
                .get_mut(session.as_str())
                .expect("conversation checked above");
            log.push(Turn::user(content));
            log.push(Turn::model(reply.clone()));

            Ok(reply)
        }

        fn provider_name(&self) -> &'static str {
            "mock"
        }
    }
}
