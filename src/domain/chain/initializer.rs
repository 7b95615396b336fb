//! Session initializer - uploads the document and seeds a conversation

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::{debug, info};

use super::ConnectionError;
use crate::domain::conversation::{
    ConversationService, ConversationServiceFactory, Credentials, Document, DocumentRef,
    DocumentStatus, Turn, WorkflowSession,
};

/// User half of the priming exchange, sent alongside the document
pub const PRIMING_REQUEST: &str = "Analyze this file.";

/// Model half of the priming exchange
pub const PRIMING_REPLY: &str = "I have analyzed the file. Ready for your prompts.";

/// Document-ready polling configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollConfig {
    /// Delay between status checks
    pub interval: Duration,
    /// Give up after this long (None waits indefinitely)
    pub deadline: Option<Duration>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            deadline: Some(Duration::from_secs(300)),
        }
    }
}

/// Establishes document-seeded conversations
pub struct SessionInitializer {
    factory: Arc<dyn ConversationServiceFactory>,
    poll: PollConfig,
}

impl std::fmt::Debug for SessionInitializer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionInitializer")
            .field("poll", &self.poll)
            .finish()
    }
}

impl SessionInitializer {
    pub fn new(factory: Arc<dyn ConversationServiceFactory>) -> Self {
        Self::with_poll_config(factory, PollConfig::default())
    }

    pub fn with_poll_config(factory: Arc<dyn ConversationServiceFactory>, poll: PollConfig) -> Self {
        Self { factory, poll }
    }

    pub fn poll_config(&self) -> &PollConfig {
        &self.poll
    }

    /// Upload `document`, wait until the service accepts it, then open a
    /// conversation primed with it
    pub async fn initialize(
        &self,
        credentials: &Credentials,
        document: &Document,
    ) -> Result<WorkflowSession, ConnectionError> {
        let service = self.factory.configure(credentials)?;

        info!(
            document = %document.display_name(),
            size_bytes = document.size_bytes(),
            provider = service.provider_name(),
            "Uploading document"
        );

        let uploaded = service.upload_document(document).await?;
        self.wait_until_ready(service.as_ref(), &uploaded).await?;

        let handle = service
            .create_conversation(vec![
                Turn::user_with_document(uploaded.clone(), PRIMING_REQUEST),
                Turn::model(PRIMING_REPLY),
            ])
            .await?;

        info!(conversation = %handle, document = %uploaded.name, "Session initialized");

        Ok(WorkflowSession::new(handle, uploaded, service))
    }

    async fn wait_until_ready(
        &self,
        service: &dyn ConversationService,
        document: &DocumentRef,
    ) -> Result<(), ConnectionError> {
        let start = Instant::now();

        loop {
            match service.document_status(document).await? {
                DocumentStatus::Ready => return Ok(()),
                DocumentStatus::Failed => {
                    return Err(ConnectionError::document_rejected(
                        &document.name,
                        "the service failed to process the document",
                    ));
                }
                DocumentStatus::Processing => {
                    let waited = start.elapsed();

                    if let Some(deadline) = self.poll.deadline {
                        if waited >= deadline {
                            return Err(ConnectionError::timed_out(
                                &document.name,
                                waited.as_millis() as u64,
                            ));
                        }
                    }

                    debug!(
                        document = %document.name,
                        waited_ms = waited.as_millis() as u64,
                        "Document still processing"
                    );
                    sleep(self.poll.interval).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::conversation::mock::MockConversationService;
    use crate::domain::conversation::{MockConversationServiceFactory, TurnRole};
    use crate::domain::DomainError;

    fn fast_poll() -> PollConfig {
        PollConfig {
            interval: Duration::from_millis(1),
            deadline: Some(Duration::from_millis(20)),
        }
    }

    fn factory_for(service: Arc<MockConversationService>) -> Arc<dyn ConversationServiceFactory> {
        let mut factory = MockConversationServiceFactory::new();
        factory
            .expect_configure()
            .returning(move |_| Ok(service.clone() as Arc<dyn ConversationService>));
        Arc::new(factory)
    }

    fn inputs() -> (Credentials, Document) {
        (
            Credentials::new("test-key").unwrap(),
            Document::new("brochure.pdf", b"%PDF-1.7".to_vec()).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_initialize_seeds_priming_turns() {
        let service = Arc::new(MockConversationService::new());
        let initializer = SessionInitializer::with_poll_config(factory_for(service.clone()), fast_poll());
        let (credentials, document) = inputs();

        let session = initializer.initialize(&credentials, &document).await.unwrap();

        assert_eq!(service.upload_count(), 1);
        let turns = service.turns(session.handle());
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role, TurnRole::User);
        assert_eq!(turns[0].text(), PRIMING_REQUEST);
        assert_eq!(turns[0].documents().next(), Some(session.document()));
        assert_eq!(turns[1].role, TurnRole::Model);
        assert_eq!(turns[1].text(), PRIMING_REPLY);
    }

    #[tokio::test]
    async fn test_initialize_polls_until_ready() {
        let service = Arc::new(MockConversationService::new().with_statuses(vec![
            DocumentStatus::Processing,
            DocumentStatus::Processing,
            DocumentStatus::Ready,
        ]));
        let initializer = SessionInitializer::with_poll_config(
            factory_for(service.clone()),
            PollConfig {
                interval: Duration::from_millis(1),
                deadline: None,
            },
        );
        let (credentials, document) = inputs();

        initializer.initialize(&credentials, &document).await.unwrap();

        assert_eq!(service.status_calls(), 3);
    }

    #[tokio::test]
    async fn test_failed_document_is_rejected() {
        let service = Arc::new(
            MockConversationService::new().with_statuses(vec![DocumentStatus::Failed]),
        );
        let initializer = SessionInitializer::with_poll_config(factory_for(service.clone()), fast_poll());
        let (credentials, document) = inputs();

        let err = initializer.initialize(&credentials, &document).await.unwrap_err();

        assert!(matches!(err, ConnectionError::DocumentRejected { .. }));
        assert_eq!(service.conversation_count(), 0);
    }

    #[tokio::test]
    async fn test_processing_past_deadline_times_out() {
        let service = Arc::new(
            MockConversationService::new().with_statuses(vec![DocumentStatus::Processing; 10_000]),
        );
        let initializer = SessionInitializer::with_poll_config(factory_for(service.clone()), fast_poll());
        let (credentials, document) = inputs();

        let err = initializer.initialize(&credentials, &document).await.unwrap_err();

        match err {
            ConnectionError::TimedOut { document, waited_ms } => {
                assert_eq!(document, "files/1");
                assert!(waited_ms >= 20);
            }
            other => panic!("expected timeout, got {:?}", other),
        }
        assert_eq!(service.conversation_count(), 0);
    }

    #[tokio::test]
    async fn test_upload_failure_is_connection_error() {
        let service = Arc::new(MockConversationService::new().with_upload_error("HTTP 401"));
        let initializer = SessionInitializer::with_poll_config(factory_for(service), fast_poll());
        let (credentials, document) = inputs();

        let err = initializer.initialize(&credentials, &document).await.unwrap_err();

        assert!(matches!(err, ConnectionError::Service(ref m) if m.contains("HTTP 401")));
    }

    #[tokio::test]
    async fn test_configure_failure_is_connection_error() {
        let mut factory = MockConversationServiceFactory::new();
        factory
            .expect_configure()
            .returning(|_| Err(DomainError::credential("key rejected")));
        let initializer = SessionInitializer::with_poll_config(Arc::new(factory), fast_poll());
        let (credentials, document) = inputs();

        let err = initializer.initialize(&credentials, &document).await.unwrap_err();

        assert_eq!(
            err,
            ConnectionError::Service("Credential error: key rejected".to_string())
        );
    }
}
