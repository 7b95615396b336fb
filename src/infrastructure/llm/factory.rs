use std::sync::Arc;
use std::time::Duration;

use super::gemini::{
    GeminiConversationService, DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL,
    DEFAULT_GEMINI_UPLOAD_URL,
};
use super::http_client::HttpClient;
use crate::domain::{ConversationService, ConversationServiceFactory, Credentials, DomainError};

/// Factory for Gemini conversation services
///
/// Holds everything except the API key, which arrives per workflow.
#[derive(Debug, Clone)]
pub struct GeminiServiceFactory {
    model: String,
    base_url: String,
    upload_url: String,
    request_timeout: Duration,
}

impl GeminiServiceFactory {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            upload_url: DEFAULT_GEMINI_UPLOAD_URL.to_string(),
            request_timeout: Duration::from_secs(120),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_upload_url(mut self, upload_url: impl Into<String>) -> Self {
        self.upload_url = upload_url.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl Default for GeminiServiceFactory {
    fn default() -> Self {
        Self::new(DEFAULT_GEMINI_MODEL)
    }
}

impl ConversationServiceFactory for GeminiServiceFactory {
    fn configure(
        &self,
        credentials: &Credentials,
    ) -> Result<Arc<dyn ConversationService>, DomainError> {
        if self.model.trim().is_empty() {
            return Err(DomainError::configuration("Gemini model name is empty"));
        }

        let http_client = HttpClient::with_timeout(self.request_timeout)?;
        let service = GeminiConversationService::with_urls(
            http_client,
            credentials.api_key(),
            &self.model,
            &self.base_url,
            &self.upload_url,
        );

        Ok(Arc::new(service))
    }
}
