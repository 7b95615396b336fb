use chrono::{DateTime, Utc};

use crate::domain::DomainError;

/// Credentials used to configure the remote conversational service
#[derive(Clone)]
pub struct Credentials {
    api_key: String,
    supplied_at: DateTime<Utc>,
}

impl Credentials {
    /// Create credentials from an API key, rejecting blank keys
    pub fn new(api_key: impl Into<String>) -> Result<Self, DomainError> {
        let api_key = api_key.into().trim().to_string();

        if api_key.is_empty() {
            return Err(DomainError::validation("API key must not be empty"));
        }

        Ok(Self {
            api_key,
            supplied_at: Utc::now(),
        })
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn supplied_at(&self) -> DateTime<Utc> {
        self.supplied_at
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"[REDACTED]")
            .field("supplied_at", &self.supplied_at)
            .finish()
    }
}
