//! Document payloads and their remote references

use std::path::Path;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// MIME type assumed when the display name gives no hint
pub const DEFAULT_DOCUMENT_MIME_TYPE: &str = "application/pdf";

/// A binary document supplied by the user
#[derive(Clone)]
pub struct Document {
    display_name: String,
    mime_type: String,
    data: Bytes,
}

impl Document {
    /// Create a document, deriving the MIME type from the display name
    pub fn new(display_name: impl Into<String>, data: impl Into<Bytes>) -> Result<Self, DomainError> {
        let display_name = display_name.into();
        let data = data.into();

        if data.is_empty() {
            return Err(DomainError::validation(format!(
                "Document '{}' is empty",
                display_name
            )));
        }

        let mime_type = mime_guess::from_path(&display_name)
            .first_raw()
            .unwrap_or(DEFAULT_DOCUMENT_MIME_TYPE)
            .to_string();

        Ok(Self {
            display_name,
            mime_type,
            data,
        })
    }

    /// Read a document from disk
    pub async fn from_path(path: &Path) -> Result<Self, DomainError> {
        let data = tokio::fs::read(path).await.map_err(|e| {
            DomainError::validation(format!("Failed to read '{}': {}", path.display(), e))
        })?;

        let display_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("document.pdf");

        Self::new(display_name, data)
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("display_name", &self.display_name)
            .field("mime_type", &self.mime_type)
            .field("size_bytes", &self.data.len())
            .finish()
    }
}

/// Reference to a document held by the remote service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
    /// Service-side resource name (e.g. "files/abc123")
    pub name: String,
    /// URI used when referencing the document in a turn
    pub uri: String,
    pub mime_type: String,
}

impl DocumentRef {
    pub fn new(
        name: impl Into<String>,
        uri: impl Into<String>,
        mime_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            uri: uri.into(),
            mime_type: mime_type.into(),
        }
    }
}

/// Processing state of an uploaded document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentStatus {
    Processing,
    Ready,
    Failed,
}
