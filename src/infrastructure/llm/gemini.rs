use std::collections::HashMap;

use async_trait::async_trait;
use bytes::{BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

use super::http_client::HttpClientTrait;
use crate::domain::{
    ConversationService, Document, DocumentRef, DocumentStatus, DomainError, SessionHandle, Turn,
    TurnPart, TurnRole,
};

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_UPLOAD_URL: &str =
    "https://generativelanguage.googleapis.com/upload/v1beta/files";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-3-pro-preview";

const PROVIDER: &str = "gemini";

/// Gemini conversation service
///
/// Gemini's generateContent endpoint is stateless, so each conversation's
/// turn log is kept here and replayed in full on every message.
#[derive(Debug)]
pub struct GeminiConversationService<C: HttpClientTrait> {
    client: C,
    api_key: String,
    model: String,
    base_url: String,
    upload_url: String,
    conversations: RwLock<HashMap<String, Vec<Turn>>>,
}

impl<C: HttpClientTrait> GeminiConversationService<C> {
    pub fn new(client: C, api_key: impl Into<String>) -> Self {
        Self::with_urls(
            client,
            api_key,
            DEFAULT_GEMINI_MODEL,
            DEFAULT_GEMINI_BASE_URL,
            DEFAULT_GEMINI_UPLOAD_URL,
        )
    }

    pub fn with_urls(
        client: C,
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
        upload_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            model: model.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            upload_url: upload_url.into(),
            conversations: RwLock::new(HashMap::new()),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn file_url(&self, name: &str) -> String {
        format!("{}/v1beta/{}", self.base_url, name)
    }

    fn generate_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    fn auth_headers(&self) -> Vec<(&str, &str)> {
        vec![("x-goog-api-key", self.api_key.as_str())]
    }

    fn build_generate_request(turns: &[Turn]) -> serde_json::Value {
        let contents: Vec<GeminiContent> = turns.iter().map(GeminiContent::from_domain).collect();
        serde_json::json!({ "contents": contents })
    }

    fn parse_generate_response(response: serde_json::Value) -> Result<String, DomainError> {
        let response: GenerateContentResponse = serde_json::from_value(response).map_err(|e| {
            DomainError::provider(PROVIDER, format!("Failed to parse response: {}", e))
        })?;

        let candidate = response.candidates.into_iter().next().ok_or_else(|| {
            let reason = response
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .unwrap_or_else(|| "no candidates returned".to_string());
            DomainError::provider(PROVIDER, format!("Empty response: {}", reason))
        })?;

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.is_empty() {
            let reason = candidate
                .finish_reason
                .unwrap_or_else(|| "UNKNOWN".to_string());
            return Err(DomainError::provider(
                PROVIDER,
                format!("Response contained no text (finish reason: {})", reason),
            ));
        }

        Ok(text)
    }
}

/// Encode a Files API multipart/related upload: JSON metadata then raw bytes
fn encode_upload(document: &Document, boundary: &str) -> Bytes {
    let metadata = serde_json::json!({
        "file": { "displayName": document.display_name() }
    });

    let mut body = BytesMut::with_capacity(document.size_bytes() + 512);

    body.put(format!("--{boundary}\r\n").as_bytes());
    body.put(&b"Content-Type: application/json; charset=UTF-8\r\n\r\n"[..]);
    body.put(metadata.to_string().as_bytes());
    body.put(&b"\r\n"[..]);

    body.put(format!("--{boundary}\r\n").as_bytes());
    body.put(format!("Content-Type: {}\r\n\r\n", document.mime_type()).as_bytes());
    body.put(document.data().clone());
    body.put(&b"\r\n"[..]);

    body.put(format!("--{boundary}--\r\n").as_bytes());

    body.freeze()
}

#[async_trait]
impl<C: HttpClientTrait + 'static> ConversationService for GeminiConversationService<C> {
    async fn upload_document(&self, document: &Document) -> Result<DocumentRef, DomainError> {
        let boundary = format!("prompt-chain-{}", uuid::Uuid::new_v4().simple());
        let body = encode_upload(document, &boundary);
        let content_type = format!("multipart/related; boundary={}", boundary);

        let mut headers = self.auth_headers();
        headers.push(("X-Goog-Upload-Protocol", "multipart"));

        let response = self
            .client
            .post_bytes(&self.upload_url, headers, &content_type, body)
            .await?;

        let uploaded: UploadFileResponse = serde_json::from_value(response).map_err(|e| {
            DomainError::provider(PROVIDER, format!("Failed to parse upload response: {}", e))
        })?;

        debug!(file = %uploaded.file.name, state = ?uploaded.file.state, "Document uploaded");

        let mime_type = uploaded
            .file
            .mime_type
            .unwrap_or_else(|| document.mime_type().to_string());

        Ok(DocumentRef::new(uploaded.file.name, uploaded.file.uri, mime_type))
    }

    async fn document_status(&self, document: &DocumentRef) -> Result<DocumentStatus, DomainError> {
        let response = self
            .client
            .get_json(&self.file_url(&document.name), self.auth_headers())
            .await?;

        let file: GeminiFile = serde_json::from_value(response).map_err(|e| {
            DomainError::provider(PROVIDER, format!("Failed to parse file metadata: {}", e))
        })?;

        Ok(file.state.into())
    }

    async fn create_conversation(
        &self,
        initial_turns: Vec<Turn>,
    ) -> Result<SessionHandle, DomainError> {
        let id = uuid::Uuid::new_v4().to_string();
        self.conversations
            .write()
            .await
            .insert(id.clone(), initial_turns);

        Ok(SessionHandle::new(id))
    }

    async fn send_message(
        &self,
        session: &SessionHandle,
        content: &str,
    ) -> Result<String, DomainError> {
        let mut turns = self
            .conversations
            .read()
            .await
            .get(session.as_str())
            .cloned()
            .ok_or_else(|| {
                DomainError::not_found(format!("Conversation '{}' not found", session))
            })?;

        turns.push(Turn::user(content));
        let body = Self::build_generate_request(&turns);

        debug!(conversation = %session, turns = turns.len(), model = %self.model, "Sending message");

        let response = self
            .client
            .post_json(&self.generate_url(), self.auth_headers(), &body)
            .await?;
        let reply = Self::parse_generate_response(response)?;

        // Only a successful exchange becomes part of the history
        let mut conversations = self.conversations.write().await;
        if let Some(history) = conversations.get_mut(session.as_str()) {
            history.push(Turn::user(content));
            history.push(Turn::model(reply.clone()));
        }

        Ok(reply)
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

// Gemini API types

#[derive(Debug, Serialize)]
struct GeminiContent {
    role: &'static str,
    parts: Vec<GeminiPart>,
}

impl GeminiContent {
    fn from_domain(turn: &Turn) -> Self {
        let role = match turn.role {
            TurnRole::User => "user",
            TurnRole::Model => "model",
        };

        let parts = turn
            .parts
            .iter()
            .map(|part| match part {
                TurnPart::Text { text } => GeminiPart::Text { text: text.clone() },
                TurnPart::Document { document } => GeminiPart::FileData {
                    file_data: FileData {
                        mime_type: document.mime_type.clone(),
                        file_uri: document.uri.clone(),
                    },
                },
            })
            .collect();

        Self { role, parts }
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum GeminiPart {
    Text {
        text: String,
    },
    FileData {
        #[serde(rename = "fileData")]
        file_data: FileData,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FileData {
    mime_type: String,
    file_uri: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum FileState {
    Processing,
    Active,
    Failed,
    #[serde(other)]
    Unknown,
}

impl From<FileState> for DocumentStatus {
    fn from(state: FileState) -> Self {
        match state {
            FileState::Active => DocumentStatus::Ready,
            FileState::Failed => DocumentStatus::Failed,
            FileState::Processing | FileState::Unknown => DocumentStatus::Processing,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiFile {
    name: String,
    #[serde(default)]
    uri: String,
    mime_type: Option<String>,
    #[serde(default = "default_file_state")]
    state: FileState,
}

fn default_file_state() -> FileState {
    FileState::Processing
}

#[derive(Debug, Deserialize)]
struct UploadFileResponse {
    file: GeminiFile,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}
