//! Conversation service implementations

mod factory;
mod gemini;
mod http_client;

pub use factory::GeminiServiceFactory;
pub use gemini::{
    GeminiConversationService, DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL,
    DEFAULT_GEMINI_UPLOAD_URL,
};
pub use http_client::{HttpClient, HttpClientTrait};
