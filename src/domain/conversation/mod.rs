//! Conversation domain - Remote conversational service abstractions
//!
//! The remote service owns an append-only turn log per conversation. Local
//! code only ever appends to it through [`ConversationService::send_message`].

mod credentials;
mod document;
mod service;
mod session;
mod turn;

pub use credentials::Credentials;
pub use document::{Document, DocumentRef, DocumentStatus, DEFAULT_DOCUMENT_MIME_TYPE};
pub use service::{ConversationService, ConversationServiceFactory};
pub use session::{SessionHandle, WorkflowSession};
pub use turn::{Turn, TurnPart, TurnRole};

#[cfg(test)]
pub use service::mock;
#[cfg(test)]
pub use service::MockConversationServiceFactory;
