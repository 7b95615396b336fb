//! Domain layer - Core business logic and entities

pub mod chain;
pub mod conversation;
pub mod error;

pub use chain::{
    default_step_definitions, Artifact, ArtifactFormat, ChainController, ChainControllerConfig,
    ChainError, ConnectionError, InstructionMode, PollConfig, SessionInitializer, StepDefinition,
    StepError, StepIndex, StepOutput, StepRequest, WorkflowState,
};
pub use conversation::{
    ConversationService, ConversationServiceFactory, Credentials, Document, DocumentRef,
    DocumentStatus, SessionHandle, Turn, TurnPart, TurnRole, WorkflowSession,
};
pub use error::DomainError;
