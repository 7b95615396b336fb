//! Step chain domain - Step gating, invalidation and context assembly

mod artifact;
mod context;
mod controller;
mod entity;
mod error;
mod initializer;
mod state;

pub use artifact::{Artifact, ArtifactFormat};
pub use context::assemble_message;
pub use controller::{ChainController, ChainControllerConfig, StepRequest};
pub use entity::{
    default_step_definitions, InstructionMode, StepDefinition, StepIndex,
    CHAIN_LENGTH,
};
pub use error::{ChainError, ConnectionError, StepError};
pub use initializer::{PollConfig, SessionInitializer, PRIMING_REPLY, PRIMING_REQUEST};
pub use state::{StepOutput, WorkflowState};
