//! Request and response types for the HTTP surface

pub mod chain;
pub mod error;
pub mod json;

pub use chain::{
    ArtifactQuery, ChainStateResponse, CredentialsRequest, DocumentSummary, StepRequestBody,
    StepView,
};
pub use error::{ApiError, ApiErrorResponse};
pub use json::Json;
