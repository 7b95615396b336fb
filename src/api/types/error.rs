//! API error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::domain::{ChainError, ConnectionError, DomainError, StepError};

/// Error categories reported to clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorType {
    InvalidRequestError,
    AuthenticationError,
    NotFoundError,
    ConflictError,
    UpstreamError,
    ServerError,
    ServiceUnavailableError,
}

impl std::fmt::Display for ApiErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRequestError => write!(f, "invalid_request_error"),
            Self::AuthenticationError => write!(f, "authentication_error"),
            Self::NotFoundError => write!(f, "not_found_error"),
            Self::ConflictError => write!(f, "conflict_error"),
            Self::UpstreamError => write!(f, "upstream_error"),
            Self::ServerError => write!(f, "server_error"),
            Self::ServiceUnavailableError => write!(f, "service_unavailable_error"),
        }
    }
}

/// Error response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

/// Error detail structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub message: String,
    #[serde(rename = "type")]
    pub error_type: ApiErrorType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub param: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// API error with status code
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub response: ApiErrorResponse,
}

impl ApiError {
    pub fn new(
        status: StatusCode,
        error_type: ApiErrorType,
        message: impl Into<String>,
    ) -> Self {
        Self {
            status,
            response: ApiErrorResponse {
                error: ApiErrorDetail {
                    message: message.into(),
                    error_type,
                    param: None,
                    code: None,
                },
            },
        }
    }

    pub fn with_param(mut self, param: impl Into<String>) -> Self {
        self.response.error.param = Some(param.into());
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.response.error.code = Some(code.into());
        self
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, ApiErrorType::InvalidRequestError, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, ApiErrorType::AuthenticationError, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, ApiErrorType::NotFoundError, message)
    }

    /// The workflow is not in a state that allows the request
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, ApiErrorType::ConflictError, message)
    }

    /// The remote conversational service failed
    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, ApiErrorType::UpstreamError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, ApiErrorType::ServerError, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            ApiErrorType::ServiceUnavailableError,
            message,
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.response)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match &err {
            DomainError::NotFound { message } => Self::not_found(message),
            DomainError::Validation { message } => Self::bad_request(message),
            DomainError::Credential { message } => Self::unauthorized(message),
            DomainError::Provider { provider, message } => {
                Self::bad_gateway(format!("{}: {}", provider, message))
            }
            DomainError::Configuration { message } => Self::internal(message),
            DomainError::Internal { message } => Self::internal(message),
        }
    }
}

impl From<ConnectionError> for ApiError {
    fn from(err: ConnectionError) -> Self {
        let message = err.to_string();

        match err {
            ConnectionError::Service(_) => {
                Self::bad_gateway(message).with_code("connection_failed")
            }
            ConnectionError::DocumentRejected { .. } => {
                Self::new(StatusCode::UNPROCESSABLE_ENTITY, ApiErrorType::UpstreamError, message)
                    .with_code("document_rejected")
            }
            ConnectionError::TimedOut { .. } => {
                Self::new(StatusCode::GATEWAY_TIMEOUT, ApiErrorType::UpstreamError, message)
                    .with_code("document_not_ready")
            }
        }
    }
}

impl From<StepError> for ApiError {
    fn from(err: StepError) -> Self {
        let message = err.to_string();

        match err {
            StepError::InvalidStep { .. } => Self::bad_request(message)
                .with_param("step")
                .with_code("invalid_step"),
            StepError::PrerequisiteMissing { .. } => {
                Self::conflict(message).with_code("prerequisite_missing")
            }
            StepError::SessionUnavailable(_) => {
                Self::conflict(message).with_code("session_unavailable")
            }
            StepError::Connection(inner) => inner.into(),
            StepError::Service { .. } => Self::bad_gateway(message).with_code("step_failed"),
        }
    }
}

impl From<ChainError> for ApiError {
    fn from(err: ChainError) -> Self {
        let message = err.to_string();
        let mut api_err = ApiError::from(err.source);
        api_err.response.error.message = message;
        api_err
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}",
            self.response.error.error_type, self.response.error.message
        )
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::WorkflowState;

    #[test]
    fn test_api_error_with_param() {
        let err = ApiError::bad_request("Invalid value")
            .with_param("mode")
            .with_code("invalid_type");

        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.response.error.param, Some("mode".to_string()));
        assert_eq!(err.response.error.code, Some("invalid_type".to_string()));
    }

    #[test]
    fn test_step_error_mapping() {
        let err: ApiError = StepError::InvalidStep { step: 4, max: 3 }.into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.response.error.param.as_deref(), Some("step"));

        let err: ApiError = StepError::prerequisite_missing(3, 2).into();
        assert_eq!(err.status, StatusCode::CONFLICT);
        assert_eq!(err.response.error.code.as_deref(), Some("prerequisite_missing"));

        let err: ApiError = StepError::session_unavailable("no API key supplied").into();
        assert_eq!(err.status, StatusCode::CONFLICT);

        let err: ApiError = StepError::service(2, "HTTP 500").into();
        assert_eq!(err.status, StatusCode::BAD_GATEWAY);
        assert_eq!(err.response.error.message, "Step 2 failed: HTTP 500");
    }

    #[test]
    fn test_connection_error_mapping() {
        let err: ApiError = StepError::from(ConnectionError::timed_out("files/a", 10)).into();
        assert_eq!(err.status, StatusCode::GATEWAY_TIMEOUT);

        let err: ApiError = ConnectionError::document_rejected("files/a", "failed").into();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);

        let err: ApiError = ConnectionError::service("HTTP 403").into();
        assert_eq!(err.status, StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_chain_error_keeps_step_in_message() {
        let err = ChainError {
            step: 2,
            source: StepError::service(2, "boom"),
            state: Box::new(WorkflowState::new()),
        };

        let api_err: ApiError = err.into();
        assert_eq!(api_err.status, StatusCode::BAD_GATEWAY);
        assert!(api_err.response.error.message.starts_with("Automatic chain stopped at step 2"));
    }

    #[test]
    fn test_domain_error_conversion() {
        let api_err: ApiError = DomainError::validation("API key must not be empty").into();
        assert_eq!(api_err.status, StatusCode::BAD_REQUEST);

        let api_err: ApiError = DomainError::credential("bad").into();
        assert_eq!(api_err.response.error.error_type, ApiErrorType::AuthenticationError);
    }

    #[test]
    fn test_error_serialization() {
        let err = ApiError::conflict("Cannot run step 2");
        let json = serde_json::to_string(&err.response).unwrap();

        assert!(json.contains("conflict_error"));
        assert!(!json.contains("param"));
    }
}
