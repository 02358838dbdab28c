//! services/api/src/web/error.rs
//!
//! The HTTP error envelope. Every failure leaves the service as a non-2xx
//! response carrying a machine-readable kind and a human-readable message,
//! so the frontend can render "already applied" instead of a generic
//! failure.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use tracing::error;
use udaan_core::ports::PortError;
use udaan_core::workflow::WorkflowError;
use utoipa::ToSchema;

/// Standard error envelope returned by every endpoint.
#[derive(Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable kind: `validation_error`, `not_found`,
    /// `duplicate_application`, `forbidden`, `unauthorized`, or
    /// `service_error`.
    #[schema(example = "duplicate_application")]
    pub kind: String,
    #[schema(example = "You already applied for this job")]
    pub message: String,
}

/// A failure ready to be rendered as a response.
#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    kind: &'static str,
    message: String,
}

impl HttpError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            kind: "validation_error",
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            kind: "unauthorized",
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            kind: "forbidden",
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            kind: "not_found",
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            kind: "service_error",
            message: message.into(),
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                kind: self.kind.to_string(),
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<WorkflowError> for HttpError {
    fn from(e: WorkflowError) -> Self {
        match e {
            WorkflowError::Validation(message) => Self::validation(message),
            WorkflowError::NotFound(message) => Self::not_found(message),
            WorkflowError::DuplicateApplication => Self {
                status: StatusCode::BAD_REQUEST,
                kind: "duplicate_application",
                message: e.to_string(),
            },
            WorkflowError::Forbidden(message) => Self {
                status: StatusCode::FORBIDDEN,
                kind: "forbidden",
                message,
            },
            WorkflowError::Service(message) => {
                error!("workflow storage failure: {}", message);
                Self::internal("An internal error occurred")
            }
        }
    }
}

impl From<PortError> for HttpError {
    fn from(e: PortError) -> Self {
        match e {
            PortError::NotFound(message) => Self::not_found(message),
            PortError::Conflict(message) => Self::validation(message),
            PortError::Unexpected(message) => {
                error!("storage failure: {}", message);
                Self::internal("An internal error occurred")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_applications_map_to_a_distinct_kind() {
        let err = HttpError::from(WorkflowError::DuplicateApplication);
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.kind, "duplicate_application");
    }

    #[test]
    fn store_failures_do_not_leak_details() {
        let err = HttpError::from(WorkflowError::Service("connection reset".to_string()));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.message.contains("connection reset"));
    }

    #[test]
    fn forbidden_maps_to_403() {
        let err = HttpError::from(WorkflowError::Forbidden("nope".to_string()));
        assert_eq!(err.status, StatusCode::FORBIDDEN);
        assert_eq!(err.kind, "forbidden");
    }
}
