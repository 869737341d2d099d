// crates/bridge-stub/src/error.rs
// ============================================================================
// Module: Bridge Stub Errors
// Description: Failures raised by stub handlers and startup.
// Purpose: Render every failure as the service's JSON error envelope.
// Dependencies: axum, bridge-core, thiserror
// ============================================================================

//! ## Overview
//! Handler failures map one-to-one onto an [`ErrorKind`], whose status code
//! and name are written into an [`ErrorEnvelope`] body. Validation failures
//! also carry their per-field messages.

use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use bridge_core::ErrorEnvelope;
use bridge_core::ErrorKind;
use bridge_core::ValidationErrors;
use thiserror::Error;

/// Stub failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StubError {
    /// Referenced entity does not exist.
    #[error("{0}")]
    NotFound(String),
    /// Entity with the same key already exists.
    #[error("{0}")]
    AlreadyExists(String),
    /// Submitted version is stale.
    #[error("{0}")]
    ConcurrentModification(String),
    /// Submitted entity is invalid.
    #[error(transparent)]
    Invalid(#[from] ValidationErrors),
    /// Request is malformed.
    #[error("{0}")]
    BadRequest(String),
    /// No valid session accompanied the request.
    #[error("Not signed in.")]
    NotAuthenticated,
    /// Caller lacks the required role.
    #[error("Caller does not have permission to access this service.")]
    Unauthorized,
    /// Caller has not consented to the study.
    #[error("Consent is required before continuing.")]
    ConsentRequired,
    /// Stub failed internally.
    #[error("{0}")]
    Internal(String),
    /// Stub could not start.
    #[error("stub startup failed: {0}")]
    Startup(String),
}

impl StubError {
    /// Error kind reported in the envelope.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::EntityNotFoundException,
            Self::AlreadyExists(_) => ErrorKind::EntityAlreadyExistsException,
            Self::ConcurrentModification(_) => ErrorKind::ConcurrentModificationException,
            Self::Invalid(_) => ErrorKind::InvalidEntityException,
            Self::BadRequest(_) => ErrorKind::BadRequestException,
            Self::NotAuthenticated => ErrorKind::NotAuthenticatedException,
            Self::Unauthorized => ErrorKind::UnauthorizedException,
            Self::ConsentRequired => ErrorKind::ConsentRequiredException,
            Self::Internal(_) | Self::Startup(_) => ErrorKind::BridgeServiceException,
        }
    }

    /// Error envelope rendered for this failure.
    #[must_use]
    pub fn envelope(&self) -> ErrorEnvelope {
        match self {
            Self::Invalid(errors) => ErrorEnvelope::from(errors.clone()),
            other => ErrorEnvelope::new(other.kind(), other.to_string()),
        }
    }
}

impl IntoResponse for StubError {
    fn into_response(self) -> Response {
        let envelope = self.envelope();
        let status =
            StatusCode::from_u16(envelope.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::error!(error = %self, "stub request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "stub request rejected");
        }
        (status, Json(envelope)).into_response()
    }
}
