// crates/bridge-client/src/error.rs
// ============================================================================
// Module: Bridge Client Errors
// Description: Classification of failed API calls.
// Purpose: Map HTTP failures and error envelopes onto a small taxonomy.
// Dependencies: bridge-core, thiserror
// ============================================================================

//! ## Overview
//! Every non-2xx response is classified once, from its status code and the
//! `type` of its error envelope. Validation failures keep the service's
//! message verbatim so callers can assert on it.

use std::collections::BTreeMap;

use bridge_core::ErrorEnvelope;
use bridge_core::ErrorKind;
use thiserror::Error;

/// Failed API call.
///
/// # Invariants
/// - HTTP-level variants carry the status code returned by the service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The addressed account, study, or resource does not exist.
    #[error("{message}")]
    NotFound {
        /// Service message.
        message: String,
    },
    /// The resource already exists or was modified concurrently.
    #[error("{message}")]
    Conflict {
        /// Service message.
        message: String,
    },
    /// The submitted entity failed validation.
    #[error("{message}")]
    Validation {
        /// HTTP status (400 or 422).
        status: u16,
        /// Service message, `<Entity> is invalid: ...`.
        message: String,
        /// Violations grouped by field.
        errors: BTreeMap<String, Vec<String>>,
    },
    /// Any other non-2xx response.
    #[error("HTTP {status}: {message}")]
    Server {
        /// HTTP status.
        status: u16,
        /// Exception kind, when the body carried an envelope.
        kind: Option<ErrorKind>,
        /// Service message.
        message: String,
    },
    /// The request could not be sent or the response could not be read.
    #[error("transport failure: {0}")]
    Transport(String),
    /// The response body did not match the expected shape.
    #[error("decode failure: {0}")]
    Decode(String),
    /// The request could not be built locally.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    /// HTTP status of the failure, when one was received.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::NotFound {
                ..
            } => Some(404),
            Self::Conflict {
                ..
            } => Some(409),
            Self::Validation {
                status, ..
            }
            | Self::Server {
                status, ..
            } => Some(*status),
            Self::Transport(_) | Self::Decode(_) | Self::InvalidRequest(_) => None,
        }
    }

    /// Classifies a non-2xx response from its status and body.
    #[must_use]
    pub fn from_response(status: u16, body: &str) -> Self {
        let envelope = serde_json::from_str::<ErrorEnvelope>(body).ok();
        let message = envelope.as_ref().map_or_else(
            || if body.trim().is_empty() { format!("HTTP {status}") } else { body.trim().to_string() },
            |envelope| envelope.message.clone(),
        );
        let kind = envelope.as_ref().map(|envelope| envelope.kind);
        match status {
            404 => Self::NotFound {
                message,
            },
            409 => Self::Conflict {
                message,
            },
            422 => Self::Validation {
                status,
                message,
                errors: envelope.map(|envelope| envelope.errors).unwrap_or_default(),
            },
            400 if kind == Some(ErrorKind::InvalidEntityException) => Self::Validation {
                status,
                message,
                errors: envelope.map(|envelope| envelope.errors).unwrap_or_default(),
            },
            _ => Self::Server {
                status,
                kind,
                message,
            },
        }
    }
}
