// crates/bridge-core/src/core/errors.rs
// ============================================================================
// Module: Bridge Error Payloads
// Description: Validation error aggregation and the service error envelope.
// Purpose: Share one error wire shape between the service and its clients.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Entity validation collects every violated constraint into
//! [`ValidationErrors`], which renders as `<Entity> is invalid: <messages>`.
//! Failed requests carry an [`ErrorEnvelope`] whose `type` names the
//! exception kind so clients can classify the failure.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Validation Errors
// ============================================================================

/// Constraint violations for a single entity.
///
/// # Invariants
/// - `messages` preserves the order in which violations were found.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{entity} is invalid: {}", messages.join("; "))]
pub struct ValidationErrors {
    /// Entity type name used in the rendered message.
    pub entity: String,
    /// Human readable violations.
    pub messages: Vec<String>,
    /// Violations grouped by field name.
    pub fields: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    /// Creates an empty error set for an entity.
    #[must_use]
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            messages: Vec::new(),
            fields: BTreeMap::new(),
        }
    }

    /// Records a violation against a field.
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        let message = message.into();
        self.fields.entry(field.into()).or_default().push(message.clone());
        self.messages.push(message);
    }

    /// Returns true when no violations were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Converts the set into a result.
    ///
    /// # Errors
    ///
    /// Returns `self` when at least one violation was recorded.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

// ============================================================================
// SECTION: Error Envelope
// ============================================================================

/// Exception kinds reported in error envelopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Unknown account, study, or resource.
    EntityNotFoundException,
    /// Duplicate resource.
    EntityAlreadyExistsException,
    /// Entity failed field validation.
    InvalidEntityException,
    /// Malformed request parameters.
    BadRequestException,
    /// Request without a valid session.
    NotAuthenticatedException,
    /// Caller lacks the required role.
    UnauthorizedException,
    /// Caller has not consented to research.
    ConsentRequiredException,
    /// Stale version on update.
    ConcurrentModificationException,
    /// Any other service failure.
    BridgeServiceException,
    /// Kind this client does not know.
    #[serde(other)]
    Other,
}

impl ErrorKind {
    /// Returns the HTTP status conventionally paired with the kind.
    #[must_use]
    pub const fn status(self) -> u16 {
        match self {
            Self::EntityNotFoundException => 404,
            Self::EntityAlreadyExistsException | Self::ConcurrentModificationException => 409,
            Self::InvalidEntityException | Self::BadRequestException => 400,
            Self::NotAuthenticatedException => 401,
            Self::UnauthorizedException => 403,
            Self::ConsentRequiredException => 412,
            Self::BridgeServiceException | Self::Other => 500,
        }
    }
}

/// JSON body returned with every non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEnvelope {
    /// HTTP status code.
    pub status_code: u16,
    /// Human readable message.
    pub message: String,
    /// Exception kind.
    #[serde(rename = "type")]
    pub kind: ErrorKind,
    /// Field violations for invalid entities.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub errors: BTreeMap<String, Vec<String>>,
}

impl ErrorEnvelope {
    /// Builds an envelope for a kind with its conventional status.
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            status_code: kind.status(),
            message: message.into(),
            kind,
            errors: BTreeMap::new(),
        }
    }
}

impl From<ValidationErrors> for ErrorEnvelope {
    fn from(errors: ValidationErrors) -> Self {
        let message = errors.to_string();
        Self {
            status_code: ErrorKind::InvalidEntityException.status(),
            message,
            kind: ErrorKind::InvalidEntityException,
            errors: errors.fields,
        }
    }
}
