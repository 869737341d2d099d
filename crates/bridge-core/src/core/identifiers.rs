// crates/bridge-core/src/core/identifiers.rs
// ============================================================================
// Module: Bridge Identifiers
// Description: Opaque identifiers for studies and server-assigned records.
// Purpose: Provide strongly typed, serializable identifiers with stable wire forms.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Identifiers are opaque strings on the wire. Studies are addressed by a
//! caller-chosen identifier; plans, activities, surveys and their elements by
//! server-assigned guids.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Identifier Types
// ============================================================================

/// Study identifier (for example `api`).
///
/// # Invariants
/// - Opaque UTF-8 string; validation happens where studies are created.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudyId(String);

impl StudyId {
    /// Creates a new study identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StudyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for StudyId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for StudyId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Server-assigned guid for plans, activities, surveys and survey elements.
///
/// # Invariants
/// - Opaque UTF-8 string; uniqueness is enforced by the issuing service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Guid(String);

impl Guid {
    /// Creates a guid from an existing value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the guid as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for Guid {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Guid {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}
