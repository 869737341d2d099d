// crates/bridge-core/src/core/holders.rs
// ============================================================================
// Module: Bridge Response Holders
// Description: Small keyed responses and list wrappers returned by the service.
// Dependencies: crate::core::identifiers, serde, time
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use time::OffsetDateTime;

use crate::core::identifiers::Guid;

/// Identifier assigned to a created record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentifierHolder {
    /// Record identifier.
    pub identifier: String,
}

/// Guid and version of a versioned record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuidVersionHolder {
    /// Record guid.
    pub guid: Guid,
    /// Record version.
    pub version: u64,
}

/// Keys of a survey revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuidCreatedOnVersionHolder {
    /// Survey guid.
    pub guid: Guid,
    /// Revision timestamp.
    #[serde(with = "time::serde::rfc3339")]
    pub created_on: OffsetDateTime,
    /// Revision version.
    pub version: u64,
}

/// Version of an updated record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionHolder {
    /// Record version.
    pub version: u64,
}

/// Plain acknowledgement message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Message text.
    pub message: String,
}

impl Message {
    /// Creates a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// List of records with a total count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceList<T> {
    /// Records.
    pub items: Vec<T>,
    /// Number of records.
    pub total: usize,
}

impl<T> ResourceList<T> {
    /// Wraps records and counts them.
    #[must_use]
    pub fn new(items: Vec<T>) -> Self {
        let total = items.len();
        Self {
            items,
            total,
        }
    }
}
