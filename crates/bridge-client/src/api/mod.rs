// crates/bridge-client/src/api/mod.rs
// ============================================================================
// Module: Bridge API Groups
// Description: Typed endpoint groups exposed by the client.
// Purpose: Mirror the service's API surface, one group per audience.
// Dependencies: crate::client
// ============================================================================

//! ## Overview
//! Each group borrows a [`crate::BridgeClient`] and maps one method to one
//! endpoint. Groups are zero-cost views; obtain them through
//! `client.auth()`, `client.admin()`, `client.schedules()`,
//! `client.consented()`, and `client.surveys()`.

mod admin;
mod auth;
mod consented;
mod schedules;
mod surveys;

pub use admin::AdminApi;
pub use auth::AuthApi;
pub use consented::ConsentedApi;
pub use schedules::SchedulesApi;
pub use surveys::SurveysApi;

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::error::ApiError;

/// Renders a survey revision timestamp as a path segment.
pub(crate) fn revision_segment(created_on: OffsetDateTime) -> Result<String, ApiError> {
    created_on
        .format(&Rfc3339)
        .map_err(|err| ApiError::InvalidRequest(format!("invalid createdOn: {err}")))
}
