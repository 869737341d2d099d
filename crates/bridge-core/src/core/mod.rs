// crates/bridge-core/src/core/mod.rs
// ============================================================================
// Module: Bridge Core Types
// Description: Identifiers, accounts, client info, periods, and error payloads.
// Purpose: Provide stable serializable records shared by clients and services.
// Dependencies: serde, thiserror, time
// ============================================================================

//! ## Overview
//! Core types are the wire vocabulary of the Bridge API. Schedules and surveys
//! build on them; the HTTP client and the stub service both serialize these
//! exact shapes.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod account;
pub mod client_info;
pub mod errors;
pub mod holders;
pub mod identifiers;
pub mod period;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use account::ConsentSignature;
pub use account::Email;
pub use account::EmailTemplate;
pub use account::EmailVerification;
pub use account::MIN_PASSWORD_LENGTH;
pub use account::Role;
pub use account::SESSION_HEADER;
pub use account::SharingScope;
pub use account::SignIn;
pub use account::SignUp;
pub use account::Study;
pub use account::UserSessionInfo;
pub use client_info::ClientInfo;
pub use errors::ErrorEnvelope;
pub use errors::ErrorKind;
pub use errors::ValidationErrors;
pub use holders::GuidCreatedOnVersionHolder;
pub use holders::GuidVersionHolder;
pub use holders::IdentifierHolder;
pub use holders::Message;
pub use holders::ResourceList;
pub use holders::VersionHolder;
pub use identifiers::Guid;
pub use identifiers::StudyId;
pub use period::LocalTime;
pub use period::Period;
pub use period::PeriodError;
