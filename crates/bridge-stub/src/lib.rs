// crates/bridge-stub/src/lib.rs
// ============================================================================
// Module: Bridge Stub
// Description: In-process stand-in for the Bridge REST service.
// Purpose: Let system tests run hermetically against the real wire contract.
// Dependencies: axum, bridge-core, tokio
// ============================================================================

//! ## Overview
//! The stub serves the study, account, schedule-plan, scheduled-activity,
//! survey, and survey-response endpoints over in-memory state. Scheduling,
//! schedule selection, and answer validation come from `bridge-core`, so the
//! stub answers exactly as those rules dictate. Errors use the service's JSON
//! envelope.
//!
//! Start one with [`spawn_stub`]; it stops when its [`StubHandle`] drops.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod error;
mod routes;
pub mod server;
pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::DEFAULT_ADMIN_EMAIL;
pub use config::DEFAULT_ADMIN_PASSWORD;
pub use config::StubConfig;
pub use config::default_study;
pub use error::StubError;
pub use server::StubHandle;
pub use server::spawn_stub;
pub use store::ACCOUNT_NOT_FOUND;
pub use store::Store;
