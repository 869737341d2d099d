// crates/bridge-client/src/lib.rs
// ============================================================================
// Module: Bridge Client
// Description: Typed HTTP client for the Bridge participant research API.
// Purpose: Give test suites and tools one session-aware entry point per API.
// Dependencies: bridge-core, reqwest, serde, tracing, url
// ============================================================================

//! ## Overview
//! [`BridgeClient`] wraps a `reqwest` client with the service's conventions:
//! JSON bodies, a `User-Agent` carrying [`bridge_core::ClientInfo`], and the
//! `Bridge-Session` header once signed in. Failures are classified into
//! [`ApiError`] from the response status and error envelope.
//!
//! Every exchange is appended to an in-memory transcript so callers can
//! persist what was sent and received when a test fails.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod transcript;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use api::AdminApi;
pub use api::AuthApi;
pub use api::ConsentedApi;
pub use api::SchedulesApi;
pub use api::SurveysApi;
pub use bridge_core::SESSION_HEADER;
pub use client::BridgeClient;
pub use config::ClientConfig;
pub use config::DEFAULT_TIMEOUT;
pub use config::default_client_info;
pub use error::ApiError;
pub use transcript::TranscriptEntry;
