// system-tests/src/config/mod.rs
// ============================================================================
// Module: System Test Configuration
// Description: Centralized configuration for Bridge system tests.
// Purpose: Provide typed access to test environment settings and defaults.
// Dependencies: std
// ============================================================================

//! ## Overview
//! System-test configuration is read from environment variables and mapped into
//! a small typed structure for reuse across test helpers. Credentials are only
//! read from the environment and never written to artifacts.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod env;

// ============================================================================
// SECTION: Tests
// ============================================================================


// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use env::DEFAULT_LOG_LEVEL;
pub use env::DEFAULT_STUDY;
pub use env::SystemTestConfig;
pub use env::SystemTestEnv;
pub use env::read_env_strict;
