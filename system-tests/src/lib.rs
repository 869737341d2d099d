// system-tests/src/lib.rs
// ============================================================================
// Module: Bridge System Tests Library
// Description: Shared configuration for the Bridge system-test binaries.
// Purpose: Give every suite one typed view of the test environment.
// Dependencies: std
// ============================================================================

//! ## Overview
//! This crate hosts the environment-driven configuration used by the
//! system-test binaries in `system-tests/tests`. Without a configured host the
//! suites run against an in-process stub; with one they target a live service.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
