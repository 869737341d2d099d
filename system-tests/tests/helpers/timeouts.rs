// system-tests/tests/helpers/timeouts.rs
// ============================================================================
// Module: System Test Timeouts
// Description: Centralized timeout configuration with env overrides.
// Purpose: Keep system-test timeouts consistent and configurable across suites.
// ============================================================================

use std::time::Duration;

use system_tests::config::SystemTestConfig;

/// Per-request timeout used when no override is configured.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Time allowed for a live service to answer its first request.
pub const READINESS_TIMEOUT: Duration = Duration::from_secs(10);

/// Returns the effective timeout, honoring `BRIDGE_SYSTEM_TEST_TIMEOUT_SEC` when set.
/// The override acts as a minimum so explicitly longer timeouts are kept.
#[must_use]
pub fn resolve_timeout(config: &SystemTestConfig, requested: Duration) -> Duration {
    config.timeout.map_or(requested, |override_timeout| requested.max(override_timeout))
}
