// system-tests/tests/helpers/readiness.rs
// ============================================================================
// Module: Readiness Helpers
// Description: Readiness probes for the Bridge service under test.
// Purpose: Ensure the service answers before suites start, without fixed sleeps.
// Dependencies: bridge-client, tokio
// ============================================================================

use std::time::Duration;
use std::time::Instant;

use bridge_client::ApiError;
use bridge_client::BridgeClient;
use tokio::time::sleep;

/// Polls the public sign-out endpoint until the service answers or `timeout` expires.
///
/// Any HTTP response counts as ready; only transport failures are retried.
pub async fn wait_for_service_ready(client: &BridgeClient, timeout: Duration) -> Result<(), String> {
    let start = Instant::now();
    let mut attempts = 0u32;
    loop {
        attempts = attempts.saturating_add(1);
        match client.auth().sign_out().await {
            Ok(_) => return Ok(()),
            Err(err) if err.status().is_some() => return Ok(()),
            Err(err @ (ApiError::Transport(_) | ApiError::Decode(_))) => {
                if start.elapsed() > timeout {
                    return Err(format!(
                        "service readiness timeout after {attempts} attempts: {err}"
                    ));
                }
                sleep(Duration::from_millis(50)).await;
            }
            Err(err) => return Err(format!("service readiness probe failed: {err}")),
        }
    }
}
