// crates/bridge-client/src/transcript.rs
// ============================================================================
// Module: Bridge Request Transcript
// Description: Ordered record of requests issued by a client.
// Purpose: Capture request/response pairs for test artifacts.
// Dependencies: serde, serde_json
// ============================================================================

use serde::Serialize;
use serde_json::Value;

/// One request/response exchange.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptEntry {
    /// 1-based position in the transcript.
    pub sequence: u64,
    /// HTTP method.
    pub method: String,
    /// Request path.
    pub path: String,
    /// HTTP status, when a response arrived.
    pub status: Option<u16>,
    /// Request body (`null` when absent).
    pub request: Value,
    /// Response body (`null` when absent or not JSON).
    pub response: Value,
    /// Failure description.
    pub error: Option<String>,
}
