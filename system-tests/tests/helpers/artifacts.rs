// system-tests/tests/helpers/artifacts.rs
// ============================================================================
// Module: Test Artifacts
// Description: Artifact helpers for system-tests.
// Purpose: Create per-test run roots and write deterministic summaries.
// Dependencies: system-tests, bridge-client, serde, serde_jcs
// ============================================================================

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use bridge_client::BridgeClient;
use serde::Serialize;
use system_tests::config::SystemTestConfig;

#[derive(Debug, Serialize)]
struct TestSummary {
    test_name: String,
    target: String,
    status: String,
    started_at_ms: u128,
    ended_at_ms: u128,
    duration_ms: u128,
    notes: Vec<String>,
    artifacts: Vec<String>,
}

fn now_millis() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}

fn default_run_root() -> PathBuf {
    PathBuf::from("target/system-tests").join(format!("run_{}", now_millis()))
}

/// Artifact manager for a single system-test.
///
/// Clones share the tracked clients and notes.
#[derive(Debug, Clone)]
pub struct TestArtifacts {
    root: PathBuf,
    clients: Arc<Mutex<Vec<(String, BridgeClient)>>>,
    notes: Arc<Mutex<Vec<String>>>,
}

impl TestArtifacts {
    /// Creates the artifact root for a test under the configured run root.
    pub fn new(config: &SystemTestConfig, test_name: &str) -> io::Result<Self> {
        let root = config.run_root.clone().unwrap_or_else(default_run_root).join(test_name);
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            clients: Arc::default(),
            notes: Arc::default(),
        })
    }

    /// Returns the root directory for the test artifacts.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes a JSON artifact using canonical JCS serialization.
    pub fn write_json<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> io::Result<PathBuf> {
        let path = self.root.join(name);
        let bytes = serde_jcs::to_vec(value).map_err(|err| io::Error::other(err.to_string()))?;
        fs::write(&path, bytes)?;
        Ok(path)
    }

    /// Writes a text artifact with UTF-8 encoding.
    pub fn write_text(&self, name: &str, value: &str) -> io::Result<PathBuf> {
        let path = self.root.join(name);
        fs::write(&path, value.as_bytes())?;
        Ok(path)
    }

    /// Writes the request transcript of `client` as `<label>_transcript.json`.
    pub fn write_transcript(&self, label: &str, client: &BridgeClient) -> io::Result<String> {
        let name = format!("{label}_transcript.json");
        self.write_json(&name, &client.transcript())?;
        Ok(name)
    }

    /// Records `client` so its transcript is written with the summary.
    pub fn track(&self, label: &str, client: &BridgeClient) {
        self.clients
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((label.to_string(), client.clone()));
    }

    /// Adds a line to the summary notes.
    pub fn note(&self, note: impl Into<String>) {
        self.notes.lock().unwrap_or_else(PoisonError::into_inner).push(note.into());
    }

    fn take_notes(&self) -> Vec<String> {
        std::mem::take(&mut *self.notes.lock().unwrap_or_else(PoisonError::into_inner))
    }

    fn write_tracked_transcripts(&self) -> io::Result<Vec<String>> {
        let clients = self.clients.lock().unwrap_or_else(PoisonError::into_inner).clone();
        clients.iter().map(|(label, client)| self.write_transcript(label, client)).collect()
    }
}

/// Helper that writes summaries even when a test panics.
pub struct TestReporter {
    artifacts: TestArtifacts,
    test_name: String,
    target: String,
    started_at_ms: u128,
    finalized: bool,
}

impl TestReporter {
    /// Creates a reporter for the named test.
    pub fn new(config: &SystemTestConfig, test_name: &str) -> io::Result<Self> {
        let target = config.host_url.clone().unwrap_or_else(|| "in-process stub".to_string());
        Ok(Self {
            artifacts: TestArtifacts::new(config, test_name)?,
            test_name: test_name.to_string(),
            target,
            started_at_ms: now_millis(),
            finalized: false,
        })
    }

    /// Returns the artifact manager.
    pub const fn artifacts(&self) -> &TestArtifacts {
        &self.artifacts
    }

    /// Writes tracked transcripts and the final summary for the test.
    pub fn finish(
        &mut self,
        status: &str,
        mut notes: Vec<String>,
        mut artifacts: Vec<String>,
    ) -> io::Result<()> {
        notes.extend(self.artifacts.take_notes());
        artifacts.extend(self.artifacts.write_tracked_transcripts()?);
        let ended_at_ms = now_millis();
        let summary = TestSummary {
            test_name: self.test_name.clone(),
            target: self.target.clone(),
            status: status.to_string(),
            started_at_ms: self.started_at_ms,
            ended_at_ms,
            duration_ms: ended_at_ms.saturating_sub(self.started_at_ms),
            notes,
            artifacts,
        };
        self.artifacts.write_json("summary.json", &summary)?;
        self.artifacts.write_text("summary.md", &summary_markdown(&summary))?;
        self.finalized = true;
        Ok(())
    }
}

impl Drop for TestReporter {
    fn drop(&mut self) {
        if self.finalized {
            return;
        }
        let status = if std::thread::panicking() { "panic" } else { "fail" };
        let _ = self.finish(
            status,
            vec!["test terminated without explicit summary".to_string()],
            Vec::new(),
        );
    }
}

fn summary_markdown(summary: &TestSummary) -> String {
    let mut out = String::new();
    out.push_str("# System-Test Summary\n\n");
    out.push_str("## Status\n\n");
    let _ = writeln!(out, "- Test: {}", summary.test_name);
    let _ = writeln!(out, "- Target: {}", summary.target);
    let _ = writeln!(out, "- Status: {}", summary.status);
    let _ = writeln!(out, "- Duration (ms): {}", summary.duration_ms);
    for (heading, items) in [("Notes", &summary.notes), ("Artifacts", &summary.artifacts)] {
        let _ = write!(out, "\n## {heading}\n\n");
        if items.is_empty() {
            out.push_str("- None\n");
        }
        for item in items {
            let _ = writeln!(out, "- {item}");
        }
    }
    out
}
