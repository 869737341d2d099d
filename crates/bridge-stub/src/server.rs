// crates/bridge-stub/src/server.rs
// ============================================================================
// Module: Bridge Stub Server
// Description: Background HTTP server hosting the stub routes.
// Purpose: Start the stub on an ephemeral port and stop it on drop.
// Dependencies: axum, tokio
// ============================================================================

//! ## Overview
//! [`spawn_stub`] binds `127.0.0.1:0` and serves the stub from a dedicated
//! thread with its own single-threaded runtime, so it outlives the runtime
//! of whichever test started it. Dropping the [`StubHandle`] shuts the
//! server down gracefully and joins the thread.

use std::net::TcpListener as StdTcpListener;
use std::sync::Arc;
use std::sync::Mutex;
use std::thread;

use bridge_core::StudyId;
use time::OffsetDateTime;
use tokio::runtime::Builder;
use tokio::sync::oneshot;

use crate::config::StubConfig;
use crate::error::StubError;
use crate::routes::StubState;
use crate::routes::router;
use crate::store::Store;

/// Handle for a running stub.
#[derive(Debug)]
pub struct StubHandle {
    base_url: String,
    config: StubConfig,
    store: Arc<Mutex<Store>>,
    shutdown: Option<oneshot::Sender<()>>,
    join: Option<thread::JoinHandle<()>>,
}

impl StubHandle {
    /// Root URL of the stub, without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Seeded study identifier.
    #[must_use]
    pub const fn study(&self) -> &StudyId {
        &self.config.study.identifier
    }

    /// Seeded admin email.
    #[must_use]
    pub fn admin_email(&self) -> &str {
        &self.config.admin_email
    }

    /// Seeded admin password.
    #[must_use]
    pub fn admin_password(&self) -> &str {
        &self.config.admin_password
    }

    /// Number of accounts the stub holds, admin included.
    #[must_use]
    pub fn account_count(&self) -> usize {
        self.store.lock().map_or(0, |store| store.account_count())
    }

    /// Verification token that would have been mailed to `email`.
    #[must_use]
    pub fn pending_verification(&self, study: &StudyId, email: &str) -> Option<String> {
        self.store.lock().ok().and_then(|store| store.pending_verification(study, email))
    }
}

impl Drop for StubHandle {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

/// Starts the stub on an ephemeral local port.
///
/// # Errors
///
/// Returns [`StubError::Startup`] when the listener cannot be bound.
pub fn spawn_stub(config: StubConfig) -> Result<StubHandle, StubError> {
    let listener = StdTcpListener::bind("127.0.0.1:0")
        .map_err(|err| StubError::Startup(format!("bind failed: {err}")))?;
    listener
        .set_nonblocking(true)
        .map_err(|err| StubError::Startup(format!("listener nonblocking failed: {err}")))?;
    let addr =
        listener.local_addr().map_err(|err| StubError::Startup(format!("local addr failed: {err}")))?;
    let base_url = format!("http://{addr}");

    let store = Arc::new(Mutex::new(Store::seeded(&config, OffsetDateTime::now_utc())));
    let app = router(StubState::new(Arc::clone(&store)));
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let join = thread::spawn(move || {
        let runtime = match Builder::new_current_thread().enable_all().build() {
            Ok(runtime) => runtime,
            Err(err) => {
                tracing::error!(error = %err, "stub runtime failed to start");
                return;
            }
        };
        runtime.block_on(async move {
            let listener = match tokio::net::TcpListener::from_std(listener) {
                Ok(listener) => listener,
                Err(err) => {
                    tracing::error!(error = %err, "stub listener failed to register");
                    return;
                }
            };
            let server = axum::serve(listener, app).with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            });
            if let Err(err) = server.await {
                tracing::error!(error = %err, "stub server failed");
            }
        });
    });
    tracing::info!(base_url = %base_url, study = %config.study.identifier, "bridge stub started");
    Ok(StubHandle {
        base_url,
        config,
        store,
        shutdown: Some(shutdown_tx),
        join: Some(join),
    })
}
