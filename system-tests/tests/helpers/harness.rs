// system-tests/tests/helpers/harness.rs
// ============================================================================
// Module: Bridge Test Harness
// Description: Resolves the service under test and signs in its admin.
// Purpose: Provide deterministic service startup and client construction.
// Dependencies: system-tests, bridge-client, bridge-stub
// ============================================================================

use std::future::Future;
use std::sync::Arc;

use bridge_client::ApiError;
use bridge_client::BridgeClient;
use bridge_client::ClientConfig;
use bridge_client::default_client_info;
use bridge_core::ClientInfo;
use bridge_core::SignIn;
use bridge_core::StudyId;
use bridge_stub::StubConfig;
use bridge_stub::StubError;
use bridge_stub::StubHandle;
use bridge_stub::spawn_stub;
use system_tests::config::SystemTestConfig;
use thiserror::Error;

use super::artifacts::TestArtifacts;
use super::artifacts::TestReporter;
use super::logging::init_logging;
use super::readiness::wait_for_service_ready;
use super::teardown::TestError;
use super::teardown::Teardown;
use super::teardown::guarded;
use super::timeouts::READINESS_TIMEOUT;
use super::timeouts::REQUEST_TIMEOUT;
use super::timeouts::resolve_timeout;
use super::users::TestUser;
use super::users::TestUserHelper;

/// Failure to bring up the environment.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// Environment variables are invalid.
    #[error("invalid system-test configuration: {0}")]
    Config(String),
    /// The in-process stub failed to start.
    #[error(transparent)]
    Stub(#[from] StubError),
    /// A client could not be built or the admin could not sign in.
    #[error(transparent)]
    Api(#[from] ApiError),
    /// The service never answered.
    #[error("{0}")]
    NotReady(String),
}

/// Service under test plus a signed-in admin client.
///
/// Cloning shares the stub; the stub stops when the last clone drops.
#[derive(Clone)]
pub struct TestEnvironment {
    config: SystemTestConfig,
    host_url: String,
    study: StudyId,
    stub: Option<Arc<StubHandle>>,
    admin: BridgeClient,
}

impl TestEnvironment {
    /// Loads configuration, starts the stub when no host is configured, and
    /// signs in the admin account.
    pub async fn start() -> Result<Self, HarnessError> {
        let config = SystemTestConfig::load().map_err(HarnessError::Config)?;
        init_logging(&config);
        let study = StudyId::new(config.study.clone());
        let (host_url, admin_email, admin_password, stub) = match &config.host_url {
            Some(host_url) => (
                host_url.clone(),
                config.admin_email.clone().unwrap_or_default(),
                config.admin_password.clone().unwrap_or_default(),
                None,
            ),
            None => {
                let mut stub_config = StubConfig::new(study.clone());
                if let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password)
                {
                    stub_config = stub_config.with_admin(email.clone(), password.clone());
                }
                let stub = spawn_stub(stub_config)?;
                (
                    stub.base_url().to_string(),
                    stub.admin_email().to_string(),
                    stub.admin_password().to_string(),
                    Some(Arc::new(stub)),
                )
            }
        };
        let admin = build_client(&config, &host_url, default_client_info())?;
        wait_for_service_ready(&admin, resolve_timeout(&config, READINESS_TIMEOUT))
            .await
            .map_err(HarnessError::NotReady)?;
        admin
            .auth()
            .sign_in(&SignIn {
                study: study.clone(),
                email: admin_email,
                password: admin_password,
            })
            .await?;
        tracing::info!(host = %host_url, study = %study, hermetic = stub.is_some(), "test environment ready");
        Ok(Self {
            config,
            host_url,
            study,
            stub,
            admin,
        })
    }

    /// Loaded configuration.
    pub const fn config(&self) -> &SystemTestConfig {
        &self.config
    }

    /// Service root.
    pub fn host_url(&self) -> &str {
        &self.host_url
    }

    /// Study the test accounts belong to.
    pub const fn study(&self) -> &StudyId {
        &self.study
    }

    /// Signed-in admin client.
    pub const fn admin(&self) -> &BridgeClient {
        &self.admin
    }

    /// In-process stub, when the suites are hermetic.
    pub fn stub(&self) -> Option<&StubHandle> {
        self.stub.as_deref()
    }

    /// Builds an unauthenticated client carrying `client_info`.
    pub fn client(&self, client_info: ClientInfo) -> Result<BridgeClient, ApiError> {
        build_client(&self.config, &self.host_url, client_info)
    }

    /// Copy of this environment whose new clients target `host_url`.
    ///
    /// The admin client and the stub are shared with `self`.
    pub fn with_client_host(&self, host_url: impl Into<String>) -> Self {
        Self {
            host_url: host_url.into(),
            ..self.clone()
        }
    }

    /// Starts an artifact reporter for the named test.
    pub fn reporter(&self, test_name: &str) -> std::io::Result<TestReporter> {
        TestReporter::new(&self.config, test_name)
    }
}

fn build_client(
    config: &SystemTestConfig,
    host_url: &str,
    client_info: ClientInfo,
) -> Result<BridgeClient, ApiError> {
    let client_config = ClientConfig::new(host_url)?
        .with_timeout(resolve_timeout(config, REQUEST_TIMEOUT))
        .with_client_info(client_info);
    BridgeClient::new(client_config)
}

// ============================================================================
// SECTION: Test Runner
// ============================================================================

/// Everything a test body needs, owned so the body can run on its own task.
#[derive(Clone)]
pub struct TestContext {
    /// Service under test.
    pub env: TestEnvironment,
    /// Cleanup stack run after the body.
    pub teardown: Teardown,
    /// Artifact sink for transcripts and notes.
    pub artifacts: TestArtifacts,
    name: String,
}

impl TestContext {
    /// Test name, used in generated emails and labels.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Starts a user builder named after the test.
    pub fn user(&self) -> TestUserHelper<'_> {
        TestUserHelper::new(&self.env, &self.name)
    }

    /// Registers `user` for release and records its transcript as `label`.
    pub fn adopt(&self, label: &str, user: &TestUser) {
        user.release_with(&self.teardown);
        self.artifacts.track(label, user.client());
    }
}

/// Starts the environment, runs `body` under [`guarded`] teardown, and writes
/// the test summary.
pub async fn run_system_test<F, Fut>(name: &str, body: F) -> Result<(), TestError>
where
    F: FnOnce(TestContext) -> Fut,
    Fut: Future<Output = Result<(), TestError>> + Send + 'static,
{
    let env = TestEnvironment::start().await?;
    let mut reporter = env.reporter(name)?;
    reporter.artifacts().track("admin", env.admin());
    let context = TestContext {
        env,
        teardown: Teardown::new(),
        artifacts: reporter.artifacts().clone(),
        name: name.to_string(),
    };
    let teardown = context.teardown.clone();
    guarded(&teardown, body(context)).await?;
    reporter.finish("pass", Vec::new(), Vec::new())?;
    Ok(())
}
