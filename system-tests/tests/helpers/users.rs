// system-tests/tests/helpers/users.rs
// ============================================================================
// Module: Test User Helper
// Description: Ephemeral participant and developer accounts for system tests.
// Purpose: Create, sign in, re-identify, and release per-test accounts.
// Dependencies: bridge-client, bridge-core, rand, thiserror, tracing
// ============================================================================

//! ## Overview
//! [`TestUserHelper`] has the admin create an account with a unique
//! `bridge-testing+<test>-<random>@sagebase.org` address, signs it in with the
//! requested client identity, and optionally consents. A failure after the
//! account exists deletes it before the error is returned. The resulting
//! [`TestUser`] is a cheap handle; register it on a [`Teardown`] so the
//! account is signed out and deleted whatever the test outcome.

use std::collections::BTreeSet;
use std::sync::Arc;

use bridge_client::ApiError;
use bridge_client::BridgeClient;
use bridge_client::default_client_info;
use bridge_core::ClientInfo;
use bridge_core::ConsentSignature;
use bridge_core::Role;
use bridge_core::SharingScope;
use bridge_core::SignIn;
use bridge_core::SignUp;
use bridge_core::StudyId;
use bridge_core::UserSessionInfo;
use thiserror::Error;

use super::harness::TestEnvironment;
use super::teardown::Teardown;

/// Password given to every test account.
pub const TEST_PASSWORD: &str = "P4ssword!";

/// Failed account setup.
#[derive(Debug, Error)]
pub enum TestUserError {
    /// The service refused to register the account.
    #[error("could not register {email}: {message}")]
    Registration {
        /// Rejected address.
        email: String,
        /// Service message.
        message: String,
    },
    /// Any other client failure.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Builder for one test account.
pub struct TestUserHelper<'a> {
    env: &'a TestEnvironment,
    name: String,
    consent: bool,
    roles: BTreeSet<Role>,
    client_info: ClientInfo,
}

impl<'a> TestUserHelper<'a> {
    /// Starts a builder; `name` identifies the creating test in the email.
    pub fn new(env: &'a TestEnvironment, name: &str) -> Self {
        Self {
            env,
            name: name.to_string(),
            consent: false,
            roles: BTreeSet::new(),
            client_info: default_client_info(),
        }
    }

    /// Signs the consent after sign-in.
    #[must_use]
    pub const fn with_consent(mut self, consent: bool) -> Self {
        self.consent = consent;
        self
    }

    /// Grants roles at creation.
    #[must_use]
    pub fn with_roles(mut self, roles: &[Role]) -> Self {
        self.roles.extend(roles.iter().copied());
        self
    }

    /// Client identity used for sign-in and every later request.
    #[must_use]
    pub fn with_client_info(mut self, client_info: ClientInfo) -> Self {
        self.client_info = client_info;
        self
    }

    /// Creates the account and returns it signed in.
    pub async fn create_and_sign_in(self) -> Result<TestUser, TestUserError> {
        let email = unique_email(&self.name);
        let sign_up = SignUp {
            study: self.env.study().clone(),
            email: email.clone(),
            password: TEST_PASSWORD.to_string(),
            roles: self.roles.clone(),
        };
        let client = self.env.client(self.client_info.clone())?;
        let admin = self.env.admin().clone();
        let user_id = match admin.admin().create_user(&sign_up).await {
            Ok(holder) => holder.identifier,
            Err(ApiError::Conflict {
                message,
            }) => {
                return Err(TestUserError::Registration {
                    email,
                    message,
                });
            }
            Err(err) => return Err(err.into()),
        };
        let user = TestUser {
            inner: Arc::new(TestUserInner {
                client,
                admin,
                user_id,
                email,
                study: self.env.study().clone(),
            }),
        };
        if let Err(err) = user.finish_setup(self.consent).await {
            if let Err(cleanup) = user.sign_out_and_delete().await {
                tracing::error!(email = %user.email(), error = %cleanup, "failed to delete half-created user");
            }
            return Err(err.into());
        }
        tracing::info!(
            email = %user.email(),
            roles = ?self.roles,
            consented = self.consent,
            "created test user"
        );
        Ok(user)
    }
}

/// Handle to a signed-in test account.
#[derive(Debug, Clone)]
pub struct TestUser {
    inner: Arc<TestUserInner>,
}

#[derive(Debug)]
struct TestUserInner {
    client: BridgeClient,
    admin: BridgeClient,
    user_id: String,
    email: String,
    study: StudyId,
}

impl TestUser {
    /// Client carrying this account's session.
    pub fn client(&self) -> &BridgeClient {
        &self.inner.client
    }

    /// Account identifier.
    pub fn user_id(&self) -> &str {
        &self.inner.user_id
    }

    /// Account email.
    pub fn email(&self) -> &str {
        &self.inner.email
    }

    /// Account study.
    pub fn study(&self) -> &StudyId {
        &self.inner.study
    }

    /// Current session, if signed in.
    pub fn session(&self) -> Option<UserSessionInfo> {
        self.inner.client.session()
    }

    /// Credentials for this account.
    pub fn sign_in_request(&self) -> SignIn {
        SignIn {
            study: self.inner.study.clone(),
            email: self.inner.email.clone(),
            password: TEST_PASSWORD.to_string(),
        }
    }

    /// Signs in with the stored credentials.
    pub async fn sign_in(&self) -> Result<UserSessionInfo, ApiError> {
        self.inner.client.auth().sign_in(&self.sign_in_request()).await
    }

    /// Signs out; a missing session is a no-op.
    pub async fn sign_out(&self) -> Result<(), ApiError> {
        if self.inner.client.session_token().is_some() {
            self.inner.client.auth().sign_out().await?;
        }
        Ok(())
    }

    /// Replaces the client identity and signs in again.
    pub async fn re_sign_in(&self, client_info: ClientInfo) -> Result<UserSessionInfo, ApiError> {
        self.sign_out().await?;
        self.inner.client.set_client_info(client_info);
        self.sign_in().await
    }

    /// Signs out and deletes the account through the admin; an account that
    /// is already gone counts as deleted.
    pub async fn sign_out_and_delete(&self) -> Result<(), ApiError> {
        if let Err(err) = self.sign_out().await {
            tracing::warn!(email = %self.email(), error = %err, "sign-out before delete failed");
        }
        match self.inner.admin.admin().delete_user(self.user_id()).await {
            Ok(_) | Err(ApiError::NotFound {
                ..
            }) => Ok(()),
            Err(err) => Err(err),
        }
    }

    /// Registers [`Self::sign_out_and_delete`] on `teardown`.
    pub fn release_with(&self, teardown: &Teardown) {
        let user = self.clone();
        teardown.defer(format!("delete user {}", self.email()), async move {
            user.sign_out_and_delete().await
        });
    }

    async fn finish_setup(&self, consent: bool) -> Result<(), ApiError> {
        self.sign_in().await?;
        if consent {
            self.inner
                .client
                .consented()
                .create_consent_signature(&ConsentSignature {
                    name: "Bridge Test User".to_string(),
                    birthdate: "1970-01-01".to_string(),
                    scope: SharingScope::NoSharing,
                })
                .await?;
        }
        Ok(())
    }
}

/// Builds `bridge-testing+<test>-<random>@sagebase.org`.
fn unique_email(name: &str) -> String {
    format!("bridge-testing+{}-{:08x}@sagebase.org", slug(name), rand::random::<u32>())
}

/// Lower-case alphanumerics and dashes from a test name.
pub fn slug(name: &str) -> String {
    let mut out = String::new();
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
        } else if !out.ends_with('-') && !out.is_empty() {
            out.push('-');
        }
    }
    out.trim_end_matches('-').to_string()
}

/// Unique label or identifier derived from a test name.
pub fn random_identifier(name: &str) -> String {
    format!("{}-{:08x}", slug(name), rand::random::<u32>())
}
