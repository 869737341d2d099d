// crates/bridge-client/src/api/auth.rs
// ============================================================================
// Module: Authentication API
// Description: Sign-up, sign-in, sign-out, and account email flows.
// Dependencies: bridge-core, reqwest
// ============================================================================

use bridge_core::Email;
use bridge_core::EmailVerification;
use bridge_core::Message;
use bridge_core::SignIn;
use bridge_core::SignUp;
use bridge_core::UserSessionInfo;
use reqwest::Method;

use crate::client::BridgeClient;
use crate::client::body;
use crate::error::ApiError;

/// Public authentication endpoints.
#[derive(Debug, Clone, Copy)]
pub struct AuthApi<'a> {
    client: &'a BridgeClient,
}

impl<'a> AuthApi<'a> {
    pub(crate) const fn new(client: &'a BridgeClient) -> Self {
        Self {
            client,
        }
    }

    /// Registers an account. Responses do not reveal whether the email was
    /// already registered.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the service rejects the request.
    pub async fn sign_up(&self, sign_up: &SignUp) -> Result<Message, ApiError> {
        self.client.call(Method::POST, &["v3", "auth", "signUp"], &[], body(sign_up)?).await
    }

    /// Signs in and stores the returned session on the client.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for unknown accounts or the wrong study.
    pub async fn sign_in(&self, sign_in: &SignIn) -> Result<UserSessionInfo, ApiError> {
        let session: UserSessionInfo =
            self.client.call(Method::POST, &["v3", "auth", "signIn"], &[], body(sign_in)?).await?;
        tracing::info!(email = %session.email, study = %session.study_id, "signed in");
        self.client.set_session(Some(session.clone()));
        Ok(session)
    }

    /// Ends the current session and clears it from the client.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the service rejects the request; the local
    /// session is cleared regardless.
    pub async fn sign_out(&self) -> Result<Message, ApiError> {
        let result = self.client.call(Method::POST, &["v3", "auth", "signOut"], &[], None).await;
        self.client.set_session(None);
        result
    }

    /// Requests another verification email.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the service rejects the request.
    pub async fn resend_email_verification(&self, email: &Email) -> Result<Message, ApiError> {
        self.client
            .call(Method::POST, &["v3", "auth", "resendEmailVerification"], &[], body(email)?)
            .await
    }

    /// Requests a password reset email.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the service rejects the request.
    pub async fn request_reset_password(&self, email: &Email) -> Result<Message, ApiError> {
        self.client
            .call(Method::POST, &["v3", "auth", "requestResetPassword"], &[], body(email)?)
            .await
    }

    /// Submits an email verification token.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] when the token matches no account.
    pub async fn verify_email(&self, verification: &EmailVerification) -> Result<Message, ApiError> {
        self.client
            .call(Method::POST, &["v3", "auth", "verifyEmail"], &[], body(verification)?)
            .await
    }
}
