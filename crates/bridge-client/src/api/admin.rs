// crates/bridge-client/src/api/admin.rs
// ============================================================================
// Module: Administration API
// Description: Study, account, and survey administration.
// Dependencies: bridge-core, reqwest
// ============================================================================

use bridge_core::GuidCreatedOnVersionHolder;
use bridge_core::IdentifierHolder;
use bridge_core::Message;
use bridge_core::SignUp;
use bridge_core::Study;
use bridge_core::StudyId;
use bridge_core::VersionHolder;
use reqwest::Method;

use crate::api::revision_segment;
use crate::client::BridgeClient;
use crate::client::body;
use crate::error::ApiError;

/// Endpoints requiring the `admin` role.
#[derive(Debug, Clone, Copy)]
pub struct AdminApi<'a> {
    client: &'a BridgeClient,
}

impl<'a> AdminApi<'a> {
    pub(crate) const fn new(client: &'a BridgeClient) -> Self {
        Self {
            client,
        }
    }

    /// Creates a study.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Conflict`] for an existing identifier and
    /// [`ApiError::Validation`] for an invalid study.
    pub async fn create_study(&self, study: &Study) -> Result<VersionHolder, ApiError> {
        self.client.call(Method::POST, &["v3", "studies"], &[], body(study)?).await
    }

    /// Reads a study.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for an unknown study.
    pub async fn get_study(&self, study: &StudyId) -> Result<Study, ApiError> {
        self.client.call(Method::GET, &["v3", "studies", study.as_str()], &[], None).await
    }

    /// Deletes a study.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for an unknown study.
    pub async fn delete_study(&self, study: &StudyId) -> Result<Message, ApiError> {
        self.client.call(Method::DELETE, &["v3", "studies", study.as_str()], &[], None).await
    }

    /// Creates an account with roles, bypassing email verification.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Conflict`] when the email is already registered.
    pub async fn create_user(&self, sign_up: &SignUp) -> Result<IdentifierHolder, ApiError> {
        self.client.call(Method::POST, &["v3", "users"], &[], body(sign_up)?).await
    }

    /// Deletes an account and everything it owns.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] when the account does not exist.
    pub async fn delete_user(&self, user_id: &str) -> Result<Message, ApiError> {
        self.client.call(Method::DELETE, &["v3", "users", user_id], &[], None).await
    }

    /// Permanently deletes a survey revision.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for an unknown revision.
    pub async fn delete_survey_permanently(
        &self,
        keys: &GuidCreatedOnVersionHolder,
    ) -> Result<Message, ApiError> {
        let created_on = revision_segment(keys.created_on)?;
        self.client
            .call(
                Method::DELETE,
                &["v3", "surveys", keys.guid.as_str(), "revisions", &created_on],
                &[],
                None,
            )
            .await
    }
}
