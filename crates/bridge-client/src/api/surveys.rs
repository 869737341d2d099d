// crates/bridge-client/src/api/surveys.rs
// ============================================================================
// Module: Survey API
// Description: Survey authoring and revision reads.
// Dependencies: bridge-core, reqwest, time
// ============================================================================

use bridge_core::Guid;
use bridge_core::GuidCreatedOnVersionHolder;
use bridge_core::Survey;
use reqwest::Method;
use time::OffsetDateTime;

use crate::api::revision_segment;
use crate::client::BridgeClient;
use crate::client::body;
use crate::error::ApiError;

/// Survey endpoints. Authoring requires the `developer` role.
#[derive(Debug, Clone, Copy)]
pub struct SurveysApi<'a> {
    client: &'a BridgeClient,
}

impl<'a> SurveysApi<'a> {
    pub(crate) const fn new(client: &'a BridgeClient) -> Self {
        Self {
            client,
        }
    }

    /// Creates a survey revision.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for an invalid survey.
    pub async fn create_survey(&self, survey: &Survey) -> Result<GuidCreatedOnVersionHolder, ApiError> {
        self.client.call(Method::POST, &["v3", "surveys"], &[], body(survey)?).await
    }

    /// Publishes a survey revision.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for an unknown revision.
    pub async fn publish_survey(
        &self,
        keys: &GuidCreatedOnVersionHolder,
    ) -> Result<GuidCreatedOnVersionHolder, ApiError> {
        let created_on = revision_segment(keys.created_on)?;
        self.client
            .call(
                Method::POST,
                &["v3", "surveys", keys.guid.as_str(), "revisions", &created_on, "publish"],
                &[],
                None,
            )
            .await
    }

    /// Reads a survey revision with element guids.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for an unknown revision.
    pub async fn get_survey(&self, guid: &Guid, created_on: OffsetDateTime) -> Result<Survey, ApiError> {
        let created_on = revision_segment(created_on)?;
        self.client
            .call(Method::GET, &["v3", "surveys", guid.as_str(), "revisions", &created_on], &[], None)
            .await
    }
}
