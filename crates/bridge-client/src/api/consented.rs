// crates/bridge-client/src/api/consented.rs
// ============================================================================
// Module: Consented Participant API
// Description: Consent, schedules, scheduled activities, and survey responses.
// Dependencies: bridge-core, reqwest
// ============================================================================

//! ## Overview
//! Participants must consent before any other call in this group succeeds;
//! until then the service answers 412. Consenting refreshes the session
//! stored on the client.

use bridge_core::ConsentSignature;
use bridge_core::IdentifierHolder;
use bridge_core::Message;
use bridge_core::ResourceList;
use bridge_core::Schedule;
use bridge_core::ScheduledActivity;
use bridge_core::SurveyAnswer;
use bridge_core::SurveyResponse;
use bridge_core::UserSessionInfo;
use reqwest::Method;

use crate::client::BridgeClient;
use crate::client::body;
use crate::error::ApiError;

/// Endpoints for signed-in, consented participants.
#[derive(Debug, Clone, Copy)]
pub struct ConsentedApi<'a> {
    client: &'a BridgeClient,
}

impl<'a> ConsentedApi<'a> {
    pub(crate) const fn new(client: &'a BridgeClient) -> Self {
        Self {
            client,
        }
    }

    /// Records consent and stores the refreshed session.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for an invalid signature.
    pub async fn create_consent_signature(
        &self,
        signature: &ConsentSignature,
    ) -> Result<UserSessionInfo, ApiError> {
        let session: UserSessionInfo = self
            .client
            .call(Method::POST, &["v3", "consents", "signature"], &[], body(signature)?)
            .await?;
        self.client.set_session(Some(session.clone()));
        Ok(session)
    }

    /// Lists the schedule selected from each plan for this client.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the service rejects the request.
    pub async fn get_schedules(&self) -> Result<ResourceList<Schedule>, ApiError> {
        self.client.call(Method::GET, &["v3", "schedules"], &[], None).await
    }

    /// Lists scheduled activities.
    ///
    /// `offset` is a UTC offset such as `+00:00`; `days_ahead` is 1 to 4 and
    /// `minimum_per_schedule` 0 to 5.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] for out-of-range parameters.
    pub async fn get_scheduled_activities(
        &self,
        offset: &str,
        days_ahead: u32,
        minimum_per_schedule: Option<u32>,
    ) -> Result<ResourceList<ScheduledActivity>, ApiError> {
        let mut query = vec![("offset", offset.to_string()), ("daysAhead", days_ahead.to_string())];
        if let Some(minimum) = minimum_per_schedule {
            query.push(("minimumPerSchedule", minimum.to_string()));
        }
        self.client.call(Method::GET, &["v3", "activities"], &query, None).await
    }

    /// Submits progress for scheduled activities.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] when progress would move backwards.
    pub async fn update_scheduled_activities(
        &self,
        activities: &[ScheduledActivity],
    ) -> Result<Message, ApiError> {
        self.client.call(Method::POST, &["v3", "activities"], &[], body(activities)?).await
    }

    /// Creates a survey response, optionally with a caller-chosen identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Conflict`] for a reused identifier and
    /// [`ApiError::Validation`] for invalid answers.
    pub async fn create_survey_response(
        &self,
        response: &SurveyResponse,
    ) -> Result<IdentifierHolder, ApiError> {
        self.client.call(Method::POST, &["v3", "surveyresponses"], &[], body(response)?).await
    }

    /// Reads a survey response.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for an unknown identifier.
    pub async fn get_survey_response(&self, identifier: &str) -> Result<SurveyResponse, ApiError> {
        self.client.call(Method::GET, &["v3", "surveyresponses", identifier], &[], None).await
    }

    /// Adds answers to an existing response.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for invalid answers.
    pub async fn add_answers_to_response(
        &self,
        identifier: &str,
        answers: &[SurveyAnswer],
    ) -> Result<IdentifierHolder, ApiError> {
        self.client
            .call(Method::POST, &["v3", "surveyresponses", identifier], &[], body(answers)?)
            .await
    }
}
