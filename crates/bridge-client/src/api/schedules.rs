// crates/bridge-client/src/api/schedules.rs
// ============================================================================
// Module: Schedule Plan API
// Description: Developer management of schedule plans.
// Dependencies: bridge-core, reqwest
// ============================================================================

use bridge_core::Guid;
use bridge_core::GuidVersionHolder;
use bridge_core::Message;
use bridge_core::ResourceList;
use bridge_core::SchedulePlan;
use reqwest::Method;

use crate::client::BridgeClient;
use crate::client::body;
use crate::error::ApiError;

/// Endpoints requiring the `developer` role.
#[derive(Debug, Clone, Copy)]
pub struct SchedulesApi<'a> {
    client: &'a BridgeClient,
}

impl<'a> SchedulesApi<'a> {
    pub(crate) const fn new(client: &'a BridgeClient) -> Self {
        Self {
            client,
        }
    }

    /// Creates a plan; the service assigns its guid and activity guids.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for an invalid plan.
    pub async fn create_schedule_plan(
        &self,
        plan: &SchedulePlan,
    ) -> Result<GuidVersionHolder, ApiError> {
        self.client.call(Method::POST, &["v3", "scheduleplans"], &[], body(plan)?).await
    }

    /// Lists the study's plans.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the service rejects the request.
    pub async fn get_schedule_plans(&self) -> Result<ResourceList<SchedulePlan>, ApiError> {
        self.client.call(Method::GET, &["v3", "scheduleplans"], &[], None).await
    }

    /// Reads one plan.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for an unknown plan.
    pub async fn get_schedule_plan(&self, guid: &Guid) -> Result<SchedulePlan, ApiError> {
        self.client.call(Method::GET, &["v3", "scheduleplans", guid.as_str()], &[], None).await
    }

    /// Updates a plan. The submitted version must match the stored one.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRequest`] for a plan without a guid and
    /// [`ApiError::Conflict`] for a stale version.
    pub async fn update_schedule_plan(
        &self,
        plan: &SchedulePlan,
    ) -> Result<GuidVersionHolder, ApiError> {
        let guid = plan
            .guid
            .as_ref()
            .ok_or_else(|| ApiError::InvalidRequest("schedule plan has no guid".to_string()))?;
        self.client.call(Method::POST, &["v3", "scheduleplans", guid.as_str()], &[], body(plan)?).await
    }

    /// Deletes a plan.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for an unknown plan.
    pub async fn delete_schedule_plan(&self, guid: &Guid) -> Result<Message, ApiError> {
        self.client.call(Method::DELETE, &["v3", "scheduleplans", guid.as_str()], &[], None).await
    }
}
