// crates/bridge-core/src/schedule/selection.rs
// ============================================================================
// Module: Bridge Schedule Selection
// Description: Client-version-aware choice of a schedule from a strategy.
// Purpose: Decide which schedule of a plan applies to a calling client.
// Dependencies: crate::{core, schedule::model}
// ============================================================================

//! ## Overview
//! Criteria pairs are evaluated in declaration order against the client's OS
//! name and app version. The first admitting pair wins. When nothing admits
//! the client, the first pair's schedule is returned; a criteria strategy never
//! leaves a client without a schedule unless it has no pairs at all.
//!
//! Bounds are inclusive. A missing bound, a bound for another OS, or a client
//! that does not report an OS name or app version leaves the client
//! unconstrained.

use crate::core::ClientInfo;
use crate::schedule::model::Criteria;
use crate::schedule::model::Schedule;
use crate::schedule::model::ScheduleStrategy;

impl Criteria {
    /// Returns true when the client's app version lies within the bounds for
    /// its OS.
    #[must_use]
    pub fn matches(&self, client: &ClientInfo) -> bool {
        let (Some(os), Some(version)) = (client.os_name.as_deref(), client.app_version) else {
            return true;
        };
        let above_min = self.min_app_versions.get(os).is_none_or(|min| version >= *min);
        let below_max = self.max_app_versions.get(os).is_none_or(|max| version <= *max);
        above_min && below_max
    }
}

impl ScheduleStrategy {
    /// Selects the schedule delivered to `client`.
    ///
    /// Returns `None` only for a criteria strategy with no pairs.
    #[must_use]
    pub fn select(&self, client: &ClientInfo) -> Option<&Schedule> {
        match self {
            Self::Simple {
                schedule,
            } => Some(schedule),
            Self::Criteria {
                schedule_criteria,
            } => schedule_criteria
                .iter()
                .find(|pair| pair.criteria.matches(client))
                .or_else(|| schedule_criteria.first())
                .map(|pair| &pair.schedule),
        }
    }
}
