// crates/bridge-core/src/schedule/mod.rs
// ============================================================================
// Module: Bridge Schedules
// Description: Schedule plans, client-aware selection, and activity projection.
// Purpose: Group the scheduling model with the rules that evaluate it.
// Dependencies: crate::core, serde, thiserror, time
// ============================================================================

//! ## Overview
//! Developers publish [`SchedulePlan`]s. For each participant the service
//! selects one schedule per plan based on the participant's client, then
//! projects the selected schedules into [`ScheduledActivity`] instances whose
//! status advances with submitted [`ActivityProgress`].

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod activity;
pub mod model;
pub mod projection;
pub mod selection;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use activity::ActivityProgress;
pub use activity::ActivityUpdate;
pub use activity::ProgressError;
pub use activity::ScheduleStatus;
pub use activity::ScheduledActivity;
pub use model::Activity;
pub use model::ActivityType;
pub use model::Criteria;
pub use model::Schedule;
pub use model::ScheduleCriteria;
pub use model::SchedulePlan;
pub use model::ScheduleStrategy;
pub use model::ScheduleType;
pub use model::SurveyReference;
pub use model::TaskReference;
pub use projection::MAX_DAYS_AHEAD;
pub use projection::MAX_MINIMUM_PER_SCHEDULE;
pub use projection::PlanSchedule;
pub use projection::ScheduleWindow;
pub use projection::instance_guid;
pub use projection::project;
