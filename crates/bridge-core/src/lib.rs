// crates/bridge-core/src/lib.rs
// ============================================================================
// Module: Bridge Core Library
// Description: Public API surface for the Bridge wire model and rules.
// Purpose: Expose serializable types and the pure rules evaluated over them.
// Dependencies: crate::{core, schedule, survey}
// ============================================================================

//! ## Overview
//! Bridge core holds the study platform's wire vocabulary (accounts, studies,
//! schedule plans, scheduled activities, surveys) together with the rules the
//! platform applies to them: client-version-aware schedule selection,
//! scheduled activity projection and progress, and survey answer validation.
//! It performs no I/O; the HTTP client and the stub service both build on it.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod schedule;
pub mod survey;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use schedule::Activity;
pub use schedule::ActivityProgress;
pub use schedule::ActivityType;
pub use schedule::ActivityUpdate;
pub use schedule::Criteria;
pub use schedule::MAX_DAYS_AHEAD;
pub use schedule::MAX_MINIMUM_PER_SCHEDULE;
pub use schedule::PlanSchedule;
pub use schedule::ProgressError;
pub use schedule::Schedule;
pub use schedule::ScheduleCriteria;
pub use schedule::SchedulePlan;
pub use schedule::ScheduleStatus;
pub use schedule::ScheduleStrategy;
pub use schedule::ScheduleType;
pub use schedule::ScheduleWindow;
pub use schedule::ScheduledActivity;
pub use schedule::SurveyReference;
pub use schedule::TaskReference;
pub use schedule::instance_guid;
pub use schedule::project;
pub use survey::Constraints;
pub use survey::SURVEY_RESPONSE_ENTITY;
pub use survey::Survey;
pub use survey::SurveyAnswer;
pub use survey::SurveyElement;
pub use survey::SurveyInfoScreen;
pub use survey::SurveyQuestion;
pub use survey::SurveyQuestionOption;
pub use survey::SurveyResponse;
pub use survey::UiHint;
pub use survey::validate_answers;
