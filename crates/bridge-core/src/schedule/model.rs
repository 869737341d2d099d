// crates/bridge-core/src/schedule/model.rs
// ============================================================================
// Module: Bridge Schedule Model
// Description: Schedule plans, strategies, schedules, and activity references.
// Purpose: Define the wire shapes developers submit to describe study schedules.
// Dependencies: crate::core, serde, time
// ============================================================================

//! ## Overview
//! A [`SchedulePlan`] pairs a [`ScheduleStrategy`] with one or more
//! [`Schedule`]s. The strategy is a tagged variant: a simple strategy holds a
//! single schedule, a criteria strategy holds ordered `(criteria, schedule)`
//! pairs gated by client app versions.
//!
//! Server-assigned fields (plan guid, version, modification time, activity
//! guids, and the persistent flag) are optional so the same types serve both
//! requests and responses.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use time::OffsetDateTime;

use crate::core::Guid;
use crate::core::LocalTime;
use crate::core::Period;
use crate::core::ValidationErrors;

// ============================================================================
// SECTION: Activities
// ============================================================================

/// Kind of work an activity asks the participant to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    /// App-defined task.
    Task,
    /// Survey hosted by the service.
    Survey,
}

/// Reference to an app-defined task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskReference {
    /// Task identifier understood by the app (for example `task:AAA`).
    pub identifier: String,
}

/// Reference to a survey revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyReference {
    /// Survey guid.
    pub guid: Guid,
    /// Revision timestamp; absent means the most recently published revision.
    #[serde(default, with = "time::serde::rfc3339::option", skip_serializing_if = "Option::is_none")]
    pub created_on: Option<OffsetDateTime>,
    /// Survey identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
}

/// Unit of work scheduled for participants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    /// Participant-facing label.
    pub label: String,
    /// Server-assigned activity guid.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guid: Option<Guid>,
    /// Activity kind, derived from the reference.
    pub activity_type: ActivityType,
    /// Task reference for task activities.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<TaskReference>,
    /// Survey reference for survey activities.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub survey: Option<SurveyReference>,
}

impl Activity {
    /// Creates a task activity.
    #[must_use]
    pub fn task(label: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            guid: None,
            activity_type: ActivityType::Task,
            task: Some(TaskReference {
                identifier: identifier.into(),
            }),
            survey: None,
        }
    }

    /// Creates a survey activity.
    #[must_use]
    pub fn survey(label: impl Into<String>, survey: SurveyReference) -> Self {
        Self {
            label: label.into(),
            guid: None,
            activity_type: ActivityType::Survey,
            task: None,
            survey: Some(survey),
        }
    }

    fn validate_into(&self, index: usize, errors: &mut ValidationErrors) {
        let field = format!("activities[{index}]");
        if self.label.trim().is_empty() {
            errors.push(format!("{field}.label"), format!("{field}.label is required"));
        }
        match (&self.task, &self.survey, self.activity_type) {
            (Some(task), None, ActivityType::Task) => {
                if task.identifier.trim().is_empty() {
                    errors.push(
                        format!("{field}.task.identifier"),
                        format!("{field}.task.identifier is required"),
                    );
                }
            }
            (None, Some(_), ActivityType::Survey) => {}
            _ => errors.push(
                field.clone(),
                format!("{field} must have exactly one task or survey reference matching its activityType"),
            ),
        }
    }
}

// ============================================================================
// SECTION: Schedules
// ============================================================================

/// Recurrence shape of a schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScheduleType {
    /// Scheduled a single time.
    Once,
    /// Scheduled every interval.
    Recurring,
    /// Always available; rescheduled as soon as it is finished.
    Persistent,
}

/// Timing rules and activities for one schedule.
///
/// # Invariants
/// - `persistent` is derived by the service from `schedule_type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    /// Schedule label.
    pub label: String,
    /// Recurrence shape.
    pub schedule_type: ScheduleType,
    /// Offset from enrollment to the first occurrence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay: Option<Period>,
    /// Spacing between recurring occurrences.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<Period>,
    /// Lifetime of each occurrence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<Period>,
    /// Times of day at which occurrences are placed.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub times: Vec<LocalTime>,
    /// Earliest time an occurrence may be scheduled.
    #[serde(default, with = "time::serde::rfc3339::option", skip_serializing_if = "Option::is_none")]
    pub starts_on: Option<OffsetDateTime>,
    /// Latest time an occurrence may be scheduled.
    #[serde(default, with = "time::serde::rfc3339::option", skip_serializing_if = "Option::is_none")]
    pub ends_on: Option<OffsetDateTime>,
    /// Activities scheduled at each occurrence.
    pub activities: Vec<Activity>,
    /// Whether the schedule is persistent (server-derived).
    #[serde(default)]
    pub persistent: bool,
}

impl Schedule {
    /// Creates a schedule with no timing rules.
    #[must_use]
    pub fn new(label: impl Into<String>, schedule_type: ScheduleType) -> Self {
        Self {
            label: label.into(),
            schedule_type,
            delay: None,
            interval: None,
            expires: None,
            times: Vec::new(),
            starts_on: None,
            ends_on: None,
            activities: Vec::new(),
            persistent: false,
        }
    }

    /// Returns true when the schedule type makes it persistent.
    #[must_use]
    pub fn is_persistent(&self) -> bool {
        self.schedule_type == ScheduleType::Persistent
    }

    /// Validates the schedule, prefixing fields with `path`.
    pub(crate) fn validate_into(&self, path: &str, errors: &mut ValidationErrors) {
        if self.label.trim().is_empty() {
            errors.push(format!("{path}.label"), format!("{path}.label is required"));
        }
        match self.schedule_type {
            ScheduleType::Recurring => {
                if self.interval.is_none_or(|interval| interval.is_zero()) {
                    errors.push(
                        format!("{path}.interval"),
                        format!("{path}.interval is required for a recurring schedule"),
                    );
                }
            }
            ScheduleType::Once | ScheduleType::Persistent => {
                if self.interval.is_some() {
                    errors.push(
                        format!("{path}.interval"),
                        format!("{path}.interval is only allowed for a recurring schedule"),
                    );
                }
            }
        }
        if self.schedule_type == ScheduleType::Persistent && self.expires.is_some() {
            errors.push(
                format!("{path}.expires"),
                format!("{path}.expires is not allowed for a persistent schedule"),
            );
        }
        if self.expires.is_some_and(|expires| expires.is_zero()) {
            errors.push(format!("{path}.expires"), format!("{path}.expires must be positive"));
        }
        if let (Some(starts_on), Some(ends_on)) = (self.starts_on, self.ends_on)
            && starts_on >= ends_on
        {
            errors.push(
                format!("{path}.endsOn"),
                format!("{path}.endsOn must be after startsOn"),
            );
        }
        if self.activities.is_empty() {
            errors.push(
                format!("{path}.activities"),
                format!("{path}.activities requires at least one activity"),
            );
        }
        let mut nested = ValidationErrors::new("Schedule");
        for (index, activity) in self.activities.iter().enumerate() {
            activity.validate_into(index, &mut nested);
        }
        for message in nested.messages {
            errors.push(format!("{path}.activities"), format!("{path}.{message}"));
        }
    }
}

// ============================================================================
// SECTION: Criteria
// ============================================================================

/// Per-OS app version bounds gating a schedule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Criteria {
    /// Minimum admitted app version per OS name.
    #[serde(default)]
    pub min_app_versions: BTreeMap<String, u32>,
    /// Maximum admitted app version per OS name.
    #[serde(default)]
    pub max_app_versions: BTreeMap<String, u32>,
}

impl Criteria {
    /// Sets the minimum app version for an OS.
    #[must_use]
    pub fn with_min(mut self, os: impl Into<String>, version: u32) -> Self {
        self.min_app_versions.insert(os.into(), version);
        self
    }

    /// Sets the maximum app version for an OS.
    #[must_use]
    pub fn with_max(mut self, os: impl Into<String>, version: u32) -> Self {
        self.max_app_versions.insert(os.into(), version);
        self
    }
}

/// Criteria paired with the schedule it gates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleCriteria {
    /// Gate.
    pub criteria: Criteria,
    /// Schedule delivered when the gate admits the client.
    pub schedule: Schedule,
}

// ============================================================================
// SECTION: Plans
// ============================================================================

/// Strategy selecting a schedule for a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ScheduleStrategy {
    /// A single schedule for every client.
    #[serde(rename = "SimpleScheduleStrategy")]
    Simple {
        /// The schedule.
        schedule: Schedule,
    },
    /// Ordered criteria-gated schedules.
    #[serde(rename = "CriteriaScheduleStrategy", rename_all = "camelCase")]
    Criteria {
        /// Ordered `(criteria, schedule)` pairs.
        schedule_criteria: Vec<ScheduleCriteria>,
    },
}

impl ScheduleStrategy {
    /// Returns every schedule in declaration order.
    #[must_use]
    pub fn schedules(&self) -> Vec<&Schedule> {
        match self {
            Self::Simple {
                schedule,
            } => vec![schedule],
            Self::Criteria {
                schedule_criteria,
            } => schedule_criteria.iter().map(|pair| &pair.schedule).collect(),
        }
    }

    /// Returns every schedule mutably in declaration order.
    pub fn schedules_mut(&mut self) -> Vec<&mut Schedule> {
        match self {
            Self::Simple {
                schedule,
            } => vec![schedule],
            Self::Criteria {
                schedule_criteria,
            } => schedule_criteria.iter_mut().map(|pair| &mut pair.schedule).collect(),
        }
    }
}

/// Server-side pairing of a strategy with its schedules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulePlan {
    /// Server-assigned guid.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guid: Option<Guid>,
    /// Plan label.
    pub label: String,
    /// Optimistic-lock version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,
    /// Last modification time.
    #[serde(default, with = "time::serde::rfc3339::option", skip_serializing_if = "Option::is_none")]
    pub modified_on: Option<OffsetDateTime>,
    /// Selection strategy.
    pub strategy: ScheduleStrategy,
}

impl SchedulePlan {
    /// Creates a plan with a single schedule.
    #[must_use]
    pub fn simple(label: impl Into<String>, schedule: Schedule) -> Self {
        Self {
            guid: None,
            label: label.into(),
            version: None,
            modified_on: None,
            strategy: ScheduleStrategy::Simple {
                schedule,
            },
        }
    }

    /// Creates a plan with ordered criteria-gated schedules.
    #[must_use]
    pub fn criteria(label: impl Into<String>, schedule_criteria: Vec<ScheduleCriteria>) -> Self {
        Self {
            guid: None,
            label: label.into(),
            version: None,
            modified_on: None,
            strategy: ScheduleStrategy::Criteria {
                schedule_criteria,
            },
        }
    }

    /// Validates the plan and all of its schedules.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationErrors`] naming each violated field.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new("SchedulePlan");
        if self.label.trim().is_empty() {
            errors.push("label", "label is required");
        }
        match &self.strategy {
            ScheduleStrategy::Simple {
                schedule,
            } => schedule.validate_into("strategy.schedule", &mut errors),
            ScheduleStrategy::Criteria {
                schedule_criteria,
            } => {
                if schedule_criteria.is_empty() {
                    errors.push(
                        "strategy.scheduleCriteria",
                        "strategy.scheduleCriteria requires at least one schedule",
                    );
                }
                for (index, pair) in schedule_criteria.iter().enumerate() {
                    pair.schedule.validate_into(
                        &format!("strategy.scheduleCriteria[{index}].schedule"),
                        &mut errors,
                    );
                }
            }
        }
        errors.into_result()
    }
}
