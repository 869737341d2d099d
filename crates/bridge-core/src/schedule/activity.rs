// crates/bridge-core/src/schedule/activity.rs
// ============================================================================
// Module: Bridge Scheduled Activities
// Description: Materialized activity instances and their status lifecycle.
// Purpose: Track participant progress through scheduled, started, and finished.
// Dependencies: crate::{core, schedule::model}, serde, thiserror, time
// ============================================================================

//! ## Overview
//! A [`ScheduledActivity`] is one time-bound instance of an [`Activity`].
//! Its status is derived from client-submitted timestamps held in
//! [`ActivityProgress`]:
//! `scheduled` (neither set), `started` (`startedOn` set), `finished`
//! (`finishedOn` set).
//!
//! # Invariants
//! - Progress only moves forward; the first submitted timestamp is kept.
//! - A finished activity always has a `startedOn` no later than `finishedOn`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use time::OffsetDateTime;

use crate::core::Guid;
use crate::core::ValidationErrors;
use crate::schedule::model::Activity;

// ============================================================================
// SECTION: Status
// ============================================================================

/// Lifecycle status of a scheduled activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleStatus {
    /// Not yet started.
    Scheduled,
    /// Started by the participant.
    Started,
    /// Finished by the participant.
    Finished,
}

// ============================================================================
// SECTION: Scheduled Activity
// ============================================================================

/// Time-bound instance of an activity for one participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledActivity {
    /// Instance guid (`<activity guid>:<UTC scheduled time>Z`).
    pub guid: Guid,
    /// Plan that produced the instance.
    pub schedule_plan_guid: Guid,
    /// Activity to perform.
    pub activity: Activity,
    /// Time the instance becomes available.
    #[serde(with = "time::serde::rfc3339")]
    pub scheduled_on: OffsetDateTime,
    /// Time the instance stops being available.
    #[serde(default, with = "time::serde::rfc3339::option", skip_serializing_if = "Option::is_none")]
    pub expires_on: Option<OffsetDateTime>,
    /// Time the participant started the instance.
    #[serde(default, with = "time::serde::rfc3339::option", skip_serializing_if = "Option::is_none")]
    pub started_on: Option<OffsetDateTime>,
    /// Time the participant finished the instance.
    #[serde(default, with = "time::serde::rfc3339::option", skip_serializing_if = "Option::is_none")]
    pub finished_on: Option<OffsetDateTime>,
    /// Derived status.
    pub status: ScheduleStatus,
    /// Whether the instance comes from a persistent schedule.
    #[serde(default)]
    pub persistent: bool,
}

/// Progress submitted for one instance. Unknown fields are ignored, so a full
/// [`ScheduledActivity`] is accepted as an update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityUpdate {
    /// Instance guid.
    pub guid: Guid,
    /// Start time, if starting.
    #[serde(default, with = "time::serde::rfc3339::option", skip_serializing_if = "Option::is_none")]
    pub started_on: Option<OffsetDateTime>,
    /// Finish time, if finishing.
    #[serde(default, with = "time::serde::rfc3339::option", skip_serializing_if = "Option::is_none")]
    pub finished_on: Option<OffsetDateTime>,
}

impl From<&ScheduledActivity> for ActivityUpdate {
    fn from(activity: &ScheduledActivity) -> Self {
        Self {
            guid: activity.guid.clone(),
            started_on: activity.started_on,
            finished_on: activity.finished_on,
        }
    }
}

// ============================================================================
// SECTION: Progress
// ============================================================================

/// Errors raised when applying progress.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProgressError {
    /// Finish time precedes the start time.
    #[error("finishedOn {finished_on} is before startedOn {started_on}")]
    FinishedBeforeStarted {
        /// Recorded or submitted start.
        started_on: OffsetDateTime,
        /// Submitted finish.
        finished_on: OffsetDateTime,
    },
}

impl From<ProgressError> for ValidationErrors {
    fn from(error: ProgressError) -> Self {
        let mut errors = Self::new("ScheduledActivity");
        errors.push("finishedOn", error.to_string());
        errors
    }
}

/// Stored progress timestamps for one instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActivityProgress {
    /// Start time.
    pub started_on: Option<OffsetDateTime>,
    /// Finish time.
    pub finished_on: Option<OffsetDateTime>,
}

impl ActivityProgress {
    /// Applies submitted timestamps without moving progress backwards.
    ///
    /// # Errors
    ///
    /// Returns [`ProgressError::FinishedBeforeStarted`] and leaves the progress
    /// unchanged when the result would finish before it started.
    pub fn apply(
        &mut self,
        started_on: Option<OffsetDateTime>,
        finished_on: Option<OffsetDateTime>,
    ) -> Result<(), ProgressError> {
        let finished_on = self.finished_on.or(finished_on);
        let started_on = self.started_on.or(started_on).or(finished_on);
        if let (Some(started_on), Some(finished_on)) = (started_on, finished_on)
            && finished_on < started_on
        {
            return Err(ProgressError::FinishedBeforeStarted {
                started_on,
                finished_on,
            });
        }
        self.started_on = started_on;
        self.finished_on = finished_on;
        Ok(())
    }

    /// Returns the status implied by the recorded timestamps.
    #[must_use]
    pub const fn status(&self) -> ScheduleStatus {
        if self.finished_on.is_some() {
            ScheduleStatus::Finished
        } else if self.started_on.is_some() {
            ScheduleStatus::Started
        } else {
            ScheduleStatus::Scheduled
        }
    }
}
