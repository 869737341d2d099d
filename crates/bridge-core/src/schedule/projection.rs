// crates/bridge-core/src/schedule/projection.rs
// ============================================================================
// Module: Bridge Scheduled Activity Projection
// Description: Expands schedules into dated activity instances for a window.
// Purpose: Compute the scheduled activities a participant sees when listing.
// Dependencies: crate::{core, schedule}, time
// ============================================================================

//! ## Overview
//! Projection places each schedule relative to the participant's enrollment:
//! the first occurrence is `enrollment + delay`, recurring schedules repeat
//! every `interval`, and listed times of day pin each occurrence to a wall
//! clock time. Arithmetic runs in the window's schedule zone, which defaults
//! to the requested offset; the stub pins it to the first offset a participant
//! lists with. Instances are reported in the requested offset.
//!
//! The listing window ends at the close of day `today + days_ahead`. Per
//! schedule, occurrences past the window are still returned until
//! `minimum_per_schedule` occurrences have been produced. Expired and finished
//! instances are never listed. Persistent schedules keep one outstanding
//! instance per activity; finishing it schedules the next at the finish time.
//!
//! # Invariants
//! - Output is sorted by `scheduled_on`, then by instance guid.
//! - Instance guids are keyed by the UTC instant, so they do not change with
//!   the offset a listing is requested in.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use time::Duration;
use time::OffsetDateTime;
use time::UtcOffset;

use crate::core::Guid;
use crate::core::ValidationErrors;
use crate::schedule::activity::ActivityProgress;
use crate::schedule::activity::ScheduleStatus;
use crate::schedule::activity::ScheduledActivity;
use crate::schedule::model::Activity;
use crate::schedule::model::Schedule;
use crate::schedule::model::ScheduleType;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Largest accepted `daysAhead`.
pub const MAX_DAYS_AHEAD: u32 = 4;
/// Largest accepted `minimumPerSchedule`.
pub const MAX_MINIMUM_PER_SCHEDULE: u32 = 5;
/// Upper bound on occurrences examined per schedule.
const MAX_OCCURRENCE_SCAN: u32 = 1_000;

// ============================================================================
// SECTION: Window
// ============================================================================

/// Listing request resolved against a participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleWindow {
    enrollment: OffsetDateTime,
    now: OffsetDateTime,
    offset: UtcOffset,
    zone: UtcOffset,
    days_ahead: u32,
    minimum_per_schedule: u32,
    end: OffsetDateTime,
}

impl ScheduleWindow {
    /// Resolves a listing window.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationErrors`] when `days_ahead` is outside `1..=4` or
    /// `minimum_per_schedule` is above 5.
    pub fn new(
        enrollment: OffsetDateTime,
        now: OffsetDateTime,
        offset: UtcOffset,
        days_ahead: u32,
        minimum_per_schedule: u32,
    ) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new("ScheduleContext");
        if !(1 ..= MAX_DAYS_AHEAD).contains(&days_ahead) {
            errors.push(
                "daysAhead",
                format!("daysAhead must be from 1 to {MAX_DAYS_AHEAD} days"),
            );
        }
        if minimum_per_schedule > MAX_MINIMUM_PER_SCHEDULE {
            errors.push(
                "minimumPerSchedule",
                format!("minimumPerSchedule must be from 0 to {MAX_MINIMUM_PER_SCHEDULE}"),
            );
        }
        let local_now = now.to_offset(offset);
        let end = local_now
            .date()
            .checked_add(Duration::days(i64::from(days_ahead) + 1))
            .map(|date| date.midnight().assume_offset(offset));
        match end {
            Some(end) if errors.is_empty() => Ok(Self {
                enrollment,
                now,
                offset,
                zone: offset,
                days_ahead,
                minimum_per_schedule,
                end,
            }),
            Some(_) => Err(errors),
            None => {
                errors.push("daysAhead", "daysAhead leaves the supported date range");
                Err(errors)
            }
        }
    }

    /// Exclusive end of the listing window.
    #[must_use]
    pub const fn end(&self) -> OffsetDateTime {
        self.end
    }

    /// Requested offset.
    #[must_use]
    pub const fn offset(&self) -> UtcOffset {
        self.offset
    }

    /// Zone in which times of day and periods are resolved.
    #[must_use]
    pub const fn zone(&self) -> UtcOffset {
        self.zone
    }

    /// Resolves occurrences in `zone` instead of the requested offset.
    #[must_use]
    pub const fn with_zone(mut self, zone: UtcOffset) -> Self {
        self.zone = zone;
        self
    }

    /// Requested number of days ahead.
    #[must_use]
    pub const fn days_ahead(&self) -> u32 {
        self.days_ahead
    }

    /// Requested minimum occurrences per schedule.
    #[must_use]
    pub const fn minimum_per_schedule(&self) -> u32 {
        self.minimum_per_schedule
    }

    /// Enrollment time in the schedule zone, truncated to whole seconds.
    fn local_enrollment(&self) -> OffsetDateTime {
        let local = self.enrollment.to_offset(self.zone);
        local
            .checked_sub(Duration::nanoseconds(i64::from(local.nanosecond())))
            .unwrap_or(local)
    }
}

/// A schedule selected for a participant together with its plan.
#[derive(Debug, Clone, Copy)]
pub struct PlanSchedule<'a> {
    /// Plan guid.
    pub plan_guid: &'a Guid,
    /// Selected schedule.
    pub schedule: &'a Schedule,
}

// ============================================================================
// SECTION: Projection
// ============================================================================

/// Projects schedules into the scheduled activities visible in `window`.
///
/// `progress` holds recorded timestamps keyed by instance guid.
#[must_use]
pub fn project<'a>(
    window: &ScheduleWindow,
    schedules: impl IntoIterator<Item = PlanSchedule<'a>>,
    progress: &BTreeMap<Guid, ActivityProgress>,
) -> Vec<ScheduledActivity> {
    let mut out = Vec::new();
    for entry in schedules {
        let Some(base) = entry
            .schedule
            .delay
            .map_or(Some(window.local_enrollment()), |delay| delay.add_to(window.local_enrollment()))
        else {
            continue;
        };
        if entry.schedule.schedule_type == ScheduleType::Persistent {
            project_persistent(window, entry, base, progress, &mut out);
        } else {
            project_timed(window, entry, base, progress, &mut out);
        }
    }
    out.sort_by(|left, right| {
        left.scheduled_on
            .cmp(&right.scheduled_on)
            .then_with(|| left.guid.as_str().cmp(right.guid.as_str()))
    });
    out
}

/// Projects `ONCE` and `RECURRING` schedules.
fn project_timed(
    window: &ScheduleWindow,
    entry: PlanSchedule<'_>,
    base: OffsetDateTime,
    progress: &BTreeMap<Guid, ActivityProgress>,
    out: &mut Vec<ScheduledActivity>,
) {
    let schedule = entry.schedule;
    let interval = match schedule.schedule_type {
        ScheduleType::Recurring => schedule.interval.filter(|interval| !interval.is_zero()),
        ScheduleType::Once | ScheduleType::Persistent => None,
    };
    let rounds = if interval.is_some() { MAX_OCCURRENCE_SCAN } else { 1 };
    let mut produced = 0_u32;
    for round in 0 .. rounds {
        let anchor = match interval {
            Some(interval) if round > 0 => {
                match interval.times(round).and_then(|step| step.add_to(base)) {
                    Some(anchor) => anchor,
                    None => return,
                }
            }
            _ => base,
        };
        for slot in slots(anchor, schedule) {
            if schedule.ends_on.is_some_and(|ends_on| slot > ends_on) {
                return;
            }
            if schedule.starts_on.is_some_and(|starts_on| slot < starts_on) {
                continue;
            }
            let expires_on = schedule.expires.and_then(|expires| expires.add_to(slot));
            if expires_on.is_some_and(|expires_on| expires_on <= window.now) {
                continue;
            }
            if slot >= window.end && produced >= window.minimum_per_schedule {
                return;
            }
            let mut emitted = false;
            for activity in &schedule.activities {
                if let Some(instance) =
                    instance(entry, activity, slot, expires_on, window.offset, progress)
                {
                    out.push(instance);
                    emitted = true;
                }
            }
            if emitted {
                produced += 1;
            }
        }
    }
}

/// Projects `PERSISTENT` schedules: one outstanding instance per activity.
fn project_persistent(
    window: &ScheduleWindow,
    entry: PlanSchedule<'_>,
    base: OffsetDateTime,
    progress: &BTreeMap<Guid, ActivityProgress>,
    out: &mut Vec<ScheduledActivity>,
) {
    let schedule = entry.schedule;
    for activity in &schedule.activities {
        let mut cursor = match schedule.starts_on {
            Some(starts_on) if starts_on > base => starts_on.to_offset(window.zone),
            _ => base,
        };
        for _ in 0 .. MAX_OCCURRENCE_SCAN {
            if schedule.ends_on.is_some_and(|ends_on| cursor > ends_on) {
                break;
            }
            let guid = instance_guid(activity, cursor);
            match progress.get(&guid).and_then(|recorded| recorded.finished_on) {
                Some(finished_on) => {
                    let next = finished_on.to_offset(window.zone);
                    cursor = if next > cursor { next } else { cursor + Duration::seconds(1) };
                }
                None => {
                    if cursor < window.end || window.minimum_per_schedule > 0 {
                        out.extend(instance(entry, activity, cursor, None, window.offset, progress));
                    }
                    break;
                }
            }
        }
    }
}

/// Occurrence times for one anchor: the anchor itself, or the anchor's date at
/// each listed time of day.
fn slots(anchor: OffsetDateTime, schedule: &Schedule) -> Vec<OffsetDateTime> {
    if schedule.times.is_empty() {
        return vec![anchor];
    }
    let mut slots: Vec<OffsetDateTime> =
        schedule.times.iter().map(|time| anchor.replace_time(time.time())).collect();
    slots.sort();
    slots.dedup();
    slots
}

/// Builds an instance unless it is already finished.
fn instance(
    entry: PlanSchedule<'_>,
    activity: &Activity,
    scheduled_on: OffsetDateTime,
    expires_on: Option<OffsetDateTime>,
    offset: UtcOffset,
    progress: &BTreeMap<Guid, ActivityProgress>,
) -> Option<ScheduledActivity> {
    let guid = instance_guid(activity, scheduled_on);
    let recorded = progress.get(&guid).copied().unwrap_or_default();
    let status = recorded.status();
    if status == ScheduleStatus::Finished {
        return None;
    }
    Some(ScheduledActivity {
        guid,
        schedule_plan_guid: entry.plan_guid.clone(),
        activity: activity.clone(),
        scheduled_on: scheduled_on.to_offset(offset),
        expires_on: expires_on.map(|expires_on| expires_on.to_offset(offset)),
        started_on: recorded.started_on.map(|started_on| started_on.to_offset(offset)),
        finished_on: None,
        status,
        persistent: entry.schedule.is_persistent(),
    })
}

/// Formats `<activity guid>:<YYYY-MM-DDTHH:MM:SSZ>` from the UTC instant.
#[must_use]
pub fn instance_guid(activity: &Activity, scheduled_on: OffsetDateTime) -> Guid {
    let key = activity.guid.as_ref().map_or(activity.label.as_str(), Guid::as_str);
    let scheduled_on = scheduled_on.to_offset(UtcOffset::UTC);
    let (hour, minute, second) = scheduled_on.time().as_hms();
    Guid::new(format!(
        "{key}:{:04}-{:02}-{:02}T{hour:02}:{minute:02}:{second:02}Z",
        scheduled_on.year(),
        u8::from(scheduled_on.month()),
        scheduled_on.day(),
    ))
}
