// crates/bridge-core/src/core/period.rs
// ============================================================================
// Module: Bridge Periods and Times of Day
// Description: ISO-8601 periods and wall-clock times used by schedules.
// Purpose: Parse, render, and apply calendar offsets such as `P1M` or `PT30M`.
// Dependencies: serde, thiserror, time
// ============================================================================

//! ## Overview
//! Schedules express delays, intervals, and expirations as ISO-8601 periods
//! (`P[n]Y[n]M[n]W[n]DT[n]H[n]M[n]S`). Periods keep their components so they
//! render back the way they were written. Calendar components are applied in
//! the timestamp's own offset; month arithmetic clamps to the last day of the
//! target month.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::fmt::Write as _;
use std::str::FromStr;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use thiserror::Error;
use time::Date;
use time::Duration;
use time::Month;
use time::OffsetDateTime;
use time::Time;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while parsing periods and times of day.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PeriodError {
    /// Value is not an ISO-8601 period.
    #[error("{0} is not a valid ISO-8601 period")]
    InvalidPeriod(String),
    /// Value is not a `HH:MM[:SS]` time of day.
    #[error("{0} is not a valid time of day")]
    InvalidTime(String),
}

// ============================================================================
// SECTION: Period
// ============================================================================

/// ISO-8601 period with integral components.
///
/// # Invariants
/// - At least one component is non-zero or was explicitly written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Period {
    /// Years.
    pub years: u32,
    /// Months.
    pub months: u32,
    /// Weeks.
    pub weeks: u32,
    /// Days.
    pub days: u32,
    /// Hours.
    pub hours: u32,
    /// Minutes.
    pub minutes: u32,
    /// Seconds.
    pub seconds: u32,
}

impl Period {
    /// Period of whole days.
    #[must_use]
    pub const fn days(days: u32) -> Self {
        Self {
            years: 0,
            months: 0,
            weeks: 0,
            days,
            hours: 0,
            minutes: 0,
            seconds: 0,
        }
    }

    /// Period of whole months.
    #[must_use]
    pub const fn months(months: u32) -> Self {
        Self {
            years: 0,
            months,
            weeks: 0,
            days: 0,
            hours: 0,
            minutes: 0,
            seconds: 0,
        }
    }

    /// Returns true when every component is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.years == 0
            && self.months == 0
            && self.weeks == 0
            && self.days == 0
            && self.hours == 0
            && self.minutes == 0
            && self.seconds == 0
    }

    /// Returns the period repeated `count` times, or `None` on overflow.
    #[must_use]
    pub fn times(&self, count: u32) -> Option<Self> {
        Some(Self {
            years: self.years.checked_mul(count)?,
            months: self.months.checked_mul(count)?,
            weeks: self.weeks.checked_mul(count)?,
            days: self.days.checked_mul(count)?,
            hours: self.hours.checked_mul(count)?,
            minutes: self.minutes.checked_mul(count)?,
            seconds: self.seconds.checked_mul(count)?,
        })
    }

    /// Adds the period to a timestamp, keeping its offset.
    ///
    /// Returns `None` when the result leaves the supported date range.
    #[must_use]
    pub fn add_to(&self, at: OffsetDateTime) -> Option<OffsetDateTime> {
        let total_months = self.years.checked_mul(12)?.checked_add(self.months)?;
        let date = add_months(at.date(), total_months)?;
        let shifted = at.replace_date(date);
        let days = i64::from(self.weeks) * 7 + i64::from(self.days);
        let clock = i64::from(self.hours) * 3_600
            + i64::from(self.minutes) * 60
            + i64::from(self.seconds);
        shifted.checked_add(Duration::days(days))?.checked_add(Duration::seconds(clock))
    }
}

/// Adds calendar months, clamping the day to the target month length.
fn add_months(date: Date, months: u32) -> Option<Date> {
    if months == 0 {
        return Some(date);
    }
    let zero_based = i64::from(date.year()) * 12 + i64::from(u8::from(date.month())) - 1;
    let target = zero_based.checked_add(i64::from(months))?;
    let year = i32::try_from(target.div_euclid(12)).ok()?;
    let month_number = u8::try_from(target.rem_euclid(12) + 1).ok()?;
    let month = Month::try_from(month_number).ok()?;
    let day = date.day();
    (day.min(28) ..= day)
        .rev()
        .find_map(|candidate| Date::from_calendar_date(year, month, candidate).ok())
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::from("P");
        for (value, unit) in
            [(self.years, 'Y'), (self.months, 'M'), (self.weeks, 'W'), (self.days, 'D')]
        {
            if value > 0 {
                let _ = write!(out, "{value}{unit}");
            }
        }
        if self.hours > 0 || self.minutes > 0 || self.seconds > 0 {
            out.push('T');
            for (value, unit) in [(self.hours, 'H'), (self.minutes, 'M'), (self.seconds, 'S')] {
                if value > 0 {
                    let _ = write!(out, "{value}{unit}");
                }
            }
        }
        if out.len() == 1 {
            out.push_str("0D");
        }
        f.write_str(&out)
    }
}

impl FromStr for Period {
    type Err = PeriodError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || PeriodError::InvalidPeriod(raw.to_string());
        let body = raw.trim().strip_prefix('P').ok_or_else(invalid)?;
        let (date_part, time_part) = match body.split_once('T') {
            Some((date, time)) if !time.is_empty() => (date, Some(time)),
            Some(_) => return Err(invalid()),
            None => (body, None),
        };
        if date_part.is_empty() && time_part.is_none() {
            return Err(invalid());
        }
        let mut period = Self::default();
        for (value, unit) in components(date_part).ok_or_else(invalid)? {
            let slot = match unit {
                'Y' => &mut period.years,
                'M' => &mut period.months,
                'W' => &mut period.weeks,
                'D' => &mut period.days,
                _ => return Err(invalid()),
            };
            *slot = value;
        }
        if let Some(time_part) = time_part {
            for (value, unit) in components(time_part).ok_or_else(invalid)? {
                let slot = match unit {
                    'H' => &mut period.hours,
                    'M' => &mut period.minutes,
                    'S' => &mut period.seconds,
                    _ => return Err(invalid()),
                };
                *slot = value;
            }
        }
        Ok(period)
    }
}

/// Splits `3D4H` style text into `(value, unit)` pairs.
fn components(raw: &str) -> Option<Vec<(u32, char)>> {
    let mut out = Vec::new();
    let mut digits = String::new();
    for ch in raw.chars() {
        if ch.is_ascii_digit() {
            digits.push(ch);
        } else {
            if digits.is_empty() {
                return None;
            }
            out.push((digits.parse().ok()?, ch));
            digits.clear();
        }
    }
    if digits.is_empty() { Some(out) } else { None }
}

impl Serialize for Period {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Period {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// SECTION: Time of Day
// ============================================================================

/// Wall-clock time of day written as `HH:MM` or `HH:MM:SS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LocalTime(Time);

impl LocalTime {
    /// Creates a time of day from hour and minute.
    ///
    /// # Errors
    ///
    /// Returns [`PeriodError::InvalidTime`] for out-of-range values.
    pub fn from_hm(hour: u8, minute: u8) -> Result<Self, PeriodError> {
        Time::from_hms(hour, minute, 0)
            .map(Self)
            .map_err(|_| PeriodError::InvalidTime(format!("{hour:02}:{minute:02}")))
    }

    /// Returns the underlying time.
    #[must_use]
    pub const fn time(self) -> Time {
        self.0
    }
}

impl fmt::Display for LocalTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (hour, minute, second) = self.0.as_hms();
        if second == 0 {
            write!(f, "{hour:02}:{minute:02}")
        } else {
            write!(f, "{hour:02}:{minute:02}:{second:02}")
        }
    }
}

impl FromStr for LocalTime {
    type Err = PeriodError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || PeriodError::InvalidTime(raw.to_string());
        let trimmed = raw.trim();
        let whole = trimmed.split_once('.').map_or(trimmed, |(whole, _)| whole);
        let mut parts = whole.split(':');
        let mut next = || -> Result<u8, PeriodError> {
            let part = parts.next().ok_or_else(invalid)?;
            if part.len() != 2 {
                return Err(invalid());
            }
            part.parse().map_err(|_| invalid())
        };
        let hour = next()?;
        let minute = next()?;
        let second = match parts.next() {
            Some(part) if part.len() == 2 => part.parse().map_err(|_| invalid())?,
            Some(_) => return Err(invalid()),
            None => 0,
        };
        if parts.next().is_some() {
            return Err(invalid());
        }
        Time::from_hms(hour, minute, second).map(Self).map_err(|_| invalid())
    }
}

impl Serialize for LocalTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for LocalTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
