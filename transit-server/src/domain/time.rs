//! Service-day time handling.
//!
//! Schedule feeds give times as "HH:MM:SS" strings measured from the start
//! of the service day. Post-midnight service on the same logical day is
//! written with hours past 24 ("25:10:00"). This module provides a single
//! minutes-since-service-day-start representation that every piece of time
//! arithmetic in the planner goes through.

use std::fmt;
use std::ops::{Add, Sub};

use chrono::{NaiveTime, Timelike};

/// Minutes in one service day.
pub const MINUTES_PER_DAY: i32 = 24 * 60;

/// Reference times later than this are treated as "late evening" for
/// overnight normalization (20:00).
const LATE_EVENING_MINS: i32 = 20 * 60;

/// Visit times earlier than this may belong to the next day's early
/// service (04:00).
const EARLY_MORNING_MINS: i32 = 4 * 60;

/// Largest hour accepted in a schedule time. GTFS feeds rarely exceed 30.
const MAX_HOUR: i32 = 47;

/// Error returned when parsing an invalid time string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// A time measured in whole minutes from the start of the service day.
///
/// Values may exceed 24:00 to represent post-midnight service. Seconds are
/// truncated when parsing.
///
/// # Examples
///
/// ```
/// use transit_server::domain::ServiceTime;
///
/// let t = ServiceTime::parse("08:20:00").unwrap();
/// assert_eq!(t.minutes(), 8 * 60 + 20);
///
/// // Post-midnight service keeps counting past 24:00
/// let late = ServiceTime::parse("25:10:00").unwrap();
/// assert_eq!(late.minutes(), 25 * 60 + 10);
/// assert_eq!(late.to_string(), "01:10");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ServiceTime(i32);

impl ServiceTime {
    /// Creates a time from minutes since service-day start.
    pub const fn from_minutes(minutes: i32) -> Self {
        Self(minutes)
    }

    /// Creates a time from a wall-clock time of day (never past 24:00).
    pub fn from_clock(time: NaiveTime) -> Self {
        Self((time.hour() * 60 + time.minute()) as i32)
    }

    /// Parses "H:MM", "HH:MM" or "HH:MM:SS".
    ///
    /// Surrounding whitespace is ignored. Hours up to 47 are accepted so that
    /// post-midnight service can be represented.
    ///
    /// # Examples
    ///
    /// ```
    /// use transit_server::domain::ServiceTime;
    ///
    /// assert!(ServiceTime::parse("7:05:00").is_ok());
    /// assert!(ServiceTime::parse("23:59").is_ok());
    /// assert!(ServiceTime::parse("24:30:00").is_ok());
    ///
    /// assert!(ServiceTime::parse("0800").is_err());
    /// assert!(ServiceTime::parse("08:60").is_err());
    /// assert!(ServiceTime::parse("").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self, TimeError> {
        let s = s.trim();
        let mut parts = s.split(':');

        let hour = parts
            .next()
            .and_then(parse_field)
            .ok_or_else(|| TimeError::new("invalid hour digits"))?;
        let minute = parts
            .next()
            .and_then(parse_field)
            .ok_or_else(|| TimeError::new("expected HH:MM or HH:MM:SS format"))?;
        let second = match parts.next() {
            Some(field) => {
                Some(parse_field(field).ok_or_else(|| TimeError::new("invalid second digits"))?)
            }
            None => None,
        };

        if parts.next().is_some() {
            return Err(TimeError::new("too many fields"));
        }
        if hour > MAX_HOUR {
            return Err(TimeError::new("hour must be 0-47"));
        }
        if minute > 59 {
            return Err(TimeError::new("minute must be 0-59"));
        }
        if second.is_some_and(|s| s > 59) {
            return Err(TimeError::new("second must be 0-59"));
        }

        Ok(Self(hour * 60 + minute))
    }

    /// Returns minutes since service-day start.
    pub const fn minutes(self) -> i32 {
        self.0
    }

    /// Returns the wall-clock hour (0-23).
    pub fn hour_of_day(self) -> u32 {
        (self.0.rem_euclid(MINUTES_PER_DAY) / 60) as u32
    }

    /// Returns true when this time is after 20:00 (or already past midnight).
    pub fn is_late_evening(self) -> bool {
        self.0 > LATE_EVENING_MINS
    }

    /// Normalizes a schedule time against a reference time for overnight
    /// wraparound.
    ///
    /// A visit between 00:00 and 04:00 is treated as the next day's early
    /// service when the reference is itself late evening. Times already
    /// written past 24:00 are left alone.
    ///
    /// # Examples
    ///
    /// ```
    /// use transit_server::domain::ServiceTime;
    ///
    /// let target = ServiceTime::parse("23:50").unwrap();
    /// let visit = ServiceTime::parse("00:10:00").unwrap();
    /// assert_eq!(visit.normalized_against(target).minutes(), 24 * 60 + 10);
    ///
    /// // No wrap when the reference is daytime
    /// let noon = ServiceTime::parse("12:00").unwrap();
    /// assert_eq!(visit.normalized_against(noon), visit);
    /// ```
    pub fn normalized_against(self, reference: ServiceTime) -> ServiceTime {
        if reference.is_late_evening() && self.0 < EARLY_MORNING_MINS {
            Self(self.0 + MINUTES_PER_DAY)
        } else {
            self
        }
    }

    /// Minutes elapsed from `earlier` to `self`, wrapping once over midnight
    /// when the difference would otherwise be negative.
    pub fn minutes_since(self, earlier: ServiceTime) -> i32 {
        let diff = self.0 - earlier.0;
        if diff < 0 { diff + MINUTES_PER_DAY } else { diff }
    }

    /// Minutes from `reference` until `self`, never negative.
    pub fn wait_after(self, reference: ServiceTime) -> i32 {
        (self.0 - reference.0).max(0)
    }
}

impl Add<i32> for ServiceTime {
    type Output = Self;

    fn add(self, minutes: i32) -> Self::Output {
        Self(self.0 + minutes)
    }
}

impl Sub<i32> for ServiceTime {
    type Output = Self;

    fn sub(self, minutes: i32) -> Self::Output {
        Self(self.0 - minutes)
    }
}

impl fmt::Debug for ServiceTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ServiceTime({:02}:{:02})", self.0.div_euclid(60), self.0.rem_euclid(60))
    }
}

impl fmt::Display for ServiceTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let wrapped = self.0.rem_euclid(MINUTES_PER_DAY);
        write!(f, "{:02}:{:02}", wrapped / 60, wrapped % 60)
    }
}

/// Parse a one- or two-digit ASCII field.
fn parse_field(field: &str) -> Option<i32> {
    if field.is_empty() || field.len() > 2 || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}
