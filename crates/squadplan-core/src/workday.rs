//! Work-day arithmetic over a configurable weekend.
//!
//! Weekday indices follow the Monday = 0 … Sunday = 6 convention. The
//! browser works in the 0 = Sunday convention; [`WeekendDays::sunday_based`]
//! converts.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, Weekday};

use crate::{Error, Result};

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

const SHORT_NAMES: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

const WHOLE_WEEK: u8 = 0b111_1111;

/// A set of weekdays treated as non-working.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WeekendDays(u8);

impl WeekendDays {
    /// No weekend at all; every day is a work day.
    pub const NONE: WeekendDays = WeekendDays(0);

    /// Build a weekend from Monday-based indices (0 = Monday … 6 = Sunday).
    pub fn from_indices<I>(indices: I) -> Result<Self>
    where
        I: IntoIterator<Item = u8>,
    {
        let mut mask = 0u8;
        for index in indices {
            if index > 6 {
                return Err(Error::invalid_configuration(format!(
                    "weekday index {index} is outside 0..=6"
                )));
            }
            mask |= 1 << index;
        }
        Ok(WeekendDays(mask))
    }

    /// Build a weekend from chrono weekdays.
    pub fn from_weekdays<I>(days: I) -> Self
    where
        I: IntoIterator<Item = Weekday>,
    {
        WeekendDays(
            days.into_iter()
                .fold(0, |mask, day| mask | 1 << day.num_days_from_monday()),
        )
    }

    /// Whether `day` is a weekend day.
    pub fn contains(self, day: Weekday) -> bool {
        self.0 & (1 << day.num_days_from_monday()) != 0
    }

    /// Whether there is no weekend.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Whether every day of the week is a weekend day.
    pub fn covers_whole_week(self) -> bool {
        self.0 & WHOLE_WEEK == WHOLE_WEEK
    }

    /// Weekend days in Monday-first order.
    pub fn days(self) -> impl Iterator<Item = Weekday> {
        WEEK.into_iter().filter(move |day| self.contains(*day))
    }

    /// Sunday-based indices (0 = Sunday … 6 = Saturday), ascending.
    pub fn sunday_based(self) -> Vec<u8> {
        let mut indices: Vec<u8> = self
            .days()
            .map(|day| day.num_days_from_sunday() as u8)
            .collect();
        indices.sort_unstable();
        indices
    }

    /// Human-readable label such as `"Thu, Fri"`.
    pub fn label(self) -> String {
        if self.is_empty() {
            return "none".to_string();
        }
        self.days()
            .map(|day| SHORT_NAMES[day.num_days_from_monday() as usize])
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Default for WeekendDays {
    /// Thursday and Friday.
    fn default() -> Self {
        WeekendDays::from_weekdays([Weekday::Thu, Weekday::Fri])
    }
}

impl FromStr for WeekendDays {
    type Err = Error;

    /// Parse a comma-separated list of Monday-based indices, e.g. `"5,6"`.
    fn from_str(list: &str) -> Result<Self> {
        let indices = list
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| {
                part.parse::<u8>().map_err(|_| {
                    Error::invalid_configuration(format!("weekday index {part:?} is not a number"))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        WeekendDays::from_indices(indices)
    }
}

impl fmt::Display for WeekendDays {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Whether `date` falls outside the weekend.
pub fn is_work_day(date: NaiveDate, weekend: WeekendDays) -> bool {
    !weekend.contains(date.weekday())
}

/// Advance `date` by `days` work days.
///
/// Steps one calendar day at a time and counts only work days, so the
/// result is always a work day when `days > 0`. `days = 0` returns `date`
/// unchanged.
///
/// # Errors
///
/// - [`Error::InvalidConfiguration`] if `weekend` covers the whole week.
/// - [`Error::DateOutOfRange`] if the result would overflow the calendar.
pub fn add_work_days(date: NaiveDate, days: u32, weekend: WeekendDays) -> Result<NaiveDate> {
    if weekend.covers_whole_week() {
        return Err(Error::invalid_configuration(
            "weekend covers all seven days; no work day can be reached",
        ));
    }

    let mut current = date;
    let mut counted = 0;
    while counted < days {
        current = current.succ_opt().ok_or_else(|| Error::DateOutOfRange {
            message: format!("adding {days} work days to {date}"),
        })?;
        if is_work_day(current, weekend) {
            counted += 1;
        }
    }
    Ok(current)
}
