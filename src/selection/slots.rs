//! Date slots

use jiff::{
    SignedDuration,
    civil::{Date, DateTime, Time, time},
};
use rust_decimal::Decimal;

use crate::{pricing::hours_from_seconds, selection::SelectionError};

/// Billable length of a whole-day booking.
pub const WHOLE_DAY_HOURS: i64 = 12;

/// Nominal start of a whole-day booking.
const WHOLE_DAY_START: Time = time(8, 0, 0, 0);

/// A reserved time window on one calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateSlot {
    date: Date,
    start: Time,
    end: Time,
    whole_day: bool,
}

impl DateSlot {
    /// A window from `start` to `end` on `date`.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::InvalidSlot`] unless `end` is after `start`.
    pub fn new(date: Date, start: Time, end: Time) -> Result<Self, SelectionError> {
        if end <= start {
            return Err(SelectionError::InvalidSlot { date, start, end });
        }

        Ok(Self {
            date,
            start,
            end,
            whole_day: false,
        })
    }

    /// A whole-day booking on `date`, billed as twelve hours.
    pub fn whole_day(date: Date) -> Self {
        Self {
            date,
            start: WHOLE_DAY_START,
            end: WHOLE_DAY_START.saturating_add(SignedDuration::from_hours(WHOLE_DAY_HOURS)),
            whole_day: true,
        }
    }

    /// Calendar date
    pub fn date(&self) -> Date {
        self.date
    }

    /// Start time
    pub fn start(&self) -> Time {
        self.start
    }

    /// End time
    pub fn end(&self) -> Time {
        self.end
    }

    /// Whether the slot books the whole day.
    pub fn is_whole_day(&self) -> bool {
        self.whole_day
    }

    /// Local date and time the slot begins.
    pub fn starts_at(&self) -> DateTime {
        self.date.to_datetime(self.start)
    }

    /// Billable hours: twelve for a whole day, otherwise `end - start`.
    pub fn hours(&self) -> Decimal {
        if self.whole_day {
            return Decimal::from(WHOLE_DAY_HOURS);
        }

        hours_from_seconds(self.start.duration_until(self.end).as_secs())
    }
}
