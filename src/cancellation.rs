//! Cancellation eligibility
//!
//! Customers may cancel a pending or confirmed booking more than
//! [`CUSTOMER_NOTICE_HOURS`] hours before its earliest slot begins. Partners may request a
//! cancellation at least [`PARTNER_MIN_DAYS`] calendar days ahead. The two rules measure time
//! differently: the customer rule compares elapsed time, resolving both ends in the policy's
//! time zone so daylight-saving shifts count, the partner rule compares calendar dates and
//! ignores the time of day.
//!
//! Evaluators take `now` as a civil date-time in the booking's time zone; use
//! [`CancellationPolicy::local_now`] to convert an instant.

use jiff::{SignedDuration, Timestamp, civil::DateTime, tz::TimeZone};
use thiserror::Error;

use crate::bookings::{BookingRecord, BookingStatus, PartnerCancelStatus};

/// Default customer notice period in hours.
pub const CUSTOMER_NOTICE_HOURS: i64 = 48;

/// Default minimum number of calendar days for a partner request.
pub const PARTNER_MIN_DAYS: i64 = 2;

const SECONDS_PER_DAY: i64 = 86_400;

/// Why a cancellation is not allowed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CancellationDenied {
    /// Booking has no dates to measure against.
    #[error("booking has no dates")]
    NoDates,

    /// Customer cancellation attempted on a booking past the confirmed stage.
    #[error("only pending or confirmed bookings can be cancelled, this booking is {0}")]
    StatusNotCancellable(BookingStatus),

    /// Customer cancellation inside the notice period.
    #[error("bookings can only be cancelled more than {hours} hours before they start")]
    InsideNoticePeriod {
        /// Required notice in hours
        hours: i64,
    },

    /// Partner already has a request awaiting a decision.
    #[error("a cancellation request is already pending")]
    AlreadyRequested,

    /// Partner cancellation was already approved.
    #[error("the booking has already been cancelled at the partner's request")]
    AlreadyCancelled,

    /// Partner request on a booking that is already over.
    #[error("{0} bookings cannot be cancelled")]
    Closed(BookingStatus),

    /// Earliest booking date is in the past.
    #[error("the booking date has already passed")]
    DatePassed,

    /// Partner request inside the minimum notice.
    #[error(
        "cancellation must be requested at least {min_days} days in advance, the booking is {days} day(s) away"
    )]
    TooSoon {
        /// Calendar days until the earliest booking date
        days: i64,

        /// Required minimum
        min_days: i64,
    },
}

/// Outcome of a cancellation check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancellationVerdict {
    denied: Option<CancellationDenied>,
}

impl CancellationVerdict {
    const fn allow() -> Self {
        Self { denied: None }
    }

    const fn deny(reason: CancellationDenied) -> Self {
        Self {
            denied: Some(reason),
        }
    }

    /// Whether the cancellation may proceed.
    pub fn allowed(&self) -> bool {
        self.denied.is_none()
    }

    /// Human-readable reason when denied.
    pub fn reason(&self) -> Option<String> {
        self.denied.as_ref().map(ToString::to_string)
    }

    /// The denial, if any.
    pub fn denial(&self) -> Option<&CancellationDenied> {
        self.denied.as_ref()
    }

    /// Convert into a result.
    ///
    /// # Errors
    ///
    /// Returns the [`CancellationDenied`] reason when the cancellation is not allowed.
    pub fn into_result(self) -> Result<(), CancellationDenied> {
        match self.denied {
            Some(reason) => Err(reason),
            None => Ok(()),
        }
    }
}

/// Cancellation thresholds and the time zone booking dates are expressed in.
#[derive(Debug, Clone)]
pub struct CancellationPolicy {
    /// Customers must cancel strictly more than this before the start.
    pub customer_notice: SignedDuration,

    /// Partners must request at least this many calendar days ahead.
    pub partner_min_days: i64,

    /// Zone of the booking's civil dates and times.
    pub time_zone: TimeZone,
}

impl Default for CancellationPolicy {
    fn default() -> Self {
        Self {
            customer_notice: SignedDuration::from_hours(CUSTOMER_NOTICE_HOURS),
            partner_min_days: PARTNER_MIN_DAYS,
            time_zone: TimeZone::UTC,
        }
    }
}

impl CancellationPolicy {
    /// Civil date-time of `now` in the policy's zone.
    pub fn local_now(&self, now: Timestamp) -> DateTime {
        now.to_zoned(self.time_zone.clone()).datetime()
    }

    /// Whether the customer may cancel `booking` at `now`.
    pub fn customer_can_cancel(&self, booking: &BookingRecord<'_>, now: DateTime) -> CancellationVerdict {
        match booking.status {
            BookingStatus::Pending | BookingStatus::Confirmed => {}
            status => return CancellationVerdict::deny(CancellationDenied::StatusNotCancellable(status)),
        }

        let Some(earliest) = booking.earliest_date() else {
            return CancellationVerdict::deny(CancellationDenied::NoDates);
        };

        if self.elapsed(now, earliest.starts_at()) > self.customer_notice {
            CancellationVerdict::allow()
        } else {
            CancellationVerdict::deny(CancellationDenied::InsideNoticePeriod {
                hours: self.customer_notice.as_hours(),
            })
        }
    }

    /// Real time between two civil date-times of the policy's zone. Times a transition skips
    /// or repeats resolve to the earlier offset.
    fn elapsed(&self, from: DateTime, to: DateTime) -> SignedDuration {
        match (
            self.time_zone.to_timestamp(from),
            self.time_zone.to_timestamp(to),
        ) {
            (Ok(from), Ok(to)) => to.duration_since(from),
            _ => from.duration_until(to),
        }
    }

    /// Whether the partner may request cancellation of `booking` at `now`.
    pub fn partner_can_cancel(&self, booking: &BookingRecord<'_>, now: DateTime) -> CancellationVerdict {
        match booking.partner_cancel_status {
            PartnerCancelStatus::NotRequested => {}
            PartnerCancelStatus::Requested => {
                return CancellationVerdict::deny(CancellationDenied::AlreadyRequested);
            }
            PartnerCancelStatus::Cancelled => {
                return CancellationVerdict::deny(CancellationDenied::AlreadyCancelled);
            }
        }

        if let status @ (BookingStatus::Cancelled | BookingStatus::Completed) = booking.status {
            return CancellationVerdict::deny(CancellationDenied::Closed(status));
        }

        let Some(earliest) = booking.earliest_date() else {
            return CancellationVerdict::deny(CancellationDenied::NoDates);
        };

        let days = now
            .date()
            .duration_until(earliest.date())
            .as_secs()
            .div_euclid(SECONDS_PER_DAY);

        if days < 0 {
            CancellationVerdict::deny(CancellationDenied::DatePassed)
        } else if days < self.partner_min_days {
            CancellationVerdict::deny(CancellationDenied::TooSoon {
                days,
                min_days: self.partner_min_days,
            })
        } else {
            CancellationVerdict::allow()
        }
    }
}

/// [`CancellationPolicy::customer_can_cancel`] with the default thresholds.
pub fn customer_can_cancel(booking: &BookingRecord<'_>, now: DateTime) -> CancellationVerdict {
    CancellationPolicy::default().customer_can_cancel(booking, now)
}

/// [`CancellationPolicy::partner_can_cancel`] with the default thresholds.
pub fn partner_can_cancel(booking: &BookingRecord<'_>, now: DateTime) -> CancellationVerdict {
    CancellationPolicy::default().partner_can_cancel(booking, now)
}

#[cfg(test)]
mod tests {
    use jiff::{
        civil::{Date, date, time},
        tz::TimeZone,
    };
    use rusty_money::{Money, iso::INR};
    use testresult::TestResult;

    use crate::{
        bookings::{BookingId, PaymentSummary},
        selection::DateSlot,
    };

    use super::*;

    fn booking(status: BookingStatus, dates: Vec<DateSlot>) -> BookingRecord<'static> {
        BookingRecord {
            id: BookingId::from_key("booking"),
            custom_booking_id: "BK-1".to_string(),
            status,
            partner_cancel_status: PartnerCancelStatus::NotRequested,
            partner_cancel_reason: None,
            assignee: None,
            booking_dates: dates,
            payment_summary: PaymentSummary {
                total_amount: Money::from_minor(9_440_00, INR),
                total_paid: Money::from_minor(1_888_00, INR),
                pending_amount: Money::from_minor(7_552_00, INR),
                invoices: Vec::new(),
            },
        }
    }

    fn ten_am(on: Date) -> TestResult<DateSlot> {
        Ok(DateSlot::new(on, time(10, 0, 0, 0), time(12, 0, 0, 0))?)
    }

    #[test]
    fn customer_can_cancel_with_more_than_48_hours() -> TestResult {
        let booking = booking(BookingStatus::Confirmed, vec![ten_am(date(2026, 11, 5))?]);
        let now = date(2026, 11, 3).at(9, 59, 0, 0);

        assert!(customer_can_cancel(&booking, now).allowed());

        Ok(())
    }

    #[test]
    fn customer_cannot_cancel_at_exactly_48_hours() -> TestResult {
        let booking = booking(BookingStatus::Confirmed, vec![ten_am(date(2026, 11, 5))?]);
        let now = date(2026, 11, 3).at(10, 0, 0, 0);

        let verdict = customer_can_cancel(&booking, now);

        assert!(!verdict.allowed());
        assert_eq!(
            verdict.denial(),
            Some(&CancellationDenied::InsideNoticePeriod { hours: 48 })
        );

        Ok(())
    }

    #[test]
    fn customer_cannot_cancel_once_in_progress() -> TestResult {
        let booking = booking(BookingStatus::InProgress, vec![ten_am(date(2026, 12, 1))?]);
        let now = date(2026, 11, 1).at(0, 0, 0, 0);

        let verdict = customer_can_cancel(&booking, now);

        assert_eq!(
            verdict.into_result(),
            Err(CancellationDenied::StatusNotCancellable(BookingStatus::InProgress))
        );

        Ok(())
    }

    #[test]
    fn customer_measures_from_earliest_slot() -> TestResult {
        let booking = booking(
            BookingStatus::Pending,
            vec![ten_am(date(2026, 11, 20))?, ten_am(date(2026, 11, 4))?],
        );
        let now = date(2026, 11, 3).at(9, 0, 0, 0);

        assert!(!customer_can_cancel(&booking, now).allowed());

        Ok(())
    }

    #[test]
    fn no_dates_is_not_cancellable() {
        let booking = booking(BookingStatus::Pending, Vec::new());
        let now = date(2026, 11, 3).at(9, 0, 0, 0);

        assert_eq!(
            customer_can_cancel(&booking, now).denial(),
            Some(&CancellationDenied::NoDates)
        );
        assert_eq!(
            partner_can_cancel(&booking, now).denial(),
            Some(&CancellationDenied::NoDates)
        );
    }

    #[test]
    fn partner_rule_uses_calendar_days() -> TestResult {
        let booking = booking(BookingStatus::Confirmed, vec![ten_am(date(2026, 11, 5))?]);

        let late_on_third = date(2026, 11, 3).at(23, 59, 0, 0);
        assert!(partner_can_cancel(&booking, late_on_third).allowed());

        let early_on_fourth = date(2026, 11, 4).at(0, 1, 0, 0);
        let verdict = partner_can_cancel(&booking, early_on_fourth);

        assert!(!verdict.allowed());
        assert!(verdict.reason().is_some_and(|reason| reason.contains("1 day(s)")));

        Ok(())
    }

    #[test]
    fn partner_reasons_distinguish_past_from_too_soon() -> TestResult {
        let booking = booking(BookingStatus::Confirmed, vec![ten_am(date(2026, 11, 5))?]);

        let same_day = partner_can_cancel(&booking, date(2026, 11, 5).at(8, 0, 0, 0));
        assert_eq!(
            same_day.denial(),
            Some(&CancellationDenied::TooSoon {
                days: 0,
                min_days: 2
            })
        );
        assert!(same_day.reason().is_some_and(|reason| reason.contains("0 day(s)")));

        let after = partner_can_cancel(&booking, date(2026, 11, 6).at(8, 0, 0, 0));
        assert_eq!(after.denial(), Some(&CancellationDenied::DatePassed));

        Ok(())
    }

    #[test]
    fn partner_cannot_request_twice() -> TestResult {
        let mut booking = booking(BookingStatus::Confirmed, vec![ten_am(date(2026, 12, 5))?]);
        booking.partner_cancel_status = PartnerCancelStatus::Requested;

        let verdict = partner_can_cancel(&booking, date(2026, 11, 1).at(8, 0, 0, 0));

        assert_eq!(verdict.denial(), Some(&CancellationDenied::AlreadyRequested));

        Ok(())
    }

    #[test]
    fn partner_cannot_cancel_completed_booking() -> TestResult {
        let booking = booking(BookingStatus::Completed, vec![ten_am(date(2026, 12, 5))?]);

        let verdict = partner_can_cancel(&booking, date(2026, 11, 1).at(8, 0, 0, 0));

        assert_eq!(
            verdict.denial(),
            Some(&CancellationDenied::Closed(BookingStatus::Completed))
        );

        Ok(())
    }

    #[test]
    fn partner_may_cancel_in_progress_booking() -> TestResult {
        let booking = booking(BookingStatus::InProgress, vec![ten_am(date(2026, 12, 5))?]);

        assert!(partner_can_cancel(&booking, date(2026, 11, 1).at(8, 0, 0, 0)).allowed());

        Ok(())
    }

    #[test]
    fn custom_policy_thresholds() -> TestResult {
        let policy = CancellationPolicy {
            customer_notice: SignedDuration::from_hours(24),
            partner_min_days: 7,
            time_zone: TimeZone::UTC,
        };
        let booking = booking(BookingStatus::Pending, vec![ten_am(date(2026, 11, 5))?]);
        let now = date(2026, 11, 3).at(10, 0, 0, 0);

        assert!(policy.customer_can_cancel(&booking, now).allowed());
        assert_eq!(
            policy.partner_can_cancel(&booking, now).denial(),
            Some(&CancellationDenied::TooSoon {
                days: 2,
                min_days: 7
            })
        );

        Ok(())
    }

    #[test]
    fn local_now_converts_into_policy_zone() -> TestResult {
        let policy = CancellationPolicy {
            time_zone: TimeZone::fixed(jiff::tz::offset(5)),
            ..CancellationPolicy::default()
        };
        let instant: Timestamp = "2026-11-03T20:30:00Z".parse()?;

        assert_eq!(policy.local_now(instant), date(2026, 11, 4).at(1, 30, 0, 0));

        Ok(())
    }

    fn new_york() -> TestResult<CancellationPolicy> {
        Ok(CancellationPolicy {
            time_zone: TimeZone::posix("EST5EDT,M3.2.0,M11.1.0")?,
            ..CancellationPolicy::default()
        })
    }

    #[test]
    fn customer_notice_counts_the_repeated_hour() -> TestResult {
        let policy = new_york()?;
        let booking = booking(BookingStatus::Confirmed, vec![ten_am(date(2026, 11, 2))?]);

        // 48h30m before 2026-11-02 10:00 EST; clocks fall back on 2026-11-01.
        let now = policy.local_now("2026-10-31T14:30:00Z".parse()?);

        assert_eq!(now, date(2026, 10, 31).at(10, 30, 0, 0));
        assert!(policy.customer_can_cancel(&booking, now).allowed());

        Ok(())
    }

    #[test]
    fn customer_notice_skips_the_missing_hour() -> TestResult {
        let policy = new_york()?;
        let booking = booking(BookingStatus::Confirmed, vec![ten_am(date(2026, 3, 9))?]);

        // 47h30m before 2026-03-09 10:00 EDT; clocks spring forward on 2026-03-08.
        let now = policy.local_now("2026-03-07T14:30:00Z".parse()?);

        assert_eq!(now, date(2026, 3, 7).at(9, 30, 0, 0));
        assert_eq!(
            policy.customer_can_cancel(&booking, now).denial(),
            Some(&CancellationDenied::InsideNoticePeriod { hours: 48 })
        );

        Ok(())
    }
}
