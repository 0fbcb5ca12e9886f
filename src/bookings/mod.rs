//! Bookings
//!
//! Client-side replica of a server-owned booking. The primary [`BookingStatus`] moves
//! `pending → confirmed → in-progress → completed`, with `cancelled` reachable from
//! `pending`/`confirmed`. [`PartnerCancelStatus`] tracks a partner-initiated cancellation
//! request independently of the primary status.

use std::{fmt, str::FromStr};

use jiff::Timestamp;
use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{ids::Id, selection::DateSlot};

pub mod transitions;

pub use transitions::{BookingAction, BookingError, TransitionContext};

/// Booking Id
pub type BookingId = Id<BookingRecord<'static>>;

/// A status string that is not part of the closed set.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown status: {0}")]
pub struct UnknownStatus(pub String);

/// Primary booking status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BookingStatus {
    /// Awaiting partner confirmation.
    Pending,

    /// Confirmed by the partner.
    Confirmed,

    /// Work has started.
    InProgress,

    /// Work is finished.
    Completed,

    /// Cancelled.
    Cancelled,
}

impl BookingStatus {
    /// Wire name of the status.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether no further primary transition is possible.
    pub const fn is_final(self) -> bool {
        match self {
            Self::Completed | Self::Cancelled => true,
            Self::Pending | Self::Confirmed | Self::InProgress => false,
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "in-progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// State of a partner-initiated cancellation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PartnerCancelStatus {
    /// No request has been made (or the last one was rejected).
    #[default]
    NotRequested,

    /// Awaiting an admin decision.
    Requested,

    /// Approved by an admin.
    Cancelled,
}

impl PartnerCancelStatus {
    /// Wire name of the status.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotRequested => "not-requested",
            Self::Requested => "requested",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether the request blocks work on the booking.
    pub const fn blocks_work(self) -> bool {
        match self {
            Self::NotRequested => false,
            Self::Requested | Self::Cancelled => true,
        }
    }
}

impl fmt::Display for PartnerCancelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PartnerCancelStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not-requested" => Ok(Self::NotRequested),
            "requested" => Ok(Self::Requested),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// A payment recorded against a booking.
#[derive(Debug, Clone, PartialEq)]
pub struct PaidInvoice<'a> {
    /// Invoice number
    pub number: String,

    /// Amount paid
    pub amount: Money<'a, Currency>,

    /// Gateway transaction id
    pub transaction_id: String,

    /// When the payment was captured
    pub paid_at: Timestamp,
}

/// Payment position of a booking.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentSummary<'a> {
    /// Grand total of the booking
    pub total_amount: Money<'a, Currency>,

    /// Amount collected so far
    pub total_paid: Money<'a, Currency>,

    /// Amount still owed
    pub pending_amount: Money<'a, Currency>,

    /// Payments received
    pub invoices: Vec<PaidInvoice<'a>>,
}

impl PaymentSummary<'_> {
    /// Whether nothing is left to pay.
    pub fn is_settled(&self) -> bool {
        self.pending_amount.to_minor_units() <= 0
    }
}

/// Booking Record
#[derive(Debug, Clone, PartialEq)]
pub struct BookingRecord<'a> {
    /// Booking id
    pub id: BookingId,

    /// Human readable booking reference
    pub custom_booking_id: String,

    /// Primary status
    pub status: BookingStatus,

    /// Partner cancellation request state
    pub partner_cancel_status: PartnerCancelStatus,

    /// Reason given with the partner cancellation request
    pub partner_cancel_reason: Option<String>,

    /// Team member the work is assigned to
    pub assignee: Option<String>,

    /// Booked dates
    pub booking_dates: Vec<DateSlot>,

    /// Payment position
    pub payment_summary: PaymentSummary<'a>,
}

impl<'a> BookingRecord<'a> {
    /// The booked slot that starts first.
    pub fn earliest_date(&self) -> Option<&DateSlot> {
        self.booking_dates.iter().min_by_key(|slot| slot.starts_at())
    }

    /// Apply an action, returning the resulting record. The record itself is unchanged.
    ///
    /// # Errors
    ///
    /// Returns a [`BookingError`] if the action is not valid in the current state.
    pub fn apply(
        &self,
        action: BookingAction,
        ctx: &TransitionContext,
    ) -> Result<BookingRecord<'a>, BookingError> {
        transitions::apply(self, action, ctx)
    }
}
