//! Booking transitions

use jiff::civil::DateTime;
use thiserror::Error;

use crate::{
    bookings::{BookingRecord, BookingStatus, PartnerCancelStatus},
    cancellation::{CancellationDenied, CancellationPolicy},
};

/// Errors returned when a booking action is not valid.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BookingError {
    /// The action does not apply to the booking's current status.
    #[error("cannot {action} a booking that is {status}")]
    InvalidTransition {
        /// Current primary status
        status: BookingStatus,

        /// Rejected action
        action: &'static str,
    },

    /// A partner cancellation request blocks further work.
    #[error("cannot {action} while the partner cancellation is {partner}")]
    PartnerCancellationPending {
        /// Current partner cancellation status
        partner: PartnerCancelStatus,

        /// Rejected action
        action: &'static str,
    },

    /// No partner cancellation request is awaiting a decision.
    #[error("no partner cancellation request to decide (status is {0})")]
    NoPendingRequest(PartnerCancelStatus),

    /// A cancellation rule denied the action.
    #[error(transparent)]
    Cancellation(#[from] CancellationDenied),
}

/// Something that can happen to a booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingAction {
    /// Partner confirms a pending booking.
    Confirm,

    /// Partner assigns the work to a team member.
    AssignWork {
        /// Team member
        assignee: String,
    },

    /// Work begins.
    Start,

    /// Work finishes.
    Complete,

    /// Customer cancels.
    CustomerCancel,

    /// Partner asks an admin to cancel.
    RequestPartnerCancellation {
        /// Why the partner wants out
        reason: String,
    },

    /// Admin accepts the partner's request; the booking is cancelled.
    ApprovePartnerCancellation,

    /// Admin declines the partner's request.
    RejectPartnerCancellation,
}

impl BookingAction {
    /// Short verb used in error messages and logs.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Confirm => "confirm",
            Self::AssignWork { .. } => "assign work on",
            Self::Start => "start",
            Self::Complete => "complete",
            Self::CustomerCancel => "cancel",
            Self::RequestPartnerCancellation { .. } => "request cancellation of",
            Self::ApprovePartnerCancellation => "approve cancellation of",
            Self::RejectPartnerCancellation => "reject cancellation of",
        }
    }
}

/// Clock and rules a transition is evaluated against.
#[derive(Debug, Clone)]
pub struct TransitionContext {
    /// Current civil time in the booking's zone
    pub now: DateTime,

    /// Cancellation thresholds
    pub policy: CancellationPolicy,
}

impl TransitionContext {
    /// Context with the default cancellation policy.
    pub fn new(now: DateTime) -> Self {
        Self {
            now,
            policy: CancellationPolicy::default(),
        }
    }
}

pub(crate) fn apply<'a>(
    booking: &BookingRecord<'a>,
    action: BookingAction,
    ctx: &TransitionContext,
) -> Result<BookingRecord<'a>, BookingError> {
    let mut next = booking.clone();
    let name = action.name();

    let invalid = || BookingError::InvalidTransition {
        status: booking.status,
        action: name,
    };

    let ensure_unblocked = || {
        if booking.partner_cancel_status.blocks_work() {
            Err(BookingError::PartnerCancellationPending {
                partner: booking.partner_cancel_status,
                action: name,
            })
        } else {
            Ok(())
        }
    };

    match action {
        BookingAction::Confirm => {
            ensure_unblocked()?;

            if booking.status != BookingStatus::Pending {
                return Err(invalid());
            }

            next.status = BookingStatus::Confirmed;
        }
        BookingAction::AssignWork { assignee } => {
            ensure_unblocked()?;

            if !matches!(booking.status, BookingStatus::Confirmed | BookingStatus::InProgress) {
                return Err(invalid());
            }

            next.assignee = Some(assignee);
        }
        BookingAction::Start => {
            ensure_unblocked()?;

            if booking.status != BookingStatus::Confirmed {
                return Err(invalid());
            }

            next.status = BookingStatus::InProgress;
        }
        BookingAction::Complete => {
            ensure_unblocked()?;

            if booking.status != BookingStatus::InProgress {
                return Err(invalid());
            }

            next.status = BookingStatus::Completed;
        }
        BookingAction::CustomerCancel => {
            ctx.policy
                .customer_can_cancel(booking, ctx.now)
                .into_result()?;

            next.status = BookingStatus::Cancelled;
        }
        BookingAction::RequestPartnerCancellation { reason } => {
            ctx.policy
                .partner_can_cancel(booking, ctx.now)
                .into_result()?;

            next.partner_cancel_status = PartnerCancelStatus::Requested;
            next.partner_cancel_reason = Some(reason);
        }
        BookingAction::ApprovePartnerCancellation => {
            if booking.partner_cancel_status != PartnerCancelStatus::Requested {
                return Err(BookingError::NoPendingRequest(booking.partner_cancel_status));
            }

            next.partner_cancel_status = PartnerCancelStatus::Cancelled;
            next.status = BookingStatus::Cancelled;
        }
        BookingAction::RejectPartnerCancellation => {
            if booking.partner_cancel_status != PartnerCancelStatus::Requested {
                return Err(BookingError::NoPendingRequest(booking.partner_cancel_status));
            }

            next.partner_cancel_status = PartnerCancelStatus::NotRequested;
            next.partner_cancel_reason = None;
        }
    }

    Ok(next)
}
