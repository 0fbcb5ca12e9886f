//! Payment requests
//!
//! A partner asks the customer for (part of) the amount still owed on a booking. The
//! request carries three fields, an admin decision, a customer status and a cancelled
//! flag, but only seven of their combinations are reachable; [`PaymentRequestState`] names
//! them and [`PaymentRequest::apply`] only ever moves between them.
//!
//! ```text
//! Created ──approve──▶ AdminApproved ──send──▶ Sent ──confirm──▶ Paid
//!    │                      │                    └────decline──▶ Declined
//!    ├──reject──▶ AdminRejected
//!    └──cancel──▶ Cancelled ◀──cancel──┘
//! ```

use std::fmt;

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    bookings::{BookingId, BookingRecord, BookingStatus},
    ids::Id,
};

pub mod actions;

pub use actions::{Actor, PaymentAction, PaymentActionKind};

/// Payment Request Id
pub type PaymentRequestId = Id<PaymentRequest<'static>>;

/// Errors raised by payment request transitions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PaymentRequestError {
    /// The action's guard does not hold in the current state.
    #[error("cannot {action} a payment request that is {state}")]
    InvalidTransition {
        /// Current state
        state: PaymentRequestState,

        /// Attempted action
        action: PaymentActionKind,
    },

    /// The actor may not perform the action.
    #[error("{actor} may not {action} a payment request")]
    Forbidden {
        /// Acting party
        actor: Actor,

        /// Attempted action
        action: PaymentActionKind,
    },

    /// A stored record is in a combination no transition produces.
    #[error(
        "unreachable payment request state (admin {admin}, customer {customer}, cancelled {cancelled})"
    )]
    Unreachable {
        /// Admin status
        admin: AdminStatus,

        /// Customer status
        customer: CustomerStatus,

        /// Cancelled flag
        cancelled: bool,
    },

    /// The request was paid under a different transaction.
    #[error("payment already recorded under transaction {recorded}, not {received}")]
    TransactionMismatch {
        /// Transaction on record
        recorded: String,

        /// Transaction in the callback
        received: String,
    },

    /// Amount must be positive and no more than what is still owed.
    #[error("requested amount {requested} must be positive and at most the pending {pending}")]
    InvalidAmount {
        /// Requested amount in major units
        requested: Decimal,

        /// Pending amount in major units
        pending: Decimal,
    },

    /// Amount is in a different currency from the booking.
    #[error("currency mismatch: {0} vs {1}")]
    CurrencyMismatch(&'static str, &'static str),

    /// Payments cannot be requested on a cancelled booking.
    #[error("cannot request payment on a booking that is {0}")]
    BookingNotPayable(BookingStatus),

    /// Another request for the booking is still open.
    #[error("payment request {0} is still open for this booking")]
    OpenRequestExists(PaymentRequestId),
}

/// Admin decision on a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminStatus {
    /// Awaiting review.
    #[default]
    Pending,

    /// Approved.
    Approved,

    /// Rejected.
    Rejected,
}

impl fmt::Display for AdminStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        })
    }
}

/// Customer-facing status of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomerStatus {
    /// Not yet sent to the customer.
    #[default]
    NotSent,

    /// Awaiting the customer.
    Sent,

    /// Paid.
    Paid,

    /// Declined by the customer.
    Declined,
}

impl fmt::Display for CustomerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NotSent => "not_sent",
            Self::Sent => "sent",
            Self::Paid => "paid",
            Self::Declined => "declined",
        })
    }
}

/// The reachable states of a payment request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentRequestState {
    /// Awaiting admin review.
    Created,

    /// Approved, not yet sent.
    AdminApproved,

    /// Rejected by an admin.
    AdminRejected,

    /// Sent to the customer.
    Sent,

    /// Paid through the gateway.
    Paid,

    /// Declined by the customer.
    Declined,

    /// Withdrawn by the partner.
    Cancelled,
}

impl PaymentRequestState {
    /// Whether no action can change the request any more.
    pub const fn is_terminal(self) -> bool {
        match self {
            Self::AdminRejected | Self::Paid | Self::Declined | Self::Cancelled => true,
            Self::Created | Self::AdminApproved | Self::Sent => false,
        }
    }

    /// Whether an action of `kind` moves the request out of this state.
    pub const fn allows(self, kind: PaymentActionKind) -> bool {
        matches!(
            (self, kind),
            (Self::Created, PaymentActionKind::Approve | PaymentActionKind::Reject)
                | (Self::Created | Self::AdminApproved, PaymentActionKind::Cancel)
                | (Self::AdminApproved, PaymentActionKind::Send)
                | (
                    Self::Sent,
                    PaymentActionKind::Decline | PaymentActionKind::ConfirmPayment
                )
        )
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::AdminApproved => "admin approved",
            Self::AdminRejected => "admin rejected",
            Self::Sent => "sent",
            Self::Paid => "paid",
            Self::Declined => "declined",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for PaymentRequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment Request
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentRequest<'a> {
    id: PaymentRequestId,
    booking_id: BookingId,
    amount: Money<'a, Currency>,
    admin_status: AdminStatus,
    customer_status: CustomerStatus,
    cancelled: bool,
    transaction_id: Option<String>,
}

impl<'a> PaymentRequest<'a> {
    /// A new request in the [`PaymentRequestState::Created`] state.
    pub fn new(id: PaymentRequestId, booking_id: BookingId, amount: Money<'a, Currency>) -> Self {
        Self {
            id,
            booking_id,
            amount,
            admin_status: AdminStatus::Pending,
            customer_status: CustomerStatus::NotSent,
            cancelled: false,
            transaction_id: None,
        }
    }

    /// A partner's request for `amount` of what `booking` still owes, given the booking's
    /// `existing` requests.
    ///
    /// # Errors
    ///
    /// - [`PaymentRequestError::BookingNotPayable`]: the booking is cancelled.
    /// - [`PaymentRequestError::CurrencyMismatch`]: `amount` is not in the booking's currency.
    /// - [`PaymentRequestError::InvalidAmount`]: `amount` is not positive or exceeds the
    ///   booking's pending amount.
    /// - [`PaymentRequestError::OpenRequestExists`]: another request for the booking is
    ///   still open.
    pub fn create<'r>(
        booking: &BookingRecord<'a>,
        amount: Money<'a, Currency>,
        existing: impl IntoIterator<Item = &'r PaymentRequest<'a>>,
    ) -> Result<Self, PaymentRequestError>
    where
        'a: 'r,
    {
        if booking.status == BookingStatus::Cancelled {
            return Err(PaymentRequestError::BookingNotPayable(booking.status));
        }

        let pending = &booking.payment_summary.pending_amount;

        if amount.currency() != pending.currency() {
            return Err(PaymentRequestError::CurrencyMismatch(
                amount.currency().iso_alpha_code,
                pending.currency().iso_alpha_code,
            ));
        }

        if amount.amount() <= &Decimal::ZERO || amount.amount() > pending.amount() {
            return Err(PaymentRequestError::InvalidAmount {
                requested: *amount.amount(),
                pending: *pending.amount(),
            });
        }

        ensure_no_open_request(booking.id, existing)?;

        Ok(Self::new(PaymentRequestId::generate(), booking.id, amount))
    }

    /// Rebuild a request from a stored record.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentRequestError::Unreachable`] if the combination of fields is not a
    /// reachable state, including a paid request without a transaction id.
    pub fn from_parts(
        id: PaymentRequestId,
        booking_id: BookingId,
        amount: Money<'a, Currency>,
        admin_status: AdminStatus,
        customer_status: CustomerStatus,
        cancelled: bool,
        transaction_id: Option<String>,
    ) -> Result<Self, PaymentRequestError> {
        let request = Self {
            id,
            booking_id,
            amount,
            admin_status,
            customer_status,
            cancelled,
            transaction_id,
        };

        let unreachable = PaymentRequestError::Unreachable {
            admin: admin_status,
            customer: customer_status,
            cancelled,
        };

        let state = request.classify().ok_or_else(|| unreachable.clone())?;

        let paid = state == PaymentRequestState::Paid;

        if paid != request.transaction_id.is_some() {
            return Err(unreachable);
        }

        Ok(request)
    }

    fn classify(&self) -> Option<PaymentRequestState> {
        use AdminStatus as A;
        use CustomerStatus as C;

        let state = match (self.admin_status, self.customer_status, self.cancelled) {
            (A::Pending | A::Approved, C::NotSent, true) => PaymentRequestState::Cancelled,
            (_, _, true) => return None,
            (A::Pending, C::NotSent, false) => PaymentRequestState::Created,
            (A::Rejected, C::NotSent, false) => PaymentRequestState::AdminRejected,
            (A::Approved, C::NotSent, false) => PaymentRequestState::AdminApproved,
            (A::Approved, C::Sent, false) => PaymentRequestState::Sent,
            (A::Approved, C::Paid, false) => PaymentRequestState::Paid,
            (A::Approved, C::Declined, false) => PaymentRequestState::Declined,
            (A::Pending | A::Rejected, C::Sent | C::Paid | C::Declined, false) => return None,
        };

        Some(state)
    }

    /// Current state.
    pub fn state(&self) -> PaymentRequestState {
        self.classify().unwrap_or(PaymentRequestState::Cancelled)
    }

    /// Whether no action can change the request any more.
    pub fn is_terminal(&self) -> bool {
        self.state().is_terminal()
    }

    /// Whether the request still awaits an outcome.
    pub fn is_open(&self) -> bool {
        !self.is_terminal()
    }

    /// Actions `actor` can take right now.
    pub fn available_actions(&self, actor: Actor) -> SmallVec<[PaymentActionKind; 2]> {
        let state = self.state();

        PaymentActionKind::ALL
            .into_iter()
            .filter(|kind| kind.actor() == actor && state.allows(*kind))
            .collect()
    }

    /// Apply `action` on behalf of `actor`, returning the resulting request.
    ///
    /// Confirming a paid request again with the same transaction id returns it unchanged.
    ///
    /// # Errors
    ///
    /// - [`PaymentRequestError::Forbidden`]: `actor` may not perform the action.
    /// - [`PaymentRequestError::InvalidTransition`]: the action's guard does not hold.
    /// - [`PaymentRequestError::TransactionMismatch`]: the request was paid under another
    ///   transaction.
    pub fn apply(&self, action: PaymentAction, actor: Actor) -> Result<Self, PaymentRequestError> {
        let kind = action.kind();

        if kind.actor() != actor {
            return Err(PaymentRequestError::Forbidden {
                actor,
                action: kind,
            });
        }

        let state = self.state();

        if let (PaymentRequestState::Paid, PaymentAction::ConfirmPayment { transaction_id }) =
            (state, &action)
        {
            return match &self.transaction_id {
                Some(recorded) if recorded == transaction_id => Ok(self.clone()),
                recorded => Err(PaymentRequestError::TransactionMismatch {
                    recorded: recorded.clone().unwrap_or_default(),
                    received: transaction_id.clone(),
                }),
            };
        }

        if !state.allows(kind) {
            return Err(PaymentRequestError::InvalidTransition {
                state,
                action: kind,
            });
        }

        let mut next = self.clone();

        match action {
            PaymentAction::Approve => next.admin_status = AdminStatus::Approved,
            PaymentAction::Reject => next.admin_status = AdminStatus::Rejected,
            PaymentAction::Send => next.customer_status = CustomerStatus::Sent,
            PaymentAction::Cancel => next.cancelled = true,
            PaymentAction::Decline => next.customer_status = CustomerStatus::Declined,
            PaymentAction::ConfirmPayment { transaction_id } => {
                next.customer_status = CustomerStatus::Paid;
                next.transaction_id = Some(transaction_id);
            }
        }

        Ok(next)
    }

    /// Request id
    pub fn id(&self) -> PaymentRequestId {
        self.id
    }

    /// Booking the request belongs to
    pub fn booking_id(&self) -> BookingId {
        self.booking_id
    }

    /// Requested amount
    pub fn amount(&self) -> &Money<'a, Currency> {
        &self.amount
    }

    /// Admin decision
    pub fn admin_status(&self) -> AdminStatus {
        self.admin_status
    }

    /// Customer status
    pub fn customer_status(&self) -> CustomerStatus {
        self.customer_status
    }

    /// Whether the partner withdrew the request
    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Gateway transaction recorded on payment
    pub fn transaction_id(&self) -> Option<&str> {
        self.transaction_id.as_deref()
    }
}

/// Ensure none of `requests` for `booking_id` is still open.
///
/// # Errors
///
/// Returns [`PaymentRequestError::OpenRequestExists`] with the first open request found.
pub fn ensure_no_open_request<'r, 'a: 'r>(
    booking_id: BookingId,
    requests: impl IntoIterator<Item = &'r PaymentRequest<'a>>,
) -> Result<(), PaymentRequestError> {
    match requests
        .into_iter()
        .find(|request| request.booking_id == booking_id && request.is_open())
    {
        Some(open) => Err(PaymentRequestError::OpenRequestExists(open.id)),
        None => Ok(()),
    }
}
