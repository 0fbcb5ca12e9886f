//! Payment request actions and actors

use std::fmt;

use serde::{Deserialize, Serialize};

/// Who is acting on a payment request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Actor {
    /// The customer who owes the payment.
    Customer,

    /// The studio or freelancer collecting it.
    Partner,

    /// A platform administrator.
    Admin,
}

impl Actor {
    /// Wire name of the actor.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Partner => "partner",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An action on a payment request, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentActionKind {
    /// Admin approves the request.
    Approve,

    /// Admin rejects the request.
    Reject,

    /// Partner sends the approved request to the customer.
    Send,

    /// Partner withdraws the request before it is sent.
    Cancel,

    /// Customer declines to pay.
    Decline,

    /// Gateway confirms the customer's payment.
    ConfirmPayment,
}

impl PaymentActionKind {
    /// Every action kind.
    pub const ALL: [Self; 6] = [
        Self::Approve,
        Self::Reject,
        Self::Send,
        Self::Cancel,
        Self::Decline,
        Self::ConfirmPayment,
    ];

    /// The only actor allowed to perform this action.
    pub const fn actor(self) -> Actor {
        match self {
            Self::Approve | Self::Reject => Actor::Admin,
            Self::Send | Self::Cancel => Actor::Partner,
            Self::Decline | Self::ConfirmPayment => Actor::Customer,
        }
    }

    /// Wire name of the action.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::Send => "send",
            Self::Cancel => "cancel",
            Self::Decline => "decline",
            Self::ConfirmPayment => "confirm_payment",
        }
    }
}

impl fmt::Display for PaymentActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An action on a payment request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentAction {
    /// Admin approves the request.
    Approve,

    /// Admin rejects the request.
    Reject,

    /// Partner sends the approved request to the customer.
    Send,

    /// Partner withdraws the request before it is sent.
    Cancel,

    /// Customer declines to pay.
    Decline,

    /// Gateway callback confirmed a payment.
    ConfirmPayment {
        /// Gateway transaction the payment is correlated by
        transaction_id: String,
    },
}

impl PaymentAction {
    /// The action without its payload.
    pub const fn kind(&self) -> PaymentActionKind {
        match self {
            Self::Approve => PaymentActionKind::Approve,
            Self::Reject => PaymentActionKind::Reject,
            Self::Send => PaymentActionKind::Send,
            Self::Cancel => PaymentActionKind::Cancel,
            Self::Decline => PaymentActionKind::Decline,
            Self::ConfirmPayment { .. } => PaymentActionKind::ConfirmPayment,
        }
    }
}
