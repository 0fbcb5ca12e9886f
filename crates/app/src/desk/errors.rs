//! Booking desk errors.

use atelier::{bookings::BookingError, payments::PaymentRequestError};
use thiserror::Error;

use crate::{
    domain::{bookings::BookingsServiceError, payment_requests::PaymentRequestsServiceError},
    gateway::GatewayError,
};

/// Failures surfaced to the calling UI layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeskError {
    /// Input or a cancellation rule was rejected locally.
    #[error("{0}")]
    Validation(String),

    /// The action's guard does not hold for the current state.
    #[error("invalid transition: {0}")]
    InvalidTransition(String),

    /// The server rejected a change because the record moved on first.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The payment gateway failed or disagreed with the request.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// The record does not exist on the server.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// The server could not be reached.
    #[error("unavailable: {0}")]
    Unavailable(String),
}

impl From<BookingError> for DeskError {
    fn from(error: BookingError) -> Self {
        match error {
            BookingError::Cancellation(denied) => Self::Validation(denied.to_string()),
            BookingError::InvalidTransition { .. }
            | BookingError::PartnerCancellationPending { .. }
            | BookingError::NoPendingRequest(_) => Self::InvalidTransition(error.to_string()),
        }
    }
}

impl From<PaymentRequestError> for DeskError {
    fn from(error: PaymentRequestError) -> Self {
        match error {
            PaymentRequestError::InvalidAmount { .. }
            | PaymentRequestError::CurrencyMismatch(..)
            | PaymentRequestError::BookingNotPayable(_) => Self::Validation(error.to_string()),
            PaymentRequestError::InvalidTransition { .. }
            | PaymentRequestError::Forbidden { .. }
            | PaymentRequestError::TransactionMismatch { .. } => {
                Self::InvalidTransition(error.to_string())
            }
            PaymentRequestError::OpenRequestExists(_) | PaymentRequestError::Unreachable { .. } => {
                Self::Conflict(error.to_string())
            }
        }
    }
}

impl From<BookingsServiceError> for DeskError {
    fn from(error: BookingsServiceError) -> Self {
        match error {
            BookingsServiceError::NotFound => Self::NotFound("booking"),
            BookingsServiceError::Conflict(reason) => Self::Conflict(reason),
            BookingsServiceError::Rejected(reason) => Self::InvalidTransition(reason),
            BookingsServiceError::Unavailable(reason) => Self::Unavailable(reason),
        }
    }
}

impl From<PaymentRequestsServiceError> for DeskError {
    fn from(error: PaymentRequestsServiceError) -> Self {
        match error {
            PaymentRequestsServiceError::NotFound => Self::NotFound("payment request"),
            PaymentRequestsServiceError::AlreadyExists => Self::Conflict(error.to_string()),
            PaymentRequestsServiceError::Conflict(reason) => Self::Conflict(reason),
            PaymentRequestsServiceError::Rejected(reason) => Self::InvalidTransition(reason),
            PaymentRequestsServiceError::Unavailable(reason) => Self::Unavailable(reason),
        }
    }
}
