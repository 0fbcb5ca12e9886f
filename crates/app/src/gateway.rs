//! Payment gateway contract.
//!
//! Only the correlation side of the gateway lives here: given the transaction id from a
//! gateway callback, ask the gateway what was actually captured.

use async_trait::async_trait;
use atelier::payments::PaymentRequestId;
use mockall::automock;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

/// Gateway failures. None of them change a payment request.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The gateway reported the payment as declined.
    #[error("payment declined: {reason}")]
    Declined {
        /// Decline reason
        reason: String,
    },

    /// The gateway has no record of the transaction.
    #[error("unknown transaction: {0}")]
    UnknownTransaction(String),

    /// The transaction was made against a different request.
    #[error("transaction {0} belongs to another payment request")]
    RequestMismatch(String),

    /// Captured amount differs from the request.
    #[error("captured {captured} but the request is for {requested}")]
    AmountMismatch {
        /// Amount the gateway captured
        captured: String,

        /// Amount on the request
        requested: String,
    },

    /// The gateway did not answer in time.
    #[error("gateway timeout")]
    Timeout,

    /// The gateway could not be reached.
    #[error("gateway unavailable: {0}")]
    Unavailable(String),
}

/// A payment the gateway confirms as captured.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedPayment {
    /// Gateway transaction id
    pub transaction_id: String,

    /// Request the payment was made against, as recorded by the gateway
    pub request: PaymentRequestId,

    /// Amount captured
    pub amount: Money<'static, Currency>,
}

/// Payment gateway
#[automock]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Look up a transaction reported by a callback.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the payment was not captured or the gateway cannot be
    /// reached.
    async fn verify_transaction(&self, transaction_id: &str) -> Result<CapturedPayment, GatewayError>;
}
