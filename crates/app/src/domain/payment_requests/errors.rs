//! Payment requests service errors.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PaymentRequestsServiceError {
    #[error("payment request not found")]
    NotFound,

    #[error("payment request already exists")]
    AlreadyExists,

    /// The server's guard no longer holds, e.g. the request was already cancelled.
    #[error("payment request changed on the server: {0}")]
    Conflict(String),

    #[error("server rejected the request: {0}")]
    Rejected(String),

    #[error("payment server unavailable: {0}")]
    Unavailable(String),
}
