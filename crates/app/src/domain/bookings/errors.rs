//! Bookings service errors.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BookingsServiceError {
    #[error("booking not found")]
    NotFound,

    /// The server's guard no longer holds, e.g. another actor changed the booking first.
    #[error("booking changed on the server: {0}")]
    Conflict(String),

    #[error("server rejected the request: {0}")]
    Rejected(String),

    #[error("booking server unavailable: {0}")]
    Unavailable(String),
}
