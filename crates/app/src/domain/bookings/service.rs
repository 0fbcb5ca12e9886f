//! Bookings service.

use async_trait::async_trait;
use atelier::bookings::{BookingAction, BookingId, BookingRecord};
use mockall::automock;

use crate::domain::bookings::errors::BookingsServiceError;

/// Server of record for bookings.
#[automock]
#[async_trait]
pub trait BookingsService: Send + Sync {
    /// Retrieve the authoritative booking record.
    async fn get_booking(
        &self,
        booking: BookingId,
    ) -> Result<BookingRecord<'static>, BookingsServiceError>;

    /// Ask the server to apply an action. The server checks the transition again and
    /// answers with [`BookingsServiceError::Conflict`] when its guard no longer holds.
    async fn apply_action(
        &self,
        booking: BookingId,
        action: BookingAction,
    ) -> Result<(), BookingsServiceError>;
}
