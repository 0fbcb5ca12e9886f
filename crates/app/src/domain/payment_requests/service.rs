//! Payment requests service.

use async_trait::async_trait;
use atelier::{
    bookings::BookingId,
    payments::{Actor, PaymentAction, PaymentRequest, PaymentRequestId},
};
use mockall::automock;

use crate::domain::payment_requests::errors::PaymentRequestsServiceError;

/// Server of record for payment requests.
#[automock]
#[async_trait]
pub trait PaymentRequestsService: Send + Sync {
    /// Retrieves all payment requests raised against a booking.
    async fn list_for_booking(
        &self,
        booking: BookingId,
    ) -> Result<Vec<PaymentRequest<'static>>, PaymentRequestsServiceError>;

    /// Retrieve a single payment request.
    async fn get_request(
        &self,
        request: PaymentRequestId,
    ) -> Result<PaymentRequest<'static>, PaymentRequestsServiceError>;

    /// Store a newly created request.
    async fn create_request(
        &self,
        request: PaymentRequest<'static>,
    ) -> Result<(), PaymentRequestsServiceError>;

    /// Ask the server to apply an action on behalf of `actor`.
    async fn apply_action(
        &self,
        request: PaymentRequestId,
        action: PaymentAction,
        actor: Actor,
    ) -> Result<(), PaymentRequestsServiceError>;
}
