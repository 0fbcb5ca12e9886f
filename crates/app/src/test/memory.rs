//! In-memory server of record.
//!
//! Enforces the same transitions as the real server, answering with a conflict whenever a
//! guard fails, so desk tests can exercise the authoritative side of every workflow.

use async_trait::async_trait;
use atelier::{
    bookings::{BookingAction, BookingId, BookingRecord, TransitionContext},
    payments::{Actor, PaymentAction, PaymentRequest, PaymentRequestId, ensure_no_open_request},
};
use rustc_hash::FxHashMap;
use tokio::sync::Mutex;

use crate::domain::{
    bookings::{BookingsService, BookingsServiceError},
    payment_requests::{PaymentRequestsService, PaymentRequestsServiceError},
};

pub struct InMemoryServer {
    bookings: Mutex<FxHashMap<BookingId, BookingRecord<'static>>>,
    requests: Mutex<FxHashMap<PaymentRequestId, PaymentRequest<'static>>>,
    ctx: TransitionContext,
}

impl InMemoryServer {
    pub fn new(ctx: TransitionContext) -> Self {
        Self {
            bookings: Mutex::new(FxHashMap::default()),
            requests: Mutex::new(FxHashMap::default()),
            ctx,
        }
    }

    pub async fn insert_booking(&self, booking: BookingRecord<'static>) {
        self.bookings.lock().await.insert(booking.id, booking);
    }

    pub async fn request(&self, request: PaymentRequestId) -> Option<PaymentRequest<'static>> {
        self.requests.lock().await.get(&request).cloned()
    }
}

#[async_trait]
impl BookingsService for InMemoryServer {
    async fn get_booking(
        &self,
        booking: BookingId,
    ) -> Result<BookingRecord<'static>, BookingsServiceError> {
        self.bookings
            .lock()
            .await
            .get(&booking)
            .cloned()
            .ok_or(BookingsServiceError::NotFound)
    }

    async fn apply_action(
        &self,
        booking: BookingId,
        action: BookingAction,
    ) -> Result<(), BookingsServiceError> {
        let mut bookings = self.bookings.lock().await;

        let current = bookings
            .get(&booking)
            .ok_or(BookingsServiceError::NotFound)?;

        let updated = current
            .apply(action, &self.ctx)
            .map_err(|error| BookingsServiceError::Conflict(error.to_string()))?;

        bookings.insert(booking, updated);

        Ok(())
    }
}

#[async_trait]
impl PaymentRequestsService for InMemoryServer {
    async fn list_for_booking(
        &self,
        booking: BookingId,
    ) -> Result<Vec<PaymentRequest<'static>>, PaymentRequestsServiceError> {
        let requests = self.requests.lock().await;

        Ok(requests
            .values()
            .filter(|request| request.booking_id() == booking)
            .cloned()
            .collect())
    }

    async fn get_request(
        &self,
        request: PaymentRequestId,
    ) -> Result<PaymentRequest<'static>, PaymentRequestsServiceError> {
        self.request(request)
            .await
            .ok_or(PaymentRequestsServiceError::NotFound)
    }

    async fn create_request(
        &self,
        request: PaymentRequest<'static>,
    ) -> Result<(), PaymentRequestsServiceError> {
        if !self.bookings.lock().await.contains_key(&request.booking_id()) {
            return Err(PaymentRequestsServiceError::Rejected(
                "unknown booking".to_string(),
            ));
        }

        let mut requests = self.requests.lock().await;

        if requests.contains_key(&request.id()) {
            return Err(PaymentRequestsServiceError::AlreadyExists);
        }

        ensure_no_open_request(request.booking_id(), requests.values())
            .map_err(|error| PaymentRequestsServiceError::Conflict(error.to_string()))?;

        requests.insert(request.id(), request);

        Ok(())
    }

    async fn apply_action(
        &self,
        request: PaymentRequestId,
        action: PaymentAction,
        actor: Actor,
    ) -> Result<(), PaymentRequestsServiceError> {
        let mut requests = self.requests.lock().await;

        let current = requests
            .get(&request)
            .ok_or(PaymentRequestsServiceError::NotFound)?;

        let updated = current
            .apply(action, actor)
            .map_err(|error| PaymentRequestsServiceError::Conflict(error.to_string()))?;

        requests.insert(request, updated);

        Ok(())
    }
}
