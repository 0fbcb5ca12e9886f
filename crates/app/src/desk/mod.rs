//! Booking desk
//!
//! Guarded remote workflows. Each operation fetches the authoritative record, runs the
//! local state machine as a pre-flight check, issues the remote call and then re-reads the
//! record; the server's answer is what gets returned, never the locally computed state.
//! Nothing here retries: a conflict from the server is handed straight back to the caller.

use std::sync::Arc;

use atelier::{
    bookings::{BookingAction, BookingId, BookingRecord, TransitionContext},
    cancellation::{CancellationPolicy, CancellationVerdict},
    payments::{Actor, PaymentAction, PaymentRequest, PaymentRequestId, PaymentRequestState},
};
use jiff::Timestamp;
use rusty_money::{Money, iso::Currency};
use tracing::{info, warn};

use crate::{
    domain::{
        bookings::BookingsService,
        payment_requests::{PaymentRequestsService, PaymentRequestsServiceError},
    },
    gateway::{GatewayError, PaymentGateway},
};

pub mod errors;

pub use errors::DeskError;

/// Which cancel buttons to enable for a booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancellationOptions {
    /// Customer cancellation
    pub customer: CancellationVerdict,

    /// Partner cancellation request
    pub partner: CancellationVerdict,
}

/// Runs booking and payment-request workflows against the server of record and the
/// payment gateway.
#[derive(Clone)]
pub struct BookingDesk {
    bookings: Arc<dyn BookingsService>,
    payment_requests: Arc<dyn PaymentRequestsService>,
    gateway: Arc<dyn PaymentGateway>,
    policy: CancellationPolicy,
}

impl BookingDesk {
    /// A desk over the given services, checking cancellations with `policy`.
    #[must_use]
    pub fn new(
        bookings: Arc<dyn BookingsService>,
        payment_requests: Arc<dyn PaymentRequestsService>,
        gateway: Arc<dyn PaymentGateway>,
        policy: CancellationPolicy,
    ) -> Self {
        Self {
            bookings,
            payment_requests,
            gateway,
            policy,
        }
    }

    fn context(&self, now: Timestamp) -> TransitionContext {
        TransitionContext {
            now: self.policy.local_now(now),
            policy: self.policy.clone(),
        }
    }

    /// Current cancellation verdicts for a booking.
    ///
    /// # Errors
    ///
    /// Returns an error if the booking cannot be fetched.
    #[tracing::instrument(
        name = "desk.cancellation_options",
        skip(self),
        fields(booking_id = %booking),
        err
    )]
    pub async fn cancellation_options(
        &self,
        booking: BookingId,
        now: Timestamp,
    ) -> Result<CancellationOptions, DeskError> {
        let record = self.bookings.get_booking(booking).await?;
        let now = self.policy.local_now(now);

        Ok(CancellationOptions {
            customer: self.policy.customer_can_cancel(&record, now),
            partner: self.policy.partner_can_cancel(&record, now),
        })
    }

    /// Move a booking through its lifecycle.
    ///
    /// # Errors
    ///
    /// - [`DeskError::Validation`]: a cancellation rule denies the action.
    /// - [`DeskError::InvalidTransition`]: the action is not valid in the current state.
    /// - [`DeskError::Conflict`]: the server's guard failed.
    /// - [`DeskError::NotFound`] / [`DeskError::Unavailable`]: the server could not serve
    ///   the booking.
    #[tracing::instrument(
        name = "desk.transition_booking",
        skip(self, action),
        fields(booking_id = %booking, action = action.name()),
        err
    )]
    pub async fn transition_booking(
        &self,
        booking: BookingId,
        action: BookingAction,
        now: Timestamp,
    ) -> Result<BookingRecord<'static>, DeskError> {
        let current = self.bookings.get_booking(booking).await?;

        current.apply(action.clone(), &self.context(now))?;

        remote(self.bookings.apply_action(booking, action).await)?;

        let updated = self.bookings.get_booking(booking).await?;

        info!(
            booking_id = %booking,
            status = %updated.status,
            partner_cancel_status = %updated.partner_cancel_status,
            "booking transitioned"
        );

        Ok(updated)
    }

    /// Customer cancellation.
    ///
    /// # Errors
    ///
    /// See [`BookingDesk::transition_booking`].
    pub async fn cancel_booking(
        &self,
        booking: BookingId,
        now: Timestamp,
    ) -> Result<BookingRecord<'static>, DeskError> {
        self.transition_booking(booking, BookingAction::CustomerCancel, now)
            .await
    }

    /// Partner asks an admin to cancel.
    ///
    /// # Errors
    ///
    /// See [`BookingDesk::transition_booking`].
    pub async fn request_partner_cancellation(
        &self,
        booking: BookingId,
        reason: String,
        now: Timestamp,
    ) -> Result<BookingRecord<'static>, DeskError> {
        self.transition_booking(
            booking,
            BookingAction::RequestPartnerCancellation { reason },
            now,
        )
        .await
    }

    /// Raise a payment request for part of what a booking still owes.
    ///
    /// # Errors
    ///
    /// - [`DeskError::Validation`]: the amount or booking does not allow a request.
    /// - [`DeskError::Conflict`]: another request is still open.
    #[tracing::instrument(
        name = "desk.create_payment_request",
        skip(self, amount),
        fields(booking_id = %booking, amount = %amount, request_id = tracing::field::Empty),
        err
    )]
    pub async fn create_payment_request(
        &self,
        booking: BookingId,
        amount: Money<'static, Currency>,
    ) -> Result<PaymentRequest<'static>, DeskError> {
        let record = self.bookings.get_booking(booking).await?;
        let existing = self.payment_requests.list_for_booking(booking).await?;

        let request = PaymentRequest::create(&record, amount, &existing)?;
        let request_id = request.id();

        tracing::Span::current().record("request_id", tracing::field::display(request_id));

        remote(self.payment_requests.create_request(request).await)?;

        let created = self.payment_requests.get_request(request_id).await?;

        info!(booking_id = %booking, request_id = %request_id, "created payment request");

        Ok(created)
    }

    /// Approve, reject, send, cancel or decline a payment request.
    ///
    /// # Errors
    ///
    /// - [`DeskError::Validation`]: `action` is a payment confirmation, which only
    ///   [`BookingDesk::verify_payment`] may record.
    /// - [`DeskError::InvalidTransition`]: `actor` may not act, or the guard does not hold.
    /// - [`DeskError::Conflict`]: the server's guard failed.
    #[tracing::instrument(
        name = "desk.act_on_payment_request",
        skip(self, action),
        fields(request_id = %request, action = %action.kind(), actor = %actor),
        err
    )]
    pub async fn act_on_payment_request(
        &self,
        request: PaymentRequestId,
        action: PaymentAction,
        actor: Actor,
    ) -> Result<PaymentRequest<'static>, DeskError> {
        if let PaymentAction::ConfirmPayment { .. } = action {
            return Err(DeskError::Validation(
                "payments are confirmed by verifying the gateway transaction".to_string(),
            ));
        }

        let current = self.payment_requests.get_request(request).await?;

        current.apply(action.clone(), actor)?;

        remote(
            self.payment_requests
                .apply_action(request, action, actor)
                .await,
        )?;

        let updated = self.payment_requests.get_request(request).await?;

        info!(request_id = %request, state = %updated.state(), "payment request updated");

        Ok(updated)
    }

    /// Resolve a gateway callback against server state.
    ///
    /// Safe to call more than once and from anywhere: an already recorded identical
    /// transaction returns the paid request without asking the gateway again, and a
    /// gateway failure leaves the request as it was.
    ///
    /// # Errors
    ///
    /// - [`DeskError::Gateway`]: the gateway did not confirm a matching capture.
    /// - [`DeskError::InvalidTransition`]: the request is not awaiting payment, or was paid
    ///   under another transaction.
    /// - [`DeskError::Conflict`]: the server recorded something else in the meantime.
    #[tracing::instrument(
        name = "desk.verify_payment",
        skip(self),
        fields(request_id = %request),
        err
    )]
    pub async fn verify_payment(
        &self,
        request: PaymentRequestId,
        transaction_id: &str,
    ) -> Result<PaymentRequest<'static>, DeskError> {
        let current = self.payment_requests.get_request(request).await?;
        let action = PaymentAction::ConfirmPayment {
            transaction_id: transaction_id.to_string(),
        };

        current.apply(action.clone(), Actor::Customer)?;

        if current.state() == PaymentRequestState::Paid {
            info!(request_id = %request, "payment already recorded");

            return Ok(current);
        }

        let captured = self
            .gateway
            .verify_transaction(transaction_id)
            .await
            .inspect_err(|error| warn!(request_id = %request, "gateway failed: {error}"))?;

        if captured.request != request {
            return Err(GatewayError::RequestMismatch(captured.transaction_id).into());
        }

        if captured.amount != *current.amount() {
            return Err(GatewayError::AmountMismatch {
                captured: captured.amount.to_string(),
                requested: current.amount().to_string(),
            }
            .into());
        }

        match self
            .payment_requests
            .apply_action(request, action, Actor::Customer)
            .await
        {
            Ok(()) => {}
            Err(PaymentRequestsServiceError::Conflict(reason)) => {
                let latest = self.payment_requests.get_request(request).await?;

                if latest.transaction_id() == Some(transaction_id) {
                    info!(request_id = %request, "payment recorded by a concurrent callback");

                    return Ok(latest);
                }

                warn!(request_id = %request, "payment conflict: {reason}");

                return Err(DeskError::Conflict(reason));
            }
            Err(error) => return Err(error.into()),
        }

        let updated = self.payment_requests.get_request(request).await?;

        info!(request_id = %request, "payment verified");

        Ok(updated)
    }
}

/// Convert a remote call's error, logging conflicts.
fn remote<T, E>(result: Result<T, E>) -> Result<T, DeskError>
where
    E: Into<DeskError>,
{
    result.map_err(|error| {
        let error = error.into();

        if let DeskError::Conflict(reason) = &error {
            warn!("server rejected change: {reason}");
        }

        error
    })
}
