//! Test context for desk tests.

use std::sync::Arc;

use atelier::{
    bookings::{
        BookingId, BookingRecord, BookingStatus, PartnerCancelStatus, PaymentSummary,
        TransitionContext,
    },
    cancellation::CancellationPolicy,
    selection::DateSlot,
};
use jiff::{
    Timestamp,
    civil::{date, time},
};
use rusty_money::{Money, iso::INR};

use crate::{desk::BookingDesk, gateway::PaymentGateway};

use super::memory::InMemoryServer;

/// Instant the server and the desk agree on: 2026-11-01 09:00 UTC.
const NOW: i64 = 1_793_523_600;

pub struct TestContext {
    pub server: Arc<InMemoryServer>,
    pub booking: BookingId,
}

impl TestContext {
    /// A server holding one confirmed whole-day booking on 2026-11-20, with ₹9440 due and
    /// ₹1888 already paid.
    pub async fn new() -> Self {
        let policy = CancellationPolicy::default();
        let server = Arc::new(InMemoryServer::new(TransitionContext {
            now: policy.local_now(Self::now()),
            policy,
        }));

        let booking = BookingId::from_key("BK-1001");

        server
            .insert_booking(BookingRecord {
                id: booking,
                custom_booking_id: "BK-1001".to_string(),
                status: BookingStatus::Confirmed,
                partner_cancel_status: PartnerCancelStatus::NotRequested,
                partner_cancel_reason: None,
                assignee: None,
                booking_dates: vec![DateSlot::whole_day(date(2026, 11, 20))],
                payment_summary: PaymentSummary {
                    total_amount: Money::from_minor(9_440_00, INR),
                    total_paid: Money::from_minor(1_888_00, INR),
                    pending_amount: Money::from_minor(7_552_00, INR),
                    invoices: Vec::new(),
                },
            })
            .await;

        Self { server, booking }
    }

    pub fn now() -> Timestamp {
        Timestamp::from_second(NOW).unwrap_or(Timestamp::UNIX_EPOCH)
    }

    /// A desk talking to the in-memory server through `gateway`.
    pub fn desk(&self, gateway: impl PaymentGateway + 'static) -> BookingDesk {
        BookingDesk::new(
            self.server.clone(),
            self.server.clone(),
            Arc::new(gateway),
            CancellationPolicy::default(),
        )
    }
}

#[test]
fn now_is_the_first_of_november() {
    assert_eq!(
        TestContext::now()
            .to_zoned(jiff::tz::TimeZone::UTC)
            .datetime(),
        date(2026, 11, 1).to_datetime(time(9, 0, 0, 0))
    );
}
