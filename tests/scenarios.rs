//! Integration tests for the quote fixtures and the booking lifecycle built on them.
//!
//! - `scenario-a`: Lumen Studio, 3 hours at ₹2000 plus 2× candid shoot at ₹500 and a ₹1000
//!   softbox kit. Subtotal ₹8000, GST ₹1440, total ₹9440, advance ₹1888, on site ₹7552.
//! - `scenario-b`: wedding-day admin package at ₹5000. Subtotal ₹5000, GST ₹900, total
//!   ₹5900, advance ₹1180, on site ₹4720.
//! - `freelancer-multi-day`: a whole day plus 90 minutes at ₹1500 an hour, two helpers.

use jiff::civil::date;
use rusty_money::{Money, iso::INR};
use testresult::TestResult;

use atelier::{
    bookings::{BookingAction, BookingStatus, PartnerCancelStatus, TransitionContext},
    cancellation::{CancellationDenied, customer_can_cancel, partner_can_cancel},
    fixtures::QuoteFixture,
    payments::{Actor, PaymentAction, PaymentRequest, PaymentRequestState, ensure_no_open_request},
    selection::BookingMode,
};

fn assert_expected_totals(name: &str) -> TestResult {
    let fixture = QuoteFixture::from_set(name)?;
    let invoice = fixture.invoice()?;
    let expected = fixture.expected().ok_or("fixture has no expected totals")?;

    assert_eq!(invoice.subtotal(), expected.subtotal, "{name} subtotal");
    assert_eq!(invoice.gst_amount(), expected.gst, "{name} gst");
    assert_eq!(invoice.grand_total(), expected.grand_total, "{name} grand total");
    assert_eq!(invoice.advance_amount(), expected.advance, "{name} advance");
    assert_eq!(invoice.on_site_amount(), expected.on_site, "{name} on site");

    Ok(())
}

#[test]
fn fixture_sets_produce_expected_totals() -> TestResult {
    for name in ["scenario-a", "scenario-b", "freelancer-multi-day"] {
        assert_expected_totals(name)?;
    }

    Ok(())
}

#[test]
fn hourly_quote_lists_hours_and_items() -> TestResult {
    let invoice = QuoteFixture::from_set("scenario-a")?.invoice()?;

    assert_eq!(invoice.mode(), BookingMode::Regular);
    assert_eq!(invoice.lines().len(), 3);

    Ok(())
}

#[test]
fn package_quote_has_single_line() -> TestResult {
    let invoice = QuoteFixture::from_set("scenario-b")?.invoice()?;

    assert_eq!(invoice.mode(), BookingMode::AdminPackage);
    assert_eq!(invoice.lines().len(), 1);

    Ok(())
}

#[test]
fn customer_cancellation_window_for_scenario_a() -> TestResult {
    let booking = QuoteFixture::from_set("scenario-a")?
        .booking()?
        .ok_or("scenario-a has a booking")?;

    // Earliest slot starts 2026-11-05 10:00.
    let forty_nine_hours_before = date(2026, 11, 3).at(9, 0, 0, 0);
    let forty_seven_hours_before = date(2026, 11, 3).at(11, 0, 0, 0);

    assert!(customer_can_cancel(&booking, forty_nine_hours_before).allowed());
    assert!(!customer_can_cancel(&booking, forty_seven_hours_before).allowed());

    Ok(())
}

#[test]
fn partner_cancellation_window_for_scenario_a() -> TestResult {
    let booking = QuoteFixture::from_set("scenario-a")?
        .booking()?
        .ok_or("scenario-a has a booking")?;

    let three_days_before = date(2026, 11, 2).at(18, 0, 0, 0);
    let one_day_before = date(2026, 11, 4).at(8, 0, 0, 0);

    assert!(partner_can_cancel(&booking, three_days_before).allowed());

    let verdict = partner_can_cancel(&booking, one_day_before);

    assert!(!verdict.allowed());
    assert!(verdict.reason().is_some_and(|reason| reason.contains("1 day(s)")));

    Ok(())
}

#[test]
fn requested_partner_cancellation_blocks_completion() -> TestResult {
    let booking = QuoteFixture::from_set("freelancer-multi-day")?
        .booking()?
        .ok_or("freelancer-multi-day has a booking")?;

    assert_eq!(booking.status, BookingStatus::InProgress);
    assert_eq!(booking.partner_cancel_status, PartnerCancelStatus::Requested);

    let ctx = TransitionContext::new(date(2026, 11, 18).at(12, 0, 0, 0));

    assert!(booking.apply(BookingAction::Complete, &ctx).is_err());
    assert_eq!(
        partner_can_cancel(&booking, ctx.now).denial(),
        Some(&CancellationDenied::AlreadyRequested)
    );

    let resumed = booking.apply(BookingAction::RejectPartnerCancellation, &ctx)?;

    assert_eq!(
        resumed.apply(BookingAction::Complete, &ctx)?.status,
        BookingStatus::Completed
    );

    Ok(())
}

#[test]
fn advance_payment_request_lifecycle() -> TestResult {
    let booking = QuoteFixture::from_set("scenario-b")?
        .booking()?
        .ok_or("scenario-b has a booking")?;

    assert_eq!(
        booking.payment_summary.pending_amount,
        Money::from_minor(5_900_00, INR)
    );

    let request = PaymentRequest::create(&booking, Money::from_minor(1_180_00, INR), [])?;

    assert!(PaymentRequest::create(&booking, Money::from_minor(1_00, INR), [&request]).is_err());

    let paid = request
        .apply(PaymentAction::Approve, Actor::Admin)?
        .apply(PaymentAction::Send, Actor::Partner)?
        .apply(
            PaymentAction::ConfirmPayment {
                transaction_id: "pay_Nq81x".to_string(),
            },
            Actor::Customer,
        )?;

    assert_eq!(paid.state(), PaymentRequestState::Paid);
    assert!(paid.apply(PaymentAction::Cancel, Actor::Partner).is_err());
    assert!(ensure_no_open_request(booking.id, [&paid]).is_ok());

    Ok(())
}
