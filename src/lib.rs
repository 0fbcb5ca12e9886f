//! Atelier
//!
//! Atelier is the booking pricing and lifecycle engine behind a studio and freelancer marketplace:
//! it turns a cart and a set of reserved date slots into a deterministic invoice, decides whether
//! a booking may be cancelled, and guards the payment-request and booking-status state machines.

pub mod bookings;
pub mod cancellation;
pub mod cart;
pub mod checkout;
pub mod entities;
pub mod fixtures;
pub mod ids;
pub mod invoice;
pub mod payments;
pub mod prelude;
pub mod pricing;
pub mod selection;
