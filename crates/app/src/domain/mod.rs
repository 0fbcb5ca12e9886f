//! Atelier Domain Concerns

pub mod bookings;
pub mod payment_requests;
