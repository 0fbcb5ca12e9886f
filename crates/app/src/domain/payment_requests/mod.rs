//! Payment Requests

pub mod errors;
pub mod service;

pub use errors::PaymentRequestsServiceError;
pub use service::*;
