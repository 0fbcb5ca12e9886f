//! Atelier prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    bookings::{
        BookingAction, BookingError, BookingId, BookingRecord, BookingStatus, PartnerCancelStatus,
        PaymentSummary, TransitionContext,
    },
    cancellation::{
        CancellationDenied, CancellationPolicy, CancellationVerdict, customer_can_cancel,
        partner_can_cancel,
    },
    cart::{Cart, CartCommand, CartError, CartLineItem, Category, LineItemData, LineItemId, Quantity},
    checkout::{Checkout, CheckoutCommand, CheckoutError, CheckoutSubmission, QuoteRates},
    entities::{AdminPackage, EntityId, EntityInfo, EntityKind, EntityRef, PackageId, PackageRef},
    fixtures::{FixtureError, QuoteFixture},
    ids::Id,
    invoice::{InvoiceBreakdown, InvoiceError, InvoiceLine, InvoiceLineKind, compute_invoice},
    payments::{
        Actor, PaymentAction, PaymentActionKind, PaymentRequest, PaymentRequestError,
        PaymentRequestId, PaymentRequestState, ensure_no_open_request,
    },
    pricing::{PricingError, standard_gst},
    selection::{
        BookingMode, BookingSelection, BookingTarget, DateSlot, SelectionCommand, SelectionError,
    },
};
