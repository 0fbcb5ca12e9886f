//! Checkout
//!
//! Ties the cart and the booking selection to a cached invoice. Every command clears the
//! cached invoice before it is applied, so a caller can never read totals computed before
//! the latest change; the invoice is recomputed on demand, and again whenever it is asked
//! for with different rates.

use decimal_percentage::Percentage;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::{
    cart::{Cart, CartCommand, CartError, CartLineItem},
    invoice::{InvoiceBreakdown, InvoiceError, compute_invoice},
    pricing::standard_gst,
    selection::{BookingSelection, BookingTarget, DateSlot, SelectionCommand, SelectionError},
};

/// Errors raised by checkout commands.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CheckoutError {
    /// Invalid cart input.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Invalid selection input.
    #[error(transparent)]
    Selection(#[from] SelectionError),

    /// Invoice could not be computed.
    #[error(transparent)]
    Invoice(#[from] InvoiceError),

    /// Submission attempted without any booked date.
    #[error("select at least one date before checking out")]
    NothingSelected,
}

/// Rates fetched from collaborators that the invoice depends on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuoteRates<'a> {
    /// Entity price per hour (ignored for admin packages)
    pub hourly_rate: Money<'a, Currency>,

    /// GST rate
    pub gst_rate: Percentage,
}

impl<'a> QuoteRates<'a> {
    /// Rates with the standard GST.
    pub fn new(hourly_rate: Money<'a, Currency>) -> Self {
        Self {
            hourly_rate,
            gst_rate: standard_gst(),
        }
    }
}

/// A checkout mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutCommand<'a> {
    /// Change the cart.
    Cart(CartCommand<'a>),

    /// Change the booking selection.
    Selection(SelectionCommand<'a>),
}

impl<'a> From<CartCommand<'a>> for CheckoutCommand<'a> {
    fn from(command: CartCommand<'a>) -> Self {
        Self::Cart(command)
    }
}

impl<'a> From<SelectionCommand<'a>> for CheckoutCommand<'a> {
    fn from(command: SelectionCommand<'a>) -> Self {
        Self::Selection(command)
    }
}

/// What is handed to the collaborator that creates the booking.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutSubmission<'a> {
    /// What is being booked
    pub target: BookingTarget<'a>,

    /// Booked dates in calendar order
    pub dates: Vec<DateSlot>,

    /// Cart lines (empty for admin packages)
    pub lines: Vec<CartLineItem<'a>>,

    /// Invoice computed from exactly this state
    pub invoice: InvoiceBreakdown<'a>,
}

/// Checkout state
#[derive(Debug, Clone, PartialEq)]
pub struct Checkout<'a> {
    cart: Cart<'a>,
    selection: BookingSelection<'a>,
    invoice: Option<(QuoteRates<'a>, InvoiceBreakdown<'a>)>,
}

impl<'a> Checkout<'a> {
    /// An empty checkout priced in `currency`.
    #[must_use]
    pub fn new(currency: &'static Currency) -> Self {
        Self {
            cart: Cart::new(currency),
            selection: BookingSelection::new(),
            invoice: None,
        }
    }

    /// Apply a command atomically. The cached invoice is cleared whether or not the command
    /// succeeds; a failed command leaves the cart and selection untouched.
    ///
    /// # Errors
    ///
    /// Returns a [`CheckoutError`] wrapping the cart or selection validation error.
    pub fn reduce(&mut self, command: impl Into<CheckoutCommand<'a>>) -> Result<(), CheckoutError> {
        self.invoice = None;

        match command.into() {
            CheckoutCommand::Cart(command) => self.cart.apply(command)?,
            CheckoutCommand::Selection(command) => self.selection.apply(command)?,
        }

        Ok(())
    }

    /// The invoice for the current state at `rates`, computed now unless one priced at the
    /// same rates is cached.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Invoice`] if the invoice cannot be computed.
    pub fn invoice(&mut self, rates: QuoteRates<'a>) -> Result<&InvoiceBreakdown<'a>, CheckoutError> {
        let invoice = match self.invoice.take() {
            Some((cached_rates, invoice)) if cached_rates == rates => invoice,
            _ => compute_invoice(
                &self.cart,
                &self.selection,
                rates.hourly_rate,
                rates.gst_rate,
            )?,
        };

        let (_, invoice) = self.invoice.insert((rates, invoice));

        Ok(invoice)
    }

    /// The cached invoice, absent after every command.
    pub fn cached_invoice(&self) -> Option<&InvoiceBreakdown<'a>> {
        self.invoice.as_ref().map(|(_, invoice)| invoice)
    }

    /// Snapshot of the current state with a freshly computed invoice.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::NothingSelected`]: no date is selected.
    /// - [`CheckoutError::Invoice`]: the invoice cannot be computed.
    pub fn submission(&self, rates: QuoteRates<'a>) -> Result<CheckoutSubmission<'a>, CheckoutError> {
        let (Some(target), false) = (self.selection.target(), self.selection.is_empty()) else {
            return Err(CheckoutError::NothingSelected);
        };

        let invoice = compute_invoice(
            &self.cart,
            &self.selection,
            rates.hourly_rate,
            rates.gst_rate,
        )?;

        let lines = match target {
            BookingTarget::Regular(_) => self.cart.iter().cloned().collect(),
            BookingTarget::AdminPackage(_) => Vec::new(),
        };

        Ok(CheckoutSubmission {
            target: *target,
            dates: self.selection.dates(target.mode()).copied().collect(),
            lines,
            invoice,
        })
    }

    /// The cart
    pub fn cart(&self) -> &Cart<'a> {
        &self.cart
    }

    /// The booking selection
    pub fn selection(&self) -> &BookingSelection<'a> {
        &self.selection
    }
}
