//! Invoice
//!
//! Derives a priced breakdown from a cart, a booking selection, the entity's hourly rate
//! and the GST rate. The calculation is pure: the same inputs always produce an identical
//! breakdown.
//!
//! - Regular mode: `subtotal = rate × total hours + Σ(unit price × quantity)`.
//! - Admin package mode: `subtotal = package price`; the cart and rate are ignored and the
//!   hours are informational.
//! - `gst = round(subtotal × gst rate)`, `grand total = subtotal + gst`.
//! - `advance = round(grand total × 20%)`, `on site = grand total - advance`.

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    cart::{Cart, Category, LineItemId},
    entities::PackageId,
    pricing::{
        PricingError, advance_share, checked_sum, ensure_currency, hourly_charge, line_total,
        percent_of_major,
    },
    selection::{BookingMode, BookingSelection, BookingTarget},
};

/// Errors that can occur while computing an invoice.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvoiceError {
    /// A rate or price is not in the cart currency (found, expected).
    #[error("price has currency {0}, but cart has currency {1}")]
    CurrencyMismatch(&'static str, &'static str),

    /// An amount could not be represented.
    #[error("invoice amount overflowed")]
    Overflow,
}

impl From<PricingError> for InvoiceError {
    fn from(error: PricingError) -> Self {
        match error {
            PricingError::CurrencyMismatch(found, expected) => {
                Self::CurrencyMismatch(found, expected)
            }
            PricingError::Overflow => Self::Overflow,
        }
    }
}

/// What an invoice line charges for.
#[derive(Debug, Clone, PartialEq)]
pub enum InvoiceLineKind<'a> {
    /// Booked hours at the entity's hourly rate.
    Hours {
        /// Total billable hours
        hours: Decimal,

        /// Price per hour
        rate: Money<'a, Currency>,
    },

    /// A cart line.
    Item {
        /// Cart category
        category: Category,

        /// Line item id
        id: LineItemId,

        /// Display name
        name: String,

        /// Quantity
        quantity: u32,

        /// Price per unit
        unit_price: Money<'a, Currency>,
    },

    /// A fixed-price admin package.
    Package {
        /// Package id
        id: PackageId,

        /// Hours covered (informational)
        hours: Decimal,
    },
}

/// One priced line of an invoice.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceLine<'a> {
    /// What the line charges for
    pub kind: InvoiceLineKind<'a>,

    /// Line amount
    pub amount: Money<'a, Currency>,
}

/// Priced breakdown of a booking.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceBreakdown<'a> {
    mode: BookingMode,
    total_hours: Decimal,
    subtotal: Money<'a, Currency>,
    gst_amount: Money<'a, Currency>,
    grand_total: Money<'a, Currency>,
    advance_amount: Money<'a, Currency>,
    on_site_amount: Money<'a, Currency>,
    lines: SmallVec<[InvoiceLine<'a>; 8]>,
}

impl<'a> InvoiceBreakdown<'a> {
    /// Mode the invoice was priced in.
    pub fn mode(&self) -> BookingMode {
        self.mode
    }

    /// Total billable hours of the selection.
    pub fn total_hours(&self) -> Decimal {
        self.total_hours
    }

    /// Amount before tax
    pub fn subtotal(&self) -> Money<'a, Currency> {
        self.subtotal
    }

    /// GST on the subtotal
    pub fn gst_amount(&self) -> Money<'a, Currency> {
        self.gst_amount
    }

    /// Subtotal plus GST
    pub fn grand_total(&self) -> Money<'a, Currency> {
        self.grand_total
    }

    /// Deposit collected at checkout
    pub fn advance_amount(&self) -> Money<'a, Currency> {
        self.advance_amount
    }

    /// Balance collected on site
    pub fn on_site_amount(&self) -> Money<'a, Currency> {
        self.on_site_amount
    }

    /// Priced lines, hours or package first, then cart lines by category.
    pub fn lines(&self) -> &[InvoiceLine<'a>] {
        &self.lines
    }
}

/// Compute the invoice for a cart and booking selection.
///
/// # Errors
///
/// - [`InvoiceError::CurrencyMismatch`]: the hourly rate or package price is not in the
///   cart currency.
/// - [`InvoiceError::Overflow`]: an amount could not be represented.
pub fn compute_invoice<'a>(
    cart: &Cart<'a>,
    selection: &BookingSelection<'a>,
    hourly_rate: Money<'a, Currency>,
    gst_rate: Percentage,
) -> Result<InvoiceBreakdown<'a>, InvoiceError> {
    let currency = cart.currency();

    let (mode, total_hours, subtotal, lines) = match selection.target() {
        Some(BookingTarget::AdminPackage(package)) => {
            ensure_currency(&package.price, currency)?;

            let hours = selection.total_hours(BookingMode::AdminPackage);
            let mut lines: SmallVec<[InvoiceLine<'a>; 8]> = SmallVec::new();

            lines.push(InvoiceLine {
                kind: InvoiceLineKind::Package {
                    id: package.id,
                    hours,
                },
                amount: package.price,
            });

            (
                BookingMode::AdminPackage,
                hours,
                package.price.to_minor_units(),
                lines,
            )
        }
        Some(BookingTarget::Regular(_)) | None => {
            ensure_currency(&hourly_rate, currency)?;

            let hours = selection.total_hours(BookingMode::Regular);
            let (subtotal, lines) = regular_lines(cart, hours, hourly_rate, currency)?;

            (BookingMode::Regular, hours, subtotal, lines)
        }
    };

    let gst = percent_of_major(gst_rate, subtotal, currency)?;
    let grand_total = subtotal.checked_add(gst).ok_or(InvoiceError::Overflow)?;
    let advance = percent_of_major(advance_share(), grand_total, currency)?;
    let on_site = grand_total
        .checked_sub(advance)
        .ok_or(InvoiceError::Overflow)?;

    Ok(InvoiceBreakdown {
        mode,
        total_hours,
        subtotal: Money::from_minor(subtotal, currency),
        gst_amount: Money::from_minor(gst, currency),
        grand_total: Money::from_minor(grand_total, currency),
        advance_amount: Money::from_minor(advance, currency),
        on_site_amount: Money::from_minor(on_site, currency),
        lines,
    })
}

/// Hours line plus one line per cart entry, and their total in minor units.
fn regular_lines<'a>(
    cart: &Cart<'a>,
    hours: Decimal,
    hourly_rate: Money<'a, Currency>,
    currency: &'static Currency,
) -> Result<(i64, SmallVec<[InvoiceLine<'a>; 8]>), InvoiceError> {
    let mut lines = SmallVec::new();

    let hours_amount = hourly_charge(&hourly_rate, hours)?;

    if hours > Decimal::ZERO {
        lines.push(InvoiceLine {
            kind: InvoiceLineKind::Hours {
                hours,
                rate: hourly_rate,
            },
            amount: Money::from_minor(hours_amount, currency),
        });
    }

    let mut amounts: SmallVec<[i64; 8]> = SmallVec::new();

    amounts.push(hours_amount);

    for line in cart.iter() {
        let amount = line_total(line.unit_price(), line.quantity())?;

        amounts.push(amount);

        lines.push(InvoiceLine {
            kind: InvoiceLineKind::Item {
                category: line.category(),
                id: line.id(),
                name: line.name().to_string(),
                quantity: line.quantity(),
                unit_price: *line.unit_price(),
            },
            amount: Money::from_minor(amount, currency),
        });
    }

    Ok((checked_sum(amounts)?, lines))
}
