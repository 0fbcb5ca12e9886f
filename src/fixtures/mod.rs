//! Fixtures

use std::{fs, path::Path};

use decimal_percentage::Percentage;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::{
    bookings::{BookingId, BookingRecord, PartnerCancelStatus, PaymentSummary, UnknownStatus},
    cart::{CartCommand, CartError},
    checkout::{Checkout, CheckoutError, QuoteRates},
    entities::{AdminPackage, EntityInfo},
    fixtures::quote::{BookingFixture, ExpectedFixture, QuoteFile, QuoteLine},
    invoice::InvoiceBreakdown,
    pricing::standard_gst,
    selection::{BookingTarget, DateSlot, SelectionCommand, SelectionError},
};

pub mod prices;
pub mod quote;

pub use prices::{parse_money, parse_percentage, parse_price};

/// Default directory fixture sets are loaded from.
pub const DEFAULT_FIXTURES_DIR: &str = "./fixtures";

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Invalid percentage format
    #[error("Invalid percentage format: {0}")]
    InvalidPercentage(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Currency mismatch between prices
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// Neither an entity nor a package was given
    #[error("Quote names neither an entity nor a package")]
    MissingTarget,

    /// Both an entity and a package were given
    #[error("Quote names both an entity and a package")]
    AmbiguousTarget,

    /// Timed slot without a start or end
    #[error("Slot on {0} needs both a start and an end, or whole_day")]
    IncompleteSlot(jiff::civil::Date),

    /// Amount paid is negative or more than the grand total
    #[error("Total paid {paid} must be between zero and the grand total {total}")]
    InvalidTotalPaid {
        /// Amount paid
        paid: String,

        /// Invoice grand total
        total: String,
    },

    /// Unknown booking status
    #[error("Invalid booking status: {0}")]
    Status(#[from] UnknownStatus),

    /// Cart rejected a line
    #[error("Invalid cart line: {0}")]
    Cart(#[from] CartError),

    /// Selection rejected a date
    #[error("Invalid date: {0}")]
    Selection(#[from] SelectionError),

    /// Checkout failed
    #[error("Checkout failed: {0}")]
    Checkout(#[from] CheckoutError),
}

/// What a quote books.
#[derive(Debug, Clone, PartialEq)]
pub enum QuoteTarget {
    /// A studio or freelancer, by the hour
    Entity(EntityInfo<'static>),

    /// An admin package, at a fixed price
    Package(AdminPackage<'static>),
}

impl QuoteTarget {
    /// Selection target for this quote.
    pub fn to_booking_target(&self) -> BookingTarget<'static> {
        match self {
            Self::Entity(entity) => BookingTarget::Regular(entity.to_ref()),
            Self::Package(package) => BookingTarget::AdminPackage(package.to_ref()),
        }
    }
}

/// Totals a quote is expected to produce.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpectedTotals {
    /// Subtotal
    pub subtotal: Money<'static, Currency>,

    /// GST
    pub gst: Money<'static, Currency>,

    /// Grand total
    pub grand_total: Money<'static, Currency>,

    /// Advance
    pub advance: Money<'static, Currency>,

    /// On-site
    pub on_site: Money<'static, Currency>,
}

impl TryFrom<ExpectedFixture> for ExpectedTotals {
    type Error = FixtureError;

    fn try_from(fixture: ExpectedFixture) -> Result<Self, Self::Error> {
        Ok(ExpectedTotals {
            subtotal: parse_money(&fixture.subtotal)?,
            gst: parse_money(&fixture.gst)?,
            grand_total: parse_money(&fixture.grand_total)?,
            advance: parse_money(&fixture.advance)?,
            on_site: parse_money(&fixture.on_site)?,
        })
    }
}

/// A quote fixture: a target, cart lines and dates, optionally with a booking record and
/// the totals the invoice should come to.
#[derive(Debug)]
pub struct QuoteFixture {
    /// Fixture set name
    name: String,

    /// Currency every price in the set shares
    currency: &'static Currency,

    /// GST rate, when the fixture sets one
    gst_rate: Option<Percentage>,

    /// What is booked
    target: QuoteTarget,

    /// Cart lines
    lines: Vec<QuoteLine>,

    /// Booked dates
    dates: Vec<DateSlot>,

    /// Booking record section
    booking: Option<BookingFixture>,

    /// Expected totals
    expected: Option<ExpectedTotals>,
}

impl QuoteFixture {
    /// Load a quote set from the default fixtures directory
    ///
    /// # Errors
    ///
    /// Returns an error if the fixture file cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        Self::load(DEFAULT_FIXTURES_DIR, name)
    }

    /// Load `quotes/{name}.yml` under `base_path`
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, if prices mix currencies, or if
    /// the quote names no (or more than one) booking target.
    pub fn load(base_path: impl AsRef<Path>, name: &str) -> Result<Self, FixtureError> {
        let file_path = base_path.as_ref().join("quotes").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let file: QuoteFile = serde_norway::from_str(&contents)?;

        Self::from_file(name, file)
    }

    /// Build a quote from an already parsed file
    ///
    /// # Errors
    ///
    /// See [`QuoteFixture::load`].
    pub fn from_file(name: &str, file: QuoteFile) -> Result<Self, FixtureError> {
        let target = match (file.entity, file.package) {
            (Some(entity), None) => QuoteTarget::Entity(entity.try_into()?),
            (None, Some(package)) => QuoteTarget::Package(package.try_into()?),
            (None, None) => return Err(FixtureError::MissingTarget),
            (Some(_), Some(_)) => return Err(FixtureError::AmbiguousTarget),
        };

        let currency = match &target {
            QuoteTarget::Entity(entity) => entity.hourly_rate().currency(),
            QuoteTarget::Package(package) => package.price.currency(),
        };

        let lines = file
            .cart
            .into_iter()
            .map(QuoteLine::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        for line in &lines {
            let found = line.item.unit_price.currency();

            if found != currency {
                return Err(FixtureError::CurrencyMismatch(
                    currency.iso_alpha_code.to_string(),
                    found.iso_alpha_code.to_string(),
                ));
            }
        }

        let dates = file
            .dates
            .into_iter()
            .map(DateSlot::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let gst_rate = file.gst.as_deref().map(parse_percentage).transpose()?;

        let expected = file.expected.map(ExpectedTotals::try_from).transpose()?;

        Ok(Self {
            name: name.to_string(),
            currency,
            gst_rate,
            target,
            lines,
            dates,
            booking: file.booking,
            expected,
        })
    }

    /// Fixture set name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Currency of the set
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// What is booked
    pub fn target(&self) -> &QuoteTarget {
        &self.target
    }

    /// Booked dates
    pub fn dates(&self) -> &[DateSlot] {
        &self.dates
    }

    /// Expected totals, when the fixture lists them
    pub fn expected(&self) -> Option<&ExpectedTotals> {
        self.expected.as_ref()
    }

    /// Rates the invoice is computed with, using the standard GST unless the fixture sets
    /// its own.
    pub fn rates(&self) -> QuoteRates<'static> {
        self.rates_with(standard_gst())
    }

    /// Rates the invoice is computed with, falling back to `default_gst`.
    pub fn rates_with(&self, default_gst: Percentage) -> QuoteRates<'static> {
        let hourly_rate = match &self.target {
            QuoteTarget::Entity(entity) => entity.hourly_rate(),
            QuoteTarget::Package(_) => Money::from_minor(0, self.currency),
        };

        QuoteRates {
            hourly_rate,
            gst_rate: self.gst_rate.unwrap_or(default_gst),
        }
    }

    /// Replay the fixture's lines and dates into a fresh checkout
    ///
    /// # Errors
    ///
    /// Returns an error if a line or date is rejected.
    pub fn checkout(&self) -> Result<Checkout<'static>, FixtureError> {
        let mut checkout = Checkout::new(self.currency);

        for line in &self.lines {
            checkout.reduce(CartCommand::add(
                line.category,
                line.id,
                i64::from(line.quantity),
                line.item.clone(),
            ))?;
        }

        let target = self.target.to_booking_target();

        for slot in &self.dates {
            checkout.reduce(SelectionCommand::SelectDate(target, *slot))?;
        }

        Ok(checkout)
    }

    /// Invoice for the fixture
    ///
    /// # Errors
    ///
    /// Returns an error if the checkout cannot be built or priced.
    pub fn invoice(&self) -> Result<InvoiceBreakdown<'static>, FixtureError> {
        self.invoice_with(standard_gst())
    }

    /// Invoice for the fixture, taxed at `default_gst` unless the fixture sets its own rate
    ///
    /// # Errors
    ///
    /// Returns an error if the checkout cannot be built or priced.
    pub fn invoice_with(
        &self,
        default_gst: Percentage,
    ) -> Result<InvoiceBreakdown<'static>, FixtureError> {
        let mut checkout = self.checkout()?;
        let invoice = checkout.invoice(self.rates_with(default_gst))?;

        Ok(invoice.clone())
    }

    /// Booking record for the fixture, when it has a booking section. The payment summary
    /// is derived from the invoice's grand total and the amount already paid.
    ///
    /// # Errors
    ///
    /// Returns an error if a status or price is invalid, if more than the grand total was
    /// paid, or if the invoice cannot be computed.
    pub fn booking(&self) -> Result<Option<BookingRecord<'static>>, FixtureError> {
        self.booking_with(standard_gst())
    }

    /// Booking record for the fixture, with the invoice taxed at `default_gst` unless the
    /// fixture sets its own rate
    ///
    /// # Errors
    ///
    /// See [`QuoteFixture::booking`].
    pub fn booking_with(
        &self,
        default_gst: Percentage,
    ) -> Result<Option<BookingRecord<'static>>, FixtureError> {
        let Some(fixture) = &self.booking else {
            return Ok(None);
        };

        let total_amount = self.invoice_with(default_gst)?.grand_total();

        let total_paid = match &fixture.total_paid {
            Some(price) => parse_money(price)?,
            None => Money::from_minor(0, self.currency),
        };

        if total_paid.currency() != self.currency {
            return Err(FixtureError::CurrencyMismatch(
                self.currency.iso_alpha_code.to_string(),
                total_paid.currency().iso_alpha_code.to_string(),
            ));
        }

        let total = total_amount.to_minor_units();

        let pending = total
            .checked_sub(total_paid.to_minor_units())
            .filter(|pending| (0..=total).contains(pending))
            .ok_or_else(|| FixtureError::InvalidTotalPaid {
                paid: total_paid.to_string(),
                total: total_amount.to_string(),
            })?;

        let pending_amount = Money::from_minor(pending, self.currency);

        let partner_cancel_status = match &fixture.partner_cancel_status {
            Some(status) => status.parse()?,
            None => PartnerCancelStatus::default(),
        };

        Ok(Some(BookingRecord {
            id: BookingId::from_key(&fixture.custom_booking_id),
            custom_booking_id: fixture.custom_booking_id.clone(),
            status: fixture.status.parse()?,
            partner_cancel_status,
            partner_cancel_reason: None,
            assignee: None,
            booking_dates: self.dates.clone(),
            payment_summary: PaymentSummary {
                total_amount,
                total_paid,
                pending_amount,
                invoices: Vec::new(),
            },
        }))
    }
}
