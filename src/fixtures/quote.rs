//! Quote Fixtures

use jiff::civil::{Date, Time};
use serde::Deserialize;

use crate::{
    cart::{Category, LineItemData, LineItemId, NestedItem},
    entities::{AdminPackage, EntityId, EntityInfo, Freelancer, PackageId, Studio},
    fixtures::{FixtureError, prices::parse_money},
    selection::DateSlot,
};

/// A quote in YAML
#[derive(Debug, Deserialize)]
pub struct QuoteFile {
    /// GST rate (e.g., "18%"), defaults to the standard rate
    pub gst: Option<String>,

    /// Entity booked by the hour
    pub entity: Option<EntityFixture>,

    /// Admin package booked at a fixed price
    pub package: Option<PackageFixture>,

    /// Cart lines
    #[serde(default)]
    pub cart: Vec<LineFixture>,

    /// Booked dates
    #[serde(default)]
    pub dates: Vec<DateFixture>,

    /// Server-side booking record for the quote
    pub booking: Option<BookingFixture>,

    /// Expected invoice totals
    pub expected: Option<ExpectedFixture>,
}

/// Entity fixture from YAML
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EntityFixture {
    /// A studio
    Studio {
        /// Key the id is derived from
        key: String,

        /// Studio name
        name: String,

        /// Street address
        address: String,

        /// Description
        #[serde(default)]
        description: String,

        /// Gallery images
        #[serde(default)]
        images: Vec<String>,

        /// Price per hour (e.g., "2000 INR")
        hourly_rate: String,
    },

    /// A freelancer
    Freelancer {
        /// Key the id is derived from
        key: String,

        /// Full name
        full_name: String,

        /// City
        city: String,

        /// Biography
        #[serde(default)]
        bio: String,

        /// Profile picture
        profile_image: Option<String>,

        /// Price per hour (e.g., "1500 INR")
        hourly_rate: String,
    },
}

impl TryFrom<EntityFixture> for EntityInfo<'static> {
    type Error = FixtureError;

    fn try_from(fixture: EntityFixture) -> Result<Self, Self::Error> {
        match fixture {
            EntityFixture::Studio {
                key,
                name,
                address,
                description,
                images,
                hourly_rate,
            } => Ok(EntityInfo::Studio(Studio {
                id: EntityId::from_key(&key),
                name,
                images,
                description,
                address,
                hourly_rate: parse_money(&hourly_rate)?,
            })),
            EntityFixture::Freelancer {
                key,
                full_name,
                city,
                bio,
                profile_image,
                hourly_rate,
            } => Ok(EntityInfo::Freelancer(Freelancer {
                id: EntityId::from_key(&key),
                full_name,
                profile_image,
                bio,
                city,
                hourly_rate: parse_money(&hourly_rate)?,
            })),
        }
    }
}

/// Admin package fixture from YAML
#[derive(Debug, Deserialize)]
pub struct PackageFixture {
    /// Key the id is derived from
    pub key: String,

    /// Package name
    pub name: String,

    /// Description
    #[serde(default)]
    pub description: String,

    /// Fixed price (e.g., "5000 INR")
    pub price: String,
}

impl TryFrom<PackageFixture> for AdminPackage<'static> {
    type Error = FixtureError;

    fn try_from(fixture: PackageFixture) -> Result<Self, Self::Error> {
        Ok(AdminPackage {
            id: PackageId::from_key(&fixture.key),
            name: fixture.name,
            description: fixture.description,
            price: parse_money(&fixture.price)?,
        })
    }
}

/// Cart line fixture from YAML
#[derive(Debug, Deserialize)]
pub struct LineFixture {
    /// Line category
    pub category: Category,

    /// Key the id is derived from
    pub key: String,

    /// Display name
    pub name: String,

    /// Unit price (e.g., "500 INR")
    pub price: String,

    /// Quantity
    pub quantity: u32,

    /// Package contents
    #[serde(default)]
    pub nested: Vec<NestedFixture>,
}

/// Nested item fixture from YAML
#[derive(Debug, Deserialize)]
pub struct NestedFixture {
    /// Name
    pub name: String,

    /// Quantity
    #[serde(default = "one")]
    pub quantity: u32,
}

fn one() -> u32 {
    1
}

/// A parsed cart line
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteLine {
    /// Line category
    pub category: Category,

    /// Line id
    pub id: LineItemId,

    /// Quantity to add
    pub quantity: u32,

    /// Item data
    pub item: LineItemData<'static>,
}

impl TryFrom<LineFixture> for QuoteLine {
    type Error = FixtureError;

    fn try_from(fixture: LineFixture) -> Result<Self, Self::Error> {
        let nested = fixture.nested.into_iter().map(|nested| NestedItem {
            name: nested.name,
            quantity: nested.quantity,
        });

        Ok(QuoteLine {
            category: fixture.category,
            id: LineItemId::from_key(&fixture.key),
            quantity: fixture.quantity,
            item: LineItemData::new(fixture.name, parse_money(&fixture.price)?).with_nested(nested),
        })
    }
}

/// Date fixture from YAML
#[derive(Debug, Deserialize)]
pub struct DateFixture {
    /// Calendar date
    pub date: Date,

    /// Start time, unless whole day
    pub start: Option<Time>,

    /// End time, unless whole day
    pub end: Option<Time>,

    /// Book the whole day
    #[serde(default)]
    pub whole_day: bool,
}

impl TryFrom<DateFixture> for DateSlot {
    type Error = FixtureError;

    fn try_from(fixture: DateFixture) -> Result<Self, Self::Error> {
        if fixture.whole_day {
            return Ok(DateSlot::whole_day(fixture.date));
        }

        match (fixture.start, fixture.end) {
            (Some(start), Some(end)) => Ok(DateSlot::new(fixture.date, start, end)?),
            _ => Err(FixtureError::IncompleteSlot(fixture.date)),
        }
    }
}

/// Booking record fixture from YAML
#[derive(Debug, Deserialize)]
pub struct BookingFixture {
    /// Human readable booking reference
    pub custom_booking_id: String,

    /// Primary status (e.g., "confirmed")
    pub status: String,

    /// Partner cancellation status, defaults to "not-requested"
    pub partner_cancel_status: Option<String>,

    /// Amount already paid (e.g., "1888 INR")
    pub total_paid: Option<String>,
}

/// Expected totals fixture from YAML
#[derive(Debug, Deserialize)]
pub struct ExpectedFixture {
    /// Subtotal
    pub subtotal: String,

    /// GST
    pub gst: String,

    /// Grand total
    pub grand_total: String,

    /// Advance
    pub advance: String,

    /// On-site
    pub on_site: String,
}
