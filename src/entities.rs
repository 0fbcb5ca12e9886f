//! Bookable entities
//!
//! Studios and freelancers are priced by the hour; admin packages carry a fixed price.
//! [`EntityInfo`] exposes both entity kinds through the same accessors so callers never
//! branch on the kind just to read a name or a picture.

use std::fmt;

use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};

use crate::ids::Id;

/// Entity Id
pub type EntityId = Id<EntityInfo<'static>>;

/// Admin Package Id
pub type PackageId = Id<AdminPackage<'static>>;

/// The kind of entity a regular booking targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// A studio space.
    Studio,

    /// An individual freelancer.
    Freelancer,
}

impl EntityKind {
    /// Wire name of the kind.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Studio => "studio",
            Self::Freelancer => "freelancer",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Studio
#[derive(Debug, Clone, PartialEq)]
pub struct Studio<'a> {
    /// Studio id
    pub id: EntityId,

    /// Studio name
    pub name: String,

    /// Gallery images; the first one is the cover.
    pub images: Vec<String>,

    /// Studio description
    pub description: String,

    /// Street address
    pub address: String,

    /// Price per booked hour
    pub hourly_rate: Money<'a, Currency>,
}

/// Freelancer
#[derive(Debug, Clone, PartialEq)]
pub struct Freelancer<'a> {
    /// Freelancer id
    pub id: EntityId,

    /// Full name
    pub full_name: String,

    /// Profile picture
    pub profile_image: Option<String>,

    /// Short biography
    pub bio: String,

    /// City the freelancer works from
    pub city: String,

    /// Price per booked hour
    pub hourly_rate: Money<'a, Currency>,
}

/// A bookable entity.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityInfo<'a> {
    /// A studio
    Studio(Studio<'a>),

    /// A freelancer
    Freelancer(Freelancer<'a>),
}

impl<'a> EntityInfo<'a> {
    /// Entity id
    pub fn id(&self) -> EntityId {
        match self {
            Self::Studio(studio) => studio.id,
            Self::Freelancer(freelancer) => freelancer.id,
        }
    }

    /// Entity kind
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Studio(_) => EntityKind::Studio,
            Self::Freelancer(_) => EntityKind::Freelancer,
        }
    }

    /// Display name
    pub fn name(&self) -> &str {
        match self {
            Self::Studio(studio) => &studio.name,
            Self::Freelancer(freelancer) => &freelancer.full_name,
        }
    }

    /// Cover image, if any.
    pub fn image(&self) -> Option<&str> {
        match self {
            Self::Studio(studio) => studio.images.first().map(String::as_str),
            Self::Freelancer(freelancer) => freelancer.profile_image.as_deref(),
        }
    }

    /// Description
    pub fn description(&self) -> &str {
        match self {
            Self::Studio(studio) => &studio.description,
            Self::Freelancer(freelancer) => &freelancer.bio,
        }
    }

    /// Location
    pub fn location(&self) -> &str {
        match self {
            Self::Studio(studio) => &studio.address,
            Self::Freelancer(freelancer) => &freelancer.city,
        }
    }

    /// Price per booked hour
    pub fn hourly_rate(&self) -> Money<'a, Currency> {
        match self {
            Self::Studio(studio) => studio.hourly_rate,
            Self::Freelancer(freelancer) => freelancer.hourly_rate,
        }
    }

    /// Reference used by a regular booking selection.
    pub fn to_ref(&self) -> EntityRef {
        EntityRef {
            id: self.id(),
            kind: self.kind(),
        }
    }
}

/// Identifies the entity a regular booking targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    /// Entity id
    pub id: EntityId,

    /// Entity kind
    pub kind: EntityKind,
}

/// A platform-curated, fixed-price bundle.
#[derive(Debug, Clone, PartialEq)]
pub struct AdminPackage<'a> {
    /// Package id
    pub id: PackageId,

    /// Package name
    pub name: String,

    /// Package description
    pub description: String,

    /// Fixed package price
    pub price: Money<'a, Currency>,
}

impl<'a> AdminPackage<'a> {
    /// Reference used by an admin-package booking selection.
    pub fn to_ref(&self) -> PackageRef<'a> {
        PackageRef {
            id: self.id,
            price: self.price,
        }
    }
}

/// Identifies the package an admin-package booking targets, with its fetched price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PackageRef<'a> {
    /// Package id
    pub id: PackageId,

    /// Fixed package price
    pub price: Money<'a, Currency>,
}
