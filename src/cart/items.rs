//! Cart line items

use std::fmt;

use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::{cart::CartError, ids::Id};

/// Line Item Id
pub type LineItemId = Id<CartLineItem<'static>>;

/// Cart category a line item belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Add-on services offered by the entity.
    Service,

    /// Rentable equipment.
    Equipment,

    /// Entity-defined packages.
    Package,

    /// Helpers / assistants.
    Helper,
}

impl Category {
    /// All categories, in ledger order.
    pub const ALL: [Category; 4] = [
        Category::Service,
        Category::Equipment,
        Category::Package,
        Category::Helper,
    ];

    /// Wire name of the category.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Service => "service",
            Self::Equipment => "equipment",
            Self::Package => "package",
            Self::Helper => "helper",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated, non-negative absolute quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Quantity(u32);

impl Quantity {
    /// Zero
    pub const ZERO: Quantity = Quantity(0);

    /// Validate a requested quantity.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::NegativeQuantity`] for negative values and
    /// [`CartError::QuantityTooLarge`] for values that do not fit a `u32`.
    pub fn new(value: i64) -> Result<Self, CartError> {
        if value < 0 {
            return Err(CartError::NegativeQuantity(value));
        }

        u32::try_from(value)
            .map(Quantity)
            .map_err(|_err| CartError::QuantityTooLarge(value))
    }

    /// Clamp an arbitrary signed value into the valid range.
    pub(crate) fn clamped(value: i64) -> Self {
        Quantity(u32::try_from(value.max(0)).unwrap_or(u32::MAX))
    }

    /// The quantity as a plain integer.
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl From<u32> for Quantity {
    fn from(value: u32) -> Self {
        Quantity(value)
    }
}

/// Something included with a line item (e.g. the contents of a package). Informational
/// only, never priced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NestedItem {
    /// Name of the included item
    pub name: String,

    /// How many are included
    pub quantity: u32,
}

/// Catalogue data required to create a line item the first time it is added.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItemData<'a> {
    /// Display name
    pub name: String,

    /// Price per unit
    pub unit_price: Money<'a, Currency>,

    /// Included items
    pub nested: SmallVec<[NestedItem; 4]>,
}

impl<'a> LineItemData<'a> {
    /// Item data without nested items.
    pub fn new(name: impl Into<String>, unit_price: Money<'a, Currency>) -> Self {
        Self {
            name: name.into(),
            unit_price,
            nested: SmallVec::new(),
        }
    }

    /// Attach included items.
    #[must_use]
    pub fn with_nested(mut self, nested: impl IntoIterator<Item = NestedItem>) -> Self {
        self.nested.extend(nested);
        self
    }
}

/// One cart entry. Always has a quantity of at least one while stored in a cart.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLineItem<'a> {
    id: LineItemId,
    category: Category,
    name: String,
    unit_price: Money<'a, Currency>,
    quantity: u32,
    nested: SmallVec<[NestedItem; 4]>,
}

impl<'a> CartLineItem<'a> {
    pub(crate) fn new(
        id: LineItemId,
        category: Category,
        data: LineItemData<'a>,
        quantity: u32,
    ) -> Self {
        Self {
            id,
            category,
            name: data.name,
            unit_price: data.unit_price,
            quantity,
            nested: data.nested,
        }
    }

    /// Line item id
    pub fn id(&self) -> LineItemId {
        self.id
    }

    /// Category
    pub fn category(&self) -> Category {
        self.category
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Price per unit
    pub fn unit_price(&self) -> &Money<'a, Currency> {
        &self.unit_price
    }

    /// Quantity in the cart
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Included items
    pub fn nested(&self) -> &[NestedItem] {
        &self.nested
    }

    pub(crate) fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_quantity_is_rejected() {
        assert_eq!(Quantity::new(-1), Err(CartError::NegativeQuantity(-1)));
    }

    #[test]
    fn oversized_quantity_is_rejected() {
        let too_big = i64::from(u32::MAX) + 1;

        assert_eq!(Quantity::new(too_big), Err(CartError::QuantityTooLarge(too_big)));
    }

    #[test]
    fn clamped_never_goes_below_zero() {
        assert_eq!(Quantity::clamped(-5), Quantity::ZERO);
        assert_eq!(Quantity::clamped(7).get(), 7);
        assert_eq!(Quantity::clamped(i64::MAX).get(), u32::MAX);
    }

    #[test]
    fn categories_are_listed_in_ledger_order() {
        let names: Vec<&str> = Category::ALL.iter().map(|c| c.as_str()).collect();

        assert_eq!(names, ["service", "equipment", "package", "helper"]);
    }
}
