//! Cart
//!
//! Quantity-based ledger of line items per category. Quantities never go negative and an
//! entry whose quantity reaches zero is removed, so a stored line always has a quantity of
//! at least one.

use std::collections::BTreeMap;

use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::pricing::{PricingError, checked_sum, line_total};

pub mod items;

pub use items::{CartLineItem, Category, LineItemData, LineItemId, NestedItem, Quantity};

/// Errors raised when validating cart input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    /// An absolute quantity below zero was requested.
    #[error("quantity cannot be negative (got {0})")]
    NegativeQuantity(i64),

    /// An absolute quantity that cannot be stored was requested.
    #[error("quantity {0} is too large")]
    QuantityTooLarge(i64),

    /// Item data was priced in a different currency than the cart (item currency, cart currency).
    #[error("item has currency {0}, but cart has currency {1}")]
    CurrencyMismatch(&'static str, &'static str),
}

/// A single cart mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum CartCommand<'a> {
    /// Change the quantity by a signed amount; the result is clamped at zero.
    Delta {
        /// Category of the line
        category: Category,

        /// Line item id
        id: LineItemId,

        /// Signed change in quantity
        delta: i64,

        /// Catalogue data, needed when the line does not exist yet
        item: Option<LineItemData<'a>>,
    },

    /// Set the quantity outright. Equivalent to a delta of `quantity - current`.
    SetAbsolute {
        /// Category of the line
        category: Category,

        /// Line item id
        id: LineItemId,

        /// New quantity
        quantity: Quantity,

        /// Catalogue data, needed when the line does not exist yet
        item: Option<LineItemData<'a>>,
    },

    /// Remove every line.
    Clear,
}

impl<'a> CartCommand<'a> {
    /// Add `delta` units of an item, creating the line from `item` if needed.
    pub fn add(category: Category, id: LineItemId, delta: i64, item: LineItemData<'a>) -> Self {
        Self::Delta {
            category,
            id,
            delta,
            item: Some(item),
        }
    }

    /// Change the quantity of an existing line.
    pub fn change(category: Category, id: LineItemId, delta: i64) -> Self {
        Self::Delta {
            category,
            id,
            delta,
            item: None,
        }
    }

    /// Drop a line entirely.
    pub fn remove(category: Category, id: LineItemId) -> Self {
        Self::SetAbsolute {
            category,
            id,
            quantity: Quantity::ZERO,
            item: None,
        }
    }
}

/// Cart
#[derive(Debug, Clone, PartialEq)]
pub struct Cart<'a> {
    lines: BTreeMap<(Category, LineItemId), CartLineItem<'a>>,
    currency: &'static Currency,
}

impl<'a> Cart<'a> {
    /// Create an empty cart priced in `currency`.
    #[must_use]
    pub fn new(currency: &'static Currency) -> Self {
        Cart {
            lines: BTreeMap::new(),
            currency,
        }
    }

    /// Apply a command. Quantities are clamped, never rejected; the only failure is item
    /// data in the wrong currency, which leaves the cart untouched.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::CurrencyMismatch`] if the supplied item data is not priced in
    /// the cart currency.
    pub fn apply(&mut self, command: CartCommand<'a>) -> Result<(), CartError> {
        match command {
            CartCommand::Delta {
                category,
                id,
                delta,
                item,
            } => self.apply_delta(category, id, delta, item),
            CartCommand::SetAbsolute {
                category,
                id,
                quantity,
                item,
            } => {
                let current = i64::from(self.quantity(category, id));
                let delta = i64::from(quantity.get()) - current;

                self.apply_delta(category, id, delta, item)
            }
            CartCommand::Clear => {
                self.lines.clear();

                Ok(())
            }
        }
    }

    fn apply_delta(
        &mut self,
        category: Category,
        id: LineItemId,
        delta: i64,
        item: Option<LineItemData<'a>>,
    ) -> Result<(), CartError> {
        if let Some(data) = &item {
            let item_currency = data.unit_price.currency();

            if item_currency != self.currency {
                return Err(CartError::CurrencyMismatch(
                    item_currency.iso_alpha_code,
                    self.currency.iso_alpha_code,
                ));
            }
        }

        let key = (category, id);
        let current = i64::from(self.quantity(category, id));
        let next = Quantity::clamped(current.saturating_add(delta)).get();

        if next == 0 {
            self.lines.remove(&key);
        } else if let Some(line) = self.lines.get_mut(&key) {
            line.set_quantity(next);
        } else if let Some(data) = item {
            self.lines
                .insert(key, CartLineItem::new(id, category, data, next));
        }

        Ok(())
    }

    /// Current quantity of a line (zero when absent).
    pub fn quantity(&self, category: Category, id: LineItemId) -> u32 {
        self.lines
            .get(&(category, id))
            .map_or(0, CartLineItem::quantity)
    }

    /// Get a line.
    pub fn get(&self, category: Category, id: LineItemId) -> Option<&CartLineItem<'a>> {
        self.lines.get(&(category, id))
    }

    /// Iterate over lines ordered by category, then id.
    pub fn iter(&self) -> impl Iterator<Item = &CartLineItem<'a>> {
        self.lines.values()
    }

    /// Iterate over the lines of one category.
    pub fn iter_category(&self, category: Category) -> impl Iterator<Item = &CartLineItem<'a>> {
        self.lines
            .values()
            .filter(move |line| line.category() == category)
    }

    /// Sum of `unit price × quantity` for one category.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::Overflow`] if the total cannot be represented.
    pub fn category_total(&self, category: Category) -> Result<Money<'a, Currency>, PricingError> {
        self.total_of(self.iter_category(category))
    }

    /// Sum of `unit price × quantity` across all categories.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::Overflow`] if the total cannot be represented.
    pub fn items_total(&self) -> Result<Money<'a, Currency>, PricingError> {
        self.total_of(self.iter())
    }

    fn total_of<'b>(
        &self,
        lines: impl Iterator<Item = &'b CartLineItem<'a>>,
    ) -> Result<Money<'a, Currency>, PricingError>
    where
        'a: 'b,
    {
        let totals = lines
            .map(|line| line_total(line.unit_price(), line.quantity()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Money::from_minor(checked_sum(totals)?, self.currency))
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Currency the cart is priced in.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rusty_money::iso::{INR, USD};
    use testresult::TestResult;

    use super::*;

    fn lights<'a>() -> LineItemData<'a> {
        LineItemData::new("Softbox lights", Money::from_minor(1_000_00, INR))
    }

    fn lights_id() -> LineItemId {
        LineItemId::from_key("lights")
    }

    #[test]
    fn new_cart_is_empty() {
        let cart = Cart::new(INR);

        assert!(cart.is_empty());
        assert_eq!(cart.currency(), INR);
    }

    #[test]
    fn delta_creates_line_from_item_data() -> TestResult {
        let mut cart = Cart::new(INR);

        cart.apply(CartCommand::add(Category::Equipment, lights_id(), 2, lights()))?;

        assert_eq!(cart.quantity(Category::Equipment, lights_id()), 2);
        assert_eq!(cart.len(), 1);

        Ok(())
    }

    #[test]
    fn delta_without_item_data_on_missing_line_is_noop() -> TestResult {
        let mut cart = Cart::new(INR);

        cart.apply(CartCommand::change(Category::Equipment, lights_id(), 3))?;

        assert!(cart.is_empty());

        Ok(())
    }

    #[test]
    fn delta_clamps_at_zero_and_removes_line() -> TestResult {
        let mut cart = Cart::new(INR);

        cart.apply(CartCommand::add(Category::Equipment, lights_id(), 1, lights()))?;
        cart.apply(CartCommand::change(Category::Equipment, lights_id(), -5))?;

        assert_eq!(cart.quantity(Category::Equipment, lights_id()), 0);
        assert!(cart.get(Category::Equipment, lights_id()).is_none());

        Ok(())
    }

    #[test]
    fn same_id_in_different_categories_is_distinct() -> TestResult {
        let mut cart = Cart::new(INR);

        cart.apply(CartCommand::add(Category::Equipment, lights_id(), 1, lights()))?;
        cart.apply(CartCommand::add(Category::Service, lights_id(), 4, lights()))?;

        assert_eq!(cart.quantity(Category::Equipment, lights_id()), 1);
        assert_eq!(cart.quantity(Category::Service, lights_id()), 4);

        Ok(())
    }

    #[test]
    fn set_absolute_overrides_quantity() -> TestResult {
        let mut cart = Cart::new(INR);

        cart.apply(CartCommand::add(Category::Equipment, lights_id(), 5, lights()))?;
        cart.apply(CartCommand::SetAbsolute {
            category: Category::Equipment,
            id: lights_id(),
            quantity: Quantity::new(2)?,
            item: None,
        })?;

        assert_eq!(cart.quantity(Category::Equipment, lights_id()), 2);

        cart.apply(CartCommand::remove(Category::Equipment, lights_id()))?;

        assert!(cart.is_empty());

        Ok(())
    }

    #[test]
    fn currency_mismatch_leaves_cart_untouched() -> TestResult {
        let mut cart = Cart::new(INR);

        cart.apply(CartCommand::add(Category::Equipment, lights_id(), 1, lights()))?;

        let result = cart.apply(CartCommand::add(
            Category::Helper,
            LineItemId::from_key("assistant"),
            1,
            LineItemData::new("Assistant", Money::from_minor(10_00, USD)),
        ));

        assert_eq!(result, Err(CartError::CurrencyMismatch("USD", "INR")));
        assert_eq!(cart.len(), 1);

        Ok(())
    }

    #[test]
    fn totals_by_category_and_overall() -> TestResult {
        let mut cart = Cart::new(INR);

        cart.apply(CartCommand::add(
            Category::Service,
            LineItemId::from_key("retouching"),
            2,
            LineItemData::new("Retouching", Money::from_minor(500_00, INR)),
        ))?;
        cart.apply(CartCommand::add(Category::Equipment, lights_id(), 1, lights()))?;

        assert_eq!(cart.category_total(Category::Service)?, Money::from_minor(1_000_00, INR));
        assert_eq!(cart.category_total(Category::Helper)?, Money::from_minor(0, INR));
        assert_eq!(cart.items_total()?, Money::from_minor(2_000_00, INR));

        Ok(())
    }

    #[test]
    fn clear_removes_everything() -> TestResult {
        let mut cart = Cart::new(INR);

        cart.apply(CartCommand::add(Category::Equipment, lights_id(), 1, lights()))?;
        cart.apply(CartCommand::Clear)?;

        assert!(cart.is_empty());

        Ok(())
    }

    proptest! {
        #[test]
        fn quantities_never_negative_and_zero_lines_absent(
            deltas in prop::collection::vec((0_usize..3, -5_i64..6), 0..40)
        ) {
            let ids = [
                LineItemId::from_key("a"),
                LineItemId::from_key("b"),
                LineItemId::from_key("c"),
            ];
            let mut cart = Cart::new(INR);
            let mut expected = [0_i64; 3];

            for (slot, delta) in deltas {
                let Some(id) = ids.get(slot).copied() else { continue };
                let Some(quantity) = expected.get_mut(slot) else { continue };

                cart.apply(CartCommand::add(Category::Service, id, delta, lights()))
                    .map_err(|err| TestCaseError::fail(err.to_string()))?;

                *quantity = (*quantity + delta).max(0);
            }

            for (id, quantity) in ids.iter().zip(expected) {
                prop_assert_eq!(i64::from(cart.quantity(Category::Service, *id)), quantity);
                prop_assert_eq!(cart.get(Category::Service, *id).is_some(), quantity > 0);
            }

            prop_assert!(cart.iter().all(|line| line.quantity() > 0));
        }
    }
}
