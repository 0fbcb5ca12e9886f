//! Booking selection
//!
//! Date-indexed time windows for exactly one booking target. A regular booking (studio or
//! freelancer, priced by the hour) and an admin-package booking (fixed price) are mutually
//! exclusive: the selection holds a single target, so dates for two targets can never be
//! observed at once. Switching target clears the previous target's dates in the same step.

use std::{collections::BTreeMap, fmt};

use jiff::civil::{Date, Time};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::entities::{EntityRef, PackageRef};

pub mod slots;

pub use slots::DateSlot;

/// Errors raised when validating selection input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    /// The slot ends at or before its start.
    #[error("slot on {date} must end after it starts ({start} - {end})")]
    InvalidSlot {
        /// Slot date
        date: Date,

        /// Requested start
        start: Time,

        /// Requested end
        end: Time,
    },

    /// Dates are still selected for another booking target.
    #[error("{held} booking still has {count} selected date(s); clear them before switching to {requested}")]
    ModeConflict {
        /// Mode currently holding dates
        held: BookingMode,

        /// Mode that was requested
        requested: BookingMode,

        /// Number of dates that would be discarded
        count: usize,
    },

    /// The date is not part of the selection.
    #[error("{0} is not a selected date")]
    UnknownDate(Date),
}

/// The two mutually exclusive booking modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BookingMode {
    /// Entity booking priced by the hour.
    Regular,

    /// Fixed-price admin package.
    AdminPackage,
}

impl fmt::Display for BookingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Regular => f.write_str("regular"),
            Self::AdminPackage => f.write_str("admin package"),
        }
    }
}

/// What the selected dates are booked for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BookingTarget<'a> {
    /// A studio or freelancer.
    Regular(EntityRef),

    /// An admin package.
    AdminPackage(PackageRef<'a>),
}

impl BookingTarget<'_> {
    /// Mode of this target.
    pub fn mode(&self) -> BookingMode {
        match self {
            Self::Regular(_) => BookingMode::Regular,
            Self::AdminPackage(_) => BookingMode::AdminPackage,
        }
    }

    /// Whether both targets refer to the same entity or package.
    fn same_as(&self, other: &BookingTarget<'_>) -> bool {
        match (self, other) {
            (Self::Regular(a), BookingTarget::Regular(b)) => a == b,
            (Self::AdminPackage(a), BookingTarget::AdminPackage(b)) => a.id == b.id,
            (Self::Regular(_), BookingTarget::AdminPackage(_))
            | (Self::AdminPackage(_), BookingTarget::Regular(_)) => false,
        }
    }
}

/// A single selection mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionCommand<'a> {
    /// Add or overwrite a date, switching target (and discarding its dates) if needed.
    SelectDate(BookingTarget<'a>, DateSlot),

    /// Add or overwrite a date, refusing to discard dates held by another target.
    TrySelectDate(BookingTarget<'a>, DateSlot),

    /// Remove one date from the given mode.
    RemoveDate(BookingMode, Date),

    /// Move the active-date cursor.
    SetActive(Date),

    /// Drop the target and every date.
    Clear,
}

/// Booking selection
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BookingSelection<'a> {
    target: Option<BookingTarget<'a>>,
    dates: BTreeMap<Date, DateSlot>,
    active: Option<Date>,
}

impl<'a> BookingSelection<'a> {
    /// An empty selection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a command. On error the selection is left untouched.
    ///
    /// # Errors
    ///
    /// - [`SelectionError::ModeConflict`]: `TrySelectDate` would discard another target's dates.
    /// - [`SelectionError::UnknownDate`]: `SetActive` names a date that is not selected.
    pub fn apply(&mut self, command: SelectionCommand<'a>) -> Result<(), SelectionError> {
        match command {
            SelectionCommand::SelectDate(target, slot) => {
                self.select_date(target, slot);

                Ok(())
            }
            SelectionCommand::TrySelectDate(target, slot) => self.try_select_date(target, slot),
            SelectionCommand::RemoveDate(mode, date) => {
                self.remove_date(mode, date);

                Ok(())
            }
            SelectionCommand::SetActive(date) => self.set_active(date),
            SelectionCommand::Clear => {
                self.clear();

                Ok(())
            }
        }
    }

    /// Add or overwrite a date for `target`. If another target is selected, its dates are
    /// discarded first.
    pub fn select_date(&mut self, target: BookingTarget<'a>, slot: DateSlot) {
        let switching = self
            .target
            .as_ref()
            .is_none_or(|current| !current.same_as(&target));

        if switching {
            self.dates.clear();
            self.active = None;
        }

        self.target = Some(target);
        self.dates.insert(slot.date(), slot);
        self.active = Some(slot.date());
    }

    /// Like [`select_date`](Self::select_date), but refuses to discard dates selected for a
    /// different target.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::ModeConflict`] if another target still holds dates.
    pub fn try_select_date(
        &mut self,
        target: BookingTarget<'a>,
        slot: DateSlot,
    ) -> Result<(), SelectionError> {
        if let Some(current) = &self.target
            && !current.same_as(&target)
            && !self.dates.is_empty()
        {
            return Err(SelectionError::ModeConflict {
                held: current.mode(),
                requested: target.mode(),
                count: self.dates.len(),
            });
        }

        self.select_date(target, slot);

        Ok(())
    }

    /// Remove a date from `mode`. If it was the active date, the cursor moves to the
    /// earliest remaining date (or clears when none remain). Removing from a mode that is
    /// not selected does nothing.
    pub fn remove_date(&mut self, mode: BookingMode, date: Date) {
        if self.mode() != Some(mode) {
            return;
        }

        self.dates.remove(&date);

        if self.active == Some(date) {
            self.active = self.dates.keys().next().copied();
        }
    }

    /// Move the active-date cursor to a selected date.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::UnknownDate`] if `date` is not selected.
    pub fn set_active(&mut self, date: Date) -> Result<(), SelectionError> {
        if !self.dates.contains_key(&date) {
            return Err(SelectionError::UnknownDate(date));
        }

        self.active = Some(date);

        Ok(())
    }

    /// Drop the target and every date.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Selected target, if any.
    pub fn target(&self) -> Option<&BookingTarget<'a>> {
        self.target.as_ref()
    }

    /// Mode of the selected target, if any.
    pub fn mode(&self) -> Option<BookingMode> {
        self.target.as_ref().map(BookingTarget::mode)
    }

    /// Dates selected for `mode`, in calendar order. Empty unless `mode` is the active mode.
    pub fn dates(&self, mode: BookingMode) -> impl Iterator<Item = &DateSlot> {
        let active_mode = self.mode() == Some(mode);

        self.dates.values().filter(move |_| active_mode)
    }

    /// Number of dates selected for `mode`.
    pub fn date_count(&self, mode: BookingMode) -> usize {
        self.dates(mode).count()
    }

    /// Earliest selected slot.
    pub fn earliest_date(&self) -> Option<&DateSlot> {
        self.dates.values().next()
    }

    /// Active-date cursor.
    pub fn active_date(&self) -> Option<Date> {
        self.active
    }

    /// Total billable hours for `mode`: twelve per whole day, otherwise `end - start`.
    pub fn total_hours(&self, mode: BookingMode) -> Decimal {
        self.dates(mode).map(DateSlot::hours).sum()
    }

    /// Check if nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use jiff::civil::{date, time};
    use proptest::prelude::*;
    use rusty_money::{Money, iso::INR};
    use testresult::TestResult;

    use crate::entities::{EntityId, EntityKind, PackageId};

    use super::*;

    fn studio() -> BookingTarget<'static> {
        BookingTarget::Regular(EntityRef {
            id: EntityId::from_key("studio"),
            kind: EntityKind::Studio,
        })
    }

    fn package() -> BookingTarget<'static> {
        BookingTarget::AdminPackage(PackageRef {
            id: PackageId::from_key("wedding"),
            price: Money::from_minor(5_000_00, INR),
        })
    }

    fn slot(day: i8, start: i8, end: i8) -> Result<DateSlot, SelectionError> {
        DateSlot::new(date(2026, 11, day), time(start, 0, 0, 0), time(end, 0, 0, 0))
    }

    #[test]
    fn select_and_total_hours() -> TestResult {
        let mut selection = BookingSelection::new();

        selection.select_date(studio(), slot(2, 10, 12)?);
        selection.select_date(studio(), slot(3, 9, 10)?);
        selection.select_date(studio(), DateSlot::whole_day(date(2026, 11, 4)));

        assert_eq!(selection.total_hours(BookingMode::Regular), Decimal::from(15));
        assert_eq!(selection.total_hours(BookingMode::AdminPackage), Decimal::ZERO);
        assert_eq!(selection.active_date(), Some(date(2026, 11, 4)));

        Ok(())
    }

    #[test]
    fn reselecting_a_date_overwrites_it() -> TestResult {
        let mut selection = BookingSelection::new();

        selection.select_date(studio(), slot(2, 10, 12)?);
        selection.select_date(studio(), slot(2, 10, 16)?);

        assert_eq!(selection.date_count(BookingMode::Regular), 1);
        assert_eq!(selection.total_hours(BookingMode::Regular), Decimal::from(6));

        Ok(())
    }

    #[test]
    fn switching_mode_clears_other_dates() -> TestResult {
        let mut selection = BookingSelection::new();

        selection.select_date(studio(), slot(2, 10, 12)?);
        selection.select_date(studio(), slot(3, 10, 12)?);
        selection.select_date(package(), slot(5, 9, 17)?);

        assert_eq!(selection.mode(), Some(BookingMode::AdminPackage));
        assert_eq!(selection.date_count(BookingMode::Regular), 0);
        assert_eq!(selection.date_count(BookingMode::AdminPackage), 1);

        Ok(())
    }

    #[test]
    fn switching_entity_clears_dates() -> TestResult {
        let mut selection = BookingSelection::new();
        let other = BookingTarget::Regular(EntityRef {
            id: EntityId::from_key("freelancer"),
            kind: EntityKind::Freelancer,
        });

        selection.select_date(studio(), slot(2, 10, 12)?);
        selection.select_date(other, slot(3, 10, 11)?);

        assert_eq!(selection.date_count(BookingMode::Regular), 1);
        assert_eq!(selection.total_hours(BookingMode::Regular), Decimal::ONE);

        Ok(())
    }

    #[test]
    fn try_select_refuses_to_discard_other_mode() -> TestResult {
        let mut selection = BookingSelection::new();

        selection.select_date(studio(), slot(2, 10, 12)?);

        let before = selection.clone();
        let result = selection.try_select_date(package(), slot(5, 9, 17)?);

        assert_eq!(
            result,
            Err(SelectionError::ModeConflict {
                held: BookingMode::Regular,
                requested: BookingMode::AdminPackage,
                count: 1,
            })
        );
        assert_eq!(selection, before);

        Ok(())
    }

    #[test]
    fn try_select_switches_once_other_mode_is_empty() -> TestResult {
        let mut selection = BookingSelection::new();

        selection.select_date(studio(), slot(2, 10, 12)?);
        selection.remove_date(BookingMode::Regular, date(2026, 11, 2));
        selection.try_select_date(package(), slot(5, 9, 17)?)?;

        assert_eq!(selection.mode(), Some(BookingMode::AdminPackage));

        Ok(())
    }

    #[test]
    fn removing_active_date_moves_cursor() -> TestResult {
        let mut selection = BookingSelection::new();

        selection.select_date(studio(), slot(4, 10, 12)?);
        selection.select_date(studio(), slot(2, 10, 12)?);
        selection.select_date(studio(), slot(7, 10, 12)?);

        selection.remove_date(BookingMode::Regular, date(2026, 11, 7));
        assert_eq!(selection.active_date(), Some(date(2026, 11, 2)));

        selection.remove_date(BookingMode::Regular, date(2026, 11, 2));
        assert_eq!(selection.active_date(), Some(date(2026, 11, 4)));

        selection.remove_date(BookingMode::Regular, date(2026, 11, 4));
        assert_eq!(selection.active_date(), None);

        Ok(())
    }

    #[test]
    fn removing_from_inactive_mode_is_ignored() -> TestResult {
        let mut selection = BookingSelection::new();

        selection.select_date(studio(), slot(2, 10, 12)?);
        selection.remove_date(BookingMode::AdminPackage, date(2026, 11, 2));

        assert_eq!(selection.date_count(BookingMode::Regular), 1);

        Ok(())
    }

    #[test]
    fn set_active_requires_selected_date() -> TestResult {
        let mut selection = BookingSelection::new();

        selection.select_date(studio(), slot(2, 10, 12)?);
        selection.select_date(studio(), slot(3, 10, 12)?);

        selection.apply(SelectionCommand::SetActive(date(2026, 11, 2)))?;
        assert_eq!(selection.active_date(), Some(date(2026, 11, 2)));

        let result = selection.apply(SelectionCommand::SetActive(date(2026, 12, 1)));
        assert_eq!(result, Err(SelectionError::UnknownDate(date(2026, 12, 1))));

        Ok(())
    }

    #[test]
    fn earliest_date_is_calendar_first() -> TestResult {
        let mut selection = BookingSelection::new();

        selection.select_date(studio(), slot(9, 10, 12)?);
        selection.select_date(studio(), slot(3, 10, 12)?);

        assert_eq!(selection.earliest_date().map(DateSlot::date), Some(date(2026, 11, 3)));

        Ok(())
    }

    proptest! {
        #[test]
        fn never_holds_both_modes(ops in prop::collection::vec((any::<bool>(), 1_i8..28), 1..30)) {
            let mut selection = BookingSelection::new();

            for (use_package, day) in ops {
                let target = if use_package { package() } else { studio() };

                selection.select_date(target, DateSlot::whole_day(date(2026, 11, day)));

                let (active, other) = if use_package {
                    (BookingMode::AdminPackage, BookingMode::Regular)
                } else {
                    (BookingMode::Regular, BookingMode::AdminPackage)
                };

                prop_assert_eq!(selection.mode(), Some(active));
                prop_assert!(selection.date_count(active) > 0);
                prop_assert_eq!(selection.date_count(other), 0);
            }
        }
    }
}
