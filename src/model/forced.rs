//! Forced-slot rules: cells pinned to a sentinel candidate before search.

use super::types::Owner;

/// A set of day or period numbers (1-based).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Selector {
    /// Every value in the grid.
    Any,
    /// Only the listed values.
    Only(Vec<u32>),
}

impl Selector {
    /// Whether `value` is selected.
    pub fn contains(&self, value: u32) -> bool {
        match self {
            Selector::Any => true,
            Selector::Only(values) => values.contains(&value),
        }
    }

    /// Largest explicitly listed value, if any.
    pub(crate) fn max_listed(&self) -> Option<u32> {
        match self {
            Selector::Any => None,
            Selector::Only(values) => values.iter().copied().max(),
        }
    }

    /// Whether an explicit list mentions 0, which is never a valid day or period.
    pub(crate) fn lists_zero(&self) -> bool {
        matches!(self, Selector::Only(values) if values.contains(&0))
    }
}

/// Predicate over grid cells: matches when both day and period are selected.
///
/// # Examples
///
/// ```
/// use u_timetable::model::SlotPredicate;
///
/// let last_two = SlotPredicate::days([1, 6]).with_periods([4, 5]);
/// assert!(last_two.matches(6, 5));
/// assert!(!last_two.matches(2, 5));
/// assert!(!last_two.matches(1, 3));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SlotPredicate {
    pub days: Selector,
    pub periods: Selector,
}

impl SlotPredicate {
    /// Matches every cell.
    pub fn any() -> Self {
        Self {
            days: Selector::Any,
            periods: Selector::Any,
        }
    }

    /// Matches every period of the listed days.
    pub fn days(days: impl IntoIterator<Item = u32>) -> Self {
        Self {
            days: Selector::Only(days.into_iter().collect()),
            periods: Selector::Any,
        }
    }

    /// Narrows the predicate to the listed periods.
    pub fn with_periods(mut self, periods: impl IntoIterator<Item = u32>) -> Self {
        self.periods = Selector::Only(periods.into_iter().collect());
        self
    }

    /// Whether the cell at (`day`, `period`) matches.
    pub fn matches(&self, day: u32, period: u32) -> bool {
        self.days.contains(day) && self.periods.contains(period)
    }
}

/// Pins every matching cell of `owner` to the candidate labelled `sentinel`.
///
/// The sentinel is an ordinary candidate of the owner (typically `"Free"`):
/// its forced placements count towards its required count, and no other
/// candidate may occupy a forced cell. Forced placements never occupy a
/// resource.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ForcedRule {
    pub owner: Owner,
    pub slots: SlotPredicate,
    pub sentinel: String,
}

impl ForcedRule {
    /// Creates a forced rule.
    pub fn new(owner: Owner, slots: SlotPredicate, sentinel: impl Into<String>) -> Self {
        Self {
            owner,
            slots,
            sentinel: sentinel.into(),
        }
    }
}
