//! CP variable types.

use crate::model::{CandidateId, ResourceId, UnitId};

/// Index of a boolean variable within a [`ConstraintSet`](super::ConstraintSet).
pub type VarId = usize;

/// A boolean decision: "candidate occupies this cell (on this resource)".
///
/// `day` and `period` are 0-based grid indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoolVar {
    /// Flat index of the unit cell.
    pub cell: usize,
    pub unit: UnitId,
    pub day: usize,
    pub period: usize,
    /// Resource the placement uses, if resources are modelled.
    pub resource: Option<ResourceId>,
    pub candidate: CandidateId,
    /// Fixed value, if any.
    pub fixed: Option<bool>,
}

impl BoolVar {
    /// Creates an unfixed variable.
    pub fn new(
        cell: usize,
        unit: UnitId,
        day: usize,
        period: usize,
        resource: Option<ResourceId>,
        candidate: CandidateId,
    ) -> Self {
        Self {
            cell,
            unit,
            day,
            period,
            resource,
            candidate,
            fixed: None,
        }
    }

    /// Pins the variable to `value`.
    pub fn fixed(mut self, value: bool) -> Self {
        self.fixed = Some(value);
        self
    }

    /// Whether this variable is fixed to a single value.
    pub fn is_fixed(&self) -> bool {
        self.fixed.is_some()
    }
}

/// Integer view of one unit cell.
///
/// The cell's value is the index of its single true variable in `domain`,
/// or [`CellVar::EMPTY`] when none is true.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellVar {
    pub unit: UnitId,
    pub day: usize,
    pub period: usize,
    /// Boolean variables that may fill this cell, in creation order.
    pub domain: Vec<VarId>,
}

impl CellVar {
    /// Value of an empty cell.
    pub const EMPTY: usize = usize::MAX;

    /// Domain size, counting the empty value.
    pub fn domain_size(&self) -> usize {
        self.domain.len() + 1
    }

    /// Decodes the cell value from variable values.
    pub fn value(&self, values: &[bool]) -> usize {
        self.domain
            .iter()
            .position(|&v| values[v])
            .unwrap_or(Self::EMPTY)
    }
}
