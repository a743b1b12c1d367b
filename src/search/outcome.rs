//! Search results.

use crate::cp::{ConstraintSet, VarId};
use crate::model::{CandidateId, ResourceId, Slot, UnitId};

/// One occupied slot. `day` and `period` are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Placement {
    pub unit: UnitId,
    pub day: u32,
    pub period: u32,
    pub resource: Option<ResourceId>,
    pub candidate: CandidateId,
}

impl Placement {
    /// The grid coordinate this placement occupies.
    pub fn slot(&self) -> Slot {
        Slot {
            unit: self.unit,
            day: self.day,
            period: self.period,
            resource: self.resource,
        }
    }
}

/// A (possibly partial) assignment of candidates to slots.
///
/// Placements are sorted by unit, day, period and resource. Slots without a
/// placement are Empty.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Assignment {
    placements: Vec<Placement>,
    verified: bool,
}

impl Assignment {
    /// Decodes the variables bound to true.
    ///
    /// `verified` records whether the full assignment passed
    /// [`ConstraintSet::check`].
    pub(crate) fn from_vars(set: &ConstraintSet, trues: &[VarId]) -> Self {
        let mut values = vec![false; set.var_count()];
        for &v in trues {
            values[v] = true;
        }
        let mut placements: Vec<Placement> = trues
            .iter()
            .map(|&v| {
                let var = set.var(v);
                Placement {
                    unit: var.unit,
                    day: var.day as u32 + 1,
                    period: var.period as u32 + 1,
                    resource: var.resource,
                    candidate: var.candidate,
                }
            })
            .collect();
        placements.sort_unstable();
        Self {
            placements,
            verified: set.check(&values),
        }
    }

    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    /// Whether the assignment satisfies every constraint.
    pub fn is_verified(&self) -> bool {
        self.verified
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    /// Occurrences of one candidate.
    pub fn count_for(&self, candidate: CandidateId) -> usize {
        self.placements
            .iter()
            .filter(|p| p.candidate == candidate)
            .count()
    }

    /// Placements in one unit cell (1-based day and period).
    pub fn at(&self, unit: UnitId, day: u32, period: u32) -> impl Iterator<Item = &Placement> {
        self.placements
            .iter()
            .filter(move |p| p.unit == unit && p.day == day && p.period == period)
    }
}

/// Terminal state of a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveOutcome {
    /// Every hard constraint holds.
    Solved(Assignment),
    /// The search space was exhausted without a solution.
    Infeasible,
    /// A budget ran out first; carries the deepest partial assignment.
    Exhausted(Assignment),
}

impl SolveOutcome {
    /// Whether a complete solution was found.
    pub fn is_solved(&self) -> bool {
        matches!(self, SolveOutcome::Solved(_))
    }

    /// The carried assignment, complete or partial.
    pub fn assignment(&self) -> Option<&Assignment> {
        match self {
            SolveOutcome::Solved(a) | SolveOutcome::Exhausted(a) => Some(a),
            SolveOutcome::Infeasible => None,
        }
    }
}

/// Counters collected during a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchStats {
    /// Branches expanded across all workers.
    pub branches: u64,
    /// Branches that ended in a propagation conflict.
    pub conflicts: u64,
    /// Complete solutions reached, including ones later superseded.
    pub solutions: u64,
    /// Workers that took part.
    pub workers: usize,
    /// Wall-clock duration in milliseconds.
    pub elapsed_ms: u64,
}

/// Outcome plus statistics of one search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolveReport {
    pub outcome: SolveOutcome,
    pub stats: SearchStats,
}
