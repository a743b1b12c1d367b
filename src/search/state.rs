//! Partial assignments and cardinality propagation.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::cp::{ConstraintSet, Relation, VarId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Value {
    Unknown,
    True,
    False,
}

/// Order in which each required-count constraint offers its variables.
#[derive(Debug, Clone)]
pub(crate) struct ValueOrder {
    /// Parallel to [`ConstraintSet::required`].
    order: Vec<Vec<VarId>>,
}

impl ValueOrder {
    /// Natural order, or a seeded permutation per candidate.
    pub(crate) fn new(set: &ConstraintSet, seed: Option<u64>) -> Self {
        let mut rng = seed.map(StdRng::seed_from_u64);
        let order = set
            .required()
            .iter()
            .map(|&c| {
                let mut vars = set.constraint(c).vars.clone();
                if let Some(rng) = rng.as_mut() {
                    vars.shuffle(rng);
                }
                vars
            })
            .collect();
        Self { order }
    }
}

/// A partial assignment with per-constraint counters.
///
/// `ones[c]` counts true members of constraint `c`, `open[c]` its unknown
/// members. Both are kept in step with `values` by [`assign`](Self::assign).
#[derive(Debug, Clone)]
pub(crate) struct SearchState {
    values: Vec<Value>,
    ones: Vec<u32>,
    open: Vec<u32>,
    placed: usize,
}

impl SearchState {
    /// Applies forced bindings and propagates every constraint.
    ///
    /// Returns `None` if the root is already contradictory.
    pub(crate) fn initial(set: &ConstraintSet) -> Option<Self> {
        let mut state = Self {
            values: vec![Value::Unknown; set.var_count()],
            ones: vec![0; set.constraint_count()],
            open: set
                .constraints()
                .iter()
                .map(|c| c.vars.len() as u32)
                .collect(),
            placed: 0,
        };
        let mut queue: Vec<usize> = (0..set.constraint_count()).rev().collect();
        for &var in set.forced() {
            if !state.set(set, var, true, &mut queue) {
                return None;
            }
        }
        state.propagate(set, &mut queue).then_some(state)
    }

    /// Binds `var` to `value` and propagates. Returns `false` on conflict.
    pub(crate) fn assign(&mut self, set: &ConstraintSet, var: VarId, value: bool) -> bool {
        let mut queue = Vec::new();
        self.set(set, var, value, &mut queue) && self.propagate(set, &mut queue)
    }

    /// Number of variables bound to true.
    pub(crate) fn placed(&self) -> usize {
        self.placed
    }

    #[cfg(test)]
    pub(crate) fn value(&self, var: VarId) -> Value {
        self.values[var]
    }

    /// Variables bound to true, ascending.
    pub(crate) fn trues(&self) -> Vec<VarId> {
        self.values
            .iter()
            .enumerate()
            .filter(|(_, v)| **v == Value::True)
            .map(|(i, _)| i)
            .collect()
    }

    /// Picks the next branching variable.
    ///
    /// Takes the unsatisfied required-count constraint with the least slack
    /// (open members minus still-needed members; ties to the lowest index)
    /// and returns its first unknown variable in value order. `None` means
    /// every required count is met, so the assignment is complete.
    pub(crate) fn choose(&self, set: &ConstraintSet, order: &ValueOrder) -> Option<VarId> {
        let mut best: Option<(u32, usize)> = None;
        for (slot, &c) in set.required().iter().enumerate() {
            let need = set.constraint(c).rhs.saturating_sub(self.ones[c]);
            if need == 0 {
                continue;
            }
            let slack = self.open[c].saturating_sub(need);
            if best.map_or(true, |(s, _)| slack < s) {
                best = Some((slack, slot));
            }
        }
        let (_, slot) = best?;
        order.order[slot]
            .iter()
            .copied()
            .find(|&v| self.values[v] == Value::Unknown)
    }

    fn set(&mut self, set: &ConstraintSet, var: VarId, value: bool, queue: &mut Vec<usize>) -> bool {
        let target = if value { Value::True } else { Value::False };
        match self.values[var] {
            Value::Unknown => {}
            current => return current == target,
        }
        self.values[var] = target;
        if value {
            self.placed += 1;
        }
        for &c in set.constraints_of(var) {
            self.open[c] -= 1;
            if value {
                self.ones[c] += 1;
            }
            queue.push(c);
        }
        true
    }

    fn propagate(&mut self, set: &ConstraintSet, queue: &mut Vec<usize>) -> bool {
        while let Some(c) = queue.pop() {
            let constraint = set.constraint(c);
            let (ones, open, k) = (self.ones[c], self.open[c], constraint.rhs);
            if ones > k {
                return false;
            }
            if open == 0 {
                if constraint.relation == Relation::Equal && ones < k {
                    return false;
                }
                continue;
            }

            let fill = match constraint.relation {
                Relation::AtMost if ones == k => Some(false),
                Relation::AtMost => None,
                Relation::Equal if ones + open < k => return false,
                Relation::Equal if ones == k => Some(false),
                Relation::Equal if ones + open == k => Some(true),
                Relation::Equal => None,
            };

            if let Some(value) = fill {
                for &v in &constraint.vars {
                    if self.values[v] == Value::Unknown && !self.set(set, v, value, queue) {
                        return false;
                    }
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cp::{BoolVar, Constraint, ConstraintKind};

    /// Three candidate vars in one cell row: A needs 1 of {0,1}, B needs 1 of {2}.
    fn small_set() -> ConstraintSet {
        let mut set = ConstraintSet::new();
        for (cell, candidate) in [(0, 0), (1, 0), (1, 1)] {
            set.add_var(BoolVar::new(cell, 0, 0, cell, None, candidate));
        }
        set.add_constraint(Constraint::equal(ConstraintKind::RequiredCount, vec![0, 1], 1));
        set.add_constraint(Constraint::equal(ConstraintKind::RequiredCount, vec![2], 1));
        set.add_constraint(Constraint::at_most(ConstraintKind::CellExclusive, vec![1, 2], 1));
        set
    }

    #[test]
    fn test_initial_propagation() {
        let set = small_set();
        let state = SearchState::initial(&set).unwrap();
        // B must take var 2, which excludes var 1, which forces var 0.
        assert_eq!(state.value(2), Value::True);
        assert_eq!(state.value(1), Value::False);
        assert_eq!(state.value(0), Value::True);
        assert_eq!(state.placed(), 2);
        assert_eq!(state.trues(), vec![0, 2]);
        assert!(state.choose(&set, &ValueOrder::new(&set, None)).is_none());
    }

    #[test]
    fn test_root_conflict() {
        let mut set = ConstraintSet::new();
        set.add_constraint(Constraint::equal(ConstraintKind::RequiredCount, vec![], 1));
        assert!(SearchState::initial(&set).is_none());
    }

    #[test]
    fn test_forced_conflict() {
        let mut set = ConstraintSet::new();
        set.add_var(BoolVar::new(0, 0, 0, 0, None, 0).fixed(true));
        set.add_var(BoolVar::new(1, 0, 0, 1, None, 0).fixed(true));
        set.add_constraint(Constraint::at_most(ConstraintKind::DailyCap, vec![0, 1], 1));
        assert!(SearchState::initial(&set).is_none());
    }

    #[test]
    fn test_assign_and_conflict() {
        let mut set = ConstraintSet::new();
        for period in 0..3 {
            set.add_var(BoolVar::new(period, 0, 0, period, None, 0));
        }
        set.add_constraint(Constraint::equal(ConstraintKind::RequiredCount, vec![0, 1, 2], 2));

        let state = SearchState::initial(&set).unwrap();
        let order = ValueOrder::new(&set, None);
        assert_eq!(state.choose(&set, &order), Some(0));

        let mut forbid = state.clone();
        assert!(forbid.assign(&set, 0, false));
        // Two left for two needed: both forced.
        assert_eq!(forbid.trues(), vec![1, 2]);

        let mut assigned = state.clone();
        assert!(assigned.assign(&set, 0, true));
        assert!(assigned.assign(&set, 1, true));
        assert_eq!(assigned.value(2), Value::False);
        assert!(!assigned.assign(&set, 2, true));
    }

    #[test]
    fn test_choose_least_slack() {
        let mut set = ConstraintSet::new();
        for period in 0..4 {
            set.add_var(BoolVar::new(period, 0, 0, period, None, period / 2));
        }
        set.add_constraint(Constraint::equal(ConstraintKind::RequiredCount, vec![0, 1], 0));
        set.add_constraint(Constraint::equal(ConstraintKind::RequiredCount, vec![2, 3], 1));
        let mut loose = set.clone();
        loose.add_var(BoolVar::new(4, 0, 0, 4, None, 2));
        loose.add_var(BoolVar::new(5, 0, 0, 5, None, 2));
        loose.add_var(BoolVar::new(6, 0, 0, 6, None, 2));
        loose.add_constraint(Constraint::equal(ConstraintKind::RequiredCount, vec![4, 5, 6], 1));

        let state = SearchState::initial(&loose).unwrap();
        // Candidate 1 has slack 1, candidate 2 slack 2.
        assert_eq!(state.choose(&loose, &ValueOrder::new(&loose, None)), Some(2));
    }

    #[test]
    fn test_seeded_order_is_permutation() {
        let mut set = ConstraintSet::new();
        for period in 0..10 {
            set.add_var(BoolVar::new(period, 0, 0, period, None, 0));
        }
        set.add_constraint(Constraint::equal(
            ConstraintKind::RequiredCount,
            (0..10).collect(),
            3,
        ));
        let a = ValueOrder::new(&set, Some(11));
        let b = ValueOrder::new(&set, Some(11));
        assert_eq!(a.order, b.order);
        let mut sorted = a.order[0].clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..10).collect::<Vec<_>>());
    }
}
