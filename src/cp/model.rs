//! Constraint set definition.

use std::fmt;

use super::variables::{BoolVar, CellVar, VarId};

/// Comparison of a linear cardinality constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// `Σ vars = rhs`
    Equal,
    /// `Σ vars ≤ rhs`
    AtMost,
}

/// Which timetabling rule a constraint encodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintKind {
    /// A candidate appears exactly its required number of times.
    RequiredCount,
    /// A unit cell holds at most one candidate.
    CellExclusive,
    /// A resource hosts at most one candidate per (day, period).
    ResourceExclusive,
    /// A candidate appears at most its cap per day.
    DailyCap,
    /// A teacher is in at most one place per (day, period).
    TeacherClash,
    /// A teacher's bookings within a window of consecutive periods.
    TeacherFatigue,
    /// A teacher's bookings across the whole grid.
    TeacherWeekly,
    /// A unit cell holds exactly one candidate.
    FullCell,
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConstraintKind::RequiredCount => "required-count",
            ConstraintKind::CellExclusive => "cell-exclusive",
            ConstraintKind::ResourceExclusive => "resource-exclusive",
            ConstraintKind::DailyCap => "daily-cap",
            ConstraintKind::TeacherClash => "teacher-clash",
            ConstraintKind::TeacherFatigue => "teacher-fatigue",
            ConstraintKind::TeacherWeekly => "teacher-weekly",
            ConstraintKind::FullCell => "full-cell",
        };
        f.write_str(name)
    }
}

/// A linear cardinality constraint `Σ vars (= | ≤) rhs` over boolean variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    pub kind: ConstraintKind,
    pub vars: Vec<VarId>,
    pub relation: Relation,
    pub rhs: u32,
}

impl Constraint {
    /// Creates an equality constraint.
    pub fn equal(kind: ConstraintKind, vars: Vec<VarId>, rhs: u32) -> Self {
        Self {
            kind,
            vars,
            relation: Relation::Equal,
            rhs,
        }
    }

    /// Creates an upper-bound constraint.
    pub fn at_most(kind: ConstraintKind, vars: Vec<VarId>, rhs: u32) -> Self {
        Self {
            kind,
            vars,
            relation: Relation::AtMost,
            rhs,
        }
    }

    /// Whether `count` true members satisfy the constraint.
    pub fn holds_for(&self, count: u32) -> bool {
        match self.relation {
            Relation::Equal => count == self.rhs,
            Relation::AtMost => count <= self.rhs,
        }
    }

    /// Number of true members under `values`.
    pub fn count(&self, values: &[bool]) -> u32 {
        self.vars.iter().filter(|&&v| values[v]).count() as u32
    }
}

/// The declarative model of a timetabling problem.
///
/// Boolean variables, their per-cell integer view, forced bindings and
/// cardinality constraints. Built by
/// [`ConstraintBuilder`](super::ConstraintBuilder) and then shared
/// read-only by every search worker.
///
/// # Examples
///
/// ```
/// use u_timetable::cp::{BoolVar, CellVar, Constraint, ConstraintKind, ConstraintSet};
///
/// let mut set = ConstraintSet::new();
/// let a = set.add_var(BoolVar::new(0, 0, 0, 0, None, 0));
/// let b = set.add_var(BoolVar::new(0, 0, 0, 0, None, 1));
/// set.add_cell(CellVar { unit: 0, day: 0, period: 0, domain: vec![a, b] });
/// set.add_constraint(Constraint::at_most(ConstraintKind::CellExclusive, vec![a, b], 1));
/// assert!(set.validate().is_ok());
/// assert!(set.check(&[true, false]));
/// assert!(!set.check(&[true, true]));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConstraintSet {
    vars: Vec<BoolVar>,
    cells: Vec<CellVar>,
    constraints: Vec<Constraint>,
    forced: Vec<VarId>,
    var_constraints: Vec<Vec<usize>>,
    required: Vec<usize>,
}

impl ConstraintSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a variable and returns its id. Variables fixed to `true` are
    /// recorded as forced bindings.
    pub fn add_var(&mut self, var: BoolVar) -> VarId {
        let id = self.vars.len();
        if var.fixed == Some(true) {
            self.forced.push(id);
        }
        self.vars.push(var);
        self.var_constraints.push(Vec::new());
        id
    }

    /// Adds a cell view.
    pub fn add_cell(&mut self, cell: CellVar) {
        self.cells.push(cell);
    }

    /// Adds a constraint and returns its index.
    ///
    /// Variable ids out of range are kept as given and reported by
    /// [`validate`](Self::validate).
    pub fn add_constraint(&mut self, constraint: Constraint) -> usize {
        let index = self.constraints.len();
        for &v in &constraint.vars {
            if let Some(list) = self.var_constraints.get_mut(v) {
                list.push(index);
            }
        }
        if constraint.kind == ConstraintKind::RequiredCount {
            self.required.push(index);
        }
        self.constraints.push(constraint);
        index
    }

    pub fn vars(&self) -> &[BoolVar] {
        &self.vars
    }

    pub fn var(&self, id: VarId) -> &BoolVar {
        &self.vars[id]
    }

    pub fn cells(&self) -> &[CellVar] {
        &self.cells
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn constraint(&self, index: usize) -> &Constraint {
        &self.constraints[index]
    }

    /// Variables pre-bound to `true`.
    pub fn forced(&self) -> &[VarId] {
        &self.forced
    }

    /// Indices of the constraints that mention `var`.
    pub fn constraints_of(&self, var: VarId) -> &[usize] {
        &self.var_constraints[var]
    }

    /// Indices of the required-count constraints, in candidate order.
    pub fn required(&self) -> &[usize] {
        &self.required
    }

    /// Number of boolean variables.
    pub fn var_count(&self) -> usize {
        self.vars.len()
    }

    /// Number of constraints.
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Number of constraints of one kind.
    pub fn count_of(&self, kind: ConstraintKind) -> usize {
        self.constraints.iter().filter(|c| c.kind == kind).count()
    }

    /// Finds an upper bound that the required counts inside it overfill.
    ///
    /// Required counts share no variables, so those whose members all lie
    /// in one `Σ vars ≤ k` constraint must sum to at most `k`. Returns the
    /// index of the first bound that breaks this, which makes the set
    /// infeasible before any search.
    pub fn overcommitted(&self) -> Option<usize> {
        let mut required_of = vec![None; self.vars.len()];
        for &r in &self.required {
            for &v in &self.constraints[r].vars {
                if let Some(slot) = required_of.get_mut(v) {
                    *slot = Some(r);
                }
            }
        }

        let mut inside = vec![0usize; self.constraints.len()];
        let mut touched = Vec::new();
        for (index, bound) in self.constraints.iter().enumerate() {
            if bound.relation != Relation::AtMost {
                continue;
            }
            for &v in &bound.vars {
                if let Some(&Some(r)) = required_of.get(v) {
                    if inside[r] == 0 {
                        touched.push(r);
                    }
                    inside[r] += 1;
                }
            }
            let demand: u32 = touched
                .iter()
                .filter(|&&r| inside[r] == self.constraints[r].vars.len())
                .map(|&r| self.constraints[r].rhs)
                .sum();
            for r in touched.drain(..) {
                inside[r] = 0;
            }
            if demand > bound.rhs {
                return Some(index);
            }
        }
        None
    }

    /// Validates the set for internal consistency.
    ///
    /// Checks that every referenced variable exists, that no variable sits
    /// in two required counts, that cell domains agree with their
    /// variables, and that forced bindings are fixed variables.
    pub fn validate(&self) -> Result<(), String> {
        let n = self.vars.len();
        for (i, constraint) in self.constraints.iter().enumerate() {
            if let Some(&v) = constraint.vars.iter().find(|&&v| v >= n) {
                return Err(format!("constraint {i} ({}) references undefined variable {v}", constraint.kind));
            }
        }
        let mut counted = vec![false; n];
        for &r in &self.required {
            for &v in &self.constraints[r].vars {
                if std::mem::replace(&mut counted[v], true) {
                    return Err(format!("variable {v} is in more than one required count"));
                }
            }
        }
        for (i, cell) in self.cells.iter().enumerate() {
            for &v in &cell.domain {
                let Some(var) = self.vars.get(v) else {
                    return Err(format!("cell {i} references undefined variable {v}"));
                };
                if var.cell != i || var.day != cell.day || var.period != cell.period {
                    return Err(format!("variable {v} does not belong to cell {i}"));
                }
            }
        }
        for &v in &self.forced {
            if self.vars.get(v).and_then(|var| var.fixed) != Some(true) {
                return Err(format!("forced variable {v} is not fixed to true"));
            }
        }
        Ok(())
    }

    /// Indices of constraints violated by a complete assignment.
    pub fn violations(&self, values: &[bool]) -> Vec<usize> {
        self.constraints
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.holds_for(c.count(values)))
            .map(|(i, _)| i)
            .collect()
    }

    /// Whether a complete assignment satisfies every constraint and forced binding.
    pub fn check(&self, values: &[bool]) -> bool {
        values.len() == self.vars.len()
            && self.forced.iter().all(|&v| values[v])
            && self.violations(values).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_candidates_one_cell() -> ConstraintSet {
        let mut set = ConstraintSet::new();
        let a = set.add_var(BoolVar::new(0, 0, 0, 0, None, 0));
        let b = set.add_var(BoolVar::new(0, 0, 0, 0, None, 1));
        set.add_cell(CellVar {
            unit: 0,
            day: 0,
            period: 0,
            domain: vec![a, b],
        });
        set.add_constraint(Constraint::equal(ConstraintKind::RequiredCount, vec![a], 1));
        set.add_constraint(Constraint::equal(ConstraintKind::RequiredCount, vec![b], 0));
        set.add_constraint(Constraint::at_most(ConstraintKind::CellExclusive, vec![a, b], 1));
        set
    }

    #[test]
    fn test_set_creation() {
        let set = two_candidates_one_cell();
        assert_eq!(set.var_count(), 2);
        assert_eq!(set.constraint_count(), 3);
        assert_eq!(set.required(), &[0, 1]);
        assert_eq!(set.constraints_of(0), &[0, 2]);
        assert_eq!(set.count_of(ConstraintKind::CellExclusive), 1);
        assert!(set.validate().is_ok());
    }

    #[test]
    fn test_check() {
        let set = two_candidates_one_cell();
        assert!(set.check(&[true, false]));
        assert_eq!(set.violations(&[false, true]), vec![0, 1]);
        assert!(!set.check(&[true]));
    }

    #[test]
    fn test_forced_binding() {
        let mut set = ConstraintSet::new();
        let v = set.add_var(BoolVar::new(0, 0, 0, 0, None, 0).fixed(true));
        assert_eq!(set.forced(), &[v]);
        assert!(!set.check(&[false]));
        assert!(set.check(&[true]));
    }

    #[test]
    fn test_undefined_variable() {
        let mut set = ConstraintSet::new();
        set.add_constraint(Constraint::at_most(ConstraintKind::TeacherClash, vec![7], 1));
        assert!(set.validate().is_err());
    }

    #[test]
    fn test_cell_mismatch() {
        let mut set = ConstraintSet::new();
        let v = set.add_var(BoolVar::new(1, 0, 0, 1, None, 0));
        set.add_cell(CellVar {
            unit: 0,
            day: 0,
            period: 0,
            domain: vec![v],
        });
        assert!(set.validate().is_err());
    }

    #[test]
    fn test_shared_required_variable() {
        let mut set = ConstraintSet::new();
        let v = set.add_var(BoolVar::new(0, 0, 0, 0, None, 0));
        set.add_constraint(Constraint::equal(ConstraintKind::RequiredCount, vec![v], 1));
        set.add_constraint(Constraint::equal(ConstraintKind::RequiredCount, vec![v], 1));
        assert!(set.validate().is_err());
    }

    // ---- Counting bounds ----

    /// Two candidates with one teacher on a grid of `slots` periods.
    fn shared_teacher(slots: usize, a: u32, b: u32) -> ConstraintSet {
        let mut set = ConstraintSet::new();
        for candidate in 0..2 {
            for period in 0..slots {
                set.add_var(BoolVar::new(candidate * slots + period, candidate, 0, period, None, candidate));
            }
        }
        set.add_constraint(Constraint::equal(ConstraintKind::RequiredCount, (0..slots).collect(), a));
        set.add_constraint(Constraint::equal(ConstraintKind::RequiredCount, (slots..2 * slots).collect(), b));
        set.add_constraint(Constraint::at_most(ConstraintKind::TeacherWeekly, (0..2 * slots).collect(), slots as u32));
        set
    }

    #[test]
    fn test_overcommitted_bound() {
        assert_eq!(shared_teacher(3, 2, 2).overcommitted(), Some(2));
        assert_eq!(shared_teacher(3, 2, 1).overcommitted(), None);
    }

    #[test]
    fn test_partial_overlap_not_counted() {
        // Only part of candidate 1 lies in the bound, so it proves nothing.
        let mut set = shared_teacher(3, 2, 2);
        set.add_constraint(Constraint::at_most(ConstraintKind::DailyCap, vec![0, 1, 2, 3], 2));
        assert_eq!(set.overcommitted(), Some(2));
        let mut loose = shared_teacher(3, 2, 1);
        loose.add_constraint(Constraint::at_most(ConstraintKind::DailyCap, vec![0, 1, 2, 3], 2));
        assert_eq!(loose.overcommitted(), None);
    }

    #[test]
    fn test_relation() {
        let eq = Constraint::equal(ConstraintKind::RequiredCount, vec![], 2);
        assert!(eq.holds_for(2));
        assert!(!eq.holds_for(1));
        let le = Constraint::at_most(ConstraintKind::DailyCap, vec![], 2);
        assert!(le.holds_for(0));
        assert!(!le.holds_for(3));
        assert_eq!(ConstraintKind::TeacherFatigue.to_string(), "teacher-fatigue");
    }
}
