//! Translation of a [`Problem`] into a [`ConstraintSet`].

use log::{debug, info};

use super::model::{Constraint, ConstraintKind, ConstraintSet};
use super::variables::{BoolVar, CellVar, VarId};
use crate::model::Problem;

/// Derives the boolean model of a problem.
///
/// Variables are created in (unit, day, period, resource, candidate) order,
/// one per eligible pair; forced cells get a single fixed variable for their
/// sentinel. Candidates that take no resource get one plain variable per
/// cell, ahead of the resource-bound ones. The output depends only on the
/// problem, so building twice yields identical sets.
///
/// # Examples
///
/// ```
/// use u_timetable::cp::{ConstraintBuilder, ConstraintKind};
/// use u_timetable::model::{CandidateRecord, Owner, Problem, ProblemInput, ScheduleRules};
///
/// let input = ProblemInput::new(vec![
///     CandidateRecord::new(Owner::year("Y1"), "Lab", 6).with_teacher("T1"),
/// ]);
/// let problem = Problem::new(ScheduleRules::lab(), input).unwrap();
/// let set = ConstraintBuilder::new(&problem).build();
/// assert_eq!(set.var_count(), 30);
/// assert_eq!(set.count_of(ConstraintKind::RequiredCount), 1);
/// assert_eq!(set.count_of(ConstraintKind::DailyCap), 6);
/// ```
pub struct ConstraintBuilder<'a> {
    problem: &'a Problem,
}

impl<'a> ConstraintBuilder<'a> {
    pub fn new(problem: &'a Problem) -> Self {
        Self { problem }
    }

    /// Builds the constraint set.
    pub fn build(&self) -> ConstraintSet {
        let problem = self.problem;
        let rules = problem.rules();
        let days = rules.days as usize;
        let periods = rules.periods as usize;
        let slots = days * periods;

        let mut set = ConstraintSet::new();
        let mut by_candidate: Vec<Vec<VarId>> = vec![Vec::new(); problem.candidates().len()];
        let mut by_candidate_day: Vec<Vec<VarId>> =
            vec![Vec::new(); problem.candidates().len() * days];
        let mut by_resource_slot: Vec<Vec<VarId>> =
            vec![Vec::new(); problem.resources().len() * slots];
        let mut by_teacher_slot: Vec<Vec<VarId>> =
            vec![Vec::new(); problem.teachers().len() * slots];

        for unit in 0..problem.units().len() {
            for day in 0..days {
                for period in 0..periods {
                    let cell = problem.cell_index(unit, day, period);
                    let mut domain = Vec::new();

                    let mut place = |set: &mut ConstraintSet, var: BoolVar| {
                        let candidate = var.candidate;
                        let resource = var.resource;
                        let id = set.add_var(var);
                        by_candidate[candidate].push(id);
                        by_candidate_day[candidate * days + day].push(id);
                        if let Some(r) = resource {
                            by_resource_slot[r * slots + day * periods + period].push(id);
                        }
                        if let Some(t) = problem.teacher_of(candidate) {
                            by_teacher_slot[t * slots + day * periods + period].push(id);
                        }
                        id
                    };

                    if let Some(sentinel) = problem.forced_at(unit, day, period) {
                        let var = BoolVar::new(cell, unit, day, period, None, sentinel).fixed(true);
                        domain.push(place(&mut set, var));
                    } else {
                        let candidates = problem.unit_candidates(unit).unwrap_or_default();
                        for &candidate in candidates {
                            if problem.needs_resource(candidate) {
                                continue;
                            }
                            let var = BoolVar::new(cell, unit, day, period, None, candidate);
                            domain.push(place(&mut set, var));
                        }
                        for resource in 0..problem.resources().len() {
                            for &candidate in candidates {
                                if !problem.is_eligible(candidate, resource) {
                                    continue;
                                }
                                let var =
                                    BoolVar::new(cell, unit, day, period, Some(resource), candidate);
                                domain.push(place(&mut set, var));
                            }
                        }
                    }

                    set.add_cell(CellVar {
                        unit,
                        day,
                        period,
                        domain,
                    });
                }
            }
        }

        for (candidate, vars) in problem.candidates().iter().zip(by_candidate) {
            let required = candidate.required_count();
            set.add_constraint(Constraint::equal(ConstraintKind::RequiredCount, vars, required));
        }

        let cells: Vec<Vec<VarId>> = set.cells().iter().map(|c| c.domain.clone()).collect();
        for domain in cells {
            if rules.require_full_grid {
                set.add_constraint(Constraint::equal(ConstraintKind::FullCell, domain, 1));
            } else {
                add_at_most(&mut set, ConstraintKind::CellExclusive, domain, 1);
            }
        }

        for vars in by_resource_slot {
            add_at_most(&mut set, ConstraintKind::ResourceExclusive, vars, 1);
        }

        for (candidate, row) in problem.candidates().iter().zip(by_candidate_day.chunks(days)) {
            for vars in row {
                add_at_most(&mut set, ConstraintKind::DailyCap, vars.clone(), candidate.daily_cap());
            }
        }

        for teacher in 0..problem.teachers().len() {
            let grid = &by_teacher_slot[teacher * slots..(teacher + 1) * slots];

            for vars in grid {
                add_at_most(&mut set, ConstraintKind::TeacherClash, vars.clone(), 1);
            }

            if let Some(fatigue) = rules.fatigue {
                let window = fatigue.window as usize;
                for day in 0..days {
                    let row = &grid[day * periods..(day + 1) * periods];
                    for run in row.windows(window) {
                        let vars: Vec<VarId> = run.iter().flatten().copied().collect();
                        add_at_most(&mut set, ConstraintKind::TeacherFatigue, vars, fatigue.max_bookings);
                    }
                }
            }

            // Bounded by the grid even without a weekly limit.
            let weekly = rules
                .teacher_weekly_limit
                .map_or(slots as u32, |limit| limit.min(slots as u32));
            let vars: Vec<VarId> = grid.iter().flatten().copied().collect();
            add_at_most(&mut set, ConstraintKind::TeacherWeekly, vars, weekly);
        }

        info!(
            "Built constraint set: {} variables, {} constraints, {} forced",
            set.var_count(),
            set.constraint_count(),
            set.forced().len()
        );
        debug!(
            "Constraint mix: {} daily-cap, {} teacher-clash, {} teacher-fatigue, {} resource-exclusive",
            set.count_of(ConstraintKind::DailyCap),
            set.count_of(ConstraintKind::TeacherClash),
            set.count_of(ConstraintKind::TeacherFatigue),
            set.count_of(ConstraintKind::ResourceExclusive)
        );

        set
    }
}

/// Adds `Σ vars ≤ rhs` unless it cannot bind.
fn add_at_most(set: &mut ConstraintSet, kind: ConstraintKind, vars: Vec<VarId>, rhs: u32) {
    if vars.len() > rhs as usize {
        set.add_constraint(Constraint::at_most(kind, vars, rhs));
    }
}
