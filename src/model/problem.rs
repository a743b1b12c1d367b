//! Validated problem construction.

use std::collections::{BTreeMap, HashMap, HashSet};

use log::{debug, info};

use super::error::ModelError;
use super::forced::ForcedRule;
use super::rules::ScheduleRules;
use super::types::{
    Candidate, CandidateId, CandidateRecord, Owner, Resource, ResourceId, TeacherId, UnitId,
};

/// Raw input entities for one solve, as delivered by a source.
///
/// `sections` maps a year to its declared sections. Years absent from the
/// map take their sections from the candidates that name one.
#[derive(Debug, Clone, Default)]
pub struct ProblemInput {
    pub candidates: Vec<CandidateRecord>,
    pub resources: Vec<Resource>,
    pub forced_rules: Vec<ForcedRule>,
    pub sections: BTreeMap<String, Vec<String>>,
}

impl ProblemInput {
    /// Creates an input with candidates only.
    pub fn new(candidates: Vec<CandidateRecord>) -> Self {
        Self {
            candidates,
            ..Self::default()
        }
    }

    /// Sets the shared resources.
    pub fn with_resources(mut self, resources: Vec<Resource>) -> Self {
        self.resources = resources;
        self
    }

    /// Adds a forced-slot rule.
    pub fn with_forced_rule(mut self, rule: ForcedRule) -> Self {
        self.forced_rules.push(rule);
        self
    }

    /// Declares the sections of a year.
    pub fn with_sections<I, S>(mut self, year: impl Into<String>, sections: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sections
            .insert(year.into(), sections.into_iter().map(Into::into).collect());
        self
    }
}

/// An immutable, validated timetabling problem.
///
/// Holds the units (owners that own grid cells), the candidates and which
/// units each one may occupy, the resources, and the forced cells. Every
/// structural check happens in [`Problem::new`]; once built, a problem is
/// read-only and can be shared across search workers.
///
/// # Examples
///
/// ```
/// use u_timetable::model::{CandidateRecord, Owner, Problem, ProblemInput, ScheduleRules};
///
/// let input = ProblemInput::new(vec![
///     CandidateRecord::new(Owner::year("1st Year"), "C++ Lab", 6).with_teacher("Geetha"),
///     CandidateRecord::new(Owner::year("1st Year"), "English", 6),
/// ]);
/// let problem = Problem::new(ScheduleRules::general(), input).unwrap();
/// assert_eq!(problem.units().len(), 1);
/// assert_eq!(problem.candidates().len(), 2);
/// assert_eq!(problem.cell_count(), 30);
/// ```
#[derive(Debug, Clone)]
pub struct Problem {
    rules: ScheduleRules,
    units: Vec<Owner>,
    candidates: Vec<Candidate>,
    candidate_units: Vec<Vec<UnitId>>,
    unit_candidates: Vec<Vec<CandidateId>>,
    resources: Vec<Resource>,
    forced: Vec<Option<CandidateId>>,
    teachers: Vec<TeacherId>,
    candidate_teacher: Vec<Option<usize>>,
}

impl Problem {
    /// Validates `input` against `rules` and builds the problem.
    ///
    /// # Errors
    ///
    /// - [`ModelError::InvalidCandidate`] for a negative required count, a
    ///   zero cap override, or a count exceeding the owner's available cells
    /// - [`ModelError::DuplicateCandidate`] for a repeated (owner, label)
    /// - [`ModelError::NoForcedCandidate`] for a forced rule whose sentinel
    ///   is not a candidate of the owner
    /// - [`ModelError::ConfigurationContradiction`] for invalid rules, empty
    ///   input, forced cells that break a hard limit on their own, or
    ///   required counts that overfill a unit, a year or a teacher's week
    pub fn new(rules: ScheduleRules, input: ProblemInput) -> Result<Self, ModelError> {
        rules
            .validate()
            .map_err(ModelError::ConfigurationContradiction)?;

        if input.candidates.is_empty() {
            return Err(ModelError::contradiction("no candidates to schedule"));
        }

        {
            let mut seen = HashSet::new();
            if let Some(dup) = input.resources.iter().find(|r| !seen.insert(r.id.as_str())) {
                return Err(ModelError::contradiction(format!(
                    "duplicate resource id {:?}",
                    dup.id
                )));
            }
        }

        let units = collect_units(&input.candidates, &input.sections)?;
        let candidates = build_candidates(&rules, &input.candidates)?;

        let candidate_units: Vec<Vec<UnitId>> = candidates
            .iter()
            .map(|c| {
                units
                    .iter()
                    .enumerate()
                    .filter(|(_, unit)| c.owner.covers(unit))
                    .map(|(u, _)| u)
                    .collect()
            })
            .collect();

        let mut unit_candidates = vec![Vec::new(); units.len()];
        for (c, covered) in candidate_units.iter().enumerate() {
            for &u in covered {
                unit_candidates[u].push(c);
            }
        }

        let mut teachers: Vec<TeacherId> = candidates
            .iter()
            .filter_map(|c| c.teacher.clone())
            .collect();
        teachers.sort();
        teachers.dedup();
        let candidate_teacher = candidates
            .iter()
            .map(|c| {
                c.teacher
                    .as_ref()
                    .and_then(|t| teachers.binary_search(t).ok())
            })
            .collect();

        let mut problem = Self {
            forced: vec![None; units.len() * rules.cells_per_unit()],
            rules,
            units,
            candidates,
            candidate_units,
            unit_candidates,
            resources: input.resources,
            teachers,
            candidate_teacher,
        };

        for rule in &input.forced_rules {
            problem.apply_forced_rule(rule)?;
        }
        problem.check_availability()?;
        problem.check_forced_limits()?;
        problem.check_demand()?;

        info!(
            "Built problem: {} units, {} candidates, {} resources, {} teachers, {} forced cells",
            problem.units.len(),
            problem.candidates.len(),
            problem.resources.len(),
            problem.teachers.len(),
            problem.forced.iter().filter(|f| f.is_some()).count()
        );

        Ok(problem)
    }

    /// The rules this problem was built with.
    pub fn rules(&self) -> &ScheduleRules {
        &self.rules
    }

    /// Units in construction order: years by first appearance, then sections.
    pub fn units(&self) -> &[Owner] {
        &self.units
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn candidate(&self, id: CandidateId) -> Option<&Candidate> {
        self.candidates.get(id)
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    /// Whether cells are bound to resources (lab variant).
    pub fn has_resources(&self) -> bool {
        !self.resources.is_empty()
    }

    /// Distinct teachers, sorted.
    pub fn teachers(&self) -> &[TeacherId] {
        &self.teachers
    }

    /// Index into [`teachers`](Self::teachers) for a candidate's teacher.
    pub fn teacher_of(&self, candidate: CandidateId) -> Option<usize> {
        self.candidate_teacher.get(candidate).copied().flatten()
    }

    /// Units a candidate may occupy.
    pub fn candidate_units(&self, candidate: CandidateId) -> Option<&[UnitId]> {
        self.candidate_units.get(candidate).map(Vec::as_slice)
    }

    /// Candidates that may occupy a unit's cells, in candidate order.
    pub fn unit_candidates(&self, unit: UnitId) -> Option<&[CandidateId]> {
        self.unit_candidates.get(unit).map(Vec::as_slice)
    }

    /// Whether the candidate's placements are bound to resources. Always
    /// false when the problem has none.
    pub fn needs_resource(&self, candidate: CandidateId) -> bool {
        self.has_resources()
            && self
                .candidates
                .get(candidate)
                .is_some_and(|c| c.needs_resource)
    }

    /// Whether the candidate may use the resource: it needs one and its
    /// group fits the capacity.
    pub fn is_eligible(&self, candidate: CandidateId, resource: ResourceId) -> bool {
        match (self.candidates.get(candidate), self.resources.get(resource)) {
            (Some(c), Some(r)) => c.needs_resource && r.admits(c.group_size),
            _ => false,
        }
    }

    /// Total number of unit cells.
    pub fn cell_count(&self) -> usize {
        self.forced.len()
    }

    /// Flat index of a unit cell. `day` and `period` are 0-based.
    pub fn cell_index(&self, unit: UnitId, day: usize, period: usize) -> usize {
        let periods = self.rules.periods as usize;
        unit * self.rules.cells_per_unit() + day * periods + period
    }

    /// Sentinel pinned to a unit cell, if any. `day` and `period` are 0-based.
    pub fn forced_at(&self, unit: UnitId, day: usize, period: usize) -> Option<CandidateId> {
        if day >= self.rules.days as usize || period >= self.rules.periods as usize {
            return None;
        }
        self.forced
            .get(self.cell_index(unit, day, period))
            .copied()
            .flatten()
    }

    /// Looks up a candidate by exact owner and label.
    pub fn find_candidate(&self, owner: &Owner, label: &str) -> Option<CandidateId> {
        self.candidates
            .iter()
            .position(|c| &c.owner == owner && c.label == label)
    }

    fn apply_forced_rule(&mut self, rule: &ForcedRule) -> Result<(), ModelError> {
        let (days, periods) = (self.rules.days, self.rules.periods);
        let out_of_grid = rule.slots.days.lists_zero()
            || rule.slots.periods.lists_zero()
            || rule.slots.days.max_listed().is_some_and(|d| d > days)
            || rule.slots.periods.max_listed().is_some_and(|p| p > periods);
        if out_of_grid {
            return Err(ModelError::contradiction(format!(
                "forced rule for {} selects cells outside the {}x{} grid",
                rule.owner, days, periods
            )));
        }

        let covered: Vec<UnitId> = (0..self.units.len())
            .filter(|&u| rule.owner.covers(&self.units[u]))
            .collect();
        if covered.is_empty() {
            return Err(ModelError::contradiction(format!(
                "forced rule names unknown owner {}",
                rule.owner
            )));
        }

        for unit in covered {
            let sentinel = self.sentinel_for(unit, &rule.sentinel).ok_or_else(|| {
                ModelError::NoForcedCandidate {
                    owner: rule.owner.clone(),
                    label: rule.sentinel.clone(),
                }
            })?;

            for day in 0..days as usize {
                for period in 0..periods as usize {
                    if !rule.slots.matches(day as u32 + 1, period as u32 + 1) {
                        continue;
                    }
                    let cell = self.cell_index(unit, day, period);
                    match self.forced[cell] {
                        Some(other) if other != sentinel => {
                            return Err(ModelError::contradiction(format!(
                                "{} day {} period {} is forced to both {:?} and {:?}",
                                self.units[unit],
                                day + 1,
                                period + 1,
                                self.candidates[other].label,
                                rule.sentinel
                            )));
                        }
                        _ => self.forced[cell] = Some(sentinel),
                    }
                }
            }
            debug!("Forced {:?} into matching cells of {}", rule.sentinel, self.units[unit]);
        }
        Ok(())
    }

    /// Prefers a candidate owned by the unit itself over a year-wide one.
    fn sentinel_for(&self, unit: UnitId, label: &str) -> Option<CandidateId> {
        let matching = || {
            self.unit_candidates[unit]
                .iter()
                .copied()
                .filter(|&c| self.candidates[c].label == label)
        };
        matching()
            .find(|&c| self.candidates[c].owner == self.units[unit])
            .or_else(|| matching().next())
    }

    fn check_availability(&self) -> Result<(), ModelError> {
        let cells_per_unit = self.rules.cells_per_unit();
        for (c, candidate) in self.candidates.iter().enumerate() {
            let available: usize = self.candidate_units[c]
                .iter()
                .map(|&u| {
                    let start = u * cells_per_unit;
                    self.forced[start..start + cells_per_unit]
                        .iter()
                        .filter(|f| f.map_or(true, |s| s == c))
                        .count()
                })
                .sum();
            if candidate.required_count as usize > available {
                return Err(ModelError::InvalidCandidate {
                    owner: candidate.owner.clone(),
                    label: candidate.label.clone(),
                    reason: format!(
                        "requires {} slots but only {} are available",
                        candidate.required_count, available
                    ),
                });
            }
        }
        Ok(())
    }

    fn check_forced_limits(&self) -> Result<(), ModelError> {
        let days = self.rules.days as usize;
        let periods = self.rules.periods as usize;

        let mut per_candidate = vec![0u32; self.candidates.len()];
        let mut per_candidate_day: HashMap<(CandidateId, usize), u32> = HashMap::new();
        let mut teacher_grid = vec![vec![0u32; days * periods]; self.teachers.len()];

        for unit in 0..self.units.len() {
            for day in 0..days {
                for period in 0..periods {
                    let Some(c) = self.forced_at(unit, day, period) else {
                        continue;
                    };
                    per_candidate[c] += 1;
                    *per_candidate_day.entry((c, day)).or_default() += 1;
                    if let Some(t) = self.candidate_teacher[c] {
                        teacher_grid[t][day * periods + period] += 1;
                    }
                }
            }
        }

        for (c, &count) in per_candidate.iter().enumerate() {
            let candidate = &self.candidates[c];
            if count > candidate.required_count {
                return Err(ModelError::contradiction(format!(
                    "{:?} of {} is forced {} times but only {} are required",
                    candidate.label, candidate.owner, count, candidate.required_count
                )));
            }
        }

        let mut capped: Vec<_> = per_candidate_day.into_iter().collect();
        capped.sort_unstable();
        for ((c, day), count) in capped {
            let candidate = &self.candidates[c];
            if count > candidate.daily_cap {
                return Err(ModelError::contradiction(format!(
                    "{:?} of {} is forced {} times on day {}, above its daily cap of {}",
                    candidate.label,
                    candidate.owner,
                    count,
                    day + 1,
                    candidate.daily_cap
                )));
            }
        }

        for (t, grid) in teacher_grid.iter().enumerate() {
            let teacher = &self.teachers[t];
            for (cell, &count) in grid.iter().enumerate() {
                if count > 1 {
                    return Err(ModelError::contradiction(format!(
                        "teacher {} is forced twice into day {} period {}",
                        teacher,
                        cell / periods + 1,
                        cell % periods + 1
                    )));
                }
            }

            if let Some(fatigue) = self.rules.fatigue {
                let window = fatigue.window as usize;
                for day in 0..days {
                    let row = &grid[day * periods..(day + 1) * periods];
                    for run in row.windows(window) {
                        if run.iter().sum::<u32>() > fatigue.max_bookings {
                            return Err(ModelError::contradiction(format!(
                                "teacher {teacher} has more than {} forced bookings within {window} consecutive periods on day {}",
                                fatigue.max_bookings,
                                day + 1
                            )));
                        }
                    }
                }
            }

            if let Some(limit) = self.rules.teacher_weekly_limit {
                let total: u32 = grid.iter().sum();
                if total > limit {
                    return Err(ModelError::contradiction(format!(
                        "teacher {teacher} has {total} forced bookings, above the weekly limit of {limit}"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Checks sums that no single candidate reveals: a section's own
    /// candidates against its cells, a year against the cells of its units
    /// (exactly, under a full grid) and a teacher against the weekly limit.
    fn check_demand(&self) -> Result<(), ModelError> {
        let cells = self.rules.cells_per_unit() as u64;

        let mut years: Vec<&str> = Vec::new();
        for unit in &self.units {
            if !years.contains(&unit.year.as_str()) {
                years.push(&unit.year);
            }
        }

        for year in years {
            let of_year = || {
                self.candidates
                    .iter()
                    .filter(move |c| c.owner.year == year)
            };
            let units: Vec<&Owner> = self.units.iter().filter(|u| u.year == year).collect();

            for &unit in units.iter().filter(|u| u.section.is_some()) {
                let own: u64 = of_year()
                    .filter(|c| &c.owner == unit)
                    .map(|c| u64::from(c.required_count))
                    .sum();
                if own > cells {
                    return Err(ModelError::contradiction(format!(
                        "{unit} needs {own} slots for its own candidates but has {cells} cells"
                    )));
                }
            }

            let total: u64 = of_year().map(|c| u64::from(c.required_count)).sum();
            let capacity = units.len() as u64 * cells;
            if total > capacity {
                return Err(ModelError::contradiction(format!(
                    "{year} needs {total} slots but its units have {capacity} cells"
                )));
            }
            if self.rules.require_full_grid && total != capacity {
                return Err(ModelError::contradiction(format!(
                    "{year} needs {total} slots but a full grid of its units has {capacity} cells"
                )));
            }
        }

        if let Some(limit) = self.rules.teacher_weekly_limit {
            let mut totals = vec![0u64; self.teachers.len()];
            for (c, candidate) in self.candidates.iter().enumerate() {
                if let Some(t) = self.candidate_teacher[c] {
                    totals[t] += u64::from(candidate.required_count);
                }
            }
            if let Some((t, total)) = totals
                .iter()
                .enumerate()
                .find(|&(_, &total)| total > u64::from(limit))
            {
                return Err(ModelError::contradiction(format!(
                    "teacher {} needs {total} slots, above the weekly limit of {limit}",
                    self.teachers[t]
                )));
            }
        }
        Ok(())
    }
}

/// Derives the units: years by first appearance among the candidates, each
/// split into its declared (or candidate-named) sections.
fn collect_units(
    records: &[CandidateRecord],
    declared: &BTreeMap<String, Vec<String>>,
) -> Result<Vec<Owner>, ModelError> {
    let mut years: Vec<&str> = Vec::new();
    for rec in records {
        if !years.contains(&rec.owner.year.as_str()) {
            years.push(&rec.owner.year);
        }
    }

    let mut units = Vec::new();
    for year in years {
        let named = records
            .iter()
            .filter(|r| r.owner.year == year)
            .filter_map(|r| r.owner.section.as_deref());

        let sections: Vec<String> = match declared.get(year) {
            Some(list) if !list.is_empty() => {
                let mut unique = HashSet::new();
                if let Some(dup) = list.iter().find(|s| !unique.insert(s.as_str())) {
                    return Err(ModelError::contradiction(format!(
                        "section {dup:?} of {year} is declared twice"
                    )));
                }
                if let Some(unknown) = named.clone().find(|s| !unique.contains(s)) {
                    return Err(ModelError::contradiction(format!(
                        "section {unknown:?} of {year} is not declared"
                    )));
                }
                list.clone()
            }
            _ => {
                let mut derived: Vec<String> = Vec::new();
                for section in named {
                    if !derived.iter().any(|s| s == section) {
                        derived.push(section.to_string());
                    }
                }
                derived
            }
        };

        if sections.is_empty() {
            units.push(Owner::year(year));
        } else {
            units.extend(sections.into_iter().map(|s| Owner::section(year, s)));
        }
    }
    Ok(units)
}

fn build_candidates(
    rules: &ScheduleRules,
    records: &[CandidateRecord],
) -> Result<Vec<Candidate>, ModelError> {
    let mut seen = HashSet::new();
    let mut candidates = Vec::with_capacity(records.len());

    for rec in records {
        if !seen.insert((&rec.owner, rec.label.as_str())) {
            return Err(ModelError::DuplicateCandidate {
                owner: rec.owner.clone(),
                label: rec.label.clone(),
            });
        }
        let invalid = |reason: String| ModelError::InvalidCandidate {
            owner: rec.owner.clone(),
            label: rec.label.clone(),
            reason,
        };
        let required_count = u32::try_from(rec.required_count).map_err(|_| {
            invalid(format!(
                "required count {} is out of range",
                rec.required_count
            ))
        })?;
        if rec.daily_cap == Some(0) {
            return Err(invalid("daily cap override must be at least 1".into()));
        }

        candidates.push(Candidate {
            owner: rec.owner.clone(),
            label: rec.label.clone(),
            required_count,
            teacher: rec.teacher.clone(),
            group_size: rec.group_size,
            daily_cap: rec.daily_cap.unwrap_or(rules.daily_cap),
            needs_resource: rec.needs_resource,
        });
    }
    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SlotPredicate;

    fn rec(owner: Owner, label: &str, count: i64) -> CandidateRecord {
        CandidateRecord::new(owner, label, count)
    }

    #[test]
    fn test_single_year() {
        let input = ProblemInput::new(vec![
            rec(Owner::year("Y1"), "Lab", 6).with_teacher("T1"),
            rec(Owner::year("Y1"), "English", 5),
        ]);
        let problem = Problem::new(ScheduleRules::default(), input).unwrap();
        assert_eq!(problem.units(), &[Owner::year("Y1")]);
        assert_eq!(problem.unit_candidates(0), Some(&[0, 1][..]));
        assert_eq!(problem.teachers(), &[TeacherId::from("T1")]);
        assert_eq!(problem.teacher_of(0), Some(0));
        assert_eq!(problem.teacher_of(1), None);
        assert_eq!(problem.find_candidate(&Owner::year("Y1"), "English"), Some(1));
    }

    #[test]
    fn test_sections_from_candidates() {
        let input = ProblemInput::new(vec![
            rec(Owner::section("Y2", "A"), "DOS", 5),
            rec(Owner::section("Y2", "B"), "DOS", 5),
            rec(Owner::year("Y2"), "Tamil", 6),
        ]);
        let problem = Problem::new(ScheduleRules::default(), input).unwrap();
        assert_eq!(
            problem.units(),
            &[Owner::section("Y2", "A"), Owner::section("Y2", "B")]
        );
        // Year-wide Tamil spans both sections.
        assert_eq!(problem.candidate_units(2), Some(&[0, 1][..]));
        assert_eq!(problem.candidate_units(0), Some(&[0][..]));
    }

    #[test]
    fn test_declared_sections() {
        let input = ProblemInput::new(vec![rec(Owner::year("Y1"), "Maths", 5)])
            .with_sections("Y1", ["A", "B", "C"]);
        let problem = Problem::new(ScheduleRules::default(), input).unwrap();
        assert_eq!(problem.units().len(), 3);
        assert_eq!(problem.cell_count(), 90);
    }

    #[test]
    fn test_undeclared_section() {
        let input = ProblemInput::new(vec![rec(Owner::section("Y1", "Z"), "Maths", 5)])
            .with_sections("Y1", ["A"]);
        let err = Problem::new(ScheduleRules::default(), input).unwrap_err();
        assert!(matches!(err, ModelError::ConfigurationContradiction(_)));
    }

    #[test]
    fn test_no_candidates() {
        let err = Problem::new(ScheduleRules::default(), ProblemInput::default()).unwrap_err();
        assert!(matches!(err, ModelError::ConfigurationContradiction(_)));
    }

    #[test]
    fn test_invalid_rules() {
        let input = ProblemInput::new(vec![rec(Owner::year("Y1"), "Lab", 1)]);
        let err = Problem::new(ScheduleRules::default().with_grid(0, 5), input).unwrap_err();
        assert!(matches!(err, ModelError::ConfigurationContradiction(_)));
    }

    #[test]
    fn test_negative_count() {
        let input = ProblemInput::new(vec![rec(Owner::year("Y1"), "Lab", -1)]);
        let err = Problem::new(ScheduleRules::default(), input).unwrap_err();
        assert!(matches!(err, ModelError::InvalidCandidate { .. }));
    }

    #[test]
    fn test_count_exceeds_cells() {
        let input = ProblemInput::new(vec![rec(Owner::year("Y1"), "Lab", 31)]);
        let err = Problem::new(ScheduleRules::default(), input).unwrap_err();
        match err {
            ModelError::InvalidCandidate { label, reason, .. } => {
                assert_eq!(label, "Lab");
                assert!(reason.contains("31"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_forced_cells_reduce_availability() {
        let input = ProblemInput::new(vec![
            rec(Owner::year("Y3"), "Python", 29),
            rec(Owner::year("Y3"), "Free", 2).with_daily_cap(2),
        ])
        .with_forced_rule(ForcedRule::new(
            Owner::year("Y3"),
            SlotPredicate::days([1]).with_periods([4, 5]),
            "Free",
        ));
        let err = Problem::new(ScheduleRules::default(), input).unwrap_err();
        assert!(matches!(err, ModelError::InvalidCandidate { ref label, .. } if label == "Python"));
    }

    #[test]
    fn test_duplicate_candidate() {
        let input = ProblemInput::new(vec![
            rec(Owner::year("Y1"), "Lab", 1),
            rec(Owner::year("Y1"), "Lab", 2),
        ]);
        let err = Problem::new(ScheduleRules::default(), input).unwrap_err();
        assert_eq!(
            err,
            ModelError::DuplicateCandidate {
                owner: Owner::year("Y1"),
                label: "Lab".into()
            }
        );
    }

    #[test]
    fn test_same_label_different_owner() {
        let input = ProblemInput::new(vec![
            rec(Owner::year("Y1"), "English", 6),
            rec(Owner::year("Y2"), "English", 6),
        ]);
        assert!(Problem::new(ScheduleRules::default(), input).is_ok());
    }

    #[test]
    fn test_missing_sentinel() {
        let input = ProblemInput::new(vec![rec(Owner::year("Y3"), "Python", 5)]).with_forced_rule(
            ForcedRule::new(Owner::year("Y3"), SlotPredicate::days([1]), "Free"),
        );
        let err = Problem::new(ScheduleRules::default(), input).unwrap_err();
        assert_eq!(
            err,
            ModelError::NoForcedCandidate {
                owner: Owner::year("Y3"),
                label: "Free".into()
            }
        );
    }

    #[test]
    fn test_forced_cells_recorded() {
        let input = ProblemInput::new(vec![
            rec(Owner::year("Y3"), "Python", 5),
            rec(Owner::year("Y3"), "Free", 2).with_daily_cap(2),
        ])
        .with_forced_rule(ForcedRule::new(
            Owner::year("Y3"),
            SlotPredicate::days([1]).with_periods([4, 5]),
            "Free",
        ));
        let problem = Problem::new(ScheduleRules::default(), input).unwrap();
        assert_eq!(problem.forced_at(0, 0, 3), Some(1));
        assert_eq!(problem.forced_at(0, 0, 4), Some(1));
        assert_eq!(problem.forced_at(0, 0, 2), None);
        assert_eq!(problem.forced_at(0, 1, 3), None);
    }

    #[test]
    fn test_forced_above_required() {
        let input = ProblemInput::new(vec![rec(Owner::year("Y3"), "Free", 1).with_daily_cap(2)])
            .with_forced_rule(ForcedRule::new(
                Owner::year("Y3"),
                SlotPredicate::days([1]).with_periods([4, 5]),
                "Free",
            ));
        let err = Problem::new(ScheduleRules::default(), input).unwrap_err();
        assert!(matches!(err, ModelError::ConfigurationContradiction(_)));
    }

    #[test]
    fn test_forced_above_daily_cap() {
        let input = ProblemInput::new(vec![rec(Owner::year("Y3"), "Free", 2)]).with_forced_rule(
            ForcedRule::new(
                Owner::year("Y3"),
                SlotPredicate::days([1]).with_periods([4, 5]),
                "Free",
            ),
        );
        let err = Problem::new(ScheduleRules::default(), input).unwrap_err();
        assert!(matches!(err, ModelError::ConfigurationContradiction(_)));
    }

    #[test]
    fn test_conflicting_forced_rules() {
        let input = ProblemInput::new(vec![
            rec(Owner::year("Y1"), "Free", 1),
            rec(Owner::year("Y1"), "Library", 1),
        ])
        .with_forced_rule(ForcedRule::new(
            Owner::year("Y1"),
            SlotPredicate::days([2]).with_periods([1]),
            "Free",
        ))
        .with_forced_rule(ForcedRule::new(
            Owner::year("Y1"),
            SlotPredicate::days([2]).with_periods([1]),
            "Library",
        ));
        let err = Problem::new(ScheduleRules::default(), input).unwrap_err();
        assert!(matches!(err, ModelError::ConfigurationContradiction(_)));
    }

    #[test]
    fn test_forced_outside_grid() {
        let input = ProblemInput::new(vec![rec(Owner::year("Y1"), "Free", 1)]).with_forced_rule(
            ForcedRule::new(Owner::year("Y1"), SlotPredicate::days([7]), "Free"),
        );
        let err = Problem::new(ScheduleRules::default(), input).unwrap_err();
        assert!(matches!(err, ModelError::ConfigurationContradiction(_)));
    }

    #[test]
    fn test_forced_unknown_owner() {
        let input = ProblemInput::new(vec![rec(Owner::year("Y1"), "Free", 1)]).with_forced_rule(
            ForcedRule::new(Owner::year("Y9"), SlotPredicate::days([1]), "Free"),
        );
        let err = Problem::new(ScheduleRules::default(), input).unwrap_err();
        assert!(matches!(err, ModelError::ConfigurationContradiction(_)));
    }

    #[test]
    fn test_teacher_limit_below_forced() {
        let input = ProblemInput::new(vec![rec(Owner::year("Y1"), "Duty", 6).with_teacher("T1")])
            .with_forced_rule(ForcedRule::new(
                Owner::year("Y1"),
                SlotPredicate::any().with_periods([1]),
                "Duty",
            ));
        let rules = ScheduleRules::default().with_teacher_weekly_limit(Some(5));
        let err = Problem::new(rules, input).unwrap_err();
        assert!(matches!(err, ModelError::ConfigurationContradiction(_)));
    }

    #[test]
    fn test_forced_teacher_fatigue() {
        let input = ProblemInput::new(vec![rec(Owner::year("Y1"), "Duty", 3)
            .with_teacher("T1")
            .with_daily_cap(3)])
        .with_forced_rule(ForcedRule::new(
            Owner::year("Y1"),
            SlotPredicate::days([1]).with_periods([1, 2, 3]),
            "Duty",
        ));
        let err = Problem::new(ScheduleRules::default(), input).unwrap_err();
        assert!(matches!(err, ModelError::ConfigurationContradiction(_)));
    }

    #[test]
    fn test_forced_teacher_clash_across_sections() {
        let input = ProblemInput::new(vec![
            rec(Owner::section("Y1", "A"), "Duty", 1).with_teacher("T1"),
            rec(Owner::section("Y1", "B"), "Duty", 1).with_teacher("T1"),
        ])
        .with_forced_rule(ForcedRule::new(
            Owner::year("Y1"),
            SlotPredicate::days([1]).with_periods([1]),
            "Duty",
        ));
        let err = Problem::new(ScheduleRules::default(), input).unwrap_err();
        assert!(matches!(err, ModelError::ConfigurationContradiction(_)));
    }

    #[test]
    fn test_sentinel_prefers_own_section() {
        let input = ProblemInput::new(vec![
            rec(Owner::year("Y1"), "Free", 2),
            rec(Owner::section("Y1", "A"), "Free", 1),
            rec(Owner::section("Y1", "B"), "Maths", 1),
        ])
        .with_forced_rule(ForcedRule::new(
            Owner::year("Y1"),
            SlotPredicate::days([1]).with_periods([5]),
            "Free",
        ));
        let problem = Problem::new(ScheduleRules::default(), input).unwrap();
        // Section A uses its own Free; section B falls back to the year-wide one.
        assert_eq!(problem.forced_at(0, 0, 4), Some(1));
        assert_eq!(problem.forced_at(1, 0, 4), Some(0));
    }

    #[test]
    fn test_duplicate_resource() {
        let input = ProblemInput::new(vec![rec(Owner::year("Y1"), "Lab", 1)])
            .with_resources(vec![Resource::new("Lab1", 30), Resource::new("Lab1", 20)]);
        let err = Problem::new(ScheduleRules::lab(), input).unwrap_err();
        assert!(matches!(err, ModelError::ConfigurationContradiction(_)));
    }

    #[test]
    fn test_eligibility() {
        let input = ProblemInput::new(vec![
            rec(Owner::year("Y1"), "Big", 1).with_group_size(8),
            rec(Owner::year("Y1"), "Small", 1).with_group_size(4),
            rec(Owner::year("Y1"), "English", 1).without_resource(),
        ])
        .with_resources(vec![Resource::new("Lab1", 5)]);
        let problem = Problem::new(ScheduleRules::lab(), input).unwrap();
        assert!(!problem.is_eligible(0, 0));
        assert!(problem.is_eligible(1, 0));
        assert!(!problem.is_eligible(2, 0));
        assert!(problem.needs_resource(1));
        assert!(!problem.needs_resource(2));
    }

    #[test]
    fn test_needs_resource_without_resources() {
        let input = ProblemInput::new(vec![rec(Owner::year("Y1"), "Lab", 1)]);
        let problem = Problem::new(ScheduleRules::lab(), input).unwrap();
        assert!(!problem.needs_resource(0));
    }

    #[test]
    fn test_accessors_out_of_range() {
        let input = ProblemInput::new(vec![rec(Owner::year("Y1"), "Lab", 1).with_teacher("T1")])
            .with_resources(vec![Resource::new("Lab1", 30)]);
        let problem = Problem::new(ScheduleRules::lab(), input).unwrap();
        assert!(problem.candidate(0).is_some());
        assert!(problem.candidate(1).is_none());
        assert_eq!(problem.teacher_of(1), None);
        assert_eq!(problem.candidate_units(1), None);
        assert_eq!(problem.unit_candidates(1), None);
        assert!(!problem.is_eligible(1, 0));
        assert!(!problem.is_eligible(0, 1));
        assert_eq!(problem.forced_at(1, 0, 0), None);
        assert_eq!(problem.forced_at(0, 6, 0), None);
    }

    // ---- Aggregate demand ----

    #[test]
    fn test_section_overbooked() {
        let input = ProblemInput::new(vec![
            rec(Owner::section("Y1", "A"), "Maths", 16),
            rec(Owner::section("Y1", "A"), "Physics", 15),
            rec(Owner::section("Y1", "B"), "Maths", 5),
        ]);
        let rules = ScheduleRules::general().with_daily_cap(5);
        let err = Problem::new(rules, input).unwrap_err();
        match err {
            ModelError::ConfigurationContradiction(reason) => {
                assert!(reason.contains("Y1 A"), "{reason}");
                assert!(reason.contains("31"), "{reason}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_year_overbooked() {
        let input = ProblemInput::new(vec![
            rec(Owner::year("Y1"), "Maths", 16),
            rec(Owner::year("Y1"), "Physics", 15),
        ]);
        let rules = ScheduleRules::general().with_daily_cap(5);
        let err = Problem::new(rules, input).unwrap_err();
        assert!(matches!(err, ModelError::ConfigurationContradiction(ref r) if r.contains("31")));
    }

    #[test]
    fn test_year_wide_demand_spans_sections() {
        // 31 slots fit once the year has two sections.
        let input = ProblemInput::new(vec![
            rec(Owner::year("Y1"), "Maths", 16),
            rec(Owner::year("Y1"), "Physics", 15),
        ])
        .with_sections("Y1", ["A", "B"]);
        let rules = ScheduleRules::general().with_daily_cap(5);
        assert!(Problem::new(rules, input).is_ok());
    }

    #[test]
    fn test_full_grid_total_mismatch() {
        let subjects = ["DOS", "OS", "Maths", "Tamil", "English"];
        let records = subjects
            .iter()
            .enumerate()
            .map(|(i, s)| rec(Owner::year("1st Year"), s, 6).with_teacher(format!("T{i}")))
            .collect();
        let input = ProblemInput::new(records).with_sections("1st Year", ["A", "B"]);
        let err = Problem::new(ScheduleRules::department(), input).unwrap_err();
        match err {
            ModelError::ConfigurationContradiction(reason) => {
                assert!(reason.contains("30"), "{reason}");
                assert!(reason.contains("60"), "{reason}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_full_grid_exact_total() {
        let input = ProblemInput::new(vec![
            rec(Owner::section("Y1", "A"), "DOS", 2),
            rec(Owner::section("Y1", "B"), "DOS", 2),
            rec(Owner::year("Y1"), "Tamil", 8).with_daily_cap(4),
        ]);
        let rules = ScheduleRules::department().with_grid(2, 3);
        assert!(Problem::new(rules, input).is_ok());
    }

    #[test]
    fn test_teacher_over_weekly_limit() {
        let input = ProblemInput::new(vec![
            rec(Owner::year("Y1"), "DOS", 6).with_teacher("T1"),
            rec(Owner::year("Y2"), "OS", 6).with_teacher("T1"),
            rec(Owner::year("Y3"), "Networks", 6).with_teacher("T1"),
            rec(Owner::year("Y4"), "Seminar", 1).with_teacher("T1"),
        ]);
        let err = Problem::new(ScheduleRules::general(), input).unwrap_err();
        match err {
            ModelError::ConfigurationContradiction(reason) => {
                assert!(reason.contains("T1"), "{reason}");
                assert!(reason.contains("19"), "{reason}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_teacher_at_weekly_limit() {
        let input = ProblemInput::new(vec![
            rec(Owner::year("Y1"), "DOS", 6).with_teacher("T1"),
            rec(Owner::year("Y2"), "OS", 6).with_teacher("T1"),
            rec(Owner::year("Y3"), "Networks", 6).with_teacher("T1"),
        ]);
        assert!(Problem::new(ScheduleRules::general(), input).is_ok());
    }
}
