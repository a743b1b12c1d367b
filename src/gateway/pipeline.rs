//! Fetch → validate → build → search → materialize → write.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use log::{info, warn};
use thiserror::Error;

use super::{CandidateSource, GatewayError, ScheduleSink, Scope};
use crate::cp::ConstraintBuilder;
use crate::materialize::{materialize, Timetable};
use crate::model::{ModelError, Problem, ProblemInput, ScheduleRules};
use crate::search::{SearchConfig, SearchRunner, SolveOutcome, SolveReport};

/// Failure of a [`Scheduler::run`].
///
/// Infeasibility is not an error: it is reported in the returned
/// [`SolveReport`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The candidate source failed.
    #[error("candidate source failed: {0}")]
    Source(GatewayError),

    /// The fetched input or the configuration is unusable.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// The schedule sink failed.
    #[error("schedule sink failed: {0}")]
    Sink(GatewayError),
}

/// A validated problem together with its search report.
#[derive(Debug, Clone)]
pub struct ScheduleRun {
    pub problem: Problem,
    pub report: SolveReport,
}

impl ScheduleRun {
    /// Grids of the solved or partial assignment. `None` when infeasible.
    pub fn timetable(&self) -> Option<Timetable> {
        self.report
            .outcome
            .assignment()
            .map(|a| materialize(&self.problem, a))
    }
}

/// End-to-end timetabling pipeline.
///
/// # Examples
///
/// ```
/// use u_timetable::gateway::{MemorySink, MemorySource, Scheduler, Scope};
/// use u_timetable::model::{CandidateRecord, Owner, ScheduleRules};
/// use u_timetable::search::SearchConfig;
///
/// let source = MemorySource::new()
///     .with_candidate(CandidateRecord::new(Owner::year("1st Year"), "C++", 5).with_teacher("Geetha"))
///     .with_candidate(CandidateRecord::new(Owner::year("1st Year"), "English", 5));
/// let mut sink = MemorySink::new();
///
/// let scheduler = Scheduler::new(ScheduleRules::general(), SearchConfig::default());
/// let report = scheduler.run(&source, &Scope::new("CS"), &mut sink).unwrap();
/// assert!(report.outcome.is_solved());
/// assert_eq!(sink.grids().len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Scheduler {
    rules: ScheduleRules,
    search: SearchConfig,
    cancel: Option<Arc<AtomicBool>>,
}

impl Scheduler {
    pub fn new(rules: ScheduleRules, search: SearchConfig) -> Self {
        Self {
            rules,
            search,
            cancel: None,
        }
    }

    /// Attaches a cancellation flag checked by the search workers.
    pub fn with_cancel(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn rules(&self) -> &ScheduleRules {
        &self.rules
    }

    pub fn search_config(&self) -> &SearchConfig {
        &self.search
    }

    /// Validates `input`, builds the constraint set and searches.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError`] if the input or the search configuration is
    /// invalid. Search itself never fails.
    pub fn solve(&self, input: ProblemInput) -> Result<ScheduleRun, ModelError> {
        self.search
            .validate()
            .map_err(ModelError::ConfigurationContradiction)?;
        let problem = Problem::new(self.rules.clone(), input)?;
        let set = ConstraintBuilder::new(&problem).build();
        let report = SearchRunner::run_with_cancel(&set, &self.search, self.cancel.clone());
        Ok(ScheduleRun { problem, report })
    }

    /// Fetches the scope from `source`, solves it and writes every grid to
    /// `sink`.
    ///
    /// Grids are written after `Solved`, and after `Exhausted` when the
    /// search config accepts partial timetables. Nothing is written
    /// otherwise.
    pub fn run<S, K>(
        &self,
        source: &S,
        scope: &Scope,
        sink: &mut K,
    ) -> Result<SolveReport, PipelineError>
    where
        S: CandidateSource + ?Sized,
        K: ScheduleSink + ?Sized,
    {
        let input = ProblemInput {
            candidates: source
                .fetch_candidates(scope)
                .map_err(PipelineError::Source)?,
            resources: source.fetch_resources().map_err(PipelineError::Source)?,
            forced_rules: source
                .fetch_forced_rules(scope)
                .map_err(PipelineError::Source)?,
            sections: source.fetch_sections(scope).map_err(PipelineError::Source)?,
        };
        info!(
            "Fetched scope {:?}: {} candidates, {} resources, {} forced rules",
            scope.name,
            input.candidates.len(),
            input.resources.len(),
            input.forced_rules.len()
        );

        let run = self.solve(input)?;
        let write = match &run.report.outcome {
            SolveOutcome::Solved(_) => true,
            SolveOutcome::Exhausted(_) if self.search.accept_partial => {
                warn!("Writing partial timetable for scope {:?}", scope.name);
                true
            }
            SolveOutcome::Exhausted(_) => {
                warn!("Search budget exhausted for scope {:?}, nothing written", scope.name);
                false
            }
            SolveOutcome::Infeasible => {
                warn!("Scope {:?} is infeasible, nothing written", scope.name);
                false
            }
        };

        if write {
            if let Some(timetable) = run.timetable() {
                for grid in timetable.iter() {
                    sink.write_schedule(grid.key(), grid)
                        .map_err(PipelineError::Sink)?;
                }
                info!("Wrote {} grids for scope {:?}", timetable.len(), scope.name);
            }
        }

        Ok(run.report)
    }
}
