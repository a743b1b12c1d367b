//! Boundaries to the systems that supply candidates and store timetables.
//!
//! The solver never talks to storage itself. A [`CandidateSource`] is read
//! once before the solve and a [`ScheduleSink`] written once per grid after
//! it, both by the [`Scheduler`] pipeline on the caller's thread.

mod memory;
mod pipeline;

pub use memory::{MemorySink, MemorySource};
pub use pipeline::{PipelineError, ScheduleRun, Scheduler};

use std::collections::BTreeMap;

use crate::materialize::{Grid, GridKey};
use crate::model::{CandidateRecord, ForcedRule, Resource};

/// Error type of gateway implementations.
pub type GatewayError = Box<dyn std::error::Error + Send + Sync>;

/// Selects which years one solve covers, e.g. a department.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Scope {
    /// Name of the scope, used in logs.
    pub name: String,
    /// Years in the scope. Empty selects every year the source knows.
    pub years: Vec<String>,
}

impl Scope {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            years: Vec::new(),
        }
    }

    /// Restricts the scope to the given years.
    pub fn with_years<I, S>(mut self, years: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.years = years.into_iter().map(Into::into).collect();
        self
    }

    /// Whether `year` is in the scope.
    pub fn includes(&self, year: &str) -> bool {
        self.years.is_empty() || self.years.iter().any(|y| y == year)
    }
}

/// Supplies the entities of one solve.
pub trait CandidateSource {
    /// Candidate rows of every owner in the scope.
    fn fetch_candidates(&self, scope: &Scope) -> Result<Vec<CandidateRecord>, GatewayError>;

    /// Shared resources. Empty when cells are not bound to rooms.
    fn fetch_resources(&self) -> Result<Vec<Resource>, GatewayError>;

    /// Forced-slot rules for owners in the scope.
    fn fetch_forced_rules(&self, scope: &Scope) -> Result<Vec<ForcedRule>, GatewayError>;

    /// Declared sections per year. The default declares none, so sections
    /// come from the candidates.
    fn fetch_sections(
        &self,
        _scope: &Scope,
    ) -> Result<BTreeMap<String, Vec<String>>, GatewayError> {
        Ok(BTreeMap::new())
    }
}

/// Receives finished grids.
pub trait ScheduleSink {
    /// Stores one grid. Called once per key, in timetable order.
    fn write_schedule(&mut self, key: &GridKey, grid: &Grid) -> Result<(), GatewayError>;
}
