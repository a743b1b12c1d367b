//! In-memory gateways.

use std::collections::BTreeMap;

use super::{CandidateSource, GatewayError, ScheduleSink, Scope};
use crate::materialize::{Grid, GridKey};
use crate::model::{CandidateRecord, ForcedRule, Resource};

/// A source backed by vectors, filtered by scope on fetch.
///
/// # Examples
///
/// ```
/// use u_timetable::gateway::{CandidateSource, MemorySource, Scope};
/// use u_timetable::model::{CandidateRecord, Owner};
///
/// let source = MemorySource::new()
///     .with_candidate(CandidateRecord::new(Owner::year("1st Year"), "C++", 5))
///     .with_candidate(CandidateRecord::new(Owner::year("2nd Year"), "Java", 5));
/// let scope = Scope::new("CS").with_years(["2nd Year"]);
/// assert_eq!(source.fetch_candidates(&scope).unwrap().len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    pub candidates: Vec<CandidateRecord>,
    pub resources: Vec<Resource>,
    pub forced_rules: Vec<ForcedRule>,
    pub sections: BTreeMap<String, Vec<String>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_candidate(mut self, record: CandidateRecord) -> Self {
        self.candidates.push(record);
        self
    }

    pub fn with_resource(mut self, resource: Resource) -> Self {
        self.resources.push(resource);
        self
    }

    pub fn with_forced_rule(mut self, rule: ForcedRule) -> Self {
        self.forced_rules.push(rule);
        self
    }

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

impl CandidateSource for MemorySource {
    fn fetch_candidates(&self, scope: &Scope) -> Result<Vec<CandidateRecord>, GatewayError> {
        Ok(self
            .candidates
            .iter()
            .filter(|c| scope.includes(&c.owner.year))
            .cloned()
            .collect())
    }

    fn fetch_resources(&self) -> Result<Vec<Resource>, GatewayError> {
        Ok(self.resources.clone())
    }

    fn fetch_forced_rules(&self, scope: &Scope) -> Result<Vec<ForcedRule>, GatewayError> {
        Ok(self
            .forced_rules
            .iter()
            .filter(|r| scope.includes(&r.owner.year))
            .cloned()
            .collect())
    }

    fn fetch_sections(&self, scope: &Scope) -> Result<BTreeMap<String, Vec<String>>, GatewayError> {
        Ok(self
            .sections
            .iter()
            .filter(|(year, _)| scope.includes(year))
            .map(|(year, sections)| (year.clone(), sections.clone()))
            .collect())
    }
}

/// A sink that keeps every written grid, in write order.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    written: Vec<Grid>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grids in the order they were written.
    pub fn grids(&self) -> &[Grid] {
        &self.written
    }

    pub fn get(&self, key: &GridKey) -> Option<&Grid> {
        self.written.iter().find(|g| g.key() == key)
    }
}

impl ScheduleSink for MemorySink {
    fn write_schedule(&mut self, key: &GridKey, grid: &Grid) -> Result<(), GatewayError> {
        if self.get(key).is_some() {
            return Err(format!("schedule for {key} already written").into());
        }
        self.written.push(grid.clone());
        Ok(())
    }
}
