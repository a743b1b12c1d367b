//! Conversion of an [`Assignment`] into per-owner and per-resource grids.

use std::fmt;

use crate::model::{Owner, Problem, TeacherId};
use crate::search::Assignment;

/// Which grid a [`Grid`] is: one unit's timetable or one resource's.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GridKey {
    Unit(Owner),
    Resource(String),
}

impl fmt::Display for GridKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridKey::Unit(owner) => write!(f, "{owner}"),
            GridKey::Resource(id) => f.write_str(id),
        }
    }
}

/// Contents of one grid cell.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GridCell {
    Empty,
    Filled {
        label: String,
        teacher: Option<TeacherId>,
        /// Owner of the candidate (the year for year-wide candidates).
        owner: Owner,
        /// Resource name, if the placement uses one.
        resource: Option<String>,
    },
}

impl GridCell {
    pub fn is_empty(&self) -> bool {
        matches!(self, GridCell::Empty)
    }

    pub fn label(&self) -> Option<&str> {
        match self {
            GridCell::Empty => None,
            GridCell::Filled { label, .. } => Some(label),
        }
    }
}

/// A days × periods grid.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Grid {
    key: GridKey,
    days: u32,
    periods: u32,
    cells: Vec<GridCell>,
}

impl Grid {
    fn new(key: GridKey, days: u32, periods: u32) -> Self {
        Self {
            key,
            days,
            periods,
            cells: vec![GridCell::Empty; days as usize * periods as usize],
        }
    }

    pub fn key(&self) -> &GridKey {
        &self.key
    }

    pub fn days(&self) -> u32 {
        self.days
    }

    pub fn periods(&self) -> u32 {
        self.periods
    }

    fn index(&self, day: u32, period: u32) -> Option<usize> {
        let valid = (1..=self.days).contains(&day) && (1..=self.periods).contains(&period);
        valid.then(|| (day - 1) as usize * self.periods as usize + (period - 1) as usize)
    }

    /// Cell at a 1-based day and period.
    pub fn get(&self, day: u32, period: u32) -> Option<&GridCell> {
        self.index(day, period).map(|i| &self.cells[i])
    }

    /// Text of a cell as written to schedule sinks.
    ///
    /// Unit grids show `"label (teacher)"`, `"label"` or `"Empty"`. Resource
    /// grids prefix the owner: `"1st Year A_C++ (Geetha)"`.
    pub fn rendered(&self, day: u32, period: u32) -> Option<String> {
        let cell = self.get(day, period)?;
        let GridCell::Filled {
            label,
            teacher,
            owner,
            ..
        } = cell
        else {
            return Some("Empty".to_string());
        };
        let subject = match &self.key {
            GridKey::Unit(_) => label.clone(),
            GridKey::Resource(_) => format!("{owner}_{label}"),
        };
        Some(match teacher {
            Some(t) => format!("{subject} ({t})"),
            None => subject,
        })
    }

    /// Rendered rows, one per day.
    pub fn rows(&self) -> Vec<Vec<String>> {
        (1..=self.days)
            .map(|d| {
                (1..=self.periods)
                    .filter_map(|p| self.rendered(d, p))
                    .collect()
            })
            .collect()
    }

    /// Number of filled cells.
    pub fn filled(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_empty()).count()
    }
}

/// Every grid of one solve: units first, then resources.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Timetable {
    grids: Vec<Grid>,
}

impl Timetable {
    pub fn get(&self, key: &GridKey) -> Option<&Grid> {
        self.grids.iter().find(|g| &g.key == key)
    }

    /// Grid of one unit.
    pub fn unit(&self, owner: &Owner) -> Option<&Grid> {
        self.get(&GridKey::Unit(owner.clone()))
    }

    /// Grid of one resource.
    pub fn resource(&self, id: &str) -> Option<&Grid> {
        self.get(&GridKey::Resource(id.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Grid> {
        self.grids.iter()
    }

    pub fn len(&self) -> usize {
        self.grids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grids.is_empty()
    }
}

/// Builds the grids of `problem` from `assignment`.
///
/// Slots without a placement stay Empty, so partial assignments
/// materialize too.
pub fn materialize(problem: &Problem, assignment: &Assignment) -> Timetable {
    let rules = problem.rules();
    let (days, periods) = (rules.days, rules.periods);

    let mut units: Vec<Grid> = problem
        .units()
        .iter()
        .map(|u| Grid::new(GridKey::Unit(u.clone()), days, periods))
        .collect();
    let mut resources: Vec<Grid> = problem
        .resources()
        .iter()
        .map(|r| Grid::new(GridKey::Resource(r.id.clone()), days, periods))
        .collect();

    for placement in assignment.placements() {
        let Some(candidate) = problem.candidate(placement.candidate) else {
            continue;
        };
        let resource = placement.resource.and_then(|r| problem.resources().get(r));
        let cell = GridCell::Filled {
            label: candidate.label().to_string(),
            teacher: candidate.teacher().cloned(),
            owner: candidate.owner().clone(),
            resource: resource.map(|r| r.id.clone()),
        };

        if let Some(grid) = placement.resource.and_then(|r| resources.get_mut(r)) {
            if let Some(i) = grid.index(placement.day, placement.period) {
                grid.cells[i] = cell.clone();
            }
        }
        if let Some(grid) = units.get_mut(placement.unit) {
            if let Some(i) = grid.index(placement.day, placement.period) {
                grid.cells[i] = cell;
            }
        }
    }

    units.extend(resources);
    Timetable { grids: units }
}
