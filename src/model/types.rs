//! Value types of the timetabling domain.

use std::fmt;

/// Index of a candidate within a [`Problem`](super::Problem).
pub type CandidateId = usize;

/// Index of a scheduling unit (an owner that holds grid cells).
pub type UnitId = usize;

/// Index of a resource within a [`Problem`](super::Problem).
pub type ResourceId = usize;

/// Identifier of a teacher.
///
/// Two candidates taught by equal `TeacherId`s share every teacher
/// constraint (clash, fatigue, weekly limit), across all owners.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TeacherId(pub String);

impl TeacherId {
    /// Creates a teacher id.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The teacher's name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TeacherId {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl fmt::Display for TeacherId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The group an activity belongs to: a year, optionally narrowed to a section.
///
/// An owner without a section, in a year that has sections, is *year-wide*:
/// it covers every section of that year.
///
/// # Examples
///
/// ```
/// use u_timetable::model::Owner;
///
/// let year = Owner::year("2nd Year");
/// let sec_a = Owner::section("2nd Year", "A");
/// assert!(year.covers(&sec_a));
/// assert!(!sec_a.covers(&Owner::section("2nd Year", "B")));
/// assert_eq!(sec_a.to_string(), "2nd Year A");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Owner {
    /// Year name, e.g. `"1st Year"`.
    pub year: String,
    /// Section within the year, if any.
    pub section: Option<String>,
}

impl Owner {
    /// An owner covering a whole year.
    pub fn year(year: impl Into<String>) -> Self {
        Self {
            year: year.into(),
            section: None,
        }
    }

    /// An owner for one section of a year.
    pub fn section(year: impl Into<String>, section: impl Into<String>) -> Self {
        Self {
            year: year.into(),
            section: Some(section.into()),
        }
    }

    /// Whether this owner includes `unit`.
    ///
    /// A year-wide owner covers every unit of the year; a sectioned owner
    /// covers only itself.
    pub fn covers(&self, unit: &Owner) -> bool {
        self.year == unit.year && (self.section.is_none() || self.section == unit.section)
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.section {
            Some(section) => write!(f, "{} {}", self.year, section),
            None => f.write_str(&self.year),
        }
    }
}

/// A candidate row as supplied by a source, before validation.
///
/// `required_count` is signed so that malformed upstream data can be
/// rejected at construction instead of wrapping silently.
///
/// # Examples
///
/// ```
/// use u_timetable::model::{CandidateRecord, Owner};
///
/// let lab = CandidateRecord::new(Owner::year("1st Year"), "C++ Lab", 6)
///     .with_teacher("Geetha")
///     .with_group_size(30);
/// assert_eq!(lab.required_count, 6);
/// assert_eq!(lab.teacher.as_ref().map(|t| t.as_str()), Some("Geetha"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CandidateRecord {
    /// Owning year/section.
    pub owner: Owner,
    /// Subject label, unique per owner.
    pub label: String,
    /// Number of occurrences required across the week.
    pub required_count: i64,
    /// Teacher, if the activity has one.
    pub teacher: Option<TeacherId>,
    /// Seats needed on a resource.
    pub group_size: Option<u32>,
    /// Per-day cap overriding the rule-wide one.
    pub daily_cap: Option<u32>,
    /// Whether placements occupy a resource when the problem has any.
    #[cfg_attr(feature = "serde", serde(default = "default_needs_resource"))]
    pub needs_resource: bool,
}

#[cfg(feature = "serde")]
fn default_needs_resource() -> bool {
    true
}

impl CandidateRecord {
    /// Creates a record without teacher, group size or cap override.
    pub fn new(owner: Owner, label: impl Into<String>, required_count: i64) -> Self {
        Self {
            owner,
            label: label.into(),
            required_count,
            teacher: None,
            group_size: None,
            daily_cap: None,
            needs_resource: true,
        }
    }

    /// Sets the teacher.
    pub fn with_teacher(mut self, teacher: impl Into<String>) -> Self {
        self.teacher = Some(TeacherId::new(teacher));
        self
    }

    /// Sets the number of seats the activity occupies on a resource.
    pub fn with_group_size(mut self, seats: u32) -> Self {
        self.group_size = Some(seats);
        self
    }

    /// Overrides the per-day cap for this candidate.
    pub fn with_daily_cap(mut self, cap: u32) -> Self {
        self.daily_cap = Some(cap);
        self
    }

    /// Places the candidate in plain unit cells even when the problem has
    /// resources, e.g. a lecture scheduled alongside labs.
    pub fn without_resource(mut self) -> Self {
        self.needs_resource = false;
        self
    }
}

/// A validated, schedulable activity.
///
/// Only constructed by [`Problem::new`](super::Problem::new); fields are
/// read through accessors so a built problem cannot be altered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub(crate) owner: Owner,
    pub(crate) label: String,
    pub(crate) required_count: u32,
    pub(crate) teacher: Option<TeacherId>,
    pub(crate) group_size: Option<u32>,
    pub(crate) daily_cap: u32,
    pub(crate) needs_resource: bool,
}

impl Candidate {
    pub fn owner(&self) -> &Owner {
        &self.owner
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn required_count(&self) -> u32 {
        self.required_count
    }

    pub fn teacher(&self) -> Option<&TeacherId> {
        self.teacher.as_ref()
    }

    pub fn group_size(&self) -> Option<u32> {
        self.group_size
    }

    /// Effective per-day cap (override or rule default).
    pub fn daily_cap(&self) -> u32 {
        self.daily_cap
    }

    /// Whether the candidate asked for a resource.
    pub fn needs_resource(&self) -> bool {
        self.needs_resource
    }
}

/// A shared, capacity-limited room such as a lab.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Resource {
    /// Resource name, unique within a problem.
    pub id: String,
    /// Number of seats.
    pub capacity: u32,
}

impl Resource {
    /// Creates a resource.
    pub fn new(id: impl Into<String>, capacity: u32) -> Self {
        Self {
            id: id.into(),
            capacity,
        }
    }

    /// Whether a group of `group_size` seats fits. Groups of unknown size
    /// fit everywhere.
    pub fn admits(&self, group_size: Option<u32>) -> bool {
        group_size.map_or(true, |seats| seats <= self.capacity)
    }
}

/// One grid coordinate. Days and periods are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Slot {
    pub unit: UnitId,
    pub day: u32,
    pub period: u32,
    pub resource: Option<ResourceId>,
}
