//! Domain model for academic timetabling.
//!
//! # Key Components
//!
//! - **Entities**: [`Owner`], [`CandidateRecord`], [`Candidate`], [`Resource`]
//! - **Forced slots**: [`ForcedRule`] with a [`SlotPredicate`]
//! - **Rules**: [`ScheduleRules`] grid shape and hard limits, with presets
//! - **Problem**: [`Problem`] validated, immutable input to the builder
//!
//! All structural validation happens in [`Problem::new`], which returns a
//! [`ModelError`] describing the first violation found.

mod error;
mod forced;
mod problem;
mod rules;
mod types;

pub use error::ModelError;
pub use forced::{ForcedRule, Selector, SlotPredicate};
pub use problem::{Problem, ProblemInput};
pub use rules::{FatigueRule, ScheduleRules};
pub use types::{
    Candidate, CandidateId, CandidateRecord, Owner, Resource, ResourceId, Slot, TeacherId, UnitId,
};
