//! Constraint Programming (CP) layer.
//!
//! Translates a validated [`Problem`](crate::model::Problem) into a boolean
//! model with linear cardinality constraints.
//!
//! # Key Components
//!
//! - **Variables**: [`BoolVar`] one per (cell, candidate[, resource]) pair,
//!   [`CellVar`] integer view of a cell with an empty sentinel
//! - **Constraints**: [`Constraint`] `Σ vars (= | ≤) rhs`, tagged with a
//!   [`ConstraintKind`]
//! - **Model**: [`ConstraintSet`] container shared read-only by the search
//! - **Builder**: [`ConstraintBuilder`] deterministic problem translation
//!
//! # Design
//!
//! This module defines the model only. Propagation and branching live in
//! [`search`](crate::search).

mod builder;
mod model;
mod variables;

pub use builder::ConstraintBuilder;
pub use model::{Constraint, ConstraintKind, ConstraintSet, Relation};
pub use variables::{BoolVar, CellVar, VarId};
