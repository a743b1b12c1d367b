//! Backtracking search over a [`ConstraintSet`](crate::cp::ConstraintSet).
//!
//! Cardinality propagation plus depth-first branching, run by one or more
//! workers that share a frontier of open branches.
//!
//! # Key Components
//!
//! - [`SearchConfig`]: workers, budgets, seed, partial acceptance
//! - [`SearchRunner`]: executes the search
//! - [`SolveReport`]: [`SolveOutcome`] plus [`SearchStats`]
//! - [`Assignment`]: sorted [`Placement`]s of a solved or partial search
//!
//! # Outcomes
//!
//! Search never fails. It ends `Solved` with the first solution in
//! depth-first order, `Infeasible` once the whole tree is refuted, or
//! `Exhausted` with the deepest partial assignment when a time limit,
//! branch budget or cancellation stops it first.

mod config;
mod frontier;
mod outcome;
mod runner;
mod state;

pub use config::SearchConfig;
pub use outcome::{Assignment, Placement, SearchStats, SolveOutcome, SolveReport};
pub use runner::SearchRunner;
