//! Constraint-based academic timetabling.
//!
//! Assigns activities (subjects taught to a year or section) to slots of a
//! days × periods grid, optionally bound to capacity-limited rooms, under
//! hard rules: required weekly counts, per-day caps, teacher clashes,
//! consecutive-period fatigue and weekly teacher limits.
//!
//! - **Model** ([`model`]): validated, immutable problem description with
//!   explicit [`ScheduleRules`](model::ScheduleRules) and forced-slot rules.
//! - **CP** ([`cp`]): deterministic translation into boolean variables and
//!   linear cardinality constraints.
//! - **Search** ([`search`]): propagation and depth-first branching over a
//!   shared frontier, on one thread or a rayon pool, with time and branch
//!   budgets.
//! - **Materialize** ([`materialize`]): per-owner and per-resource grids
//!   with the rendering sinks expect.
//! - **Gateway** ([`gateway`]): candidate source and schedule sink traits,
//!   in-memory implementations and the end-to-end
//!   [`Scheduler`](gateway::Scheduler).
//!
//! # Quick start
//!
//! ```
//! use u_timetable::cp::ConstraintBuilder;
//! use u_timetable::materialize::materialize;
//! use u_timetable::model::{CandidateRecord, Owner, Problem, ProblemInput, ScheduleRules};
//! use u_timetable::search::{SearchConfig, SearchRunner, SolveOutcome};
//!
//! let input = ProblemInput::new(vec![
//!     CandidateRecord::new(Owner::year("1st Year"), "C++ Lab", 6).with_teacher("Geetha"),
//! ]);
//! let problem = Problem::new(ScheduleRules::lab(), input).unwrap();
//! let set = ConstraintBuilder::new(&problem).build();
//! let report = SearchRunner::run(&set, &SearchConfig::default());
//!
//! if let SolveOutcome::Solved(assignment) = &report.outcome {
//!     let timetable = materialize(&problem, assignment);
//!     let grid = timetable.unit(&Owner::year("1st Year")).unwrap();
//!     assert_eq!(grid.rendered(1, 1).as_deref(), Some("C++ Lab (Geetha)"));
//! }
//! ```
//!
//! # Features
//!
//! - `parallel` (default): multi-worker search on a rayon thread pool
//! - `serde`: serialization of input and output types

pub mod cp;
pub mod gateway;
pub mod materialize;
pub mod model;
pub mod search;
