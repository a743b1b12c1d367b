//! Backtracking search execution.
//!
//! [`SearchRunner`] explores the assignment space of a [`ConstraintSet`]:
//! propagate → pick the tightest required count → branch assign / forbid →
//! repeat, with open branches shared between workers through a frontier.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

#[cfg(feature = "parallel")]
use log::warn;
use log::{debug, info, trace};

use super::config::SearchConfig;
use super::frontier::{Branch, Frontier};
use super::outcome::{Assignment, SearchStats, SolveOutcome, SolveReport};
use super::state::{SearchState, ValueOrder};
use crate::cp::{ConstraintSet, VarId};

/// Executes the search.
///
/// The reported solution is the first one in depth-first order (assign
/// before forbid), whatever the worker count, unless a budget stops the
/// search before that order is settled.
///
/// # Usage
///
/// ```
/// use u_timetable::cp::ConstraintBuilder;
/// use u_timetable::model::{CandidateRecord, Owner, Problem, ProblemInput, ScheduleRules};
/// use u_timetable::search::{SearchConfig, SearchRunner, SolveOutcome};
///
/// let input = ProblemInput::new(vec![
///     CandidateRecord::new(Owner::year("Y1"), "Lab", 6).with_teacher("T1"),
/// ]);
/// let problem = Problem::new(ScheduleRules::lab(), input).unwrap();
/// let set = ConstraintBuilder::new(&problem).build();
/// let report = SearchRunner::run(&set, &SearchConfig::default());
/// match report.outcome {
///     SolveOutcome::Solved(assignment) => assert_eq!(assignment.len(), 6),
///     other => panic!("unexpected outcome: {other:?}"),
/// }
/// ```
pub struct SearchRunner;

impl SearchRunner {
    /// Runs the search.
    ///
    /// A worker count of 0 is treated as 1; call [`SearchConfig::validate`]
    /// first to reject it instead.
    pub fn run(set: &ConstraintSet, config: &SearchConfig) -> SolveReport {
        Self::run_with_cancel(set, config, None)
    }

    /// Runs the search with an optional cancellation token.
    ///
    /// If `cancel` is `Some` and the flag is set to `true`, workers stop at
    /// their next node and the result is reported as if a budget ran out.
    pub fn run_with_cancel(
        set: &ConstraintSet,
        config: &SearchConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> SolveReport {
        let started = Instant::now();
        let workers = config.workers.max(1);

        let root = match set.overcommitted() {
            Some(index) => {
                let bound = set.constraint(index);
                info!(
                    "Required counts overfill {} bound {index} (at most {}): infeasible",
                    bound.kind, bound.rhs
                );
                None
            }
            None => {
                let root = SearchState::initial(set);
                if root.is_none() {
                    info!("Root propagation failed: infeasible");
                }
                root
            }
        };
        let Some(root) = root else {
            return SolveReport {
                outcome: SolveOutcome::Infeasible,
                stats: SearchStats {
                    conflicts: 1,
                    workers,
                    elapsed_ms: started.elapsed().as_millis() as u64,
                    ..SearchStats::default()
                },
            };
        };

        let track_partial = config.has_budget() || cancel.is_some();
        let partial = track_partial.then(|| Found {
            path: Vec::new(),
            trues: root.trues(),
            placed: root.placed(),
        });

        let search = Search {
            set,
            order: ValueOrder::new(set, config.seed),
            partial_depth: AtomicUsize::new(root.placed()),
            frontier: Frontier::new(Branch::root(root)),
            best: Mutex::new(None),
            has_solution: AtomicBool::new(false),
            partial: Mutex::new(partial),
            track_partial,
            deadline: config
                .time_limit_ms
                .map(|ms| started + Duration::from_millis(ms)),
            max_branches: config.max_branches,
            cancel,
            stop: AtomicBool::new(false),
            exhausted: AtomicBool::new(false),
            branches: AtomicU64::new(0),
            conflicts: AtomicU64::new(0),
            solutions: AtomicU64::new(0),
        };

        debug!(
            "Starting search: {} variables, {} constraints, {} workers",
            set.var_count(),
            set.constraint_count(),
            workers
        );
        let used = search.launch(workers);
        search.finish(started, used)
    }
}

/// A recorded assignment with the path that reached it.
struct Found {
    path: Vec<u8>,
    trues: Vec<VarId>,
    placed: usize,
}

/// State shared by all workers of one search.
struct Search<'a> {
    set: &'a ConstraintSet,
    order: ValueOrder,
    frontier: Frontier,
    best: Mutex<Option<Found>>,
    has_solution: AtomicBool,
    partial: Mutex<Option<Found>>,
    partial_depth: AtomicUsize,
    track_partial: bool,
    deadline: Option<Instant>,
    max_branches: Option<u64>,
    cancel: Option<Arc<AtomicBool>>,
    stop: AtomicBool,
    exhausted: AtomicBool,
    branches: AtomicU64,
    conflicts: AtomicU64,
    solutions: AtomicU64,
}

impl Search<'_> {
    /// Runs the workers and returns how many took part.
    #[cfg(feature = "parallel")]
    fn launch(&self, workers: usize) -> usize {
        if workers == 1 {
            self.work(0);
            return 1;
        }
        match rayon::ThreadPoolBuilder::new().num_threads(workers).build() {
            Ok(pool) => {
                pool.scope(|scope| {
                    for id in 0..workers {
                        scope.spawn(move |_| self.work(id));
                    }
                });
                workers
            }
            Err(err) => {
                warn!("Failed to build worker pool ({err}), searching on the calling thread");
                self.work(0);
                1
            }
        }
    }

    #[cfg(not(feature = "parallel"))]
    fn launch(&self, workers: usize) -> usize {
        if workers > 1 {
            debug!("Parallel feature disabled, running {workers} requested workers as one");
        }
        self.work(0);
        1
    }

    fn work(&self, id: usize) {
        debug!("Worker {id} started");
        let mut taken = 0usize;
        while let Some(branch) = self.frontier.next() {
            taken += 1;
            let mut stack = VecDeque::from([branch]);
            while let Some(node) = stack.pop_back() {
                if self.should_stop() {
                    self.frontier.close();
                    break;
                }
                if self.is_dominated(&node.path) {
                    trace!("Worker {id} pruned branch at depth {}", node.path.len());
                    continue;
                }
                self.expand(node, &mut stack);
                if stack.len() > 1 && self.frontier.is_hungry() {
                    if let Some(oldest) = stack.pop_front() {
                        self.frontier.push(oldest);
                    }
                }
            }
            self.frontier.done();
        }
        debug!("Worker {id} finished after {taken} frontier branches");
    }

    fn should_stop(&self) -> bool {
        if self.stop.load(Ordering::Relaxed) {
            return true;
        }
        let cancelled = self
            .cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed));
        let timed_out = self.deadline.is_some_and(|d| Instant::now() >= d);
        let over_budget = self
            .max_branches
            .is_some_and(|max| self.branches.load(Ordering::Relaxed) >= max);

        if cancelled || timed_out || over_budget {
            if !self.exhausted.swap(true, Ordering::SeqCst) {
                debug!(
                    "Search stopped early (cancelled: {cancelled}, timed out: {timed_out}, branch budget: {over_budget})"
                );
            }
            self.stop.store(true, Ordering::SeqCst);
            return true;
        }
        false
    }

    /// Whether every completion of `path` sorts after the best solution.
    fn is_dominated(&self, path: &[u8]) -> bool {
        if !self.has_solution.load(Ordering::Acquire) {
            return false;
        }
        let best = self.best.lock().unwrap_or_else(PoisonError::into_inner);
        best.as_ref().is_some_and(|b| path > b.path.as_slice())
    }

    fn expand(&self, node: Branch, stack: &mut VecDeque<Branch>) {
        self.branches.fetch_add(1, Ordering::Relaxed);
        let Branch {
            path,
            mut state,
            decision,
        } = node;

        if let Some((var, value)) = decision {
            if !state.assign(self.set, var, value) {
                self.conflicts.fetch_add(1, Ordering::Relaxed);
                return;
            }
        }

        if self.track_partial {
            self.offer_partial(&path, &state);
        }

        match state.choose(self.set, &self.order) {
            None => self.offer_solution(path, &state),
            Some(var) => {
                let (assign, forbid) = Branch::split(&path, state, var);
                stack.push_back(forbid);
                stack.push_back(assign);
            }
        }
    }

    fn offer_solution(&self, path: Vec<u8>, state: &SearchState) {
        self.solutions.fetch_add(1, Ordering::Relaxed);
        let mut best = self.best.lock().unwrap_or_else(PoisonError::into_inner);
        if best.as_ref().map_or(true, |b| path < b.path) {
            trace!("New best solution at depth {}", path.len());
            *best = Some(Found {
                trues: state.trues(),
                placed: state.placed(),
                path,
            });
        }
        self.has_solution.store(true, Ordering::Release);
    }

    /// Keeps the deepest partial assignment: most placements, then smallest path.
    fn offer_partial(&self, path: &[u8], state: &SearchState) {
        let placed = state.placed();
        if placed < self.partial_depth.load(Ordering::Relaxed) {
            return;
        }
        let mut partial = self.partial.lock().unwrap_or_else(PoisonError::into_inner);
        let better = partial
            .as_ref()
            .map_or(true, |p| placed > p.placed || (placed == p.placed && path < p.path.as_slice()));
        if better {
            *partial = Some(Found {
                path: path.to_vec(),
                trues: state.trues(),
                placed,
            });
            self.partial_depth.store(placed, Ordering::Relaxed);
        }
    }

    fn finish(self, started: Instant, workers: usize) -> SolveReport {
        let stats = SearchStats {
            branches: self.branches.load(Ordering::Relaxed),
            conflicts: self.conflicts.load(Ordering::Relaxed),
            solutions: self.solutions.load(Ordering::Relaxed),
            workers,
            elapsed_ms: started.elapsed().as_millis() as u64,
        };

        let best = self.best.into_inner().unwrap_or_else(PoisonError::into_inner);
        let exhausted = self.exhausted.load(Ordering::SeqCst);

        let outcome = match best {
            Some(found) => SolveOutcome::Solved(Assignment::from_vars(self.set, &found.trues)),
            None if exhausted => {
                let partial = self
                    .partial
                    .into_inner()
                    .unwrap_or_else(PoisonError::into_inner);
                SolveOutcome::Exhausted(
                    partial
                        .map(|p| Assignment::from_vars(self.set, &p.trues))
                        .unwrap_or_default(),
                )
            }
            None => SolveOutcome::Infeasible,
        };

        let label = match &outcome {
            SolveOutcome::Solved(_) => "solved",
            SolveOutcome::Infeasible => "infeasible",
            SolveOutcome::Exhausted(_) => "exhausted",
        };
        info!(
            "Search {label}: {} branches, {} conflicts, {} solutions, {} workers, {} ms",
            stats.branches, stats.conflicts, stats.solutions, stats.workers, stats.elapsed_ms
        );

        SolveReport { outcome, stats }
    }
}
