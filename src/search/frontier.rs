//! Shared work queue of open branches.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use super::state::SearchState;
use crate::cp::VarId;

/// Decision taken on the branch variable: assign (0) sorts before forbid (1).
pub(crate) const ASSIGN: u8 = 0;
pub(crate) const FORBID: u8 = 1;

/// An open node of the search tree.
///
/// `decision` is applied when the node is expanded; `state` is the parent's
/// propagated state. Nodes compare by `path` only, which is unique per node,
/// so depth-first order equals ascending path order.
#[derive(Debug, Clone)]
pub(crate) struct Branch {
    pub path: Vec<u8>,
    pub state: SearchState,
    pub decision: Option<(VarId, bool)>,
}

impl Branch {
    pub(crate) fn root(state: SearchState) -> Self {
        Self {
            path: Vec::new(),
            state,
            decision: None,
        }
    }

    /// The two children of this node after branching on `var`.
    pub(crate) fn split(path: &[u8], state: SearchState, var: VarId) -> (Branch, Branch) {
        let child = |step: u8, state: SearchState| {
            let mut path = path.to_vec();
            path.push(step);
            Branch {
                path,
                state,
                decision: Some((var, step == ASSIGN)),
            }
        };
        let forbid = child(FORBID, state.clone());
        let assign = child(ASSIGN, state);
        (assign, forbid)
    }
}

impl PartialEq for Branch {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for Branch {}

impl PartialOrd for Branch {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Branch {
    fn cmp(&self, other: &Self) -> Ordering {
        self.path.cmp(&other.path)
    }
}

struct Inner {
    heap: BinaryHeap<Reverse<Branch>>,
    busy: usize,
    closed: bool,
}

/// Priority queue of branches shared by the workers.
///
/// The smallest path is handed out first. The frontier closes itself when
/// it is empty and no worker holds a branch, or when [`close`](Self::close)
/// is called; [`next`](Self::next) then returns `None` to every worker.
pub(crate) struct Frontier {
    inner: Mutex<Inner>,
    ready: Condvar,
    waiting: AtomicUsize,
}

impl Frontier {
    pub(crate) fn new(root: Branch) -> Self {
        let mut heap = BinaryHeap::new();
        heap.push(Reverse(root));
        Self {
            inner: Mutex::new(Inner {
                heap,
                busy: 0,
                closed: false,
            }),
            ready: Condvar::new(),
            waiting: AtomicUsize::new(0),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Offers a branch to idle workers.
    pub(crate) fn push(&self, branch: Branch) {
        let mut inner = self.lock();
        if inner.closed {
            return;
        }
        inner.heap.push(Reverse(branch));
        self.ready.notify_one();
    }

    /// Takes the smallest open branch, blocking while other workers may
    /// still donate work.
    pub(crate) fn next(&self) -> Option<Branch> {
        let mut inner = self.lock();
        loop {
            if inner.closed {
                return None;
            }
            if let Some(Reverse(branch)) = inner.heap.pop() {
                inner.busy += 1;
                return Some(branch);
            }
            if inner.busy == 0 {
                inner.closed = true;
                self.ready.notify_all();
                return None;
            }
            self.waiting.fetch_add(1, AtomicOrdering::SeqCst);
            inner = self
                .ready
                .wait(inner)
                .unwrap_or_else(PoisonError::into_inner);
            self.waiting.fetch_sub(1, AtomicOrdering::SeqCst);
        }
    }

    /// Marks a branch taken by [`next`](Self::next) as fully explored.
    pub(crate) fn done(&self) {
        let mut inner = self.lock();
        inner.busy = inner.busy.saturating_sub(1);
        if inner.busy == 0 && inner.heap.is_empty() {
            self.ready.notify_all();
        }
    }

    /// Stops handing out branches.
    pub(crate) fn close(&self) {
        let mut inner = self.lock();
        inner.closed = true;
        inner.heap.clear();
        self.ready.notify_all();
    }

    /// Whether some worker is waiting for work.
    pub(crate) fn is_hungry(&self) -> bool {
        self.waiting.load(AtomicOrdering::Relaxed) > 0
    }
}
