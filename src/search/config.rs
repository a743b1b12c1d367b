//! Search configuration.
//!
//! [`SearchConfig`] holds the parameters that control the backtracking
//! search: worker count, budgets, value-order seed and partial acceptance.

/// Configuration for the search engine.
///
/// # Defaults
///
/// ```
/// use u_timetable::search::SearchConfig;
///
/// let config = SearchConfig::default();
/// assert_eq!(config.workers, 1);
/// assert!(config.time_limit_ms.is_none());
/// assert!(config.max_branches.is_none());
/// assert!(!config.accept_partial);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_timetable::search::SearchConfig;
///
/// let config = SearchConfig::default()
///     .with_workers(4)
///     .with_time_limit_ms(5_000)
///     .with_seed(42)
///     .with_accept_partial(true);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchConfig {
    /// Number of parallel workers.
    ///
    /// Values above 1 need the `parallel` feature; without it the search
    /// runs on the calling thread.
    pub workers: usize,

    /// Optional wall-clock limit in milliseconds.
    ///
    /// When reached, the search stops and reports the best solution or the
    /// deepest partial assignment found so far.
    pub time_limit_ms: Option<u64>,

    /// Optional limit on the number of explored branches, shared by all workers.
    pub max_branches: Option<u64>,

    /// Seed for permuting the value order of each candidate.
    ///
    /// `None` keeps the natural (unit, day, period) order.
    pub seed: Option<u64>,

    /// Whether the pipeline writes an exhausted partial timetable.
    pub accept_partial: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            workers: 1,
            time_limit_ms: None,
            max_branches: None,
            seed: None,
            accept_partial: false,
        }
    }
}

impl SearchConfig {
    /// Sets the number of workers.
    pub fn with_workers(mut self, n: usize) -> Self {
        self.workers = n;
        self
    }

    /// Sets a wall-clock time limit in milliseconds.
    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = Some(ms);
        self
    }

    /// Sets a branch budget.
    pub fn with_max_branches(mut self, n: u64) -> Self {
        self.max_branches = Some(n);
        self
    }

    /// Sets the value-order seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets whether exhausted partial timetables are written.
    pub fn with_accept_partial(mut self, accept: bool) -> Self {
        self.accept_partial = accept;
        self
    }

    /// Preset for quick feasibility checks.
    ///
    /// - Workers: 1, Time limit: 2s
    pub fn fast() -> Self {
        Self {
            workers: 1,
            time_limit_ms: Some(2_000),
            ..Self::default()
        }
    }

    /// Preset for typical department timetables.
    ///
    /// - Workers: 4, Time limit: 10s
    pub fn balanced() -> Self {
        Self {
            workers: 4,
            time_limit_ms: Some(10_000),
            ..Self::default()
        }
    }

    /// Preset for large or tight instances.
    ///
    /// - Workers: 8, Time limit: 60s
    pub fn thorough() -> Self {
        Self {
            workers: 8,
            time_limit_ms: Some(60_000),
            ..Self::default()
        }
    }

    /// Whether any budget can cut the search short.
    pub fn has_budget(&self) -> bool {
        self.time_limit_ms.is_some() || self.max_branches.is_some()
    }

    /// Validates the configuration.
    ///
    /// Returns `Err` with a description if any parameter is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.workers == 0 {
            return Err("workers must be at least 1".into());
        }
        if self.time_limit_ms == Some(0) {
            return Err("time_limit_ms must be positive or None".into());
        }
        if self.max_branches == Some(0) {
            return Err("max_branches must be positive or None".into());
        }
        Ok(())
    }
}
