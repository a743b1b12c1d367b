//! Scheduling rule configuration.
//!
//! [`ScheduleRules`] is passed explicitly into [`Problem::new`](super::Problem::new);
//! nothing about the grid or the hard limits is global.

/// Consecutive-period limit for teachers.
///
/// Within any `window` consecutive periods of one day a teacher may hold at
/// most `max_bookings` activities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FatigueRule {
    pub window: u32,
    pub max_bookings: u32,
}

impl Default for FatigueRule {
    fn default() -> Self {
        Self {
            window: 3,
            max_bookings: 2,
        }
    }
}

/// Hard rules shared by every owner in one solve.
///
/// # Defaults
///
/// ```
/// use u_timetable::model::ScheduleRules;
///
/// let rules = ScheduleRules::default();
/// assert_eq!(rules.days, 6);
/// assert_eq!(rules.periods, 5);
/// assert_eq!(rules.daily_cap, 1);
/// assert_eq!(rules.teacher_weekly_limit, Some(18));
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_timetable::model::ScheduleRules;
///
/// let rules = ScheduleRules::department()
///     .with_grid(5, 6)
///     .with_teacher_weekly_limit(None);
/// assert_eq!(rules.daily_cap, 2);
/// assert!(rules.require_full_grid);
/// assert!(rules.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScheduleRules {
    /// Number of days in the grid.
    pub days: u32,

    /// Number of periods per day.
    pub periods: u32,

    /// Maximum occurrences of one candidate per owner and day.
    ///
    /// Candidates may override it with their own cap.
    pub daily_cap: u32,

    /// Maximum bookings per teacher across the whole grid.
    ///
    /// `None` disables the weekly limit.
    pub teacher_weekly_limit: Option<u32>,

    /// Consecutive-period limit. `None` disables it.
    pub fatigue: Option<FatigueRule>,

    /// Whether every unit cell must hold exactly one candidate.
    ///
    /// Department timetables are dense: free periods are explicit
    /// candidates rather than empty cells.
    pub require_full_grid: bool,
}

impl Default for ScheduleRules {
    fn default() -> Self {
        Self {
            days: 6,
            periods: 5,
            daily_cap: 1,
            teacher_weekly_limit: Some(18),
            fatigue: Some(FatigueRule::default()),
            require_full_grid: false,
        }
    }
}

impl ScheduleRules {
    /// Sets the grid shape.
    pub fn with_grid(mut self, days: u32, periods: u32) -> Self {
        self.days = days;
        self.periods = periods;
        self
    }

    /// Sets the default per-day cap.
    pub fn with_daily_cap(mut self, cap: u32) -> Self {
        self.daily_cap = cap;
        self
    }

    /// Sets or clears the teacher weekly limit.
    pub fn with_teacher_weekly_limit(mut self, limit: Option<u32>) -> Self {
        self.teacher_weekly_limit = limit;
        self
    }

    /// Sets or clears the fatigue rule.
    pub fn with_fatigue(mut self, fatigue: Option<FatigueRule>) -> Self {
        self.fatigue = fatigue;
        self
    }

    /// Requires every unit cell to be filled.
    pub fn with_full_grid(mut self, full: bool) -> Self {
        self.require_full_grid = full;
        self
    }

    /// Preset for shared-lab timetables: one session per subject per day,
    /// empty cells allowed.
    pub fn lab() -> Self {
        Self::default()
    }

    /// Preset for per-year subject timetables.
    ///
    /// Same limits as [`lab()`](Self::lab); resources are simply absent.
    pub fn general() -> Self {
        Self::default()
    }

    /// Preset for multi-section department timetables.
    ///
    /// - Per-day cap 2 (summed over sections for year-wide subjects)
    /// - Every cell filled
    /// - Teacher weekly limit 18, fatigue 2-in-3
    pub fn department() -> Self {
        Self {
            daily_cap: 2,
            require_full_grid: true,
            ..Self::default()
        }
    }

    /// Number of cells per unit.
    pub fn cells_per_unit(&self) -> usize {
        self.days as usize * self.periods as usize
    }

    /// Validates the configuration.
    ///
    /// Returns `Err` with a description if any parameter is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.days == 0 {
            return Err("days must be at least 1".into());
        }
        if self.periods == 0 {
            return Err("periods must be at least 1".into());
        }
        if self.daily_cap == 0 {
            return Err("daily_cap must be at least 1".into());
        }
        if let Some(fatigue) = self.fatigue {
            if fatigue.window == 0 {
                return Err("fatigue window must be at least 1".into());
            }
            if fatigue.max_bookings >= fatigue.window {
                return Err("fatigue max_bookings must be below the window length".into());
            }
        }
        Ok(())
    }
}
