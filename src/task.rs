//! Holds the [`Task`] descriptor and the types that describe its behaviour

/// The type of task actions.
///
/// An action does one bounded slice of work and returns. It must not
/// block - the whole point of the scheduler is that nothing in the main
/// loop ever waits on the wall clock.
pub type Action<'a> = &'a mut dyn FnMut() -> Result<(), TaskFault>;

/// A failure code reported by a task action.
///
/// The meaning of the code is chosen by the application. The scheduler
/// does not interpret it - it logs the code and carries on with the
/// rest of the pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskFault(pub u32);

impl core::fmt::Display for TaskFault {
    fn fmt(&self, fmt: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(fmt, "fault {}", self.0)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for TaskFault {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "fault {=u32}", self.0);
    }
}

/// Selects how a task is re-armed after it runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Cadence {
    /// The next run is due one full period after the run that just
    /// happened. If a run was late, the lag is dropped.
    #[default]
    FixedDelay,
    /// The next run is due one full period after the previous deadline.
    /// A task that fell behind runs on consecutive passes, once per
    /// pass, until it has caught up.
    Deadline,
}

/// Represents one registered periodic task
pub(crate) struct Task<'a> {
    /// Milliseconds between runs; never zero
    pub(crate) period_ms: u32,
    /// When this task last ran (or was registered)
    pub(crate) last_run_ms: u32,
    /// How the task is re-armed after running
    pub(crate) cadence: Cadence,
    /// The work itself
    pub(crate) action: Action<'a>,
}

impl Task<'_> {
    /// Is this task due at the given instant?
    ///
    /// The elapsed time is computed with wrapping subtraction, so the
    /// answer stays correct when the millisecond counter overflows.
    /// Comparing absolute timestamps (`now >= last + period`) would not.
    pub(crate) fn is_due(&self, now_ms: u32) -> bool {
        now_ms.wrapping_sub(self.last_run_ms) >= self.period_ms
    }

    /// Re-arm the task after a run at `now_ms`
    pub(crate) fn rearm(&mut self, now_ms: u32) {
        self.last_run_ms = match self.cadence {
            Cadence::FixedDelay => now_ms,
            Cadence::Deadline => self.last_run_ms.wrapping_add(self.period_ms),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn due_calculation_survives_counter_wrap() {
        let mut action = || Ok(());
        let task = Task {
            period_ms: 100,
            last_run_ms: u32::MAX - 49,
            cadence: Cadence::FixedDelay,
            action: &mut action,
        };
        // 49 ms elapsed, counter about to wrap
        assert!(!task.is_due(u32::MAX));
        // 99 ms elapsed, counter has wrapped
        assert!(!task.is_due(49));
        // 100 ms elapsed
        assert!(task.is_due(50));
    }

    #[test]
    fn deadline_rearm_advances_by_a_whole_period() {
        let mut action = || Ok(());
        let mut task = Task {
            period_ms: 100,
            last_run_ms: u32::MAX - 49,
            cadence: Cadence::Deadline,
            action: &mut action,
        };
        // the run happened late, at 123 - the next deadline is still
        // measured from the old one
        task.rearm(123);
        assert_eq!(task.last_run_ms, 50);
    }

    #[test]
    fn fixed_delay_rearm_starts_over_from_the_run() {
        let mut action = || Ok(());
        let mut task = Task {
            period_ms: 100,
            last_run_ms: 0,
            cadence: Cadence::FixedDelay,
            action: &mut action,
        };
        task.rearm(123);
        assert_eq!(task.last_run_ms, 123);
    }
}
