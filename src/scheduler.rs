//! Contains the [`Scheduler`] type

// Copyright (c) 2025 Ferrous Systems
// SPDX-License-Identifier: GPL-3.0-or-later

use heapless::Vec;

use crate::{Action, Cadence, Clock, Task};

/// Names a registered task
///
/// Handed out by [`Scheduler::register`] and consumed by
/// [`Scheduler::unregister`]. Task IDs follow registration order.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TaskId(pub(crate) usize);

#[cfg(feature = "defmt")]
impl defmt::Format for TaskId {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "T{=usize:03}", self.0);
    }
}

impl core::fmt::Display for TaskId {
    fn fmt(&self, fmt: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(fmt, "T{:03}", self.0)
    }
}

/// The ways that registering or removing a task can fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// A task cannot have a period of zero milliseconds
    InvalidPeriod,
    /// The task table is full
    TooManyTasks,
    /// No task is registered under the given [`TaskId`]
    NoSuchTask,
}

impl core::fmt::Display for Error {
    fn fmt(&self, fmt: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::InvalidPeriod => write!(fmt, "period must be at least 1 ms"),
            Error::TooManyTasks => write!(fmt, "task table is full"),
            Error::NoSuchTask => write!(fmt, "no task with that id"),
        }
    }
}

/// A cooperative scheduler for periodic tasks
///
/// Holds up to `N` task descriptors and a [`Clock`]. Call
/// [`Scheduler::tick`] from your main loop, as often as you like, and
/// each task's action runs whenever at least its period has elapsed
/// since the last time it ran. Nothing ever blocks: a pass over the
/// table costs one clock read and one comparison per task, plus
/// whatever the due actions themselves do.
///
/// This is the "blink without delay" pattern done once, centrally,
/// instead of copy-pasted around every piece of periodic work with its
/// own timestamp variable.
///
/// The scheduler is single-threaded. If interrupts or a second core can
/// see it, finish registering tasks before the first tick - there is no
/// support for mutating the table concurrently with a pass.
pub struct Scheduler<'a, C, const N: usize> {
    /// Where the time comes from
    clock: C,
    /// The task table, in registration order
    ///
    /// `None` marks a slot vacated by [`Scheduler::unregister`]. Vacant
    /// slots are reused by later registrations.
    tasks: Vec<Option<Task<'a>>, N>,
}

impl<'a, C: Clock, const N: usize> Scheduler<'a, C, N> {
    /// Build a scheduler with an empty task table
    pub const fn new(clock: C) -> Scheduler<'a, C, N> {
        Scheduler {
            clock,
            tasks: Vec::new(),
        }
    }

    /// Register a task that runs every `period_ms` milliseconds
    ///
    /// The task is re-armed [`Cadence::FixedDelay`] style: each run is
    /// due one full period after the run before it, so a late pass
    /// drops the lag rather than making it up. Use
    /// [`Scheduler::register_with_cadence`] if you want the catch-up
    /// behaviour instead.
    ///
    /// Cold start: a freshly registered task is treated as if it had
    /// just run. Its first execution is one full period from now - it
    /// does not fire on the next pass.
    pub fn register(&mut self, period_ms: u32, action: Action<'a>) -> Result<TaskId, Error> {
        self.register_with_cadence(period_ms, Cadence::FixedDelay, action)
    }

    /// Register a task with an explicit re-arm policy
    ///
    /// See [`Cadence`] for the difference between the two policies, and
    /// [`Scheduler::register`] for the cold-start rule.
    pub fn register_with_cadence(
        &mut self,
        period_ms: u32,
        cadence: Cadence,
        action: Action<'a>,
    ) -> Result<TaskId, Error> {
        if period_ms == 0 {
            return Err(Error::InvalidPeriod);
        }
        let task = Task {
            period_ms,
            last_run_ms: self.clock.now_ms(),
            cadence,
            action,
        };
        let id = if let Some(idx) = self.tasks.iter().position(Option::is_none) {
            self.tasks[idx] = Some(task);
            TaskId(idx)
        } else {
            self.tasks.push(Some(task)).map_err(|_| Error::TooManyTasks)?;
            TaskId(self.tasks.len() - 1)
        };
        #[cfg(feature = "defmt")]
        defmt::debug!("Registered {} every {=u32} ms", id, period_ms);
        Ok(id)
    }

    /// Remove a task from the table
    ///
    /// The vacated slot is recycled by the next registration, so `id`
    /// is dead after this call - using it again later may address a
    /// different task.
    pub fn unregister(&mut self, id: TaskId) -> Result<(), Error> {
        let slot = self.tasks.get_mut(id.0).ok_or(Error::NoSuchTask)?;
        if slot.take().is_none() {
            return Err(Error::NoSuchTask);
        }
        #[cfg(feature = "defmt")]
        defmt::debug!("Unregistered {}", id);
        Ok(())
    }

    /// Run one pass over the task table, executing every task that is due
    ///
    /// The clock is read exactly once, at the top of the pass, so every
    /// task in the pass is judged against the same instant. Tasks run
    /// in registration order, at most once each per pass. Returns how
    /// many actions ran.
    ///
    /// A task whose action reports a [`TaskFault`](crate::TaskFault)
    /// does not stop the pass: the fault is logged (under the `defmt`
    /// feature) and the remaining tasks still run. The failing task is
    /// re-armed exactly as if it had succeeded - it is not retried
    /// before its next period is up.
    pub fn tick(&mut self) -> usize {
        let now = self.clock.now_ms();
        let mut ran = 0;
        for (_idx, slot) in self.tasks.iter_mut().enumerate() {
            let Some(task) = slot.as_mut() else {
                continue;
            };
            if !task.is_due(now) {
                continue;
            }
            #[cfg(feature = "defmt")]
            defmt::trace!("Running {} at {=u32}", TaskId(_idx), now);
            if let Err(_fault) = (task.action)() {
                #[cfg(feature = "defmt")]
                defmt::warn!("{} failed: {}", TaskId(_idx), _fault);
            }
            task.rearm(now);
            ran += 1;
        }
        ran
    }

    /// The current time, as the scheduler's clock sees it
    pub fn now_ms(&self) -> u32 {
        self.clock.now_ms()
    }

    /// How many tasks are currently registered
    pub fn len(&self) -> usize {
        self.tasks.iter().filter(|slot| slot.is_some()).count()
    }

    /// Is the task table empty?
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// How many tasks the table can hold
    pub const fn capacity(&self) -> usize {
        N
    }
}
