//! Explicit task scheduler
//!
//! The core owns its cadence instead of leaning on a host runtime's
//! recurring-task facility: the host calls `due(now)` from its tick loop
//! and runs whatever comes back. Recurring tasks re-arm relative to the
//! observed `now` (a late tick coalesces missed runs rather than bursting);
//! one-shots are consumed when collected. Everything is driven by injected
//! instants, so tests use a virtual clock.

use chrono::{DateTime, Utc};
use std::time::Duration;
use tracing::debug;

/// The periodic work the core schedules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// Fold session time into the store, enforce, persist
    Flush,

    /// Recompute and push presentation updates
    Presentation,

    /// Midnight boundary: wipe today's counters and reschedule
    Rollover,
}

#[derive(Debug)]
struct Recurring {
    task: Task,
    interval: Duration,
    next_due: DateTime<Utc>,
}

#[derive(Debug)]
struct OneShot {
    task: Task,
    at: DateTime<Utc>,
}

/// Task cadence bookkeeping
#[derive(Debug, Default)]
pub struct Scheduler {
    recurring: Vec<Recurring>,
    one_shots: Vec<OneShot>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or re-arm) a recurring task. The first run is due one
    /// interval after `now`.
    pub fn register_recurring(&mut self, task: Task, interval: Duration, now: DateTime<Utc>) {
        let next_due = now + to_chrono(interval);
        debug!(?task, interval_secs = interval.as_secs(), "Recurring task armed");

        match self.recurring.iter_mut().find(|r| r.task == task) {
            Some(rec) => {
                rec.interval = interval;
                rec.next_due = next_due;
            }
            None => self.recurring.push(Recurring {
                task,
                interval,
                next_due,
            }),
        }
    }

    /// Register a one-shot task, replacing any pending one-shot of the
    /// same kind.
    pub fn register_once_at(&mut self, task: Task, at: DateTime<Utc>) {
        self.one_shots.retain(|o| o.task != task);
        self.one_shots.push(OneShot { task, at });
        debug!(?task, at = %at, "One-shot task armed");
    }

    /// Currently armed interval of a recurring task
    pub fn interval_of(&self, task: Task) -> Option<Duration> {
        self.recurring
            .iter()
            .find(|r| r.task == task)
            .map(|r| r.interval)
    }

    /// Collect every task due at `now`. Recurring tasks are emitted at most
    /// once per call and re-armed relative to `now`; due one-shots are
    /// removed.
    pub fn due(&mut self, now: DateTime<Utc>) -> Vec<Task> {
        let mut due = Vec::new();

        for rec in &mut self.recurring {
            if now >= rec.next_due {
                due.push(rec.task);
                rec.next_due = now + to_chrono(rec.interval);
            }
        }

        let mut remaining = Vec::new();
        for shot in self.one_shots.drain(..) {
            if now >= shot.at {
                due.push(shot.task);
            } else {
                remaining.push(shot);
            }
        }
        self.one_shots = remaining;

        due
    }
}

fn to_chrono(d: Duration) -> chrono::Duration {
    chrono::Duration::milliseconds(d.as_millis() as i64)
}
