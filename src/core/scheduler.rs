//! Virtual-time task queue and clocks for the population simulation.
//!
//! Deferred work is data, not closures: the owner pops due tasks and applies them to
//! its own state, so the whole simulation stays single-threaded and deterministic for
//! a given clock.

use crate::core::traits::Clock;
use chrono::{DateTime, Duration, Utc};
use std::cell::Cell;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::rc::Rc;
use std::time::Instant;
use uuid::Uuid;

/// Deferred population work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimTask {
    /// Generate and insert one roster member.
    Spawn,
    /// Periodic spawn cadence; re-arms itself when applied.
    SpawnTick,
    /// Remove a roster member by identity.
    Evict { visitor_id: Uuid },
    /// Regenerate the dashboard metrics snapshot.
    RefreshMetrics,
}

/// Identifies a scheduled task for cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskHandle(u64);

/// Min-heap of tasks keyed by due time, then by scheduling order.
#[derive(Debug, Default)]
pub struct TaskQueue {
    schedule: BinaryHeap<Reverse<(DateTime<Utc>, u64)>>,
    pending: HashMap<u64, SimTask>,
    next_seq: u64,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules a task at an absolute instant.
    pub fn schedule_at(&mut self, due: DateTime<Utc>, task: SimTask) -> TaskHandle {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.schedule.push(Reverse((due, seq)));
        self.pending.insert(seq, task);
        TaskHandle(seq)
    }

    /// Schedules a task `delay` after `now`. Negative delays run at `now`.
    pub fn schedule_in(
        &mut self,
        now: DateTime<Utc>,
        delay: Duration,
        task: SimTask,
    ) -> TaskHandle {
        let delay = if delay < Duration::zero() {
            Duration::zero()
        } else {
            delay
        };
        self.schedule_at(saturating_offset(now, delay), task)
    }

    /// Cancels a pending task. Returns `false` if it already ran or was cancelled.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        self.pending.remove(&handle.0).is_some()
    }

    /// Cancels every pending task and returns how many were dropped.
    pub fn cancel_all(&mut self) -> usize {
        let dropped = self.pending.len();
        self.pending.clear();
        self.schedule.clear();
        dropped
    }

    /// Pops the earliest live task due at or before `until`.
    pub fn pop_due(&mut self, until: DateTime<Utc>) -> Option<(DateTime<Utc>, SimTask)> {
        loop {
            let Reverse((due, seq)) = *self.schedule.peek()?;
            if due > until {
                return None;
            }
            self.schedule.pop();
            if let Some(task) = self.pending.remove(&seq) {
                return Some((due, task));
            }
        }
    }

    /// Due time of the earliest live task.
    #[cfg(test)]
    fn next_due_at(&mut self) -> Option<DateTime<Utc>> {
        while let Some(Reverse((due, seq))) = self.schedule.peek().copied() {
            if self.pending.contains_key(&seq) {
                return Some(due);
            }
            self.schedule.pop();
        }
        None
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// `at + delay`, pinned to the last representable instant instead of overflowing.
pub fn saturating_offset(at: DateTime<Utc>, delay: Duration) -> DateTime<Utc> {
    at.checked_add_signed(delay)
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Wall clock running `scale` times faster than real time from a fixed origin.
#[derive(Debug, Clone)]
pub struct ScaledClock {
    origin: DateTime<Utc>,
    started: Instant,
    scale: f64,
}

impl ScaledClock {
    pub fn new(origin: DateTime<Utc>, scale: f64) -> Self {
        let scale = if scale.is_finite() && scale > 0.0 { scale } else { 1.0 };
        Self {
            origin,
            started: Instant::now(),
            scale,
        }
    }
}

impl Clock for ScaledClock {
    fn now(&self) -> DateTime<Utc> {
        let elapsed = self.started.elapsed().as_secs_f64() * self.scale;
        saturating_offset(self.origin, Duration::milliseconds((elapsed * 1000.0) as i64))
    }
}

/// Manually advanced clock. Clones share the same instant.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn set(&self, at: DateTime<Utc>) {
        self.now.set(at);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn origin() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).unwrap()
    }

    #[test]
    fn pops_in_due_order_then_schedule_order() {
        let mut queue = TaskQueue::new();
        let start = origin();
        queue.schedule_in(start, Duration::seconds(5), SimTask::RefreshMetrics);
        queue.schedule_in(start, Duration::seconds(1), SimTask::Spawn);
        queue.schedule_in(start, Duration::seconds(1), SimTask::SpawnTick);

        let until = start + Duration::seconds(10);
        assert_eq!(queue.pop_due(until).map(|(_, t)| t), Some(SimTask::Spawn));
        assert_eq!(queue.pop_due(until).map(|(_, t)| t), Some(SimTask::SpawnTick));
        assert_eq!(
            queue.pop_due(until).map(|(_, t)| t),
            Some(SimTask::RefreshMetrics)
        );
        assert!(queue.pop_due(until).is_none());
    }

    #[test]
    fn tasks_not_yet_due_stay_queued() {
        let mut queue = TaskQueue::new();
        let start = origin();
        queue.schedule_in(start, Duration::seconds(30), SimTask::Spawn);
        assert!(queue.pop_due(start + Duration::seconds(29)).is_none());
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.next_due_at(), Some(start + Duration::seconds(30)));
    }

    #[test]
    fn cancelled_tasks_are_skipped() {
        let mut queue = TaskQueue::new();
        let start = origin();
        let handle = queue.schedule_in(start, Duration::seconds(1), SimTask::Spawn);
        queue.schedule_in(start, Duration::seconds(2), SimTask::SpawnTick);
        assert!(queue.cancel(handle));
        assert!(!queue.cancel(handle));

        let until = start + Duration::seconds(5);
        assert_eq!(queue.pop_due(until).map(|(_, t)| t), Some(SimTask::SpawnTick));
        assert!(queue.is_empty());
    }

    #[test]
    fn cancel_all_drops_everything() {
        let mut queue = TaskQueue::new();
        let start = origin();
        for secs in 0..4 {
            queue.schedule_in(start, Duration::seconds(secs), SimTask::Spawn);
        }
        assert_eq!(queue.cancel_all(), 4);
        assert!(queue.pop_due(start + Duration::hours(1)).is_none());
        assert!(queue.next_due_at().is_none());
    }

    #[test]
    fn huge_delays_saturate_instead_of_overflowing() {
        let mut queue = TaskQueue::new();
        let start = origin();
        queue.schedule_in(start, Duration::milliseconds(i64::MAX / 2), SimTask::SpawnTick);
        assert_eq!(queue.next_due_at(), Some(DateTime::<Utc>::MAX_UTC));
        assert!(queue.pop_due(start + Duration::days(365)).is_none());
        assert_eq!(
            saturating_offset(start, Duration::seconds(5)),
            start + Duration::seconds(5)
        );
    }

    #[test]
    fn manual_clock_clones_share_time() {
        let clock = ManualClock::new(origin());
        let handle = clock.clone();
        handle.advance(Duration::seconds(90));
        assert_eq!(clock.now(), origin() + Duration::seconds(90));
    }
}
