//! Pausable deferred scheduler for animation effects.
//!
//! The search decides *in which order* effects happen and hands each of them over with a delay;
//! this module decides *when* they are shown. Tasks are kept with their absolute target time, so
//! the whole set can be paused and resumed without dropping any of them or changing their order.
//!
//! There is no background timer: the host loop asks for due tasks with [`Scheduler::pop_due`] or
//! [`Scheduler::fire_due`], and uses [`Scheduler::next_deadline`] to know how long it may sleep.

use std::{
    cell::Cell,
    collections::BTreeMap,
    fmt,
    rc::Rc,
    time::{Duration, Instant},
};

use tracing::{debug, trace};

/// Source of the current time.
pub trait Clock {
    /// Returns the current instant.
    fn now(&self) -> Instant;
}

/// Clock backed by [`Instant::now`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to.
///
/// Clones share the same time, so a test can keep one handle and give another to a scheduler.
#[derive(Clone, Debug)]
pub struct ManualClock {
    /// Instant the clock was created at.
    origin: Instant,
    /// Time elapsed since `origin`, shared between clones.
    elapsed: Rc<Cell<Duration>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    /// Creates a clock frozen at the current instant.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            elapsed: Rc::new(Cell::new(Duration::ZERO)),
        }
    }

    /// Moves the clock forward.
    pub fn advance(&self, by: Duration) {
        self.elapsed.set(self.elapsed.get().saturating_add(by));
    }

    /// Returns how far the clock has been moved since creation.
    pub fn elapsed(&self) -> Duration {
        self.elapsed.get()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed.get()
    }
}

/// Ordering key of a pending task: target time first, then insertion order.
type TaskKey = (Instant, u64);

/// Set of delayed tasks that can be paused and resumed as a group.
///
/// Tasks come out in nondecreasing target time; tasks with the same target time come out in the
/// order they were scheduled.
pub struct Scheduler<T, C = SystemClock> {
    /// Time source.
    clock: C,
    /// Pending tasks keyed by target time and insertion sequence.
    tasks: BTreeMap<TaskKey, T>,
    /// Sequence number handed to the next scheduled task.
    next_seq: u64,
    /// Whether tasks are currently held back.
    paused: bool,
}

impl<T, C: fmt::Debug> fmt::Debug for Scheduler<T, C> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Scheduler")
            .field("clock", &self.clock)
            .field("pending", &self.tasks.len())
            .field("next_seq", &self.next_seq)
            .field("paused", &self.paused)
            .finish()
    }
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    /// Creates an empty scheduler running on the system clock.
    pub const fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl<T, C> Scheduler<T, C>
where
    C: Clock,
{
    /// Creates an empty scheduler running on the given clock.
    pub const fn with_clock(clock: C) -> Self {
        Self {
            clock,
            tasks: BTreeMap::new(),
            next_seq: 0,
            paused: false,
        }
    }

    /// Returns the clock the scheduler reads time from.
    pub const fn clock(&self) -> &C {
        &self.clock
    }

    /// Returns the number of pending tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns whether no task is pending.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Returns whether the scheduler is holding its tasks back.
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// Records a task to run `delay` from now.
    ///
    /// While paused the task is only queued; it becomes eligible once the scheduler resumes.
    pub fn schedule(&mut self, task: T, delay: Duration) {
        let now = self.clock.now();
        let at = now.checked_add(delay).unwrap_or(now);
        let seq = self.next_seq;
        self.next_seq += 1;

        let _ = self.tasks.insert((at, seq), task);
    }

    /// Holds back every pending task.
    ///
    /// Target times are kept as they are, so no task fires early and no ordering is lost.
    pub fn pause(&mut self) {
        if !self.paused {
            debug!(pending = self.tasks.len(), "pausing scheduler");
        }
        self.paused = true;
    }

    /// Releases the pending tasks again.
    ///
    /// Tasks whose target time passed during the pause are moved to "now" and keep their relative
    /// insertion order; every other task keeps its original target time.
    pub fn resume(&mut self) {
        if !self.paused {
            return;
        }
        self.paused = false;

        let now = self.clock.now();
        let future = self.tasks.split_off(&(now, 0));
        let overdue = std::mem::replace(&mut self.tasks, future);
        debug!(
            overdue = overdue.len(),
            pending = self.tasks.len() + overdue.len(),
            "resuming scheduler"
        );
        for ((_, seq), task) in overdue {
            let _ = self.tasks.insert((now, seq), task);
        }
    }

    /// Drops every pending task. Safe to call at any time, any number of times.
    pub fn clear(&mut self) {
        if !self.tasks.is_empty() {
            debug!(dropped = self.tasks.len(), "clearing scheduler");
        }
        self.tasks.clear();
    }

    /// Returns when the next task becomes due, or `None` when paused or empty.
    pub fn next_deadline(&self) -> Option<Instant> {
        if self.paused {
            return None;
        }
        self.tasks.first_key_value().map(|((at, _), _)| *at)
    }

    /// Removes and returns the earliest task if it is due.
    pub fn pop_due(&mut self) -> Option<T> {
        let deadline = self.next_deadline()?;
        if deadline > self.clock.now() {
            return None;
        }

        let ((_, seq), task) = self.tasks.pop_first()?;
        trace!(seq, "firing scheduled task");
        Some(task)
    }

    /// Hands every due task to `fire`, in order, and returns how many fired.
    ///
    /// `fire` may schedule new tasks; those that are already due run in the same pass.
    pub fn fire_due<F>(&mut self, mut fire: F) -> usize
    where
        F: FnMut(&mut Self, T),
    {
        let mut fired = 0;
        while let Some(task) = self.pop_due() {
            fire(self, task);
            fired += 1;
        }

        fired
    }
}

impl<C> Scheduler<Box<dyn FnOnce()>, C>
where
    C: Clock,
{
    /// Runs every due callback and returns how many ran.
    pub fn run_due(&mut self) -> usize {
        self.fire_due(|_, callback| callback())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use proptest::prelude::*;

    use super::*;

    /// Shorthand for a duration in milliseconds.
    const fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    /// Creates a scheduler over labels on a manual clock, plus a handle to that clock.
    fn create_test_scheduler() -> (Scheduler<&'static str, ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        (Scheduler::with_clock(clock.clone()), clock)
    }

    /// Collects every task that is due right now.
    fn drain_due<T, C: Clock>(scheduler: &mut Scheduler<T, C>) -> Vec<T> {
        let mut fired = Vec::new();
        let _ = scheduler.fire_due(|_, task| fired.push(task));
        fired
    }

    #[test]
    fn test_tasks_fire_in_delay_order() {
        let (mut scheduler, clock) = create_test_scheduler();
        scheduler.schedule("late", ms(30));
        scheduler.schedule("early", ms(10));
        scheduler.schedule("middle", ms(20));

        assert!(drain_due(&mut scheduler).is_empty());
        clock.advance(ms(30));

        assert_eq!(drain_due(&mut scheduler), vec!["early", "middle", "late"]);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_equal_delays_keep_insertion_order() {
        let (mut scheduler, clock) = create_test_scheduler();
        scheduler.schedule("first", ms(5));
        scheduler.schedule("second", ms(5));
        scheduler.schedule("third", ms(5));
        clock.advance(ms(5));

        assert_eq!(drain_due(&mut scheduler), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_only_due_tasks_fire() {
        let (mut scheduler, clock) = create_test_scheduler();
        scheduler.schedule("now", Duration::ZERO);
        scheduler.schedule("later", ms(100));

        assert_eq!(drain_due(&mut scheduler), vec!["now"]);
        assert_eq!(scheduler.len(), 1);
        assert_eq!(
            scheduler.next_deadline(),
            Some(clock.now() + ms(100)),
        );
    }

    #[test]
    fn test_pause_holds_tasks_back() {
        let (mut scheduler, clock) = create_test_scheduler();
        scheduler.schedule("task", ms(10));
        scheduler.pause();
        clock.advance(ms(50));

        assert!(scheduler.is_paused());
        assert_eq!(scheduler.next_deadline(), None);
        assert!(drain_due(&mut scheduler).is_empty());
        assert_eq!(scheduler.len(), 1);
    }

    #[test]
    fn test_schedule_while_paused_is_queued() {
        let (mut scheduler, clock) = create_test_scheduler();
        scheduler.pause();
        scheduler.schedule("queued", Duration::ZERO);

        assert!(drain_due(&mut scheduler).is_empty());
        scheduler.resume();
        clock.advance(ms(1));

        assert_eq!(drain_due(&mut scheduler), vec!["queued"]);
    }

    #[test]
    fn test_resume_keeps_future_deadlines() {
        let (mut scheduler, clock) = create_test_scheduler();
        scheduler.schedule("overdue", ms(10));
        scheduler.schedule("future", ms(100));
        scheduler.pause();
        clock.advance(ms(40));
        scheduler.resume();

        assert_eq!(drain_due(&mut scheduler), vec!["overdue"]);
        clock.advance(ms(59));
        assert!(drain_due(&mut scheduler).is_empty());
        clock.advance(ms(1));
        assert_eq!(drain_due(&mut scheduler), vec!["future"]);
    }

    #[test]
    fn test_overdue_tasks_fire_in_insertion_order() {
        let (mut scheduler, clock) = create_test_scheduler();
        scheduler.schedule("inserted first", ms(20));
        scheduler.schedule("inserted second", ms(10));
        scheduler.pause();
        clock.advance(ms(30));
        scheduler.resume();

        assert_eq!(
            drain_due(&mut scheduler),
            vec!["inserted first", "inserted second"]
        );
    }

    #[test]
    fn test_clear_is_idempotent() {
        let (mut scheduler, clock) = create_test_scheduler();
        scheduler.schedule("dropped", ms(1));
        scheduler.clear();
        scheduler.clear();
        clock.advance(ms(10));

        assert!(scheduler.is_empty());
        assert!(drain_due(&mut scheduler).is_empty());
    }

    #[test]
    fn test_fire_due_runs_tasks_scheduled_by_callbacks() {
        let (mut scheduler, clock) = create_test_scheduler();
        scheduler.schedule("parent", ms(10));
        clock.advance(ms(10));

        let mut fired = Vec::new();
        let count = scheduler.fire_due(|scheduler, task| {
            if task == "parent" {
                scheduler.schedule("child", Duration::ZERO);
                scheduler.schedule("grandchild", ms(5));
            }
            fired.push(task);
        });

        assert_eq!(count, 2);
        assert_eq!(fired, vec!["parent", "child"]);
        assert_eq!(scheduler.len(), 1);
    }

    #[test]
    fn test_boxed_callbacks() {
        let clock = ManualClock::new();
        let mut scheduler: Scheduler<Box<dyn FnOnce()>, ManualClock> =
            Scheduler::with_clock(clock.clone());
        let log = Rc::new(RefCell::new(Vec::new()));

        for label in ["a", "b"] {
            let log = Rc::clone(&log);
            scheduler.schedule(Box::new(move || log.borrow_mut().push(label)), ms(1));
        }
        clock.advance(ms(1));

        assert_eq!(scheduler.run_due(), 2);
        assert_eq!(*log.borrow(), vec!["a", "b"]);
    }

    #[test]
    fn test_manual_clock_is_shared() {
        let clock = ManualClock::new();
        let other = clock.clone();
        let before = clock.now();
        other.advance(ms(25));

        assert_eq!(clock.elapsed(), ms(25));
        assert_eq!(clock.now(), before + ms(25));
    }

    proptest! {
        // Pausing right after scheduling and resuming once everything is overdue must neither
        // lose, duplicate nor reorder tasks.
        #[test]
        fn pause_resume_preserves_order(
            gaps in prop::collection::vec(1..50u64, 1..40),
            extra in 0..100u64,
        ) {
            let clock = ManualClock::new();
            let mut scheduler = Scheduler::with_clock(clock.clone());
            let mut delay = 0;
            for (index, gap) in gaps.iter().enumerate() {
                delay += gap;
                scheduler.schedule(index, ms(delay));
            }
            scheduler.pause();
            clock.advance(ms(delay + extra));
            scheduler.resume();

            let fired = drain_due(&mut scheduler);
            let expected: Vec<usize> = (0..gaps.len()).collect();
            prop_assert_eq!(fired, expected);
            prop_assert!(scheduler.is_empty());
        }

        // Without pausing, tasks come out sorted by delay with ties in insertion order.
        #[test]
        fn fires_sorted_by_delay(delays in prop::collection::vec(0..20u64, 0..40)) {
            let clock = ManualClock::new();
            let mut scheduler = Scheduler::with_clock(clock.clone());
            for (index, delay) in delays.iter().enumerate() {
                scheduler.schedule((*delay, index), ms(*delay));
            }
            clock.advance(ms(20));

            let fired = drain_due(&mut scheduler);
            let mut expected: Vec<(u64, usize)> =
                delays.iter().copied().zip(0..).collect();
            expected.sort_unstable();
            prop_assert_eq!(fired, expected);
        }
    }
}
