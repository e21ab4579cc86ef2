//! RunLoop - Deterministic single-threaded queue and frame clock
//!
//! Reference implementation of [`MainQueue`] and [`FrameScheduler`] with a
//! virtual clock. Headless runtimes drive it directly; tests use it to step
//! time and frames by hand. Nothing here blocks: "waiting" is always a task
//! scheduled for a later turn.
//!
//! # API
//!
//! - `advance_to` / `advance_by` - Advance the clock, running tasks as they come due
//! - `run_until_idle` - Run everything due at the current time
//! - `run_one` - Run a single due task
//! - `advance_clock` - Move the clock without running tasks (synchronous work)
//! - `render_frame` - Fire the registered frame callbacks once

use std::cell::{Cell, RefCell};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, VecDeque};
use std::rc::Rc;
use std::time::Duration;

use crate::runtime::{FrameCallback, FrameScheduler, MainQueue, Task};

// =============================================================================
// TIMED TASKS
// =============================================================================

struct TimedTask {
    at: Duration,
    seq: u64,
    task: Task,
}

impl PartialEq for TimedTask {
    fn eq(&self, other: &Self) -> bool {
        self.at == other.at && self.seq == other.seq
    }
}

impl Eq for TimedTask {}

impl PartialOrd for TimedTask {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimedTask {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Same target time resolves in post order.
        (self.at, self.seq).cmp(&(other.at, other.seq))
    }
}

// =============================================================================
// RUN LOOP
// =============================================================================

/// Deterministic main queue + frame scheduler with a virtual clock.
pub struct RunLoop {
    now: Cell<Duration>,
    seq: Cell<u64>,
    timed: RefCell<BinaryHeap<Reverse<TimedTask>>>,
    front: RefCell<VecDeque<Task>>,
    frame_callbacks: RefCell<Vec<Rc<dyn FrameCallback>>>,
}

impl RunLoop {
    /// Create a run loop with uptime 0.
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            now: Cell::new(Duration::ZERO),
            seq: Cell::new(0),
            timed: RefCell::new(BinaryHeap::new()),
            front: RefCell::new(VecDeque::new()),
            frame_callbacks: RefCell::new(Vec::new()),
        })
    }

    fn next_seq(&self) -> u64 {
        let seq = self.seq.get();
        self.seq.set(seq + 1);
        seq
    }

    fn push_timed(&self, task: Task, at: Duration) {
        // Targets in the past run on the next turn.
        let at = at.max(self.now.get());
        self.timed.borrow_mut().push(Reverse(TimedTask {
            at,
            seq: self.next_seq(),
            task,
        }));
    }

    /// Run one due task. Front-of-queue tasks run before timed ones.
    /// Returns false if nothing is due at the current time.
    pub fn run_one(&self) -> bool {
        if let Some(task) = self.front.borrow_mut().pop_front() {
            task();
            return true;
        }
        let due = {
            let mut timed = self.timed.borrow_mut();
            match timed.peek() {
                Some(Reverse(next)) if next.at <= self.now.get() => {
                    timed.pop().map(|Reverse(t)| t.task)
                }
                _ => None,
            }
        };
        match due {
            Some(task) => {
                task();
                true
            }
            None => false,
        }
    }

    /// Run every task due at the current time, including tasks they post.
    pub fn run_until_idle(&self) {
        while self.run_one() {}
    }

    /// Advance the clock to `deadline`, running tasks in time order as they
    /// come due.
    pub fn advance_to(&self, deadline: Duration) {
        self.run_until_idle();
        loop {
            let next = self
                .timed
                .borrow()
                .peek()
                .map(|Reverse(next)| next.at)
                .filter(|at| *at <= deadline);
            match next {
                Some(at) => {
                    if at > self.now.get() {
                        self.now.set(at);
                    }
                    self.run_until_idle();
                }
                None => break,
            }
        }
        if deadline > self.now.get() {
            self.now.set(deadline);
        }
    }

    /// Advance the clock by `delta`, running tasks as they come due.
    pub fn advance_by(&self, delta: Duration) {
        let deadline = self.now.get() + delta;
        self.advance_to(deadline);
    }

    /// Move the clock forward without running any tasks, as if the current
    /// turn spent `delta` doing synchronous work.
    pub fn advance_clock(&self, delta: Duration) {
        self.now.set(self.now.get() + delta);
    }

    /// Fire each registered frame callback once. Callbacks resubscribe
    /// themselves to keep firing; tasks they post run on later turns.
    pub fn render_frame(&self) {
        let callbacks: Vec<Rc<dyn FrameCallback>> =
            self.frame_callbacks.borrow_mut().drain(..).collect();
        let frame_time = self.now.get();
        for callback in callbacks {
            callback.on_frame(frame_time);
        }
    }

    /// Target time of the earliest pending timed task, if any.
    pub fn next_task_time(&self) -> Option<Duration> {
        self.timed.borrow().peek().map(|Reverse(next)| next.at)
    }

    /// Number of pending tasks (front + timed).
    pub fn pending_tasks(&self) -> usize {
        self.front.borrow().len() + self.timed.borrow().len()
    }
}

impl MainQueue for RunLoop {
    fn uptime(&self) -> Duration {
        self.now.get()
    }

    fn post(&self, task: Task) {
        self.push_timed(task, self.now.get());
    }

    fn post_at_front(&self, task: Task) {
        self.front.borrow_mut().push_back(task);
    }

    fn post_at_time(&self, task: Task, at: Duration) {
        self.push_timed(task, at);
    }

    fn remove_callbacks(&self, task: &Task) {
        self.front.borrow_mut().retain(|t| !Rc::ptr_eq(t, task));
        self.timed
            .borrow_mut()
            .retain(|Reverse(t)| !Rc::ptr_eq(&t.task, task));
    }
}

impl FrameScheduler for RunLoop {
    fn post_frame_callback(&self, callback: Rc<dyn FrameCallback>) {
        let mut callbacks = self.frame_callbacks.borrow_mut();
        if !callbacks.iter().any(|c| Rc::ptr_eq(c, &callback)) {
            callbacks.push(callback);
        }
    }

    fn remove_frame_callback(&self, callback: &Rc<dyn FrameCallback>) {
        self.frame_callbacks
            .borrow_mut()
            .retain(|c| !Rc::ptr_eq(c, callback));
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell as StdRefCell;

    fn recorder() -> (Rc<StdRefCell<Vec<&'static str>>>, impl Fn(&'static str) -> Task) {
        let log = Rc::new(StdRefCell::new(Vec::new()));
        let log_clone = log.clone();
        let make = move |name: &'static str| -> Task {
            let log = log_clone.clone();
            Rc::new(move || log.borrow_mut().push(name))
        };
        (log, make)
    }

    #[test]
    fn test_post_runs_in_order() {
        let run_loop = RunLoop::new();
        let (log, task) = recorder();

        run_loop.post(task("a"));
        run_loop.post(task("b"));
        run_loop.run_until_idle();

        assert_eq!(*log.borrow(), vec!["a", "b"]);
    }

    #[test]
    fn test_post_at_front_runs_first() {
        let run_loop = RunLoop::new();
        let (log, task) = recorder();

        run_loop.post(task("back"));
        run_loop.post_at_front(task("front"));
        run_loop.run_until_idle();

        assert_eq!(*log.borrow(), vec!["front", "back"]);
    }

    #[test]
    fn test_post_at_time_waits_for_clock() {
        let run_loop = RunLoop::new();
        let (log, task) = recorder();

        run_loop.post_at_time(task("later"), Duration::from_millis(100));
        run_loop.run_until_idle();
        assert!(log.borrow().is_empty());

        run_loop.advance_to(Duration::from_millis(99));
        assert!(log.borrow().is_empty());

        run_loop.advance_to(Duration::from_millis(100));
        assert_eq!(*log.borrow(), vec!["later"]);
    }

    #[test]
    fn test_same_time_runs_in_post_order() {
        let run_loop = RunLoop::new();
        let (log, task) = recorder();

        run_loop.post_at_time(task("first"), Duration::from_millis(50));
        run_loop.post_at_time(task("second"), Duration::from_millis(50));
        run_loop.advance_to(Duration::from_millis(50));

        assert_eq!(*log.borrow(), vec!["first", "second"]);
    }

    #[test]
    fn test_remove_callbacks_cancels_by_identity() {
        let run_loop = RunLoop::new();
        let (log, task) = recorder();

        let cancelled = task("cancelled");
        run_loop.post(cancelled.clone());
        run_loop.post(task("kept"));
        run_loop.remove_callbacks(&cancelled);
        run_loop.run_until_idle();

        assert_eq!(*log.borrow(), vec!["kept"]);
    }

    #[test]
    fn test_past_target_runs_next_turn() {
        let run_loop = RunLoop::new();
        run_loop.advance_to(Duration::from_millis(500));

        let (log, task) = recorder();
        run_loop.post_at_time(task("stale"), Duration::from_millis(100));
        run_loop.run_until_idle();

        assert_eq!(*log.borrow(), vec!["stale"]);
    }

    #[test]
    fn test_advance_clock_does_not_run_tasks() {
        let run_loop = RunLoop::new();
        let (log, task) = recorder();

        run_loop.post(task("pending"));
        run_loop.advance_clock(Duration::from_millis(10));
        assert!(log.borrow().is_empty());
        assert_eq!(run_loop.uptime(), Duration::from_millis(10));

        run_loop.run_until_idle();
        assert_eq!(*log.borrow(), vec!["pending"]);
    }

    struct CountingFrames {
        fired: Cell<u32>,
    }

    impl FrameCallback for CountingFrames {
        fn on_frame(&self, _frame_time: Duration) {
            self.fired.set(self.fired.get() + 1);
        }
    }

    #[test]
    fn test_frame_callback_fires_once_until_reposted() {
        let run_loop = RunLoop::new();
        let callback = Rc::new(CountingFrames { fired: Cell::new(0) });
        let as_dyn: Rc<dyn FrameCallback> = callback.clone();

        run_loop.post_frame_callback(as_dyn.clone());
        run_loop.render_frame();
        run_loop.render_frame();
        assert_eq!(callback.fired.get(), 1);

        run_loop.post_frame_callback(as_dyn.clone());
        run_loop.remove_frame_callback(&as_dyn);
        run_loop.render_frame();
        assert_eq!(callback.fired.get(), 1);
    }
}
