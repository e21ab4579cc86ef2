//! Runtime Module - Capabilities consumed from the host runtime
//!
//! The tracker never owns a queue or a frame clock; it schedules work on the
//! host runtime's single-threaded main queue and frame scheduler through these
//! traits. All tasks must be posted to, and only ever run on, the one thread
//! that drives dispatch - that confinement is what makes the rest of the crate
//! lock-free.
//!
//! [`RunLoop`](crate::runloop::RunLoop) implements both traits for headless
//! runtimes and tests.

use std::rc::Rc;
use std::time::Duration;

/// A unit of work posted to the main queue.
///
/// Tasks are identified by their `Rc` allocation: posting a clone of the same
/// `Rc` posts the same task identity, which is what
/// [`MainQueue::remove_callbacks`] cancels by.
pub type Task = Rc<dyn Fn()>;

/// Single-threaded main queue that also drives UI dispatch and rendering.
///
/// Tasks posted earlier for the same target time run in post order.
pub trait MainQueue {
    /// Monotonic uptime, the timebase for [`post_at_time`](Self::post_at_time).
    fn uptime(&self) -> Duration;

    /// Run the task on a future turn of the queue, after pending work.
    fn post(&self, task: Task);

    /// Run the task on the next turn, before other pending work.
    fn post_at_front(&self, task: Task);

    /// Run the task once uptime reaches `at`. A target already in the past
    /// runs on the next turn.
    fn post_at_time(&self, task: Task, at: Duration);

    /// Cancel every pending occurrence of this task identity
    /// (compared by `Rc::ptr_eq`). A no-op if none is pending.
    fn remove_callbacks(&self, task: &Task);
}

/// Callback invoked once per rendered frame while subscribed.
pub trait FrameCallback {
    fn on_frame(&self, frame_time: Duration);
}

/// Frame scheduler with post/remove semantics: a posted callback fires on the
/// next rendered frame and is then unsubscribed; callbacks resubscribe
/// themselves to keep firing.
pub trait FrameScheduler {
    fn post_frame_callback(&self, callback: Rc<dyn FrameCallback>);

    /// Unsubscribe by identity (`Rc::ptr_eq`). A no-op if not subscribed.
    fn remove_frame_callback(&self, callback: &Rc<dyn FrameCallback>);
}
