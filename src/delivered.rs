//! DeliveredInput - Immutable snapshot of one delivered input event
//!
//! Wraps the payload with its delivery timestamp, a frame counter, and the
//! action that ends the interaction's trace span. Snapshots are never mutated:
//! the frame counter advances by swapping a new snapshot into the holder, so a
//! reader that captured the frame-N snapshot never observes the N+1 bump.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

/// One-shot action that ends the interaction's trace span.
pub type TraceEnd = Box<dyn FnOnce()>;

/// Immutable snapshot of one input event's delivery metadata.
///
/// The span-close action is shared across the snapshot lineage (the original
/// and every copy produced by [`increase_frame_count`]) and is consumable at
/// most once across all of them, from any code path.
///
/// [`increase_frame_count`]: DeliveredInput::increase_frame_count
pub struct DeliveredInput<T> {
    event: T,
    delivery_time: Duration,
    frames_since_delivery: u32,
    trace_end: Rc<Cell<Option<TraceEnd>>>,
}

impl<T> DeliveredInput<T> {
    /// Create a snapshot at frame count 0 with the given span-close action.
    pub fn new(event: T, delivery_time: Duration, trace_end: impl FnOnce() + 'static) -> Self {
        Self {
            event,
            delivery_time,
            frames_since_delivery: 0,
            trace_end: Rc::new(Cell::new(Some(Box::new(trace_end)))),
        }
    }

    /// The input payload.
    pub fn event(&self) -> &T {
        &self.event
    }

    /// Monotonic uptime at interception.
    pub fn delivery_time(&self) -> Duration {
        self.delivery_time
    }

    /// Rendered frames since delivery. Only meaningful for pointer releases;
    /// always 0 for key events.
    pub fn frames_since_delivery(&self) -> u32 {
        self.frames_since_delivery
    }

    /// Take ownership of the span-close action.
    ///
    /// Returns the action the first time it is called across the whole
    /// snapshot lineage and `None` on every subsequent call, whichever copy
    /// or code path asks. This is what keeps the span from being closed
    /// twice when both the dispatch-sandwich cleanup and a teardown task run.
    pub fn take_over_trace_end(&self) -> Option<TraceEnd> {
        self.trace_end.take()
    }
}

impl<T: Clone> DeliveredInput<T> {
    /// Produce the next snapshot with the frame counter advanced by one.
    ///
    /// The span-close action is shared with `self`, not duplicated.
    pub fn increase_frame_count(&self) -> Self {
        Self {
            event: self.event.clone(),
            delivery_time: self.delivery_time,
            frames_since_delivery: self.frames_since_delivery + 1,
            trace_end: Rc::clone(&self.trace_end),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for DeliveredInput<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeliveredInput")
            .field("event", &self.event)
            .field("delivery_time", &self.delivery_time)
            .field("frames_since_delivery", &self.frames_since_delivery)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// TESTS
// =============================================================================
