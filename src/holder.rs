//! FrameCountingHolder - Frame-counted cell for one release gesture
//!
//! Holds the live [`DeliveredInput`] for a pointer release and advances its
//! frame counter while subscribed to the frame scheduler. The input is swapped
//! by reference, never mutated: each frame produces a fresh snapshot so code
//! that captured the previous one keeps seeing the old count.
//!
//! Exactly one holder exists per release gesture; overlapping gestures each
//! get their own.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use crate::delivered::DeliveredInput;
use crate::event::PointerEvent;
use crate::runtime::{FrameCallback, FrameScheduler, MainQueue};

/// Mutable cell holding the current [`DeliveredInput`] for a release gesture.
pub struct FrameCountingHolder {
    input: RefCell<Rc<DeliveredInput<PointerEvent>>>,
    queue: Rc<dyn MainQueue>,
    frames: Rc<dyn FrameScheduler>,
    this: Weak<Self>,
}

impl FrameCountingHolder {
    pub fn new(
        input: Rc<DeliveredInput<PointerEvent>>,
        queue: Rc<dyn MainQueue>,
        frames: Rc<dyn FrameScheduler>,
    ) -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            input: RefCell::new(input),
            queue,
            frames,
            this: this.clone(),
        })
    }

    /// The current snapshot. Callers keep whatever frame count it carried at
    /// the time of the call.
    pub fn current(&self) -> Rc<DeliveredInput<PointerEvent>> {
        self.input.borrow().clone()
    }

    /// Subscribe to the frame scheduler and start counting frames.
    pub fn start_counting(&self) {
        if let Some(this) = self.this.upgrade() {
            self.frames.post_frame_callback(this);
        }
    }

    /// Unsubscribe from the frame scheduler.
    pub fn stop_counting(&self) {
        if let Some(this) = self.this.upgrade() {
            let callback: Rc<dyn FrameCallback> = this;
            self.frames.remove_frame_callback(&callback);
        }
    }
}

impl FrameCallback for FrameCountingHolder {
    fn on_frame(&self, _frame_time: Duration) {
        let Some(this) = self.this.upgrade() else {
            return;
        };
        // The bump runs at the front of the next queue turn, not inline. An
        // event consumed within the frame that triggered this callback is not
        // charged for that frame.
        let holder = this.clone();
        self.queue.post_at_front(Rc::new(move || {
            let bumped = holder.input.borrow().increase_frame_count();
            *holder.input.borrow_mut() = Rc::new(bumped);
        }));
        self.frames.post_frame_callback(this);
    }
}

// =============================================================================
// TESTS
// =============================================================================
