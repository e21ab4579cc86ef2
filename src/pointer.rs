//! Pointer Module - Pointer dispatch interceptor
//!
//! Intercepts every pointer event ahead of the rest of the dispatch chain,
//! wraps releases in a frame-counted holder paired with a "Tap Interaction"
//! span, and exposes the holder through the pointer slot during every window
//! in which a click handler might run: synchronously inside dispatch, on the
//! queue turn where the runtime fires posted clicks, and - for deferred-click
//! widgets - around the delayed click the platform posts later.
//!
//! Teardown runs exactly once per release holder and is idempotent across the
//! competing completion paths; the span close itself is guarded by the
//! claim-once capability on the input.

use std::rc::{Rc, Weak};
use std::time::Duration;

use crate::delivered::DeliveredInput;
use crate::event::PointerEvent;
use crate::holder::FrameCountingHolder;
use crate::pipeline::{PointerInterceptor, Surface};
use crate::runtime::{FrameScheduler, MainQueue, Task};
use crate::{slot, trace};

/// Span name for pointer release gestures.
pub const TAP_INTERACTION_SECTION: &str = "Tap Interaction";

/// The deferred publish lands one tick before the platform fires the click.
const DEFERRED_PUBLISH_LEAD: Duration = Duration::from_millis(1);

/// Pointer stage installed in front of a surface's dispatch chain.
pub struct PointerTracker {
    queue: Rc<dyn MainQueue>,
    frames: Rc<dyn FrameScheduler>,
    surface: Weak<Surface>,
}

impl PointerTracker {
    pub(crate) fn new(
        queue: Rc<dyn MainQueue>,
        frames: Rc<dyn FrameScheduler>,
        surface: Weak<Surface>,
    ) -> Rc<Self> {
        Rc::new(Self { queue, frames, surface })
    }
}

impl PointerInterceptor for PointerTracker {
    // Note: two taps in a single dispatch loop simply post
    // (publish, click, teardown, publish, click, teardown) in order.
    fn intercept(
        &self,
        event: &PointerEvent,
        dispatch: &mut dyn FnMut(&PointerEvent) -> bool,
    ) -> bool {
        let delivery_time = self.queue.uptime();
        let is_release = event.is_release();

        // The holder swaps immutable snapshots so a handler that captured the
        // input at frame N never observes the bump to N + 1. The event is
        // cloned because the pipeline may recycle its own copy.
        let holder = if is_release {
            let cookie = (delivery_time.as_millis() % i32::MAX as u128) as i32;
            trace::begin_async_section(TAP_INTERACTION_SECTION, cookie);
            let input = Rc::new(DeliveredInput::new(event.clone(), delivery_time, move || {
                trace::end_async_section(TAP_INTERACTION_SECTION, cookie);
            }));
            let holder = FrameCountingHolder::new(input, self.queue.clone(), self.frames.clone());
            holder.start_counting();
            Some(holder)
        } else {
            None
        };

        let publish: Option<Task> = holder.clone().map(|holder| {
            Rc::new(move || slot::set_pointer_slot(Some(holder.clone()))) as Task
        });

        // The runtime posts click callbacks when it receives the release, so
        // the slot must also be visible on the turn those callbacks run.
        if let Some(publish) = &publish {
            self.queue.post(publish.clone());
        }

        let result = trace::section(event.action.name(), || {
            // Storing in case the release immediately triggers a click.
            slot::set_pointer_slot(holder.clone());
            let _clear = slot::PointerSlotClearGuard;
            dispatch(event)
        });

        if let (Some(holder), Some(publish)) = (holder, publish) {
            let teardown: Task = {
                let holder = holder.clone();
                Rc::new(move || {
                    holder.stop_counting();
                    if let Some(end_trace) = holder.current().take_over_trace_end() {
                        end_trace();
                    }
                    // An overlapping newer gesture may already own the slot.
                    slot::clear_pointer_slot_if(&holder);
                })
            };

            let dispatch_end = self.queue.uptime();
            let surface = self.surface.upgrade();
            let deferred = trace::section("find_pressed_widget", || {
                surface.as_ref().is_some_and(|s| s.pressed_widget_defers_click())
            });

            if deferred {
                // A deferred-click widget fires its click `delay` after the
                // press state was set: make the slot visible one tick before
                // that and tear down right after.
                let delay = surface
                    .map(|s| s.deferred_click_delay())
                    .unwrap_or(crate::pipeline::DEFAULT_DEFERRED_CLICK_DELAY);
                tracing::debug!(
                    target: "frametap",
                    delay_ms = delay.as_millis() as u64,
                    "deferred-click widget pressed, rescheduling publish"
                );
                self.queue.remove_callbacks(&publish);
                self.queue.post_at_time(
                    publish,
                    (delivery_time + delay).saturating_sub(DEFERRED_PUBLISH_LEAD),
                );
                self.queue.post_at_time(teardown, dispatch_end + delay);
            } else {
                self.queue.post(teardown);
            }
        }

        result
    }
}

// =============================================================================
// TESTS
// =============================================================================
