//! Key Module - Key dispatch interceptor
//!
//! The synchronous analog of the pointer interceptor: key events are not
//! frame-tracked and have no deferred-click complication, so the exposure
//! window is exactly the synchronous extent of dispatch. The span begins at
//! interception and is closed by the unconditional cleanup, through the same
//! claim-once capability the pointer path uses.

use std::rc::Rc;

use crate::delivered::DeliveredInput;
use crate::event::KeyEvent;
use crate::pipeline::KeyInterceptor;
use crate::runtime::MainQueue;
use crate::{slot, trace};

/// Key stage installed in front of a surface's dispatch chain.
pub struct KeyTracker {
    queue: Rc<dyn MainQueue>,
}

impl KeyTracker {
    pub(crate) fn new(queue: Rc<dyn MainQueue>) -> Rc<Self> {
        Rc::new(Self { queue })
    }
}

impl KeyInterceptor for KeyTracker {
    fn intercept(&self, event: &KeyEvent, dispatch: &mut dyn FnMut(&KeyEvent) -> bool) -> bool {
        let section = event.trace_section_name();
        let now = self.queue.uptime();
        let cookie = (now.as_nanos() % i32::MAX as u128) as i32;
        trace::begin_async_section(&section, cookie);

        let input = Rc::new(DeliveredInput::new(event.clone(), now, {
            let section = section.clone();
            move || trace::end_async_section(&section, cookie)
        }));

        slot::set_key_slot(Some(input.clone()));
        let _cleanup = KeyCleanupGuard { input };
        dispatch(event)
    }
}

/// Clears the key slot and closes the span on every exit path out of the
/// dispatch sandwich, including a panicking dispatch.
struct KeyCleanupGuard {
    input: Rc<DeliveredInput<KeyEvent>>,
}

impl Drop for KeyCleanupGuard {
    fn drop(&mut self) {
        slot::set_key_slot(None);
        if let Some(end_trace) = self.input.take_over_trace_end() {
            end_trace();
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::KeyState;
    use crate::pipeline::Surface;
    use crate::runloop::RunLoop;
    use crate::trace::test_sink::RecordingSink;
    use std::cell::RefCell;
    use std::time::Duration;

    fn fixture() -> (Rc<RunLoop>, Rc<Surface>, Rc<RecordingSink>, Rc<RefCell<Vec<Option<String>>>>) {
        slot::reset_slots();
        let sink = RecordingSink::install();
        let run_loop = RunLoop::new();
        let seen: Rc<RefCell<Vec<Option<String>>>> = Rc::new(RefCell::new(Vec::new()));
        let surface = {
            let seen = seen.clone();
            Surface::new(
                |_| false,
                move |_event| {
                    seen.borrow_mut().push(
                        slot::current_key_event().map(|input| input.event().key.clone()),
                    );
                    true
                },
            )
        };
        surface.add_key_interceptor(KeyTracker::new(run_loop.clone()));
        (run_loop, surface, sink, seen)
    }

    #[test]
    fn test_slot_visible_only_during_dispatch() {
        let (_run_loop, surface, _sink, seen) = fixture();

        assert!(slot::current_key_event().is_none());
        let consumed = surface.dispatch_key(&KeyEvent::new("Enter"));
        assert!(consumed);

        assert_eq!(*seen.borrow(), vec![Some("Enter".to_string())]);
        assert!(slot::current_key_event().is_none());
    }

    #[test]
    fn test_span_named_for_key_and_closed_once() {
        let (run_loop, surface, sink, _seen) = fixture();
        run_loop.advance_to(Duration::from_millis(3));

        surface.dispatch_key(&KeyEvent::with_state("Enter", KeyState::Release));

        // Cookie derives from monotonic nanos: 3ms = 3_000_000ns.
        assert_eq!(sink.count_of("begin_async Release Enter Interaction 3000000"), 1);
        assert_eq!(sink.count_of("end_async Release Enter Interaction 3000000"), 1);
    }

    #[test]
    fn test_key_events_not_frame_tracked() {
        slot::reset_slots();
        let _sink = RecordingSink::install();
        let frames: Rc<RefCell<Option<u32>>> = Rc::new(RefCell::new(None));

        let surface = {
            let frames = frames.clone();
            Surface::new(
                |_| false,
                move |_event| {
                    *frames.borrow_mut() =
                        slot::current_key_event().map(|input| input.frames_since_delivery());
                    true
                },
            )
        };
        surface.add_key_interceptor(KeyTracker::new(RunLoop::new()));
        surface.dispatch_key(&KeyEvent::new("a"));

        assert_eq!(*frames.borrow(), Some(0));
    }

    #[test]
    fn test_cleanup_runs_when_dispatch_panics() {
        slot::reset_slots();
        let sink = RecordingSink::install();
        let run_loop = RunLoop::new();
        let surface = Surface::new(|_| false, |_event: &KeyEvent| panic!("handler failure"));
        surface.add_key_interceptor(KeyTracker::new(run_loop));

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            surface.dispatch_key(&KeyEvent::new("q"));
        }));
        assert!(result.is_err());

        assert!(slot::current_key_event().is_none());
        assert_eq!(sink.count_of("begin_async Press q Interaction 0"), 1);
        assert_eq!(sink.count_of("end_async Press q Interaction 0"), 1);
    }
}
