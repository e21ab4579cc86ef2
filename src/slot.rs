//! Slot Module - Thread-scoped exposure of the event being handled
//!
//! The slots are not in charge of holding the event holder for its lifecycle.
//! They expose it during specific windows (sandwiching handler invocations) so
//! that application code can reach back from inside a click or key handler and
//! capture the event that triggered it. The sandwiching also ensures that a
//! read outside such a window finds nothing, even while the holder is still
//! alive elsewhere.
//!
//! Storage is per-thread: a read from any thread other than the dispatch
//! thread always observes empty.
//!
//! # API
//!
//! - `pointer_event_triggering_click` - Snapshot of the release driving the current click
//! - `current_key_event` - Snapshot of the key event being dispatched

use std::cell::RefCell;
use std::rc::Rc;

use crate::delivered::DeliveredInput;
use crate::event::{KeyEvent, PointerEvent};
use crate::holder::FrameCountingHolder;

thread_local! {
    static POINTER_CLICK: RefCell<Option<Rc<FrameCountingHolder>>> = const { RefCell::new(None) };
    static CURRENT_KEY: RefCell<Option<Rc<DeliveredInput<KeyEvent>>>> = const { RefCell::new(None) };
}

// =============================================================================
// READ PATH
// =============================================================================

/// The pointer release currently triggering a click, if this call happens
/// inside a dispatch sandwich on the dispatch thread. Empty everywhere else.
pub fn pointer_event_triggering_click() -> Option<Rc<DeliveredInput<PointerEvent>>> {
    POINTER_CLICK.with(|slot| slot.borrow().as_ref().map(|holder| holder.current()))
}

/// The key event currently being dispatched, if this call happens inside the
/// synchronous extent of its dispatch on the dispatch thread.
pub fn current_key_event() -> Option<Rc<DeliveredInput<KeyEvent>>> {
    CURRENT_KEY.with(|slot| slot.borrow().clone())
}

// =============================================================================
// WRITE PATH (interceptors only)
// =============================================================================

pub(crate) fn set_pointer_slot(holder: Option<Rc<FrameCountingHolder>>) {
    POINTER_CLICK.with(|slot| *slot.borrow_mut() = holder);
}

/// Clear the pointer slot only if it still holds this exact holder. A stale
/// teardown must not clobber a newer gesture's holder.
pub(crate) fn clear_pointer_slot_if(holder: &Rc<FrameCountingHolder>) {
    POINTER_CLICK.with(|slot| {
        let mut slot = slot.borrow_mut();
        if slot.as_ref().is_some_and(|current| Rc::ptr_eq(current, holder)) {
            *slot = None;
        }
    });
}

pub(crate) fn set_key_slot(input: Option<Rc<DeliveredInput<KeyEvent>>>) {
    CURRENT_KEY.with(|slot| *slot.borrow_mut() = input);
}

/// Clears the pointer slot when dropped. Covers every exit path out of the
/// dispatch sandwich, including a panicking dispatch.
pub(crate) struct PointerSlotClearGuard;

impl Drop for PointerSlotClearGuard {
    fn drop(&mut self) {
        set_pointer_slot(None);
    }
}

/// Reset both slots. For tests.
pub fn reset_slots() {
    set_pointer_slot(None);
    set_key_slot(None);
}

// =============================================================================
// TESTS
// =============================================================================
