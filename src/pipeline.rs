//! Pipeline Module - Surface dispatch chain and pressed-widget state
//!
//! A [`Surface`] is the tracker's view of one UI window: an ordered chain of
//! input interceptors in front of the runtime's own dispatch, plus the reactive
//! pressed-widget state the pointer interceptor probes after a release.
//!
//! Interceptors registered earlier run before interceptors registered later,
//! and every stage must pass the dispatch result through unchanged.
//!
//! # API
//!
//! - `Surface::new(base_pointer, base_key)` - Surface with the runtime's handlers
//! - `dispatch_pointer` / `dispatch_key` - Drive an event through the chain
//! - `add_pointer_interceptor` / `add_key_interceptor` - Extend the chain
//! - `set_pressed_widget` / `pressed_widget` - Pressed visual state

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use spark_signals::{Signal, signal};

use crate::event::{KeyEvent, PointerEvent};

// =============================================================================
// WIDGET TRAITS
// =============================================================================

bitflags::bitflags! {
    /// Behavior flags of the widget class under the pointer.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct WidgetTraits: u8 {
        const FOCUSABLE = 1 << 0;
        const SCROLLABLE = 1 << 1;
        /// List-style widgets post their click callback after the pressed
        /// state duration instead of firing it synchronously on release.
        const DEFERS_CLICK = 1 << 2;
    }
}

/// Default extra delay before a deferred-click widget fires its click.
pub const DEFAULT_DEFERRED_CLICK_DELAY: Duration = Duration::from_millis(64);

// =============================================================================
// INTERCEPTORS
// =============================================================================

/// Pointer stage in the dispatch chain. Must forward the event by calling
/// `dispatch` and return its result unchanged; must not drop or reorder
/// events.
pub trait PointerInterceptor {
    fn intercept(
        &self,
        event: &PointerEvent,
        dispatch: &mut dyn FnMut(&PointerEvent) -> bool,
    ) -> bool;
}

/// Key stage in the dispatch chain. Same forwarding contract as
/// [`PointerInterceptor`].
pub trait KeyInterceptor {
    fn intercept(&self, event: &KeyEvent, dispatch: &mut dyn FnMut(&KeyEvent) -> bool) -> bool;
}

// =============================================================================
// SURFACE
// =============================================================================

/// One UI window's dispatch pipeline and interaction state.
pub struct Surface {
    pointer_chain: RefCell<Vec<Rc<dyn PointerInterceptor>>>,
    key_chain: RefCell<Vec<Rc<dyn KeyInterceptor>>>,
    base_pointer: Rc<dyn Fn(&PointerEvent) -> bool>,
    base_key: Rc<dyn Fn(&KeyEvent) -> bool>,
    pressed: Signal<Option<WidgetTraits>>,
    deferred_click_delay: Cell<Duration>,
    attach_count: Cell<u32>,
}

impl Surface {
    /// Create a surface around the runtime's own pointer and key handlers.
    pub fn new(
        base_pointer: impl Fn(&PointerEvent) -> bool + 'static,
        base_key: impl Fn(&KeyEvent) -> bool + 'static,
    ) -> Rc<Self> {
        Rc::new(Self {
            pointer_chain: RefCell::new(Vec::new()),
            key_chain: RefCell::new(Vec::new()),
            base_pointer: Rc::new(base_pointer),
            base_key: Rc::new(base_key),
            pressed: signal(None),
            deferred_click_delay: Cell::new(DEFAULT_DEFERRED_CLICK_DELAY),
            attach_count: Cell::new(0),
        })
    }

    /// How many times this surface has been attached.
    pub fn attach_count(&self) -> u32 {
        self.attach_count.get()
    }

    /// Record an attachment. Called by the runtime when the surface goes live.
    pub fn attach(&self) {
        self.attach_count.set(self.attach_count.get() + 1);
    }

    /// Append a pointer interceptor. It runs after every interceptor added
    /// before it and before the base handler.
    pub fn add_pointer_interceptor(&self, interceptor: Rc<dyn PointerInterceptor>) {
        self.pointer_chain.borrow_mut().push(interceptor);
    }

    /// Append a key interceptor.
    pub fn add_key_interceptor(&self, interceptor: Rc<dyn KeyInterceptor>) {
        self.key_chain.borrow_mut().push(interceptor);
    }

    /// Drive a pointer event through the chain down to the base handler.
    /// Returns true if the event was consumed.
    pub fn dispatch_pointer(&self, event: &PointerEvent) -> bool {
        let chain = self.pointer_chain.borrow().clone();
        dispatch_pointer_chain(&chain, 0, event, &self.base_pointer)
    }

    /// Drive a key event through the chain down to the base handler.
    pub fn dispatch_key(&self, event: &KeyEvent) -> bool {
        let chain = self.key_chain.borrow().clone();
        dispatch_key_chain(&chain, 0, event, &self.base_key)
    }

    /// Mark the widget class currently showing a pressed visual state.
    /// Usually called by the runtime's base handler.
    pub fn set_pressed_widget(&self, traits: WidgetTraits) {
        self.pressed.set(Some(traits));
    }

    /// Clear the pressed visual state.
    pub fn clear_pressed_widget(&self) {
        self.pressed.set(None);
    }

    /// Traits of the pressed widget, if any.
    pub fn pressed_widget(&self) -> Option<WidgetTraits> {
        self.pressed.get()
    }

    /// True when the pressed widget posts its click after an extra delay.
    pub fn pressed_widget_defers_click(&self) -> bool {
        self.pressed.get().is_some_and(|traits| traits.contains(WidgetTraits::DEFERS_CLICK))
    }

    /// Extra delay before a deferred-click widget fires its click.
    pub fn deferred_click_delay(&self) -> Duration {
        self.deferred_click_delay.get()
    }

    pub fn set_deferred_click_delay(&self, delay: Duration) {
        self.deferred_click_delay.set(delay);
    }
}

fn dispatch_pointer_chain(
    chain: &[Rc<dyn PointerInterceptor>],
    index: usize,
    event: &PointerEvent,
    base: &Rc<dyn Fn(&PointerEvent) -> bool>,
) -> bool {
    match chain.get(index) {
        Some(interceptor) => {
            interceptor.intercept(event, &mut |e| dispatch_pointer_chain(chain, index + 1, e, base))
        }
        None => base(event),
    }
}

fn dispatch_key_chain(
    chain: &[Rc<dyn KeyInterceptor>],
    index: usize,
    event: &KeyEvent,
    base: &Rc<dyn Fn(&KeyEvent) -> bool>,
) -> bool {
    match chain.get(index) {
        Some(interceptor) => {
            interceptor.intercept(event, &mut |e| dispatch_key_chain(chain, index + 1, e, base))
        }
        None => base(event),
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::PointerButton;

    struct Tagging {
        tag: &'static str,
        log: Rc<RefCell<Vec<&'static str>>>,
    }

    impl PointerInterceptor for Tagging {
        fn intercept(
            &self,
            event: &PointerEvent,
            dispatch: &mut dyn FnMut(&PointerEvent) -> bool,
        ) -> bool {
            self.log.borrow_mut().push(self.tag);
            dispatch(event)
        }
    }

    #[test]
    fn test_chain_runs_in_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let base_log = log.clone();
        let surface = Surface::new(
            move |_| {
                base_log.borrow_mut().push("base");
                true
            },
            |_| false,
        );

        surface.add_pointer_interceptor(Rc::new(Tagging { tag: "first", log: log.clone() }));
        surface.add_pointer_interceptor(Rc::new(Tagging { tag: "second", log: log.clone() }));

        let consumed = surface.dispatch_pointer(&PointerEvent::down(PointerButton::Left, 0, 0));
        assert!(consumed);
        assert_eq!(*log.borrow(), vec!["first", "second", "base"]);
    }

    #[test]
    fn test_result_passes_through_unchanged() {
        let surface = Surface::new(|event: &PointerEvent| event.is_release(), |_| false);
        surface.add_pointer_interceptor(Rc::new(Tagging {
            tag: "stage",
            log: Rc::new(RefCell::new(Vec::new())),
        }));

        assert!(surface.dispatch_pointer(&PointerEvent::up(PointerButton::Left, 0, 0)));
        assert!(!surface.dispatch_pointer(&PointerEvent::down(PointerButton::Left, 0, 0)));
    }

    #[test]
    fn test_pressed_widget_state() {
        let surface = Surface::new(|_| false, |_| false);
        assert!(surface.pressed_widget().is_none());
        assert!(!surface.pressed_widget_defers_click());

        surface.set_pressed_widget(WidgetTraits::FOCUSABLE);
        assert!(!surface.pressed_widget_defers_click());

        surface.set_pressed_widget(WidgetTraits::DEFERS_CLICK | WidgetTraits::FOCUSABLE);
        assert!(surface.pressed_widget_defers_click());

        surface.clear_pressed_widget();
        assert!(surface.pressed_widget().is_none());
    }

    #[test]
    fn test_attach_count() {
        let surface = Surface::new(|_| false, |_| false);
        assert_eq!(surface.attach_count(), 0);
        surface.attach();
        assert_eq!(surface.attach_count(), 1);
    }
}
