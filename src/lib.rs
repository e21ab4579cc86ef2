//! # frametap
//!
//! Input-to-frame latency instrumentation for single-threaded UI runtimes.
//!
//! frametap sits in front of a runtime's input dispatch chain and measures the
//! gap between an input event reaching dispatch and the moment application
//! logic consumes it, tagging elapsed frames so rendering jank can be
//! attributed to a specific input.
//!
//! ## Architecture
//!
//! ```text
//! raw event → interceptor → DeliveredInput (+ FrameCountingHolder for releases)
//!           → trace span begin → exposure slot windows → dispatch(event)
//!           → scheduled republish/teardown → span end (exactly once)
//! ```
//!
//! Handlers never receive the event from frametap directly; inside their own
//! click/key handler they read the thread-scoped slot
//! ([`pointer_event_triggering_click`] / [`current_key_event`]), which is only
//! populated during the narrow windows in which such a handler can run.
//!
//! Everything runs on the one thread that drives dispatch, frame callbacks,
//! and the main queue; all scheduling goes through the host runtime's
//! [`MainQueue`] and [`FrameScheduler`] (or the bundled deterministic
//! [`RunLoop`]).
//!
//! ## Modules
//!
//! - [`event`] - Pointer/key event types and crossterm bridging
//! - [`delivered`] - Immutable delivery snapshots with claim-once span close
//! - [`holder`] - Frame-counted cell per release gesture
//! - [`slot`] - Thread-scoped exposure windows (the read API)
//! - [`pipeline`] - Surface dispatch chain and pressed-widget state
//! - [`pointer`] / [`key`] - The dispatch interceptors
//! - [`tracker`] - Installation entry point
//! - [`runtime`] / [`runloop`] - Consumed scheduling capabilities and a
//!   deterministic implementation

pub mod delivered;
pub mod event;
pub mod holder;
pub mod key;
pub mod pipeline;
pub mod pointer;
pub mod runloop;
pub mod runtime;
pub mod slot;
pub mod trace;
pub mod tracker;

// Re-export commonly used items
pub use delivered::{DeliveredInput, TraceEnd};

pub use event::{
    KeyEvent, KeyState, Modifiers, PointerAction, PointerButton, PointerEvent, key_name,
};

pub use holder::FrameCountingHolder;

pub use pipeline::{
    DEFAULT_DEFERRED_CLICK_DELAY, KeyInterceptor, PointerInterceptor, Surface, WidgetTraits,
};

pub use pointer::TAP_INTERACTION_SECTION;

pub use runloop::RunLoop;

pub use runtime::{FrameCallback, FrameScheduler, MainQueue, Task};

pub use slot::{current_key_event, pointer_event_triggering_click};

pub use trace::{LogSink, TraceSink, set_trace_sink, set_tracing_enabled};

pub use tracker::{InputTracker, TrackerConfig};
