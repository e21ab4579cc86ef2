//! Trace Module - Span sink for interaction tracing
//!
//! Interactions emit asynchronous begin/end span pairs keyed by
//! `(name, cookie)` plus synchronous sections bracketing dispatch work. The
//! sink is an external backend behind [`TraceSink`]; the default emits
//! `tracing` events. Ending an async span twice is a backend error, which is
//! why span closes go through the claim-once capability on
//! [`DeliveredInput`](crate::delivered::DeliveredInput) rather than this
//! module.
//!
//! # API
//!
//! - `begin_async_section` / `end_async_section` - Async span keyed by (name, cookie)
//! - `section(name, f)` - Sync section around `f`, balanced on every exit path
//! - `set_trace_sink` - Swap in a backend
//! - `set_tracing_enabled` - Process-wide kill switch

use std::cell::{Cell, RefCell};
use std::rc::Rc;

// =============================================================================
// SINK
// =============================================================================

/// External tracing backend.
pub trait TraceSink {
    fn begin_async_section(&self, name: &str, cookie: i32);
    fn end_async_section(&self, name: &str, cookie: i32);
    fn begin_section(&self, name: &str);
    fn end_section(&self);
}

/// Default sink: emits `tracing` events.
pub struct LogSink;

impl TraceSink for LogSink {
    fn begin_async_section(&self, name: &str, cookie: i32) {
        tracing::trace!(target: "frametap", section = name, cookie, "begin async section");
    }

    fn end_async_section(&self, name: &str, cookie: i32) {
        tracing::trace!(target: "frametap", section = name, cookie, "end async section");
    }

    fn begin_section(&self, name: &str) {
        tracing::trace!(target: "frametap", section = name, "begin section");
    }

    fn end_section(&self) {
        tracing::trace!(target: "frametap", "end section");
    }
}

thread_local! {
    static SINK: RefCell<Rc<dyn TraceSink>> = RefCell::new(Rc::new(LogSink));
    static ENABLED: Cell<bool> = const { Cell::new(true) };
}

/// Install a tracing backend for this thread.
pub fn set_trace_sink(sink: Rc<dyn TraceSink>) {
    SINK.with(|current| *current.borrow_mut() = sink);
}

/// Enable or disable all span emission.
pub fn set_tracing_enabled(enabled: bool) {
    ENABLED.with(|flag| flag.set(enabled));
}

fn with_sink(f: impl FnOnce(&dyn TraceSink)) {
    if !ENABLED.with(Cell::get) {
        return;
    }
    SINK.with(|sink| f(&**sink.borrow()));
}

// =============================================================================
// SECTIONS
// =============================================================================

pub fn begin_async_section(name: &str, cookie: i32) {
    with_sink(|sink| sink.begin_async_section(name, cookie));
}

pub fn end_async_section(name: &str, cookie: i32) {
    with_sink(|sink| sink.end_async_section(name, cookie));
}

/// Run `f` inside a synchronous section. The end is emitted on every exit
/// path, including unwinding.
pub fn section<R>(name: &str, f: impl FnOnce() -> R) -> R {
    with_sink(|sink| sink.begin_section(name));
    let _guard = SectionGuard;
    f()
}

struct SectionGuard;

impl Drop for SectionGuard {
    fn drop(&mut self) {
        with_sink(|sink| sink.end_section());
    }
}

// =============================================================================
// TESTS
// =============================================================================


#[cfg(test)]
mod tests {
    use super::test_sink::RecordingSink;
    use super::*;

    #[test]
    fn test_async_sections_reach_sink() {
        let sink = RecordingSink::install();
        begin_async_section("Tap Interaction", 1000);
        end_async_section("Tap Interaction", 1000);
        assert_eq!(
            sink.calls(),
            vec!["begin_async Tap Interaction 1000", "end_async Tap Interaction 1000"]
        );
    }

    #[test]
    fn test_sync_section_is_balanced() {
        let sink = RecordingSink::install();
        let result = section("Up", || 7);
        assert_eq!(result, 7);
        assert_eq!(sink.calls(), vec!["begin Up", "end"]);
    }

    #[test]
    fn test_sync_section_ends_on_panic() {
        let sink = RecordingSink::install();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            section("Up", || panic!("boom"));
        }));
        assert!(result.is_err());
        assert_eq!(sink.calls(), vec!["begin Up", "end"]);
    }

    #[test]
    fn test_disabled_emits_nothing() {
        let sink = RecordingSink::install();
        set_tracing_enabled(false);
        begin_async_section("Tap Interaction", 1);
        section("Up", || ());
        assert!(sink.calls().is_empty());
        set_tracing_enabled(true);
    }
}
