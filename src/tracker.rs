//! Tracker Module - Installation and surface hookup
//!
//! [`InputTracker`] is installed once per process with the host runtime's
//! queue and frame scheduler, then notified whenever the runtime creates a
//! surface. A surface is instrumented only on its first appearance (attach
//! count 0), so a runtime that re-announces a live surface does not stack a
//! second set of interceptors.
//!
//! # Example
//!
//! ```ignore
//! use frametap::{InputTracker, RunLoop, Surface, TrackerConfig};
//!
//! let run_loop = RunLoop::new();
//! let tracker = InputTracker::install(&TrackerConfig::default(), run_loop.clone(), run_loop.clone());
//!
//! let surface = Surface::new(pointer_handler, key_handler);
//! tracker.on_surface_added(&surface);
//! surface.attach();
//! ```

use std::rc::Rc;

use crate::key::KeyTracker;
use crate::pipeline::Surface;
use crate::pointer::PointerTracker;
use crate::runtime::{FrameScheduler, MainQueue};

/// Installation-time configuration, read once.
#[derive(Clone, Debug)]
pub struct TrackerConfig {
    /// Globally enables or disables all input instrumentation.
    pub track_input_events: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self { track_input_events: true }
    }
}

/// Entry point wiring the interceptors into new surfaces.
pub struct InputTracker {
    queue: Rc<dyn MainQueue>,
    frames: Rc<dyn FrameScheduler>,
    enabled: bool,
}

impl InputTracker {
    /// Install the tracker for this process. The configuration flag is read
    /// here and never again.
    pub fn install(
        config: &TrackerConfig,
        queue: Rc<dyn MainQueue>,
        frames: Rc<dyn FrameScheduler>,
    ) -> Rc<Self> {
        if config.track_input_events {
            tracing::debug!(target: "frametap", "input tracking installed");
        } else {
            tracing::debug!(target: "frametap", "input tracking disabled by config");
        }
        Rc::new(Self {
            queue,
            frames,
            enabled: config.track_input_events,
        })
    }

    /// Instrument a newly created surface. Safe to call more than once for
    /// the same surface: anything already attached is left alone.
    pub fn on_surface_added(&self, surface: &Rc<Surface>) {
        if !self.enabled {
            return;
        }
        if surface.attach_count() != 0 {
            return;
        }
        tracing::debug!(target: "frametap", "instrumenting surface");
        surface.add_pointer_interceptor(PointerTracker::new(
            self.queue.clone(),
            self.frames.clone(),
            Rc::downgrade(surface),
        ));
        surface.add_key_interceptor(KeyTracker::new(self.queue.clone()));
    }
}

// =============================================================================
// TESTS
// =============================================================================
