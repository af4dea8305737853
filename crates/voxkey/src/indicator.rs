//! The status indicator capability and its event-loop-proxy handle.

use crate::{IndicatorCommand, IndicatorState};

use tao::event_loop::EventLoopProxy;
use tracing::debug;

/// Visual feedback for controller state transitions.
///
/// All methods are fire-and-forget: the core never waits on the indicator
/// and a dead indicator must never stall dictation.
pub trait StatusIndicator: Send {
    /// A recording started.
    fn show(&self);
    /// A segment is being transcribed.
    fn processing(&self);
    /// Back to idle (segment handled, discarded, or cancelled).
    fn hide(&self);
}

/// Sends indicator state changes to the tray on the main thread.
#[derive(Clone)]
pub struct IndicatorHandle {
    proxy: EventLoopProxy<IndicatorCommand>,
}

impl IndicatorHandle {
    /// Wrap a tao event loop proxy.
    pub fn new(proxy: EventLoopProxy<IndicatorCommand>) -> Self {
        Self { proxy }
    }

    /// Ask the main thread to exit the event loop.
    pub fn terminate(&self) {
        let _ = self.proxy.send_event(IndicatorCommand::Shutdown);
    }

    fn set_state(&self, state: IndicatorState) {
        // The send only fails once the event loop is gone, at which point
        // indicator updates are moot.
        if self
            .proxy
            .send_event(IndicatorCommand::SetState(state))
            .is_err()
        {
            debug!(?state, "Indicator update dropped, event loop closed");
        }
    }
}

impl StatusIndicator for IndicatorHandle {
    fn show(&self) {
        self.set_state(IndicatorState::Recording);
    }

    fn processing(&self) {
        self.set_state(IndicatorState::Processing);
    }

    fn hide(&self) {
        self.set_state(IndicatorState::Idle);
    }
}
