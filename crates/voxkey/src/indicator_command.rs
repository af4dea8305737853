use crate::IndicatorState;

/// Commands sent to the main UI thread.
///
/// The main thread owns the tray indicator (`TrayIcon` is `!Send`), so all
/// indicator mutations and the final exit flow through this enum as tao
/// user events.
#[derive(Debug, Clone, Copy)]
pub enum IndicatorCommand {
    /// Switch the indicator to a new state.
    SetState(IndicatorState),
    /// Exit the event loop, terminating the process.
    Shutdown,
}
