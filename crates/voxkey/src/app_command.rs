/// Why the process is going down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// A recognized utterance matched the stop-phrase set.
    StopPhrase,
    /// The user picked Exit from the tray menu.
    TrayExit,
}

/// Commands sent to the main application loop.
#[derive(Debug, Clone, Copy)]
pub enum AppCommand {
    /// Request application shutdown.
    Shutdown {
        /// What triggered the shutdown.
        reason: ShutdownReason,
    },
}
