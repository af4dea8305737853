//! Text injection via clipboard + paste chord.
//!
//! Copies the transcription to the clipboard and simulates the platform
//! paste shortcut into the focused window. Runs on the recognition worker
//! thread, so plain blocking sleeps are fine here.

use crate::{AppError, AppResult, PasteKeyGuard};

use std::panic::Location;
use std::time::Duration;

use arboard::Clipboard;
use error_location::ErrorLocation;
use tracing::{debug, info, instrument, warn};

/// Attempts to acquire/write the clipboard before giving up. The clipboard
/// is a shared OS resource and is routinely held by another process for a
/// few milliseconds.
const CLIPBOARD_ATTEMPTS: u32 = 5;

/// Backoff between clipboard attempts.
const CLIPBOARD_RETRY_DELAY: Duration = Duration::from_millis(50);

/// Delay between clipboard write and paste simulation, giving the OS
/// clipboard manager time to process the write.
const CLIPBOARD_SETTLE_DELAY: Duration = Duration::from_millis(50);

/// Gap between simulated key events; some applications and input method
/// editors drop events that arrive back-to-back.
const KEY_EVENT_DELAY: Duration = Duration::from_millis(10);

/// Injects text into the focused application.
pub trait TextInjector: Send {
    /// Place `text` at the current cursor position.
    fn inject(&mut self, text: &str) -> AppResult<()>;
}

/// Clipboard-and-paste text injection.
pub struct OutputHandler {
    pub(crate) clipboard: Clipboard,
}

impl OutputHandler {
    /// Create a new output handler.
    #[track_caller]
    #[instrument]
    pub fn new() -> AppResult<Self> {
        let clipboard = Clipboard::new().map_err(|e| AppError::ClipboardError {
            reason: format!("Failed to initialize clipboard: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!("OutputHandler initialized");

        Ok(Self { clipboard })
    }

    /// Write `text` to the clipboard, retrying transient failures.
    #[track_caller]
    pub(crate) fn set_clipboard(&mut self, text: &str) -> AppResult<()> {
        let mut attempt = 1;
        loop {
            match self.clipboard.set_text(text) {
                Ok(()) => return Ok(()),
                Err(e) if attempt < CLIPBOARD_ATTEMPTS => {
                    warn!(attempt, error = %e, "Clipboard write failed, retrying");
                    attempt += 1;
                    std::thread::sleep(CLIPBOARD_RETRY_DELAY);
                }
                Err(e) => {
                    return Err(AppError::ClipboardError {
                        reason: format!("Failed to set clipboard: {}", e),
                        location: ErrorLocation::from(Location::caller()),
                    });
                }
            }
        }
    }

    /// Simulate the platform paste chord.
    ///
    /// RAII: `PasteKeyGuard` releases the modifier on drop even if the
    /// inner key event fails, so a failure cannot leave the keyboard with
    /// a stuck modifier.
    #[track_caller]
    fn paste(&mut self) -> AppResult<()> {
        use enigo::{Direction, Key, Keyboard};

        let mut guard = PasteKeyGuard::new()?;

        std::thread::sleep(KEY_EVENT_DELAY);

        guard
            .enigo_mut()
            .key(Key::Unicode('v'), Direction::Click)
            .map_err(|e| AppError::InjectionFailed {
                reason: format!("Failed to press V: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        std::thread::sleep(KEY_EVENT_DELAY);

        // Guard drops here, releasing the modifier.
        Ok(())
    }
}

impl TextInjector for OutputHandler {
    #[instrument(skip(self, text))]
    fn inject(&mut self, text: &str) -> AppResult<()> {
        if text.is_empty() {
            return Ok(());
        }

        self.set_clipboard(text)?;
        debug!(text_len = text.len(), "Text copied to clipboard");

        std::thread::sleep(CLIPBOARD_SETTLE_DELAY);

        if let Err(e) = self.paste() {
            // The text is at least on the clipboard for a manual paste.
            warn!(error = ?e, "Paste simulation failed, text left on clipboard");
            return Err(e);
        }

        info!(text_len = text.len(), "Text injected");

        Ok(())
    }
}
