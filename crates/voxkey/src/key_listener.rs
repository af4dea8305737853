//! Global keyboard hook.
//!
//! A dedicated thread runs the rdev event loop and classifies every key
//! press/release for the controller: hotkey edges drive recording, any
//! other key while the hotkey is held signals a chord (cancel). Mouse
//! events are ignored.

use crate::{AppError, AppResult};

use std::panic::Location;
use std::time::Duration;

use error_location::ErrorLocation;
use rdev::{Event, EventType, Key};
use tokio::sync::mpsc;
use tracing::info;

/// The dedicated dictation key.
pub(crate) const HOTKEY: Key = Key::CapsLock;

/// How long to wait for the hook thread to fail before assuming it is up.
/// `rdev::listen` blocks forever on success, so there is no positive
/// confirmation; an install error returns promptly.
const INSTALL_PROBE_TIMEOUT: Duration = Duration::from_millis(500);

/// A classified keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyActivity {
    /// The hotkey went down (possibly an OS key-repeat).
    HotkeyPressed,
    /// The hotkey came up.
    HotkeyReleased,
    /// Some other key was pressed or released.
    OtherKey,
}

/// Owns nothing; the hook thread lives for the process lifetime.
pub struct KeyListener;

impl KeyListener {
    /// Install the global hook and forward classified events on `events`.
    ///
    /// Returns an error if the hook cannot be installed (missing
    /// permissions, no display server). On success the hook thread keeps
    /// running until the process exits.
    #[track_caller]
    pub fn spawn(events: mpsc::UnboundedSender<KeyActivity>) -> AppResult<()> {
        let (failed_tx, failed_rx) = std::sync::mpsc::channel::<String>();

        std::thread::Builder::new()
            .name("voxkey-keys".into())
            .spawn(move || {
                let result = rdev::listen(move |event: Event| {
                    let activity = match event.event_type {
                        EventType::KeyPress(key) if key == HOTKEY => KeyActivity::HotkeyPressed,
                        EventType::KeyRelease(key) if key == HOTKEY => KeyActivity::HotkeyReleased,
                        EventType::KeyPress(_) | EventType::KeyRelease(_) => KeyActivity::OtherKey,
                        _ => return,
                    };
                    let _ = events.send(activity);
                });
                if let Err(e) = result {
                    let _ = failed_tx.send(format!("{:?}", e));
                }
            })?;

        match failed_rx.recv_timeout(INSTALL_PROBE_TIMEOUT) {
            Ok(reason) => Err(AppError::HookInstallFailed {
                reason,
                location: ErrorLocation::from(Location::caller()),
            }),
            // Timeout means listen() is blocking, i.e. the hook is live.
            Err(_) => {
                info!(hotkey = ?HOTKEY, "Global key hook installed");
                Ok(())
            }
        }
    }
}
