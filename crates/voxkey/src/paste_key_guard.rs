use crate::{AppError, AppResult};

use std::panic::Location;

use enigo::{Direction, Enigo, Key, Keyboard, Settings};
use error_location::ErrorLocation;

/// Platform paste modifier: Cmd on macOS, Ctrl elsewhere.
fn paste_modifier() -> Key {
    #[cfg(target_os = "macos")]
    {
        Key::Meta
    }
    #[cfg(not(target_os = "macos"))]
    {
        Key::Control
    }
}

/// RAII guard holding the paste modifier down.
///
/// Owns the `Enigo` instance so every key operation between press and
/// release goes through it. The drop impl releases the modifier with
/// best-effort semantics: if even the release fails, the OS resets modifier
/// state on the user's next physical key event.
pub struct PasteKeyGuard {
    enigo: Enigo,
    modifier: Key,
}

impl PasteKeyGuard {
    /// Press the paste modifier; releasing happens on drop.
    #[track_caller]
    pub(crate) fn new() -> AppResult<Self> {
        let modifier = paste_modifier();

        let mut enigo = Enigo::new(&Settings::default()).map_err(|e| AppError::InjectionFailed {
            reason: format!("Failed to create keyboard simulator: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        enigo
            .key(modifier, Direction::Press)
            .map_err(|e| AppError::InjectionFailed {
                reason: format!("Failed to press paste modifier: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        Ok(Self { enigo, modifier })
    }

    /// Key operations while the modifier is held.
    pub(crate) fn enigo_mut(&mut self) -> &mut Enigo {
        &mut self.enigo
    }
}

impl Drop for PasteKeyGuard {
    fn drop(&mut self) {
        let _ = self.enigo.key(self.modifier, Direction::Release);
    }
}
