//! Tray-backed status indicator.
//!
//! A system tray icon with three states (Idle, Recording, Processing) and
//! an Exit menu item. Icons are generated as solid-colour squares so the
//! binary carries no image resources.

use crate::{AppError, AppResult, IndicatorState};

use std::panic::Location;

use error_location::ErrorLocation;
use tracing::{info, instrument};
use tray_icon::menu::{Menu, MenuId, MenuItem};
use tray_icon::{Icon, TrayIcon, TrayIconBuilder};

/// Icon edge length in pixels.
const ICON_SIZE: u32 = 32;

/// Idle grey.
const IDLE_RGBA: [u8; 4] = [0x80, 0x80, 0x80, 0xff];
/// Recording red.
const RECORDING_RGBA: [u8; 4] = [0xe7, 0x4c, 0x3c, 0xff];
/// Processing amber.
const PROCESSING_RGBA: [u8; 4] = [0xf3, 0x9c, 0x12, 0xff];

/// System tray indicator. Lives on the main thread.
pub struct TrayIndicator {
    tray_icon: TrayIcon,
    exit_item_id: MenuId,
}

impl TrayIndicator {
    /// Create the tray icon in the Idle state.
    #[track_caller]
    #[instrument]
    pub fn new() -> AppResult<Self> {
        let menu = Menu::new();
        let exit_item = MenuItem::new("Exit", true, None);
        let exit_item_id = exit_item.id().clone();

        menu.append(&exit_item)
            .map_err(|e| AppError::IndicatorError {
                reason: format!("Failed to add exit menu item: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let tray_icon = TrayIconBuilder::new()
            .with_tooltip(Self::tooltip(IndicatorState::Idle))
            .with_menu(Box::new(menu))
            .with_icon(Self::state_icon(IndicatorState::Idle)?)
            .build()
            .map_err(|e| AppError::IndicatorError {
                reason: format!("Failed to create tray icon: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        info!("Tray indicator initialized");

        Ok(Self {
            tray_icon,
            exit_item_id,
        })
    }

    /// Switch icon and tooltip to `state`.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn update_state(&mut self, state: IndicatorState) -> AppResult<()> {
        self.tray_icon
            .set_icon(Some(Self::state_icon(state)?))
            .map_err(|e| AppError::IndicatorError {
                reason: format!("Failed to update tray icon: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        self.tray_icon
            .set_tooltip(Some(Self::tooltip(state)))
            .map_err(|e| AppError::IndicatorError {
                reason: format!("Failed to update tray tooltip: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        Ok(())
    }

    /// The Exit menu item ID, for routing menu events.
    pub fn exit_item_id(&self) -> &MenuId {
        &self.exit_item_id
    }

    fn tooltip(state: IndicatorState) -> &'static str {
        match state {
            IndicatorState::Idle => "Voxkey - hold CapsLock to dictate",
            IndicatorState::Recording => "Voxkey - recording...",
            IndicatorState::Processing => "Voxkey - transcribing...",
        }
    }

    #[track_caller]
    fn state_icon(state: IndicatorState) -> AppResult<Icon> {
        let rgba = match state {
            IndicatorState::Idle => IDLE_RGBA,
            IndicatorState::Recording => RECORDING_RGBA,
            IndicatorState::Processing => PROCESSING_RGBA,
        };

        let pixels: Vec<u8> = rgba
            .iter()
            .copied()
            .cycle()
            .take((ICON_SIZE * ICON_SIZE * 4) as usize)
            .collect();

        Icon::from_rgba(pixels, ICON_SIZE, ICON_SIZE).map_err(|e| AppError::IndicatorError {
            reason: format!("Failed to build indicator icon: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })
    }
}
