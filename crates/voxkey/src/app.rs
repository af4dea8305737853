use crate::{
    AppCommand, AppResult, IndicatorHandle, KeyActivity, ShutdownReason,
    indicator::StatusIndicator,
};

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, instrument};
use tray_icon::menu::MenuEvent;
use voxkey_core::{RecordingController, ReleaseOutcome};

/// How often the poller checks whether the hotkey has been held past the
/// threshold. Level-triggered, so jitter here only delays a start slightly.
const HOLD_POLL_INTERVAL: Duration = Duration::from_millis(30);

/// Main application loop state.
///
/// Runs on the async runtime thread. Indicator updates go back to the main
/// thread through [`IndicatorHandle`] because the tray icon is `!Send`.
pub struct App {
    pub(crate) controller: Arc<RecordingController>,
    pub(crate) indicator: IndicatorHandle,
    pub(crate) key_events: mpsc::UnboundedReceiver<KeyActivity>,
    pub(crate) command_tx: mpsc::UnboundedSender<AppCommand>,
    pub(crate) command_rx: mpsc::UnboundedReceiver<AppCommand>,
    pub(crate) shutdown_tx: watch::Sender<bool>,
    pub(crate) exit_menu_id: tray_icon::menu::MenuId,
}

impl App {
    /// Run until a shutdown command arrives.
    #[instrument(skip(self))]
    pub(crate) async fn run(mut self) -> AppResult<()> {
        info!("Voxkey running - hold CapsLock to dictate");

        // Tray menu forwarding via a single persistent blocking task.
        // MenuEvent::receiver() is a crossbeam channel with a blocking
        // recv(); the task unblocks when menu_tx's peer is dropped.
        let (menu_tx, mut menu_rx) = mpsc::channel(32);
        let menu_handle = tokio::task::spawn_blocking(move || {
            let receiver = MenuEvent::receiver();
            while let Ok(event) = receiver.recv() {
                if menu_tx.blocking_send(event).is_err() {
                    break;
                }
            }
        });

        let mut poll = tokio::time::interval(HOLD_POLL_INTERVAL);

        loop {
            tokio::select! {
                _ = poll.tick() => {
                    if self.controller.poll_hold() {
                        self.indicator.show();
                    }
                }

                Some(activity) = self.key_events.recv() => {
                    self.handle_key_activity(activity);
                }

                Some(event) = menu_rx.recv() => {
                    if event.id == self.exit_menu_id {
                        info!("Exit requested from tray menu");
                        if self.command_tx.send(AppCommand::Shutdown {
                            reason: ShutdownReason::TrayExit,
                        }).is_err() {
                            error!("Failed to queue shutdown command");
                        }
                    }
                }

                Some(cmd) = self.command_rx.recv() => {
                    let AppCommand::Shutdown { reason } = cmd;
                    info!(?reason, "Shutdown requested");
                    break;
                }

                else => {
                    info!("All channels closed, shutting down");
                    break;
                }
            }
        }

        drop(menu_rx);

        match tokio::time::timeout(Duration::from_secs(1), menu_handle).await {
            Ok(Ok(())) => debug!("Menu event forwarder stopped cleanly"),
            Ok(Err(e)) => error!(error = ?e, "Menu event forwarder panicked"),
            Err(_) => debug!(
                "Menu event forwarder did not stop within timeout, \
                 will be cleaned up on exit"
            ),
        }

        let _ = self.shutdown_tx.send(true);
        self.indicator.terminate();
        info!("Voxkey shut down");

        Ok(())
    }

    /// Drive the controller with one classified key event and mirror the
    /// resulting transition on the indicator.
    fn handle_key_activity(&self, activity: KeyActivity) {
        match activity {
            KeyActivity::HotkeyPressed => self.controller.hotkey_pressed(),

            KeyActivity::HotkeyReleased => match self.controller.hotkey_released() {
                ReleaseOutcome::Finished { .. } => self.indicator.processing(),
                ReleaseOutcome::TooShort { .. } => self.indicator.hide(),
                ReleaseOutcome::NotRecording => {}
            },

            KeyActivity::OtherKey => {
                // The hotkey doubled as part of a shortcut chord.
                if self.controller.other_key_activity() {
                    self.indicator.hide();
                }
            }
        }
    }
}
