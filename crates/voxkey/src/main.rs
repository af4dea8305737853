//! Voxkey: hold-to-talk dictation for the desktop.
//!
//! Hold CapsLock, speak, release -- the transcription lands at the cursor.
//! Say a stop phrase ("stop voice", "关闭语音", ...) to quit.

mod app;
mod app_command;
mod config;
mod error;
mod indicator;
mod indicator_command;
mod indicator_state;
mod key_listener;
mod output_handler;
mod paste_key_guard;
mod stop_phrase;
#[cfg(test)]
mod tests;
mod tray_indicator;
mod worker;

pub(crate) use {
    app::App,
    app_command::{AppCommand, ShutdownReason},
    error::{AppError, Result as AppResult},
    indicator::IndicatorHandle,
    indicator_command::IndicatorCommand,
    indicator_state::IndicatorState,
    key_listener::{KeyActivity, KeyListener},
    output_handler::OutputHandler,
    paste_key_guard::PasteKeyGuard,
    tray_indicator::TrayIndicator,
    worker::RecognitionWorker,
};

use crate::config::Config;

use std::sync::Arc;

use tao::{
    event::Event,
    event_loop::{ControlFlow, EventLoopBuilder},
};
use tokio::sync::{mpsc, watch};
use tracing::error;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use voxkey_core::{AudioCapture, RecordingController, Resampler, SegmentQueue, WHISPER_SAMPLE_RATE};

/// Set up structured logging: stdout plus a non-blocking file appender in
/// the platform data dir. Returns the appender guard, which must stay alive
/// for buffered log lines to be flushed.
fn init_tracing() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("voxkey=debug,voxkey_core=debug"));

    match Config::log_dir() {
        Ok(log_dir) => {
            let appender = tracing_appender::rolling::never(log_dir, "voxkey.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(writer))
                .init();
            Some(guard)
        }
        Err(_) => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
            None
        }
    }
}

/// Application entry point.
fn main() {
    let _log_guard = init_tracing();

    let event_loop = EventLoopBuilder::<IndicatorCommand>::with_user_event().build();
    let proxy = event_loop.create_proxy();

    // The tray indicator lives on the main thread - TrayIcon is !Send.
    let mut tray = match TrayIndicator::new() {
        Ok(tray) => tray,
        Err(e) => {
            error!("Failed to create tray indicator: {:?}", e);
            std::process::exit(1);
        }
    };

    // Keeps the capture stream alive for the app lifetime; dropping it
    // closes the audio stream.
    let mut audio_capture: Option<AudioCapture> = None;

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Wait;

        match event {
            Event::UserEvent(cmd) => {
                match cmd {
                    IndicatorCommand::SetState(state) => {
                        if let Err(e) = tray.update_state(state) {
                            error!(error = ?e, "Failed to update indicator");
                        }
                    }
                    IndicatorCommand::Shutdown => {
                        *control_flow = ControlFlow::ExitWithCode(0);
                    }
                }
                return;
            }
            Event::NewEvents(tao::event::StartCause::Init) => {
                let config = match Config::load() {
                    Ok(c) => c,
                    Err(e) => {
                        error!("Failed to load config: {:?}", e);
                        std::process::exit(1);
                    }
                };

                if let Err(e) = config.validate_model_path() {
                    error!("Model validation failed: {:?}", e);
                    std::process::exit(1);
                }

                let transcriber = match voxkey_core::WhisperTranscriber::new(
                    &config.whisper.model_path,
                    config.whisper.use_gpu,
                    config.whisper.language.clone(),
                    config.whisper.initial_prompt.clone(),
                ) {
                    Ok(t) => t,
                    Err(e) => {
                        error!("Failed to load whisper model: {:?}", e);
                        std::process::exit(1);
                    }
                };

                let queue = SegmentQueue::new();
                let controller = Arc::new(RecordingController::new(
                    queue.clone(),
                    config.behaviour.hold_threshold(),
                    config.behaviour.min_recording(),
                ));

                let capture = match AudioCapture::spawn(
                    controller.recording_flag(),
                    queue.sender(),
                    config.audio.selected_device.clone(),
                ) {
                    Ok(c) => c,
                    Err(e) => {
                        error!("Failed to open audio input: {:?}", e);
                        std::process::exit(1);
                    }
                };
                let capture_rate = capture.sample_rate();
                audio_capture = Some(capture);

                let resampler = if capture_rate != WHISPER_SAMPLE_RATE {
                    match Resampler::new(capture_rate, WHISPER_SAMPLE_RATE) {
                        Ok(r) => Some(r),
                        Err(e) => {
                            error!("Failed to create resampler: {:?}", e);
                            std::process::exit(1);
                        }
                    }
                } else {
                    None
                };

                let injector = match OutputHandler::new() {
                    Ok(oh) => oh,
                    Err(e) => {
                        error!("Failed to create output handler: {:?}", e);
                        std::process::exit(1);
                    }
                };

                let (key_tx, key_rx) = mpsc::unbounded_channel();
                if let Err(e) = KeyListener::spawn(key_tx) {
                    error!("Failed to install key hook: {:?}", e);
                    std::process::exit(1);
                }

                #[cfg(target_os = "macos")]
                unsafe {
                    use core_foundation::runloop::{CFRunLoopGetMain, CFRunLoopWakeUp};
                    CFRunLoopWakeUp(CFRunLoopGetMain());
                }

                let indicator = IndicatorHandle::new(proxy.clone());
                let (command_tx, command_rx) = mpsc::unbounded_channel();
                let (shutdown_tx, shutdown_rx) = watch::channel(false);
                let exit_menu_id = tray.exit_item_id().clone();

                let worker = RecognitionWorker {
                    queue,
                    transcriber,
                    injector,
                    indicator: indicator.clone(),
                    command_tx: command_tx.clone(),
                    shutdown_rx,
                    resampler,
                    max_segment_samples: worker::segment_cap(capture_rate),
                    injection_delay: config.behaviour.injection_delay(),
                };

                if let Err(e) = std::thread::Builder::new()
                    .name("voxkey-recognizer".into())
                    .spawn(move || worker.run())
                {
                    error!("Failed to spawn recognition worker: {:?}", e);
                    std::process::exit(1);
                }

                // The async side (poller, key routing, shutdown) runs on a
                // dedicated runtime thread; the tray stays on this one.
                std::thread::spawn(move || {
                    let rt = match tokio::runtime::Runtime::new() {
                        Ok(rt) => rt,
                        Err(e) => {
                            error!("Failed to create tokio runtime: {:?}", e);
                            std::process::exit(1);
                        }
                    };

                    rt.block_on(async {
                        let app = App {
                            controller,
                            indicator,
                            key_events: key_rx,
                            command_tx,
                            command_rx,
                            shutdown_tx,
                            exit_menu_id,
                        };

                        if let Err(e) = app.run().await {
                            error!(error = ?e, "App error");
                        }
                    });
                });
            }
            _ => {}
        }

        // Keep the capture stream alive in the closure for the app's lifetime.
        let _ = &audio_capture;
    });
}
