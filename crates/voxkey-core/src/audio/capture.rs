//! Platform audio input, wired straight into the segment queue.
//!
//! One continuous input stream is opened for the process lifetime. The
//! real-time callback does exactly two things: read the recording flag, and
//! (only while it is set) copy the delivered frame into an
//! [`AudioChunk`](crate::AudioChunk) and enqueue it. No locks, no logging,
//! no I/O on that path.

use crate::audio::{AudioChunk, SegmentSender};
use crate::{CoreError, CoreResult};

use std::panic::Location;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
    mpsc,
};
use std::time::Duration;

use cpal::{
    Device, Stream, StreamConfig,
    traits::{DeviceTrait, HostTrait, StreamTrait},
};
use error_location::ErrorLocation;
use tracing::{info, warn};

/// How many times stream startup is attempted before the error is surfaced.
/// Input devices are commonly busy for a moment right after session start.
const STARTUP_ATTEMPTS: u32 = 3;

/// Backoff between startup attempts.
const STARTUP_BACKOFF: Duration = Duration::from_millis(250);

/// How long `spawn` waits for the stream thread to report before giving up.
const STARTUP_REPORT_TIMEOUT: Duration = Duration::from_secs(10);

/// Handle to the capture stream.
///
/// `cpal::Stream` is not `Send`, so the stream is built, played, and dropped
/// on a dedicated thread that this handle controls. Dropping the handle
/// stops the stream.
pub struct AudioCapture {
    sample_rate: u32,
    stop_tx: mpsc::Sender<()>,
}

impl AudioCapture {
    /// Open the input stream and start delivering frames.
    ///
    /// `recording` gates the callback: frames are enqueued on `segments`
    /// only while it is set. `preferred_device` selects an input device by
    /// name; `None` uses the host default.
    ///
    /// Blocks until the stream thread reports success or failure, so a
    /// missing or unusable device is a startup error rather than a silent
    /// dead stream.
    #[track_caller]
    pub fn spawn(
        recording: Arc<AtomicBool>,
        segments: SegmentSender,
        preferred_device: Option<String>,
    ) -> CoreResult<Self> {
        let (ready_tx, ready_rx) = mpsc::channel::<CoreResult<u32>>();
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        let spawned = std::thread::Builder::new()
            .name("voxkey-audio".into())
            .spawn(move || {
                match open_stream_with_retry(recording, segments, preferred_device) {
                    Ok((stream, sample_rate)) => {
                        let _ = ready_tx.send(Ok(sample_rate));
                        // Park here so the stream stays alive on this
                        // thread until the handle is dropped.
                        let _ = stop_rx.recv();
                        drop(stream);
                        info!("Audio capture stopped");
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                    }
                }
            });

        if let Err(e) = spawned {
            return Err(CoreError::DeviceError {
                reason: format!("Failed to spawn audio thread: {}", e),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        match ready_rx.recv_timeout(STARTUP_REPORT_TIMEOUT) {
            Ok(Ok(sample_rate)) => Ok(Self {
                sample_rate,
                stop_tx,
            }),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(CoreError::DeviceError {
                reason: "Audio thread did not report startup status".to_string(),
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }

    /// The capture sample rate in Hz. Chunks on the queue are mono at this
    /// rate; the worker resamples to the transcriber's rate if they differ.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

impl Drop for AudioCapture {
    fn drop(&mut self) {
        let _ = self.stop_tx.send(());
    }
}

/// Runs on the audio thread. Retries transient device failures a bounded
/// number of times before surfacing the error.
fn open_stream_with_retry(
    recording: Arc<AtomicBool>,
    segments: SegmentSender,
    preferred_device: Option<String>,
) -> CoreResult<(Stream, u32)> {
    let mut attempt = 1;
    loop {
        match open_stream(&recording, &segments, preferred_device.as_deref()) {
            Ok(pair) => return Ok(pair),
            Err(e) if attempt < STARTUP_ATTEMPTS => {
                warn!(attempt, error = %e, "Audio stream startup failed, retrying");
                attempt += 1;
                std::thread::sleep(STARTUP_BACKOFF);
            }
            Err(e) => return Err(e),
        }
    }
}

#[track_caller]
fn open_stream(
    recording: &Arc<AtomicBool>,
    segments: &SegmentSender,
    preferred_device: Option<&str>,
) -> CoreResult<(Stream, u32)> {
    let device = resolve_device(preferred_device)?;

    let supported = device
        .default_input_config()
        .map_err(|e| CoreError::DeviceError {
            reason: format!("Failed to get input config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;
    let config: StreamConfig = supported.into();
    let sample_rate = config.sample_rate;
    let channels = config.channels as usize;

    info!(
        device = %device.name().unwrap_or_else(|_| "unknown".into()),
        sample_rate,
        channels,
        "Opening audio input stream"
    );

    let recording = Arc::clone(recording);
    let segments = segments.clone();

    let stream = device
        .build_input_stream(
            &config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                // Real-time path: one atomic gate check and one bounded copy.
                // Frames arriving while no recording is active are dropped
                // here, never buffered.
                if !recording.load(Ordering::Acquire) {
                    return;
                }
                let chunk = if channels <= 1 {
                    data.to_vec()
                } else {
                    downmix(data, channels)
                };
                segments.send_chunk(AudioChunk::new(chunk));
            },
            |err| {
                // cpal invokes this off the real-time path.
                tracing::error!("Audio stream error: {}", err);
            },
            None,
        )
        .map_err(|e| CoreError::DeviceError {
            reason: format!("Failed to build input stream: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

    stream.play().map_err(|e| CoreError::DeviceError {
        reason: format!("Failed to start input stream: {}", e),
        location: ErrorLocation::from(Location::caller()),
    })?;

    info!("Audio capture started");

    Ok((stream, sample_rate))
}

#[track_caller]
fn resolve_device(preferred: Option<&str>) -> CoreResult<Device> {
    let host = cpal::default_host();

    if let Some(name) = preferred {
        let mut devices = host.input_devices().map_err(|e| CoreError::DeviceError {
            reason: format!("Failed to enumerate input devices: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;
        if let Some(device) = devices.find(|d| d.name().is_ok_and(|n| n == name)) {
            return Ok(device);
        }
        warn!(device = name, "Configured input device not found, using default");
    }

    host.default_input_device()
        .ok_or(CoreError::NoMicrophoneFound {
            location: ErrorLocation::from(Location::caller()),
        })
}

/// Average interleaved frames down to mono. Output length is fixed by the
/// input length, so the callback's allocation stays bounded by the driver's
/// frame size.
pub(crate) fn downmix(data: &[f32], channels: usize) -> Vec<f32> {
    data.chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}
