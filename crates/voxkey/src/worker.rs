//! Recognition worker: the sole consumer of the segment queue.
//!
//! Runs on its own thread. Accumulates chunks into one buffer per segment,
//! and on the end-of-segment marker resamples, transcribes, and routes the
//! text: stop phrase to shutdown, anything else to the injector. Whisper
//! inference blocks this thread for seconds at a time, which is fine -- it
//! is fully decoupled from the real-time capture path.

use crate::{
    AppCommand, ShutdownReason,
    indicator::StatusIndicator,
    output_handler::TextInjector,
    stop_phrase,
};

use std::borrow::Cow;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};
use voxkey_core::{Resampler, SegmentItem, SegmentQueue, Transcriber, WHISPER_SAMPLE_RATE};

/// Bounded queue wait, so shutdown is noticed within this interval.
const QUEUE_WAIT: Duration = Duration::from_secs(1);

/// Safety cap on segment length, in seconds of captured audio. Sessions are
/// bounded by the user releasing the key; this bound protects against a key
/// release that never arrives (e.g. focus stolen mid-hold).
const MAX_SEGMENT_SECS: usize = 300;

/// Samples to cap a segment at, for audio captured at `capture_rate`.
pub fn segment_cap(capture_rate: u32) -> usize {
    capture_rate as usize * MAX_SEGMENT_SECS
}

/// Drains the segment queue and turns segments into injected text.
pub struct RecognitionWorker<T, J, S>
where
    T: Transcriber,
    J: TextInjector,
    S: StatusIndicator,
{
    pub(crate) queue: SegmentQueue,
    pub(crate) transcriber: T,
    pub(crate) injector: J,
    pub(crate) indicator: S,
    pub(crate) command_tx: mpsc::UnboundedSender<AppCommand>,
    pub(crate) shutdown_rx: watch::Receiver<bool>,
    pub(crate) resampler: Option<Resampler>,
    pub(crate) max_segment_samples: usize,
    pub(crate) injection_delay: Duration,
}

impl<T, J, S> RecognitionWorker<T, J, S>
where
    T: Transcriber,
    J: TextInjector,
    S: StatusIndicator,
{
    /// Consume segments until the shutdown signal flips.
    pub fn run(mut self) {
        info!("Recognition worker started");
        let mut buffer: Vec<f32> = Vec::new();
        let mut cap_logged = false;

        loop {
            if *self.shutdown_rx.borrow() {
                break;
            }

            let Some(item) = self.queue.recv_timeout(QUEUE_WAIT) else {
                continue;
            };

            match item {
                SegmentItem::Chunk(chunk) => {
                    self.accumulate(&mut buffer, &mut cap_logged, chunk.samples());
                }
                SegmentItem::EndOfSegment => {
                    self.finish_segment(&mut buffer);
                    cap_logged = false;
                }
            }
        }

        info!("Recognition worker stopped");
    }

    fn accumulate(&self, buffer: &mut Vec<f32>, cap_logged: &mut bool, samples: &[f32]) {
        let room = self.max_segment_samples.saturating_sub(buffer.len());
        if room == 0 {
            if !*cap_logged {
                warn!(
                    max_samples = self.max_segment_samples,
                    "Segment length cap reached, discarding further audio"
                );
                *cap_logged = true;
            }
            return;
        }
        buffer.extend_from_slice(&samples[..samples.len().min(room)]);
    }

    /// Handle one closed segment, then clear the buffer unconditionally so
    /// no audio leaks into the next segment.
    fn finish_segment(&mut self, buffer: &mut Vec<f32>) {
        let text = if buffer.is_empty() {
            String::new()
        } else {
            match self.transcribe(buffer) {
                Ok(text) => text,
                Err(e) => {
                    error!(error = ?e, "Transcription failed, segment dropped");
                    String::new()
                }
            }
        };
        buffer.clear();

        self.indicator.hide();

        if text.is_empty() {
            info!("No speech detected");
            return;
        }

        if let Some(phrase) = stop_phrase::matched_stop_phrase(&text) {
            info!(phrase, "Stop phrase recognized, shutting down");
            let _ = self.command_tx.send(AppCommand::Shutdown {
                reason: ShutdownReason::StopPhrase,
            });
            return;
        }

        info!(text_len = text.len(), "Recognized");

        // Let focus settle after the indicator transition before pasting
        // into the target window.
        std::thread::sleep(self.injection_delay);

        if let Err(e) = self.injector.inject(&text) {
            error!(error = ?e, "Failed to inject text");
        }
    }

    fn transcribe(&mut self, samples: &[f32]) -> crate::AppResult<String> {
        let prepared: Cow<'_, [f32]> = match self.resampler.as_mut() {
            Some(resampler) => Cow::Owned(resampler.convert(samples)?),
            None => Cow::Borrowed(samples),
        };

        if prepared.is_empty() {
            return Ok(String::new());
        }

        debug!(sample_count = prepared.len(), "Transcribing segment");
        let start = std::time::Instant::now();
        let text = self.transcriber.transcribe(&prepared, WHISPER_SAMPLE_RATE)?;
        info!(
            duration_ms = start.elapsed().as_millis(),
            text_len = text.len(),
            "Transcription complete"
        );

        Ok(text.trim().to_string())
    }
}
