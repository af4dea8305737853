//! Tests for the recognition worker, driven end to end with fakes.

#![allow(clippy::unwrap_used)]

use crate::{
    AppCommand, IndicatorState, ShutdownReason,
    indicator::StatusIndicator,
    output_handler::TextInjector,
    worker::{RecognitionWorker, segment_cap},
};

use std::panic::Location;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use tokio::sync::{mpsc, watch};
use voxkey_core::{AudioChunk, CoreError, CoreResult, SegmentQueue, Transcriber};

/// How long tests wait for the worker to act before giving up.
const SETTLE: Duration = Duration::from_millis(500);

/// Transcriber fake: returns a canned string and records the sample count
/// of every call.
struct FakeTranscriber {
    text: String,
    calls: Arc<Mutex<Vec<usize>>>,
    fail: bool,
}

impl Transcriber for FakeTranscriber {
    fn transcribe(&mut self, samples: &[f32], _sample_rate: u32) -> CoreResult<String> {
        self.calls.lock().unwrap().push(samples.len());
        if self.fail {
            return Err(CoreError::TranscriptionFailed {
                source: "induced failure".into(),
                location: error_location::ErrorLocation::from(Location::caller()),
            });
        }
        Ok(self.text.clone())
    }
}

/// Injector fake: records every injected string.
#[derive(Clone)]
struct FakeInjector {
    injected: Arc<Mutex<Vec<String>>>,
}

impl TextInjector for FakeInjector {
    fn inject(&mut self, text: &str) -> crate::AppResult<()> {
        self.injected.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

/// Indicator fake: records state transitions.
#[derive(Clone)]
struct FakeIndicator {
    states: Arc<Mutex<Vec<IndicatorState>>>,
}

impl StatusIndicator for FakeIndicator {
    fn show(&self) {
        self.states.lock().unwrap().push(IndicatorState::Recording);
    }

    fn processing(&self) {
        self.states.lock().unwrap().push(IndicatorState::Processing);
    }

    fn hide(&self) {
        self.states.lock().unwrap().push(IndicatorState::Idle);
    }
}

struct Harness {
    queue: SegmentQueue,
    injected: Arc<Mutex<Vec<String>>>,
    states: Arc<Mutex<Vec<IndicatorState>>>,
    calls: Arc<Mutex<Vec<usize>>>,
    command_rx: mpsc::UnboundedReceiver<AppCommand>,
    shutdown_tx: watch::Sender<bool>,
    worker: JoinHandle<()>,
}

impl Harness {
    fn start(text: &str, fail: bool, max_segment_samples: usize) -> Self {
        let queue = SegmentQueue::new();
        let injected = Arc::new(Mutex::new(Vec::new()));
        let states = Arc::new(Mutex::new(Vec::new()));
        let calls = Arc::new(Mutex::new(Vec::new()));
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let worker = RecognitionWorker {
            queue: queue.clone(),
            transcriber: FakeTranscriber {
                text: text.to_string(),
                calls: Arc::clone(&calls),
                fail,
            },
            injector: FakeInjector {
                injected: Arc::clone(&injected),
            },
            indicator: FakeIndicator {
                states: Arc::clone(&states),
            },
            command_tx,
            shutdown_rx,
            resampler: None,
            max_segment_samples,
            injection_delay: Duration::ZERO,
        };
        let worker = std::thread::spawn(move || worker.run());

        Self {
            queue,
            injected,
            states,
            calls,
            command_rx,
            shutdown_tx,
            worker,
        }
    }

    /// Block until `pred` holds or the settle window elapses.
    fn wait_until(&self, pred: impl Fn(&Self) -> bool) {
        let deadline = Instant::now() + SETTLE;
        while !pred(self) && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(10));
        }
    }

    fn stop(self) {
        let _ = self.shutdown_tx.send(true);
        let _ = self.worker.join();
    }
}

/// WHAT: A finished segment is transcribed and its text injected.
/// WHY: This is the happy path of the whole application.
#[test]
fn finished_segment_is_injected() {
    // Given: a worker and one segment of audio.
    let harness = Harness::start("hello world", false, segment_cap(16_000));
    let sender = harness.queue.sender();
    sender.send_chunk(AudioChunk::new(vec![0.1; 1_600]));
    sender.send_chunk(AudioChunk::new(vec![0.2; 1_600]));
    sender.end_segment();

    // When: the worker drains the queue.
    harness.wait_until(|h| !h.injected.lock().unwrap().is_empty());

    // Then: the full segment reaches the transcriber and the text reaches
    // the injector, and the indicator returns to idle.
    assert_eq!(*harness.injected.lock().unwrap(), vec!["hello world"]);
    assert_eq!(*harness.calls.lock().unwrap(), vec![3_200]);
    assert_eq!(*harness.states.lock().unwrap(), vec![IndicatorState::Idle]);
    harness.stop();
}

/// WHAT: A recognized stop phrase requests shutdown and is never injected.
/// WHY: Injecting the stop phrase into the focused window on the way out
/// would leave stray text behind.
#[test]
fn stop_phrase_requests_shutdown_without_injection() {
    // Given: a transcriber that hears a stop phrase with punctuation.
    let mut harness = Harness::start("Stop voice.", false, segment_cap(16_000));
    let sender = harness.queue.sender();
    sender.send_chunk(AudioChunk::new(vec![0.1; 1_600]));
    sender.end_segment();

    // When: the segment is processed.
    harness.wait_until(|h| !h.calls.lock().unwrap().is_empty());
    std::thread::sleep(Duration::from_millis(50));

    // Then: a shutdown command is emitted and nothing was injected.
    assert!(matches!(
        harness.command_rx.try_recv(),
        Ok(AppCommand::Shutdown {
            reason: ShutdownReason::StopPhrase
        })
    ));
    assert!(harness.injected.lock().unwrap().is_empty());
    harness.stop();
}

/// WHAT: An empty segment produces no transcription call and no injection.
/// WHY: A cancelled or silent-drained segment must cost nothing downstream.
#[test]
fn empty_segment_injects_nothing() {
    // Given: an end-of-segment marker with no audio before it.
    let harness = Harness::start("should not appear", false, segment_cap(16_000));
    harness.queue.sender().end_segment();

    // When: the worker sees the marker.
    harness.wait_until(|h| !h.states.lock().unwrap().is_empty());

    // Then: the indicator resets but nothing is transcribed or injected.
    assert_eq!(*harness.states.lock().unwrap(), vec![IndicatorState::Idle]);
    assert!(harness.calls.lock().unwrap().is_empty());
    assert!(harness.injected.lock().unwrap().is_empty());
    harness.stop();
}

/// WHAT: A transcription error drops the segment and leaves the worker alive.
/// WHY: One bad segment must not end the session or poison the next one.
#[test]
fn transcription_error_drops_segment_and_continues() {
    // Given: a transcriber that fails.
    let mut harness = Harness::start("unused", true, segment_cap(16_000));
    let sender = harness.queue.sender();
    sender.send_chunk(AudioChunk::new(vec![0.1; 1_600]));
    sender.end_segment();

    // When: the failing segment is processed.
    harness.wait_until(|h| !h.calls.lock().unwrap().is_empty());
    std::thread::sleep(Duration::from_millis(50));

    // Then: nothing is injected, no shutdown is requested, and the
    // indicator is back to idle, ready for the next segment.
    assert!(harness.injected.lock().unwrap().is_empty());
    assert!(harness.command_rx.try_recv().is_err());
    assert_eq!(*harness.states.lock().unwrap(), vec![IndicatorState::Idle]);
    harness.stop();
}

/// WHAT: Audio beyond the segment length cap is discarded.
/// WHY: The cap bounds memory if a key release is lost mid-hold.
#[test]
fn segment_cap_bounds_accumulated_audio() {
    // Given: a tiny cap and more audio than it allows.
    let harness = Harness::start("capped", false, 100);
    let sender = harness.queue.sender();
    sender.send_chunk(AudioChunk::new(vec![0.1; 80]));
    sender.send_chunk(AudioChunk::new(vec![0.2; 80]));
    sender.end_segment();

    // When: the segment is transcribed.
    harness.wait_until(|h| !h.calls.lock().unwrap().is_empty());

    // Then: exactly the cap's worth of samples was kept.
    assert_eq!(*harness.calls.lock().unwrap(), vec![100]);
    harness.stop();
}

/// WHAT: The buffer is cleared between segments.
/// WHY: Audio from one segment leaking into the next corrupts transcripts.
#[test]
fn buffer_resets_between_segments() {
    // Given: two back-to-back segments of different lengths.
    let harness = Harness::start("ok", false, segment_cap(16_000));
    let sender = harness.queue.sender();
    sender.send_chunk(AudioChunk::new(vec![0.1; 1_000]));
    sender.end_segment();
    sender.send_chunk(AudioChunk::new(vec![0.2; 2_000]));
    sender.end_segment();

    // When: both are processed.
    harness.wait_until(|h| h.calls.lock().unwrap().len() == 2);

    // Then: each transcription saw only its own segment's samples.
    assert_eq!(*harness.calls.lock().unwrap(), vec![1_000, 2_000]);
    harness.stop();
}

/// WHAT: `segment_cap` scales with the capture rate.
/// WHY: The cap is expressed in seconds of wall-clock audio, whatever the
/// device's native rate.
#[test]
fn segment_cap_scales_with_rate() {
    assert_eq!(segment_cap(16_000), 16_000 * 300);
    assert_eq!(segment_cap(48_000), 48_000 * 300);
}
