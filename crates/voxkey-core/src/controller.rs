//! Hold-to-talk recording state machine.
//!
//! Turns raw hotkey press/release edges, other-key activity, and periodic
//! poller ticks into well-defined recording segments on the
//! [`SegmentQueue`](crate::SegmentQueue). All transitions are guarded by a
//! single mutex; the audio callback observes the state only through a shared
//! atomic flag and never takes the lock.

use crate::audio::SegmentQueue;

use std::sync::{
    Arc, Mutex, MutexGuard,
    atomic::{AtomicBool, Ordering},
};
use std::time::{Duration, Instant};

use tracing::{debug, info};
use uuid::Uuid;

/// What happened when the hotkey was released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseOutcome {
    /// No recording was active (tap released before the hold threshold, or
    /// the segment was already cancelled).
    NotRecording,
    /// The recording was shorter than the minimum duration; buffered audio
    /// was discarded and no end marker was queued.
    TooShort {
        /// How long the recording ran before release.
        held: Duration,
    },
    /// The segment was closed: the end-of-segment marker is on the queue
    /// and the worker will transcribe it.
    Finished {
        /// Correlation id of the finished segment.
        segment_id: Uuid,
        /// Recorded duration.
        duration: Duration,
    },
}

/// Hotkey and session state, all behind one lock.
///
/// `started_at.is_some()` is the single source of truth for "a recording is
/// active"; the atomic flag handed to the audio callback is a mirror that
/// is only written while this lock is held.
struct ControllerState {
    hotkey_down: bool,
    pressed_at: Option<Instant>,
    started_at: Option<Instant>,
    segment_id: Option<Uuid>,
}

/// The central state machine coordinating the input hook, the hold poller,
/// the audio callback, and the recognition worker.
///
/// At most one recording is active at any instant. Transition methods are
/// safe to call from any thread and never block beyond the internal mutex,
/// which is held only for a few field writes and a queue drain.
pub struct RecordingController {
    state: Mutex<ControllerState>,
    recording: Arc<AtomicBool>,
    queue: SegmentQueue,
    hold_threshold: Duration,
    min_duration: Duration,
}

impl RecordingController {
    /// Create a controller over `queue`.
    ///
    /// `hold_threshold` is how long the hotkey must stay down before a
    /// recording starts; `min_duration` is the shortest recording that is
    /// still handed to the transcriber.
    pub fn new(queue: SegmentQueue, hold_threshold: Duration, min_duration: Duration) -> Self {
        Self {
            state: Mutex::new(ControllerState {
                hotkey_down: false,
                pressed_at: None,
                started_at: None,
                segment_id: None,
            }),
            recording: Arc::new(AtomicBool::new(false)),
            queue,
            hold_threshold,
            min_duration,
        }
    }

    /// The flag the audio callback reads to decide whether to enqueue a
    /// frame. Set strictly after drain-on-start and cleared strictly before
    /// the end marker is pushed, which is what keeps segments isolated.
    pub fn recording_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.recording)
    }

    /// Whether a recording is currently active.
    pub fn is_recording(&self) -> bool {
        self.recording.load(Ordering::Acquire)
    }

    /// The hotkey went down.
    ///
    /// Only the first edge is recorded; OS key-repeat delivers further
    /// press events while the key is held and those must not move the
    /// press timestamp.
    pub fn hotkey_pressed(&self) {
        let mut s = self.lock();
        if !s.hotkey_down {
            s.hotkey_down = true;
            s.pressed_at = Some(Instant::now());
            debug!("Hotkey down");
        }
    }

    /// The hotkey was released.
    ///
    /// Always clears the held state. If a recording is active it is closed:
    /// past the minimum duration the end marker is queued for the worker,
    /// below it the buffered audio is discarded as an accidental tap.
    pub fn hotkey_released(&self) -> ReleaseOutcome {
        let mut s = self.lock();
        s.hotkey_down = false;
        s.pressed_at = None;

        let Some(started_at) = s.started_at.take() else {
            return ReleaseOutcome::NotRecording;
        };
        let segment_id = s.segment_id.take().unwrap_or_else(Uuid::new_v4);

        // Stop the callback from enqueueing before deciding the segment's
        // fate, so the marker (or the drain) lands after the last chunk.
        self.recording.store(false, Ordering::Release);

        let duration = started_at.elapsed();
        if duration >= self.min_duration {
            self.queue.end_segment();
            info!(
                segment_id = %segment_id,
                duration_ms = duration.as_millis(),
                "Recording stopped"
            );
            ReleaseOutcome::Finished {
                segment_id,
                duration,
            }
        } else {
            let dropped = self.queue.drain();
            info!(
                segment_id = %segment_id,
                duration_ms = duration.as_millis(),
                dropped_chunks = dropped,
                "Recording too short, discarded"
            );
            ReleaseOutcome::TooShort { held: duration }
        }
    }

    /// Some other key was pressed or released.
    ///
    /// While the hotkey is held and a recording is active this means the
    /// hotkey was part of a keyboard shortcut chord, not dictation: the
    /// segment is dropped entirely, with no end marker. Returns whether a
    /// recording was cancelled.
    pub fn other_key_activity(&self) -> bool {
        let mut s = self.lock();
        if !s.hotkey_down || s.started_at.is_none() {
            return false;
        }

        self.recording.store(false, Ordering::Release);
        s.started_at = None;
        let segment_id = s.segment_id.take();
        let dropped = self.queue.drain();

        info!(
            segment_id = ?segment_id,
            dropped_chunks = dropped,
            "Recording cancelled by other key activity"
        );
        true
    }

    /// Poller tick: start a recording if the hotkey has been held past the
    /// hold threshold and none is active.
    ///
    /// Level-triggered on elapsed hold time, so a missed tick just delays
    /// the start by one poll interval instead of losing it. Any chunks left
    /// over from an aborted segment are drained before the callback is
    /// re-armed. Returns whether a recording started.
    pub fn poll_hold(&self) -> bool {
        let mut s = self.lock();
        if !s.hotkey_down || s.started_at.is_some() {
            return false;
        }
        let Some(pressed_at) = s.pressed_at else {
            return false;
        };
        if pressed_at.elapsed() < self.hold_threshold {
            return false;
        }

        let segment_id = Uuid::new_v4();
        self.queue.drain();
        s.started_at = Some(Instant::now());
        s.segment_id = Some(segment_id);
        self.recording.store(true, Ordering::Release);

        info!(segment_id = %segment_id, "Recording started");
        true
    }

    fn lock(&self) -> MutexGuard<'_, ControllerState> {
        // Recover from lock poison: the state fields stay valid even if a
        // previous holder panicked.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}
