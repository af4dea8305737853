//! Ordered channel carrying captured audio from the driver callback to the
//! recognition worker.
//!
//! The queue is unbounded and multi-producer/single-consumer. Producers only
//! ever call the non-blocking [`SegmentSender`] methods, which makes the
//! sender safe to use from the real-time audio callback. The receiving side
//! is shared behind a mutex so the controller can discard stale items
//! (drain-on-start, too-short release, cancel) without owning the consumer
//! loop.

use std::sync::{
    Arc, Mutex,
    mpsc::{self, Receiver, Sender},
};
use std::time::Duration;

/// How often `recv_timeout` re-checks the queue while waiting.
const RECV_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// One block of mono samples as delivered by the audio driver, at the
/// capture sample rate.
#[derive(Debug, Clone)]
pub struct AudioChunk {
    samples: Box<[f32]>,
}

impl AudioChunk {
    /// Wrap captured samples.
    pub fn new(samples: Vec<f32>) -> Self {
        Self {
            samples: samples.into_boxed_slice(),
        }
    }

    /// The samples in this chunk.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Number of samples in this chunk.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the chunk holds no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// An item on the segment queue.
#[derive(Debug)]
pub enum SegmentItem {
    /// Audio captured while a recording was active.
    Chunk(AudioChunk),
    /// Sentinel closing the current segment. Every marker corresponds to
    /// exactly one start transition; the chunks before it (back to the
    /// previous marker or queue drain) form one logical segment.
    EndOfSegment,
}

/// Producer handle for the segment queue.
///
/// Cloneable and cheap; `send_chunk` never blocks and never fails loudly --
/// a disconnected queue only happens during shutdown, where dropping audio
/// is the correct behaviour.
#[derive(Clone)]
pub struct SegmentSender {
    tx: Sender<SegmentItem>,
}

impl SegmentSender {
    /// Enqueue one chunk of captured audio.
    pub fn send_chunk(&self, chunk: AudioChunk) {
        let _ = self.tx.send(SegmentItem::Chunk(chunk));
    }

    /// Enqueue the end-of-segment marker.
    pub fn end_segment(&self) {
        let _ = self.tx.send(SegmentItem::EndOfSegment);
    }
}

/// Shared handle to the segment queue.
///
/// Clones share one underlying channel. The consumer side is mutex-wrapped
/// so that `drain` and `recv_timeout` may be called from different threads
/// (controller and worker respectively); the lock is never taken on the
/// audio callback path.
#[derive(Clone)]
pub struct SegmentQueue {
    tx: Sender<SegmentItem>,
    rx: Arc<Mutex<Receiver<SegmentItem>>>,
}

impl SegmentQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            tx,
            rx: Arc::new(Mutex::new(rx)),
        }
    }

    /// A producer handle for the audio callback.
    pub fn sender(&self) -> SegmentSender {
        SegmentSender {
            tx: self.tx.clone(),
        }
    }

    /// Push the end-of-segment marker.
    pub fn end_segment(&self) {
        let _ = self.tx.send(SegmentItem::EndOfSegment);
    }

    /// Discard every pending item and return how many were removed.
    pub fn drain(&self) -> usize {
        let rx = self.rx.lock().unwrap_or_else(|e| e.into_inner());
        let mut removed = 0;
        while rx.try_recv().is_ok() {
            removed += 1;
        }
        removed
    }

    /// Wait up to `timeout` for the next item.
    ///
    /// Returns `None` on timeout so the caller can re-check its shutdown
    /// signal and keep waiting. Implemented as a short-interval poll rather
    /// than a blocking `recv_timeout` so the consumer lock is held only for
    /// the duration of a `try_recv` -- `drain` must never have to wait out
    /// a full consumer timeout.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<SegmentItem> {
        let deadline = std::time::Instant::now() + timeout;
        loop {
            {
                let rx = self.rx.lock().unwrap_or_else(|e| e.into_inner());
                if let Ok(item) = rx.try_recv() {
                    return Some(item);
                }
            }
            if std::time::Instant::now() >= deadline {
                return None;
            }
            std::thread::sleep(RECV_POLL_INTERVAL);
        }
    }
}

impl Default for SegmentQueue {
    fn default() -> Self {
        Self::new()
    }
}
