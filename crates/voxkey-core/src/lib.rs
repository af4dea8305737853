//! Voxkey core library
//!
//! Hold-to-talk segmentation for desktop dictation: the recording state
//! machine, the audio-to-recognition segment queue, the CPAL capture
//! adapter, sample-rate conversion, and the whisper-rs transcriber.
//!
//! # Example
//!
//! ```no_run
//! use voxkey_core::{AudioCapture, RecordingController, SegmentQueue};
//!
//! use std::time::Duration;
//!
//! fn main() -> voxkey_core::CoreResult<()> {
//!     let queue = SegmentQueue::new();
//!     let controller = RecordingController::new(
//!         queue.clone(),
//!         Duration::from_millis(250),
//!         Duration::from_millis(500),
//!     );
//!     let _capture = AudioCapture::spawn(controller.recording_flag(), queue.sender(), None)?;
//!
//!     controller.hotkey_pressed();
//!     std::thread::sleep(Duration::from_millis(300));
//!     controller.poll_hold(); // recording starts
//!     std::thread::sleep(Duration::from_secs(1));
//!     controller.hotkey_released(); // end-of-segment marker queued
//!     Ok(())
//! }
//! ```

mod audio;
mod controller;
mod error;
mod transcribe;

pub use {
    audio::{AudioCapture, AudioChunk, Resampler, SegmentItem, SegmentQueue, SegmentSender},
    controller::{RecordingController, ReleaseOutcome},
    error::{CoreError, Result as CoreResult},
    transcribe::{Transcriber, WHISPER_SAMPLE_RATE, WhisperTranscriber},
};

#[cfg(test)]
mod tests;
