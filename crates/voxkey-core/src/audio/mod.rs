pub(crate) mod capture;
mod queue;
mod resampler;

pub use {
    capture::AudioCapture,
    queue::{AudioChunk, SegmentItem, SegmentQueue, SegmentSender},
    resampler::Resampler,
};
