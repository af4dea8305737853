use error_location::ErrorLocation;
use thiserror::Error;

/// Errors from the capture/segmentation/transcription pipeline.
///
/// Every variant carries an [`ErrorLocation`] recording the call site.
#[derive(Error, Debug)]
pub enum CoreError {
    /// No usable audio input device on this host.
    #[error("No microphone available {location}")]
    NoMicrophoneFound {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The audio device refused an operation (open, build stream, play).
    #[error("Audio device error: {reason} {location}")]
    DeviceError {
        /// Description of the device failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// No model file at the configured path.
    #[error("Whisper model not found at {path:?} {location}")]
    ModelNotFound {
        /// Path that was checked.
        path: std::path::PathBuf,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Whisper inference failed.
    #[error("Transcription failed: {source} {location}")]
    TranscriptionFailed {
        /// Underlying error from whisper-rs.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A transcription was requested for an empty sample buffer.
    #[error("No audio in segment {location}")]
    EmptySegment {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Sample-rate conversion failed.
    #[error("Resampling error: {reason} {location}")]
    ResamplingError {
        /// Description of the resampling failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

/// Result type alias using [`CoreError`].
pub type Result<T> = std::result::Result<T, CoreError>;
