//! The speech-to-text capability and its whisper-rs implementation.

use crate::{CoreError, CoreResult};

use std::panic::Location;
use std::path::Path;

use error_location::ErrorLocation;
use tracing::{debug, info, instrument};
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

/// Sample rate the whisper transcriber expects.
pub const WHISPER_SAMPLE_RATE: u32 = 16_000;

/// A pluggable speech-to-text backend.
///
/// Implementations may block for the duration of inference; the caller is
/// responsible for keeping that off any real-time path. Implementations are
/// stateless across calls from the caller's perspective.
pub trait Transcriber: Send {
    /// Transcribe one segment of normalized mono samples at `sample_rate`.
    fn transcribe(&mut self, samples: &[f32], sample_rate: u32) -> CoreResult<String>;
}

/// Local whisper.cpp inference via whisper-rs.
pub struct WhisperTranscriber {
    ctx: WhisperContext,
    language: String,
    initial_prompt: Option<String>,
}

impl WhisperTranscriber {
    /// Load a ggml model from `model_path`.
    ///
    /// `language` is the fixed transcription language (no auto-detection);
    /// `initial_prompt` optionally primes decoding, e.g. toward punctuated
    /// Mandarin sentences.
    #[track_caller]
    #[instrument(skip(model_path, initial_prompt))]
    pub fn new<P: AsRef<Path>>(
        model_path: P,
        use_gpu: bool,
        language: String,
        initial_prompt: Option<String>,
    ) -> CoreResult<Self> {
        let path = model_path.as_ref();

        if !path.exists() {
            return Err(CoreError::ModelNotFound {
                path: path.to_path_buf(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let mut ctx_params = WhisperContextParameters::default();
        ctx_params.use_gpu(use_gpu);

        let ctx = WhisperContext::new_with_params(
            path.to_str().ok_or(CoreError::ModelNotFound {
                path: path.to_path_buf(),
                location: ErrorLocation::from(Location::caller()),
            })?,
            ctx_params,
        )
        .map_err(|e| CoreError::TranscriptionFailed {
            source: Box::new(e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!(model_path = ?path, language, use_gpu, "Whisper model loaded");

        Ok(Self {
            ctx,
            language,
            initial_prompt,
        })
    }
}

impl Transcriber for WhisperTranscriber {
    #[instrument(skip(self, samples))]
    fn transcribe(&mut self, samples: &[f32], sample_rate: u32) -> CoreResult<String> {
        if samples.is_empty() {
            return Err(CoreError::EmptySegment {
                location: ErrorLocation::from(Location::caller()),
            });
        }
        if sample_rate != WHISPER_SAMPLE_RATE {
            return Err(CoreError::TranscriptionFailed {
                source: format!(
                    "Whisper requires {} Hz input, got {} Hz",
                    WHISPER_SAMPLE_RATE, sample_rate
                )
                .into(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
        params.set_language(Some(self.language.as_str()));
        params.set_print_progress(false);
        params.set_print_special(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);
        params.set_suppress_blank(true);
        params.set_suppress_nst(true);
        if let Some(ref prompt) = self.initial_prompt {
            params.set_initial_prompt(prompt);
        }

        let mut state = self
            .ctx
            .create_state()
            .map_err(|e| CoreError::TranscriptionFailed {
                source: Box::new(e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        state
            .full(params, samples)
            .map_err(|e| CoreError::TranscriptionFailed {
                source: Box::new(e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let num_segments = state.full_n_segments();
        let mut result = String::with_capacity(num_segments as usize * 256);

        for i in 0..num_segments {
            let segment = state
                .get_segment(i)
                .ok_or_else(|| CoreError::TranscriptionFailed {
                    source: format!("Missing decoded segment {}", i).into(),
                    location: ErrorLocation::from(Location::caller()),
                })?;
            result.push_str(&segment.to_string());
        }

        let text = result.trim().to_string();

        debug!(
            sample_count = samples.len(),
            segment_count = num_segments,
            text_len = text.len(),
            "Inference complete"
        );

        Ok(text)
    }
}
