//! Sample-rate conversion from the capture rate to the transcriber's rate.

use crate::{CoreError, CoreResult};

use std::panic::Location;

use audioadapter_buffers::direct::InterleavedSlice;
use error_location::ErrorLocation;
use rubato::{Fft, FixedSync, Resampler as RubatoResampler};
use tracing::{debug, instrument};

/// Frames fed to the FFT resampler per iteration.
const CHUNK_FRAMES: usize = 1024;

/// Sub-chunk count for the FFT resampler.
const SUB_CHUNKS: usize = 2;

/// Converts mono audio between two fixed sample rates.
pub struct Resampler {
    inner: Fft<f32>,
    input_rate: u32,
    output_rate: u32,
}

impl Resampler {
    /// Prepare a converter from `input_rate` to `output_rate` Hz.
    #[track_caller]
    #[instrument]
    pub fn new(input_rate: u32, output_rate: u32) -> CoreResult<Self> {
        let inner = Fft::<f32>::new(
            input_rate as usize,
            output_rate as usize,
            CHUNK_FRAMES,
            SUB_CHUNKS,
            1, // mono
            FixedSync::Input,
        )
        .map_err(|e| CoreError::ResamplingError {
            reason: format!("Failed to create resampler: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        debug!(input_rate, output_rate, "Resampler ready");

        Ok(Self {
            inner,
            input_rate,
            output_rate,
        })
    }

    /// Convert a whole segment of samples.
    ///
    /// Processes in fixed-size chunks; the final partial chunk is
    /// zero-padded, and the output is trimmed back to the exact converted
    /// length so the padding never reaches the transcriber.
    #[track_caller]
    #[instrument(skip(self, samples))]
    pub fn convert(&mut self, samples: &[f32]) -> CoreResult<Vec<f32>> {
        if samples.is_empty() {
            return Ok(Vec::new());
        }

        let expected_len =
            (samples.len() as f64 * self.output_rate as f64 / self.input_rate as f64) as usize;
        let max_out_frames = self.inner.output_frames_max();

        let mut output = Vec::with_capacity(expected_len + max_out_frames);
        let mut padded = vec![0.0f32; CHUNK_FRAMES];
        let mut out_chunk = vec![0.0f32; max_out_frames];

        for chunk in samples.chunks(CHUNK_FRAMES) {
            let frames: &[f32] = if chunk.len() == CHUNK_FRAMES {
                chunk
            } else {
                padded[..chunk.len()].copy_from_slice(chunk);
                padded[chunk.len()..].fill(0.0);
                &padded
            };

            let input_adapter = InterleavedSlice::new(frames, 1, CHUNK_FRAMES).map_err(|e| {
                CoreError::ResamplingError {
                    reason: format!("Failed to wrap input chunk: {}", e),
                    location: ErrorLocation::from(Location::caller()),
                }
            })?;

            let mut output_adapter = InterleavedSlice::new_mut(&mut out_chunk, 1, max_out_frames)
                .map_err(|e| CoreError::ResamplingError {
                reason: format!("Failed to wrap output chunk: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

            let (_consumed, written) = self
                .inner
                .process_into_buffer(&input_adapter, &mut output_adapter, None)
                .map_err(|e| CoreError::ResamplingError {
                    reason: format!("Resampling failed: {}", e),
                    location: ErrorLocation::from(Location::caller()),
                })?;

            output.extend_from_slice(&out_chunk[..written]);
        }

        output.truncate(expected_len);

        debug!(
            input_len = samples.len(),
            output_len = output.len(),
            "Segment resampled"
        );

        Ok(output)
    }
}
