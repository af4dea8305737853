use crate::config::default_language;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Whisper model configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhisperConfig {
    /// Path to the ggml model file (e.g., ggml-small.bin).
    pub model_path: PathBuf,

    /// Use GPU inference if a GPU backend was compiled in (Metal/Vulkan).
    #[serde(default = "default_use_gpu")]
    pub use_gpu: bool,

    /// Fixed transcription language.
    #[serde(default = "default_language")]
    pub language: String,

    /// Optional decoding prompt, e.g. to prime punctuated output.
    #[serde(default)]
    pub initial_prompt: Option<String>,
}

fn default_use_gpu() -> bool {
    true
}
