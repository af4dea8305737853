mod audio_config;
mod behaviour_config;
#[allow(clippy::module_inception)]
mod config;
mod whisper_config;

pub(crate) use {
    audio_config::AudioConfig, behaviour_config::BehaviourConfig, config::Config,
    whisper_config::WhisperConfig,
};

pub(crate) const DEFAULT_HOLD_THRESHOLD_MS: u64 = 250;
pub(crate) const DEFAULT_MIN_RECORDING_MS: u64 = 500;
pub(crate) const DEFAULT_INJECTION_DELAY_MS: u64 = 50;
pub(crate) const DEFAULT_LANGUAGE: &str = "zh";

pub(crate) fn default_hold_threshold_ms() -> u64 {
    DEFAULT_HOLD_THRESHOLD_MS
}

pub(crate) fn default_min_recording_ms() -> u64 {
    DEFAULT_MIN_RECORDING_MS
}

pub(crate) fn default_injection_delay_ms() -> u64 {
    DEFAULT_INJECTION_DELAY_MS
}

pub(crate) fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}
