use crate::config::{
    default_hold_threshold_ms, default_injection_delay_ms, default_min_recording_ms,
};

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Hold-to-talk timing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehaviourConfig {
    /// How long the hotkey must stay held before recording starts.
    #[serde(default = "default_hold_threshold_ms")]
    pub hold_threshold_ms: u64,

    /// Recordings shorter than this are discarded as accidental taps.
    #[serde(default = "default_min_recording_ms")]
    pub min_recording_ms: u64,

    /// Pause between hiding the indicator and injecting text, letting focus
    /// settle on the target window. Empirically tuned; kept configurable.
    #[serde(default = "default_injection_delay_ms")]
    pub injection_delay_ms: u64,
}

impl BehaviourConfig {
    /// Hold threshold as a [`Duration`].
    pub fn hold_threshold(&self) -> Duration {
        Duration::from_millis(self.hold_threshold_ms)
    }

    /// Minimum recording length as a [`Duration`].
    pub fn min_recording(&self) -> Duration {
        Duration::from_millis(self.min_recording_ms)
    }

    /// Injection settle delay as a [`Duration`].
    pub fn injection_delay(&self) -> Duration {
        Duration::from_millis(self.injection_delay_ms)
    }
}
