/// Indicator states corresponding to the dictation workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorState {
    /// No recording in progress.
    Idle,
    /// Currently capturing audio.
    Recording,
    /// Segment closed, transcription running.
    Processing,
}
