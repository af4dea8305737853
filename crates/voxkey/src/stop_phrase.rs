//! Stop-phrase detection.
//!
//! A recognized utterance that matches one of these phrases terminates the
//! process instead of being injected as text.

/// Phrases that end the session, in Mandarin and English.
const STOP_PHRASES: [&str; 7] = [
    "关闭语音",
    "停止语音",
    "退出语音",
    "停止录音",
    "关闭录音",
    "stop voice",
    "exit voice",
];

/// Punctuation the transcriber tends to append to short utterances.
const TRAILING_PUNCTUATION: [char; 9] = ['。', '，', '、', '！', '？', '.', ',', '!', '?'];

/// Strip trailing punctuation/whitespace and lower-case for comparison.
pub fn normalize(text: &str) -> String {
    text.trim_end_matches(|c: char| c.is_whitespace() || TRAILING_PUNCTUATION.contains(&c))
        .to_lowercase()
}

/// Returns the matched stop phrase if `text` normalizes to one.
pub fn matched_stop_phrase(text: &str) -> Option<&'static str> {
    let normalized = normalize(text);
    STOP_PHRASES.iter().copied().find(|p| *p == normalized)
}
