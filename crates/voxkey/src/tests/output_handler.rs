//! Tests for clipboard-based text injection.
//!
//! These touch the real system clipboard and synthesize key events, so they
//! only run on a machine with a desktop session. They are ignored by
//! default; run them locally with `cargo test -- --ignored`.

#![allow(clippy::unwrap_used)]

use crate::output_handler::{OutputHandler, TextInjector};

/// WHAT: Text placed via the retry loop is readable back from the clipboard.
/// WHY: Injection is paste-based; a clipboard write that silently fails
/// means no text ever reaches the target window.
#[test]
#[ignore = "requires a desktop session with a clipboard"]
fn set_clipboard_round_trips() {
    // Given: an output handler on a live desktop.
    let mut handler = OutputHandler::new().unwrap();

    // When: text is written to the clipboard.
    handler.set_clipboard("voxkey clipboard test").unwrap();

    // Then: the same text reads back.
    assert_eq!(
        handler.clipboard.get_text().unwrap(),
        "voxkey clipboard test"
    );
}

/// WHAT: Injecting an empty string is a no-op.
/// WHY: It must not clobber whatever the user already has on the clipboard.
#[test]
#[ignore = "requires a desktop session with a clipboard"]
fn inject_empty_text_leaves_clipboard_alone() {
    // Given: a known clipboard value.
    let mut handler = OutputHandler::new().unwrap();
    handler.set_clipboard("precious").unwrap();

    // When: empty text is injected.
    handler.inject("").unwrap();

    // Then: the clipboard is untouched.
    assert_eq!(handler.clipboard.get_text().unwrap(), "precious");
}

/// WHAT: Non-ASCII text survives the clipboard write.
/// WHY: The primary dictation language is Mandarin.
#[test]
#[ignore = "requires a desktop session with a clipboard"]
fn set_clipboard_preserves_cjk_text() {
    let mut handler = OutputHandler::new().unwrap();
    handler.set_clipboard("你好，世界").unwrap();
    assert_eq!(handler.clipboard.get_text().unwrap(), "你好，世界");
}
