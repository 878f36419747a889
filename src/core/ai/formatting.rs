//! Formatting helpers for AI answers shown in Discord.
//!
//! Discord rejects messages over 2000 characters, so answers are cut well
//! below that before sending.

/// Longest answer body sent as-is. Anything longer is cut here.
pub const MAX_ANSWER_CHARS: usize = 1900;

/// Appended after a cut answer.
pub const TRUNCATION_MARKER: &str = "...";

/// Cuts `text` to at most `max_chars` characters, appending the marker when
/// anything was removed. Counts characters, so multi-byte text never splits
/// inside a code point.
pub fn truncate_answer(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => {
            let mut cut = String::with_capacity(byte_idx + TRUNCATION_MARKER.len());
            cut.push_str(&text[..byte_idx]);
            cut.push_str(TRUNCATION_MARKER);
            cut
        }
        None => text.to_string(),
    }
}
