//! Conversation title derivation
//!
//! A conversation is titled once, from its first user message: the leading
//! characters of the text, with a marker when the text was cut.

pub const TITLE_MAX_CHARS: usize = 15;

const TRUNCATION_MARKER: &str = "...";

/// Derive a conversation title from the first user message.
///
/// Counts characters rather than bytes, so multibyte text is never split
/// mid-character.
pub fn derive_title(text: &str) -> String {
    let mut title: String = text.chars().take(TITLE_MAX_CHARS).collect();
    if text.chars().nth(TITLE_MAX_CHARS).is_some() {
        title.push_str(TRUNCATION_MARKER);
    }
    title
}
