//! Common utilities for backend clients
//!
//! Helpers shared across the backend clients for keeping credentials out of
//! logs and error messages.

/// Minimum key length to display partial key
const MIN_KEY_LENGTH_FOR_PARTIAL_DISPLAY: usize = 8;

/// Number of characters to show at start/end of masked key
const KEY_MASK_VISIBLE_CHARS: usize = 4;

/// Longest provider message carried in a `BackendError`
pub const MAX_ERROR_MESSAGE_CHARS: usize = 300;

/// Mask API key for safe display in logs
///
/// Shows first 4 and last 4 characters for keys longer than 8 characters,
/// otherwise shows "****" to prevent exposure of short keys.
///
/// # Examples
/// ```
/// use switchyard_llm::util::mask_api_key;
/// assert_eq!(mask_api_key("sk-1234567890abcdef"), "sk-1...cdef");
/// assert_eq!(mask_api_key("short"), "****");
/// ```
#[must_use]
pub fn mask_api_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= MIN_KEY_LENGTH_FOR_PARTIAL_DISPLAY {
        return "****".to_string();
    }
    let head: String = chars[..KEY_MASK_VISIBLE_CHARS].iter().collect();
    let tail: String = chars[chars.len() - KEY_MASK_VISIBLE_CHARS..].iter().collect();
    format!("{head}...{tail}")
}

/// Truncate to at most `max_chars` characters without splitting a code point
#[must_use]
pub fn truncate_safe(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

/// Replace every occurrence of `key` in `message` with its masked form
#[must_use]
pub fn scrub_key(message: &str, key: &str) -> String {
    if key.is_empty() || !message.contains(key) {
        return message.to_string();
    }
    message.replace(key, &mask_api_key(key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_api_key_long() {
        let key = "sk-1234567890abcdefghij";
        let masked = mask_api_key(key);
        assert_eq!(masked, "sk-1...ghij");
        assert!(!masked.contains("567890"));
    }

    #[test]
    fn test_mask_api_key_short() {
        assert_eq!(mask_api_key("short"), "****");
        assert_eq!(mask_api_key("12345678"), "****");
        assert_eq!(mask_api_key(""), "****");
    }

    #[test]
    fn test_truncate_safe() {
        assert_eq!(truncate_safe("hello", 10), "hello");
        assert_eq!(truncate_safe("hello world", 5), "hello...");
        // multi-byte characters are never split
        assert_eq!(truncate_safe("안녕하세요", 2), "안녕...");
    }

    #[test]
    fn test_scrub_key() {
        let key = "gsk_abcdefghijklmnopqrstuvwxyz";
        let scrubbed = scrub_key(&format!("bad key {key} rejected"), key);
        assert_eq!(scrubbed, "bad key gsk_...wxyz rejected");
        assert_eq!(scrub_key("nothing here", key), "nothing here");
    }
}
