//! Text shaping for replies and log previews.

/// Remove every character in `strip` from `text`, then cap it at `max_chars` characters.
pub fn shape_reply(text: &str, strip: &str, max_chars: usize) -> String {
    let stripped: String = text.chars().filter(|c| !strip.contains(*c)).collect();
    truncate_chars(&stripped, max_chars).to_string()
}

/// Truncate to at most `max_chars` characters without splitting one.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Prefix of `text` no longer than `max_bytes`, cut on a char boundary.
pub fn preview(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }

    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
