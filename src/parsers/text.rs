/// Collapses runs of whitespace (spaces, newlines, tabs) into single spaces
/// and trims both ends.
pub fn clean(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Concatenates text nodes as they appear in the document, then cleans the
/// result. Inline markup inside a word (`<b>T</b>rator`) leaves it whole.
pub fn text_content<'a, I>(fragments: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    clean(&fragments.into_iter().collect::<String>())
}

/// Returns at most `max_chars` characters of `text`, never splitting a
/// multi-byte character.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}
