//! Filename sanitization.

/// Characters that cannot appear in a path segment.
const RESERVED: [char; 10] = ['/', '\\', '?', '%', '*', ':', '|', '"', '<', '>'];

/// Sanitize a path segment derived from remote text.
///
/// Every reserved character becomes `_` and surrounding whitespace is
/// trimmed. The result is never split into further segments.
pub fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if RESERVED.contains(&c) { '_' } else { c })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Sanitize a segment, substituting `fallback` when nothing usable remains.
pub fn sanitize_or(name: &str, fallback: &str) -> String {
    let sanitized = sanitize(name);
    if sanitized.is_empty() || sanitized == "." || sanitized == ".." {
        fallback.to_string()
    } else {
        sanitized
    }
}
