//! `Link` header pagination helpers.

/// Extract the `rel="next"` URL from a `Link` header value.
pub fn parse_next_link(header: &str) -> Option<String> {
    let next = header
        .split(',')
        .find(|link| link.contains(r#"rel="next""#))?;

    let start = next.find('<')? + 1;
    let end = start + next[start..].find('>')?;
    let url = &next[start..end];

    if url.is_empty() {
        None
    } else {
        Some(url.to_string())
    }
}

/// Append the page-size hint to a request URL.
pub fn with_page_size(url: &str, per_page: u32) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{}{}per_page={}", url, separator, per_page)
}
