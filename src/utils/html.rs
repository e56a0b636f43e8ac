//! HTML escaping for user-supplied names
//!
//! The escaped form is what gets rendered, hashed, used as the cache key and
//! sent to the identicon generator, so the mapping must never change.

/// Escape `&`, `<`, `>`, `"` and `'` for embedding in HTML text or attributes.
///
/// ```rust
/// use identidock::utils::escape_html;
///
/// assert_eq!(escape_html(r#"<b class="x">Tom & Jerry's</b>"#),
///     "&lt;b class=&quot;x&quot;&gt;Tom &amp; Jerry&#x27;s&lt;/b&gt;");
/// ```
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            other => escaped.push(other),
        }
    }
    escaped
}
