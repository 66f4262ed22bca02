//! HTML helper functions

use lazy_static::lazy_static;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use regex::Regex;

/// Characters escaped in a URL path segment (unreserved ones pass through)
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

lazy_static! {
    /// Schemes allowed in generated `href`/`src` attributes
    static ref SAFE_URL: Regex = Regex::new(r"(?i)^(https?://|mailto:|/|#)").unwrap();
    static ref WEB_URL: Regex = Regex::new(r"(?i)^https?://").unwrap();
}

/// Escape HTML special characters
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Whether a URL may be placed in an attribute without script injection
pub fn is_safe_url(url: &str) -> bool {
    SAFE_URL.is_match(url.trim())
}

/// Whether a URL points to another site
pub fn is_external_url(url: &str) -> bool {
    WEB_URL.is_match(url.trim())
}

/// Generate an anchor tag around already-escaped inner markup
///
/// # Examples
/// ```ignore
/// link_to("/post/hello", "Hello", false) // -> <a href="/post/hello">Hello</a>
/// ```
pub fn link_to(href: &str, inner: &str, external: bool) -> String {
    if external {
        format!(
            r#"<a href="{}" target="_blank" rel="noopener">{}</a>"#,
            html_escape(href),
            inner
        )
    } else {
        format!(r#"<a href="{}">{}</a>"#, html_escape(href), inner)
    }
}

/// Generate an image tag
pub fn image_tag(src: &str, alt: Option<&str>) -> String {
    format!(
        r#"<img src="{}" alt="{}" />"#,
        html_escape(src),
        html_escape(alt.unwrap_or(""))
    )
}

/// Encode a path segment
pub fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT).to_string()
}
