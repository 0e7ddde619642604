//! Link, text and sitemap extraction from raw documents
//!
//! These are deliberately crude scanners, not HTML parsers. Link extraction
//! behaves like the pattern `<a[^<>]+?href=(['"])(.*?)\1` (case-insensitive)
//! and text extraction like `>(.*?)<`, where `.` never matches a line break.
//! Both run left to right over non-overlapping matches.

/// Extracts every anchor `href` value, in document order
///
/// After `<a` (any case) at least one character other than `<` or `>` must
/// precede `href=`. The value is the shortest run up to the matching quote
/// and may not contain a line break; when it fails, a later `href=` within
/// the same tag is tried. Duplicates are kept and malformed tags are skipped.
///
/// # Examples
///
/// ```
/// use tidemark::crawler::extract_links;
///
/// let html = r#"<p><a href="/about">About</a> <A class='x' HREF='/blog'>Blog</A></p>"#;
/// assert_eq!(extract_links(html), vec!["/about", "/blog"]);
/// ```
pub fn extract_links(html: &str) -> Vec<String> {
    let bytes = html.as_bytes();
    let mut links = Vec::new();
    let mut pos = 0;

    while let Some(start) = find_anchor_open(bytes, pos) {
        match match_href(html, start + 2) {
            Some((value, end)) => {
                links.push(value.to_string());
                pos = end;
            }
            None => pos = start + 1,
        }
    }

    links
}

/// Position of the next `<a` / `<A` at or after `from`
fn find_anchor_open(bytes: &[u8], from: usize) -> Option<usize> {
    (from..bytes.len().saturating_sub(1))
        .find(|&i| bytes[i] == b'<' && bytes[i + 1].eq_ignore_ascii_case(&b'a'))
}

/// Matches `[^<>]+?href=(['"])(.*?)\1` starting at `from`
///
/// Returns the attribute value and the position just past the closing quote.
fn match_href(html: &str, from: usize) -> Option<(&str, usize)> {
    let bytes = html.as_bytes();
    let region_end = bytes[from..]
        .iter()
        .position(|&b| b == b'<' || b == b'>')
        .map_or(bytes.len(), |offset| from + offset);

    for attr in (from + 1)..=region_end {
        let is_href = bytes
            .get(attr..attr + 5)
            .map_or(false, |name| name.eq_ignore_ascii_case(b"href="));
        if !is_href {
            continue;
        }

        let quote = match bytes.get(attr + 5) {
            Some(&q) if q == b'"' || q == b'\'' => q,
            _ => continue,
        };

        let value_start = attr + 6;
        let closing = bytes[value_start..]
            .iter()
            .position(|&b| b == quote || b == b'\n')
            .map(|offset| value_start + offset);

        if let Some(end) = closing.filter(|&end| bytes[end] == quote) {
            return Some((&html[value_start..end], end + 1));
        }
    }

    None
}

/// Extracts every run of text between a `>` and the next `<`
///
/// Runs spanning a line break are not captured. Whitespace-only runs, empty
/// runs and script or style bodies are kept verbatim; entities are not
/// decoded.
///
/// # Examples
///
/// ```
/// use tidemark::crawler::extract_text;
///
/// let html = "<p>Hello <b>world</b></p>";
/// assert_eq!(extract_text(html), vec!["Hello ", "world", ""]);
/// ```
pub fn extract_text(html: &str) -> Vec<String> {
    let bytes = html.as_bytes();
    let mut fragments = Vec::new();
    let mut pos = 0;

    while let Some(offset) = html[pos..].find('>') {
        let start = pos + offset + 1;

        // Any '>' before a line break would fail on that same line break
        let Some(len) = html[start..].find(|c| c == '<' || c == '\n') else {
            break;
        };

        let end = start + len;
        if bytes[end] == b'<' {
            fragments.push(html[start..end].to_string());
        }
        pos = end + 1;
    }

    fragments
}

/// Extracts every `<loc>` value from a sitemap or sitemap index
///
/// Values are trimmed and the five predefined XML entities decoded. An
/// unterminated `<loc>` ends the scan.
///
/// # Examples
///
/// ```
/// use tidemark::crawler::extract_sitemap_locations;
///
/// let xml = "<urlset><url><loc> http://example.com/a?x=1&amp;y=2 </loc></url></urlset>";
/// assert_eq!(extract_sitemap_locations(xml), vec!["http://example.com/a?x=1&y=2"]);
/// ```
pub fn extract_sitemap_locations(xml: &str) -> Vec<String> {
    const OPEN: &str = "<loc>";
    const CLOSE: &str = "</loc>";

    let mut locations = Vec::new();
    let mut pos = 0;

    while let Some(offset) = xml[pos..].find(OPEN) {
        let start = pos + offset + OPEN.len();
        let Some(len) = xml[start..].find(CLOSE) else {
            break;
        };

        let value = xml[start..start + len].trim();
        if !value.is_empty() {
            locations.push(decode_xml_entities(value));
        }
        pos = start + len + CLOSE.len();
    }

    locations
}

fn decode_xml_entities(value: &str) -> String {
    value
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
