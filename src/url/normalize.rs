use crate::url::{PagePath, Target};

/// The components of a raw href, split without any resolution
///
/// Splitting follows the generic URI-reference grammar: a scheme is only
/// recognised when everything before the first `:` is a valid scheme name,
/// and a network location only after a leading `//`. Empty components count
/// as absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference<'a> {
    pub scheme: Option<&'a str>,
    pub netloc: Option<&'a str>,
    pub path: &'a str,
    pub query: Option<&'a str>,
}

impl<'a> Reference<'a> {
    /// Splits an href into scheme, network location, path and query
    ///
    /// The fragment is dropped.
    pub fn split(href: &'a str) -> Self {
        let rest = match href.split_once('#') {
            Some((before, _fragment)) => before,
            None => href,
        };
        // Fragment goes first; whitespace in front of '#' must not survive
        let rest = rest.trim_matches(|c: char| c.is_ascii_whitespace() || c.is_ascii_control());

        let (scheme, rest) = match rest.find(':') {
            Some(i) if is_scheme(&rest[..i]) => (Some(&rest[..i]), &rest[i + 1..]),
            _ => (None, rest),
        };

        let (netloc, rest) = match rest.strip_prefix("//") {
            Some(authority) => {
                let end = authority
                    .find(|c| c == '/' || c == '?')
                    .unwrap_or(authority.len());
                (Some(&authority[..end]), &authority[end..])
            }
            None => (None, rest),
        };

        let (path, query) = match rest.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (rest, None),
        };

        Self {
            scheme,
            netloc: netloc.filter(|n| !n.is_empty()),
            path,
            query: query.filter(|q| !q.is_empty()),
        }
    }
}

/// Checks for `ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )`
fn is_scheme(candidate: &str) -> bool {
    let mut chars = candidate.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        _ => false,
    }
}

/// Normalizes an href found on `current` into a page path on `target`
///
/// # Resolution Rules
///
/// 1. Explicit scheme: kept only when the network location equals the
///    target authority exactly (case-sensitive); the path is then absolute
/// 2. Protocol-relative (`//a/b`): the network location is treated as the
///    first path segment, giving `/a/b`
/// 3. Otherwise RFC 3986 §5.2 resolution against the current page:
///    - empty path keeps the current page (and its query if none is given)
///    - `/x` replaces the path
///    - `x` joins onto the current page's directory
/// 4. Dot segments are removed, the fragment dropped, the query kept
///
/// # Returns
///
/// `None` only when the href points at another host.
///
/// # Examples
///
/// ```
/// use tidemark::url::{normalize, PagePath, Target};
///
/// let target = Target::parse("http://example.com").unwrap();
/// let current = PagePath::from_parts("/blog/post1", None);
///
/// let page = normalize(&current, "../about#team", &target).unwrap();
/// assert_eq!(page.as_str(), "/about");
///
/// assert!(normalize(&current, "http://other.com/", &target).is_none());
/// ```
pub fn normalize(current: &PagePath, href: &str, target: &Target) -> Option<PagePath> {
    let reference = Reference::split(href);

    match (reference.scheme, reference.netloc) {
        (Some(_), netloc) if netloc != Some(target.netloc()) => {
            tracing::debug!("{} does not belong to {}, discarded", href, target.netloc());
            None
        }
        (Some(_), _) => Some(resolve_absolute(reference.path, reference.query)),
        (None, Some(netloc)) => Some(resolve_absolute(
            &format!("/{}{}", netloc, reference.path),
            reference.query,
        )),
        (None, None) => Some(resolve_relative(current, reference.path, reference.query)),
    }
}

/// Resolves a root-relative path
fn resolve_absolute(path: &str, query: Option<&str>) -> PagePath {
    let path = if path.starts_with('/') {
        remove_dot_segments(path)
    } else {
        remove_dot_segments(&format!("/{}", path))
    };
    PagePath::from_parts(&path, query)
}

/// Resolves a path-relative reference against the current page
fn resolve_relative(current: &PagePath, path: &str, query: Option<&str>) -> PagePath {
    if path.is_empty() {
        return PagePath::from_parts(current.path(), query.or(current.query()));
    }

    if path.starts_with('/') {
        return resolve_absolute(path, query);
    }

    // Merge onto everything up to and including the last '/'
    let base = current.path();
    let directory = match base.rfind('/') {
        Some(i) => &base[..=i],
        None => "/",
    };

    PagePath::from_parts(&remove_dot_segments(&format!("{}{}", directory, path)), query)
}

/// Removes `.` and `..` segments from an absolute path (RFC 3986 §5.2.4)
///
/// Empty segments are preserved, `..` never climbs above the root, and a
/// trailing dot segment leaves a trailing slash.
///
/// # Examples
///
/// ```
/// use tidemark::url::remove_dot_segments;
///
/// assert_eq!(remove_dot_segments("/a/b/c/./../../g"), "/a/g");
/// assert_eq!(remove_dot_segments("/a/b/.."), "/a/");
/// ```
pub fn remove_dot_segments(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').skip(1).collect();
    let last = segments.len().saturating_sub(1);
    let mut output: Vec<&str> = Vec::with_capacity(segments.len());

    for (i, segment) in segments.iter().enumerate() {
        match *segment {
            "." => {
                if i == last {
                    output.push("");
                }
            }
            ".." => {
                output.pop();
                if i == last {
                    output.push("");
                }
            }
            _ => output.push(segment),
        }
    }

    format!("/{}", output.join("/"))
}
