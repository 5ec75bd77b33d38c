// ABOUTME: Relative-to-absolute URL resolution against the configured site base.
// ABOUTME: Deliberately a string join, not full RFC 3986 reference resolution.

/// Resolve a possibly relative link against the site base.
///
/// Rules:
/// - empty input stays empty;
/// - input already carrying an `http`/`https` scheme is returned unchanged;
/// - anything else becomes `base` + `/` + `link` with exactly one joining
///   slash (trailing slash of the base and leading slash of the link are
///   stripped).
///
/// This is a simplified join: `..`-relative paths, query-only references and
/// protocol-relative (`//host/...`) URLs are not handled. Site rules on the
/// target sites only ever produce root-relative or absolute links.
pub fn resolve(base: &str, link: &str) -> String {
    if link.is_empty() || link.starts_with("http") {
        return link.to_string();
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        link.trim_start_matches('/')
    )
}
