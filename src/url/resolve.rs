use crate::{UrlError, UrlResult};
use url::Url;

/// Returns true if `href` starts with a URL scheme (`scheme:`)
///
/// Follows RFC 3986: a letter followed by letters, digits, `+`, `-` or `.`,
/// terminated by a colon.
pub fn has_scheme(href: &str) -> bool {
    let Some((scheme, _)) = href.split_once(':') else {
        return false;
    };

    let mut chars = scheme.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {}
        _ => return false,
    }

    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Resolves an href to an absolute URL
///
/// Hrefs that already carry a scheme are kept verbatim; everything else is
/// joined against the page URL.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use doc_distiller::url::resolve_href;
///
/// let base = Url::parse("https://x.com/b/c").unwrap();
/// assert_eq!(resolve_href("/a", &base).unwrap(), "https://x.com/a");
/// assert_eq!(resolve_href("https://y.org/z", &base).unwrap(), "https://y.org/z");
/// ```
pub fn resolve_href(href: &str, base: &Url) -> UrlResult<String> {
    let href = href.trim();

    if has_scheme(href) {
        return Ok(href.to_string());
    }

    base.join(href)
        .map(|url| url.to_string())
        .map_err(|_| UrlError::Unresolvable {
            href: href.to_string(),
            base: base.to_string(),
        })
}
