use ::url::Url;

/// Resolves a possibly site-relative link against a base URL
///
/// Returns `None` when either side cannot be parsed.
pub fn resolve_link(base: &str, href: &str) -> Option<String> {
    let base = Url::parse(base).ok()?;
    base.join(href.trim()).ok().map(String::from)
}

/// Extracts the listing id from a detail-page URL
///
/// Detail pages look like `https://sh.lianjia.com/xiaoqu/5011000012345/` or
/// `https://sh.lianjia.com/chengjiao/107100123456.html`; the id is the last
/// path segment without its extension.
///
/// # Examples
///
/// ```
/// use listing_sweep::url::listing_id_from_url;
///
/// assert_eq!(
///     listing_id_from_url("https://sh.lianjia.com/xiaoqu/5011000012345/"),
///     Some("5011000012345".to_string())
/// );
/// assert_eq!(
///     listing_id_from_url("https://sh.lianjia.com/chengjiao/107100123456.html"),
///     Some("107100123456".to_string())
/// );
/// ```
pub fn listing_id_from_url(url: &str) -> Option<String> {
    let trimmed = strip_trailing_slash(url.trim());
    let last = trimmed.rsplit('/').next()?;
    let id = last.split('.').next()?.trim();

    if id.is_empty() || id.contains(':') {
        None
    } else {
        Some(id.to_string())
    }
}

/// Removes trailing `/` characters from a URL
pub fn strip_trailing_slash(url: &str) -> &str {
    url.trim_end_matches('/')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_relative_link() {
        assert_eq!(
            resolve_link("https://sh.lianjia.com/zufang/", "/zufang/SH123.html"),
            Some("https://sh.lianjia.com/zufang/SH123.html".to_string())
        );
    }

    #[test]
    fn test_resolve_absolute_link() {
        assert_eq!(
            resolve_link("https://sh.lianjia.com/zufang/", "https://other.com/x"),
            Some("https://other.com/x".to_string())
        );
    }

    #[test]
    fn test_resolve_invalid_base() {
        assert_eq!(resolve_link("not a url", "/x"), None);
    }

    #[test]
    fn test_listing_id_variants() {
        assert_eq!(
            listing_id_from_url("https://sh.lianjia.com/xiaoqu/123"),
            Some("123".to_string())
        );
        assert_eq!(
            listing_id_from_url("https://sh.lianjia.com/xiaoqu/123//"),
            Some("123".to_string())
        );
        assert_eq!(listing_id_from_url(""), None);
        assert_eq!(listing_id_from_url("https://"), None);
    }

    #[test]
    fn test_strip_trailing_slash() {
        assert_eq!(strip_trailing_slash("https://a.com/x/"), "https://a.com/x");
        assert_eq!(strip_trailing_slash("https://a.com/x"), "https://a.com/x");
    }
}
