/// Composes a listing-index URL from an endpoint, a region and filter tokens
///
/// The tokens are concatenated without separators because the portal reads
/// them positionally (`p3l2` is "price band 3, two rooms"), so the order must
/// be the order in which the filters were applied. Runs of `/` inside the
/// appended part are collapsed; the scheme separator of `base` is left alone.
///
/// # Arguments
///
/// * `base` - Endpoint URL of one listing type (e.g. `https://sh.lianjia.com/ershoufang/`)
/// * `region` - Region token (e.g. `pudong`)
/// * `tokens` - Filter tokens in application order
///
/// # Examples
///
/// ```
/// use listing_sweep::url::build_listing_url;
///
/// let base = "https://sh.lianjia.com/ershoufang/";
/// assert_eq!(
///     build_listing_url(base, "pudong", &["p1", "l2"]),
///     "https://sh.lianjia.com/ershoufang/pudong/p1l2/"
/// );
/// assert_eq!(
///     build_listing_url(base, "pudong", &[] as &[&str]),
///     "https://sh.lianjia.com/ershoufang/pudong/"
/// );
/// ```
pub fn build_listing_url<S: AsRef<str>>(base: &str, region: &str, tokens: &[S]) -> String {
    let joined: String = tokens.iter().map(AsRef::as_ref).collect();
    let tail = collapse_separators(&format!("{}/{}/", region, joined));

    let mut url = base.trim_end_matches('/').to_string();
    url.push('/');
    url.push_str(tail.trim_start_matches('/'));
    url
}

/// Returns the filter token selecting one result page (`pg{n}`)
pub fn page_token(page: u32) -> String {
    format!("pg{}", page)
}

/// Collapses every run of consecutive `/` into a single one
fn collapse_separators(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut previous_slash = false;

    for c in path.chars() {
        if c == '/' {
            if previous_slash {
                continue;
            }
            previous_slash = true;
        } else {
            previous_slash = false;
        }
        out.push(c);
    }

    out
}
