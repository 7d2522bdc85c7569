use crate::parser::{select_all, text_of};
use scraper::Html;

/// Title fragments of the portal's verification interstitials
const BLOCK_TITLE_MARKERS: &[&str] = &["人机认证", "验证异常", "captcha"];

/// Elements only present on verification interstitials
const BLOCK_SELECTORS: &[&str] = &["#captcha", "div.captcha", "div.geetest_holder"];

/// Returns true if the page is a block/CAPTCHA interstitial instead of content
///
/// # Examples
///
/// ```
/// use listing_sweep::parser::is_block_page;
///
/// assert!(is_block_page("<html><head><title>人机认证</title></head></html>"));
/// assert!(!is_block_page("<html><head><title>Pudong listings</title></head></html>"));
/// ```
pub fn is_block_page(html: &str) -> bool {
    let document = Html::parse_document(html);

    let title_blocked = select_all(&document, "title").into_iter().any(|title| {
        let text = text_of(title).to_lowercase();
        BLOCK_TITLE_MARKERS.iter().any(|marker| text.contains(marker))
    });

    title_blocked
        || BLOCK_SELECTORS
            .iter()
            .any(|css| !select_all(&document, css).is_empty())
}
