use crate::parser::select_all;
use scraper::Html;
use serde::Deserialize;

/// The pagination widgets used by the listing indexes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationStyle {
    /// `<div class="page-box house-lst-page-box" page-data='{"totalPage":N,"curPage":M}'>`
    PageData,

    /// `<div data-el="page_navigation" data-totalpage="N">`
    TotalPageAttr,
}

#[derive(Debug, Deserialize)]
struct PageData {
    #[serde(rename = "totalPage")]
    total_page: u32,
}

/// Returns the total number of result pages a listing page announces
///
/// Fails soft: a missing widget, a missing attribute or a malformed number all
/// yield 0. Narrow filter combinations legitimately have no results, so zero
/// simply means there is nothing to enumerate for that query.
///
/// # Examples
///
/// ```
/// use listing_sweep::parser::{page_count, PaginationStyle};
///
/// let html = r#"<div class="page-box house-lst-page-box" page-data='{"totalPage":45,"curPage":1}'></div>"#;
/// assert_eq!(page_count(PaginationStyle::PageData, html), 45);
/// assert_eq!(page_count(PaginationStyle::PageData, "<p>nothing</p>"), 0);
/// ```
pub fn page_count(style: PaginationStyle, html: &str) -> u32 {
    let document = Html::parse_document(html);

    let count = match style {
        PaginationStyle::PageData => page_data_count(&document),
        PaginationStyle::TotalPageAttr => total_page_attr_count(&document),
    };

    count.unwrap_or(0)
}

fn page_data_count(document: &Html) -> Option<u32> {
    let widget = select_all(document, "div.page-box.house-lst-page-box")
        .into_iter()
        .next()?;
    let raw = widget.value().attr("page-data")?;
    let data: PageData = serde_json::from_str(raw).ok()?;
    Some(data.total_page)
}

fn total_page_attr_count(document: &Html) -> Option<u32> {
    let widget = select_all(document, r#"div[data-el="page_navigation"]"#)
        .into_iter()
        .next()?;
    widget.value().attr("data-totalpage")?.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_data_widget() {
        let html = r#"<html><body>
            <div class="page-box house-lst-page-box" comp-module="page"
                 page-url="/ershoufang/pg{page}/" page-data='{"totalPage":100,"curPage":1}'></div>
        </body></html>"#;
        assert_eq!(page_count(PaginationStyle::PageData, html), 100);
    }

    #[test]
    fn test_page_data_malformed_json() {
        let html = r#"<div class="page-box house-lst-page-box" page-data='{"totalPage":"many"}'></div>"#;
        assert_eq!(page_count(PaginationStyle::PageData, html), 0);

        let html = r#"<div class="page-box house-lst-page-box" page-data='not json'></div>"#;
        assert_eq!(page_count(PaginationStyle::PageData, html), 0);
    }

    #[test]
    fn test_page_data_missing_attribute() {
        let html = r#"<div class="page-box house-lst-page-box"></div>"#;
        assert_eq!(page_count(PaginationStyle::PageData, html), 0);
    }

    #[test]
    fn test_total_page_attr_widget() {
        let html = r#"<div class="content__pg" data-el="page_navigation" data-url="/zufang/pg{page}/"
                           data-totalpage="37" data-curpage="1"></div>"#;
        assert_eq!(page_count(PaginationStyle::TotalPageAttr, html), 37);
    }

    #[test]
    fn test_total_page_attr_malformed() {
        let html = r#"<div data-el="page_navigation" data-totalpage="-3"></div>"#;
        assert_eq!(page_count(PaginationStyle::TotalPageAttr, html), 0);

        let html = r#"<div data-el="page_navigation"></div>"#;
        assert_eq!(page_count(PaginationStyle::TotalPageAttr, html), 0);
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(page_count(PaginationStyle::PageData, ""), 0);
        assert_eq!(page_count(PaginationStyle::TotalPageAttr, ""), 0);
    }
}
