use crate::parser::{
    clean, require, require_attr, select_all, select_within, text_of, Extracted, PageContext,
    SkipReason,
};
use crate::storage::Community;
use scraper::{ElementRef, Html};

/// Extracts the communities listed on a community index page
///
/// The rental count and the average price are optional: communities without
/// rentals have no rental link, and new communities often show no price.
pub fn parse_community_page(html: &str, ctx: &PageContext<'_>) -> Extracted<Community> {
    let document = Html::parse_document(html);
    let mut extracted = Extracted::default();

    for (index, item) in select_all(&document, "li.clear").into_iter().enumerate() {
        extracted.push(index, parse_item(item, ctx));
    }

    extracted
}

fn parse_item(item: ElementRef<'_>, ctx: &PageContext<'_>) -> Result<Community, SkipReason> {
    let id = require_attr(item, "data-housecode", "id")?.to_string();

    let title_block = require(item, "div.title", "title")?;
    let title = text_of(title_block);
    let link = require_attr(require(title_block, "a", "link")?, "href", "link")?.to_string();

    let district = text_of(require(item, "a.district", "district")?);
    let biz_circle = text_of(require(item, "a.bizcircle", "biz_circle")?);
    let tag_list = text_of(require(item, "div.tagList", "tag_list")?);
    let on_sale = text_of(require(item, "a.totalSellCount span", "on_sale")?);

    let rent_title = format!("{}租房", title);
    let on_rent = select_within(item, "a[title]")
        .into_iter()
        .find(|a| a.value().attr("title").map(str::trim) == Some(rent_title.as_str()))
        .map(|a| {
            let text = text_of(a);
            clean(text.split('套').next().unwrap_or_default())
        });

    let price = select_within(item, "div.totalPrice span")
        .into_iter()
        .next()
        .map(text_of)
        .filter(|p| !p.is_empty());

    Ok(Community {
        id,
        title,
        link,
        district,
        biz_circle,
        tag_list,
        on_sale,
        on_rent,
        price,
        city: ctx.city.to_string(),
        region: ctx.region.to_string(),
    })
}
