use crate::parser::{
    clean, require, require_attr, select_all, select_first, select_within, text_of, Extracted,
    PageContext, SkipReason,
};
use crate::storage::RentInfo;
use crate::url::resolve_link;
use scraper::{ElementRef, Html};

/// Extracts the rentals listed on a rent index page
///
/// The region stored with each rental is the district named in the listing's
/// location line, not the region token of the crawl: rental searches bleed
/// across district borders.
pub fn parse_rent_page(html: &str, ctx: &PageContext<'_>) -> Extracted<RentInfo> {
    let document = Html::parse_document(html);
    let mut extracted = Extracted::default();

    for (index, item) in select_all(&document, "div.content__list--item[data-house_code]")
        .into_iter()
        .enumerate()
    {
        extracted.push(index, parse_item(item, ctx));
    }

    extracted
}

fn parse_item(item: ElementRef<'_>, ctx: &PageContext<'_>) -> Result<RentInfo, SkipReason> {
    let house_id = require_attr(item, "data-house_code", "house_id")?.to_string();

    let title_link = require(item, "p.content__list--item--title a", "title")?;
    let title = text_of(title_link);
    let href = require_attr(title_link, "href", "link")?;
    let link = resolve_link(ctx.endpoint, href).ok_or_else(|| SkipReason::Malformed {
        field: "link",
        value: href.to_string(),
    })?;

    // "整租·Green Court 1室1厅" carries the rent type before the dot
    let rent_type = title
        .split_once('·')
        .map(|(kind, _)| clean(kind))
        .unwrap_or_default();

    // "浦东-北蔡-Green Court / 50㎡ / 南 / 1室1厅1卫 / 中楼层 （6层）"
    let description = require(item, "p.content__list--item--des", "description")?;
    let description_text = text_of(description);
    let parts: Vec<String> = description_text
        .split('/')
        .map(clean)
        .filter(|part| !part.is_empty())
        .collect();
    if parts.len() < 4 {
        return Err(SkipReason::Malformed {
            field: "description",
            value: description_text,
        });
    }

    let (region, zone, community) = location(description, &parts[0]).ok_or_else(|| {
        SkipReason::Malformed {
            field: "location",
            value: parts[0].clone(),
        }
    })?;

    let price = text_of(require(item, "span.content__list--item-price", "price")?);
    let decoration = select_first(item, "i.content__item__tag--decoration")
        .map(text_of)
        .unwrap_or_default();
    let subway = select_first(item, "i.content__item__tag--is_subway_house")
        .map(text_of)
        .unwrap_or_default();

    Ok(RentInfo {
        house_id,
        title,
        link,
        rent_type,
        region,
        zone,
        community,
        square: parts[1].clone(),
        direction: parts[2].clone(),
        house_type: parts[3].clone(),
        floor: parts.get(4).cloned().unwrap_or_default(),
        price,
        decoration,
        subway,
    })
}

/// District, zone and community of a rental
///
/// Taken from the three location links when present, otherwise from the
/// `district-zone-community` text.
fn location(description: ElementRef<'_>, text: &str) -> Option<(String, String, String)> {
    let links: Vec<String> = select_within(description, "a").into_iter().map(text_of).collect();
    if links.len() >= 3 {
        return Some((links[0].clone(), links[1].clone(), links[2].clone()));
    }

    let mut segments = text.splitn(3, '-').map(clean);
    let region = segments.next().filter(|s| !s.is_empty())?;
    let zone = segments.next()?;
    let community = segments.next()?;
    Some((region, zone, community))
}
