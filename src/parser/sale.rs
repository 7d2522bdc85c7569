use crate::parser::{
    clean, require, require_attr, select_all, select_first, text_of, Extracted, PageContext,
    SkipReason,
};
use crate::storage::HouseInfo;
use scraper::{ElementRef, Html};

/// Extracts the homes listed on a sale index page
pub fn parse_sale_page(html: &str, ctx: &PageContext<'_>) -> Extracted<HouseInfo> {
    let document = Html::parse_document(html);
    let mut extracted = Extracted::default();

    for (index, item) in select_all(&document, "ul.sellListContent > li")
        .into_iter()
        .enumerate()
    {
        extracted.push(index, parse_item(item, ctx));
    }

    extracted
}

fn parse_item(item: ElementRef<'_>, ctx: &PageContext<'_>) -> Result<HouseInfo, SkipReason> {
    let title_link = require(item, "div.title a", "title")?;
    let title = text_of(title_link);
    let link = require_attr(title_link, "href", "link")?.to_string();
    let house_id = require_attr(title_link, "data-housecode", "house_id")
        .or_else(|_| require_attr(title_link, "data-lj_action_housedel_id", "house_id"))?
        .to_string();

    // "2室1厅 | 89.5平米 | 南 | 精装 | 中楼层(共6层) | 1998年建"
    let info_raw = text_of(require(item, "div.houseInfo", "houseInfo")?);
    let info: Vec<String> = info_raw.split('|').map(clean).collect();
    if info.len() < 6 {
        return Err(SkipReason::Malformed {
            field: "houseInfo",
            value: info_raw,
        });
    }

    let position = text_of(require(item, "div.positionInfo", "positionInfo")?);
    let mut position_parts = position.split('-').map(clean);
    let community = position_parts.next().unwrap_or_default();
    let zone = position_parts.next().unwrap_or_default();

    let follow_info = text_of(require(item, "div.followInfo", "followInfo")?);
    let tax_type = select_first(item, "span.taxfree")
        .map(text_of)
        .unwrap_or_default();
    let total_price = text_of(require(item, "div.totalPrice span", "total_price")?);
    let unit_price = require_attr(
        require(item, "div.unitPrice", "unit_price")?,
        "data-price",
        "unit_price",
    )?
    .to_string();

    let mut info = info.into_iter();
    let mut next_info = || info.next().unwrap_or_default();

    Ok(HouseInfo {
        house_id,
        title,
        link,
        community,
        zone,
        house_type: next_info(),
        square: next_info(),
        direction: next_info(),
        decoration: next_info(),
        floor: next_info(),
        years: next_info(),
        follow_info,
        tax_type,
        total_price,
        unit_price,
        region: ctx.region.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::tests::context;

    fn item(title_attrs: &str, house_info: &str, extra: &str) -> String {
        format!(
            r#"<li class="clear">
                <div class="title"><a href="https://sh.lianjia.com/ershoufang/{id}.html" {attrs}>Sunny two-bed</a></div>
                <div class="houseInfo">{info}</div>
                <div class="positionInfo">Green Court - Beicai</div>
                <div class="followInfo">12人关注 / 3天以前发布</div>
                {extra}
                <div class="totalPrice"><span>520</span>万</div>
                <div class="unitPrice" data-price="58100"><span>58,100元/平</span></div>
            </li>"#,
            id = "107",
            attrs = title_attrs,
            info = house_info,
            extra = extra,
        )
    }

    const FULL_INFO: &str = "2室1厅 | 89.5平米 | 南 北 | 精装 | 中楼层(共6层) | 1998年建";

    #[test]
    fn test_parses_complete_item() {
        let html = format!(
            r#"<ul class="sellListContent">{}</ul>"#,
            item(
                r#"data-housecode="107""#,
                FULL_INFO,
                r#"<span class="taxfree">满五年</span>"#
            )
        );

        let extracted = parse_sale_page(&html, &context());
        assert!(extracted.skipped.is_empty());
        let house = &extracted.records[0];
        assert_eq!(house.house_id, "107");
        assert_eq!(house.title, "Sunny two-bed");
        assert_eq!(house.community, "Green Court");
        assert_eq!(house.zone, "Beicai");
        assert_eq!(house.house_type, "2室1厅");
        assert_eq!(house.square, "89.5平米");
        assert_eq!(house.direction, "南 北");
        assert_eq!(house.years, "1998年建");
        assert_eq!(house.tax_type, "满五年");
        assert_eq!(house.total_price, "520");
        assert_eq!(house.unit_price, "58100");
        assert_eq!(house.region, "pudong");
    }

    #[test]
    fn test_falls_back_to_housedel_id() {
        let html = format!(
            r#"<ul class="sellListContent">{}</ul>"#,
            item(r#"data-lj_action_housedel_id="990""#, FULL_INFO, "")
        );

        let extracted = parse_sale_page(&html, &context());
        assert_eq!(extracted.records[0].house_id, "990");
        assert_eq!(extracted.records[0].tax_type, "");
    }

    #[test]
    fn test_skips_malformed_item_keeps_rest() {
        let html = format!(
            r#"<ul class="sellListContent">{}{}</ul>"#,
            item(r#"data-housecode="1""#, "2室1厅 | 89.5平米", ""),
            item(r#"data-housecode="2""#, FULL_INFO, "")
        );

        let extracted = parse_sale_page(&html, &context());
        assert_eq!(extracted.records.len(), 1);
        assert_eq!(extracted.records[0].house_id, "2");
        assert_eq!(extracted.skipped.len(), 1);
        assert_eq!(extracted.skipped[0].index, 0);
        assert!(matches!(
            extracted.skipped[0].reason,
            SkipReason::Malformed {
                field: "houseInfo",
                ..
            }
        ));
    }

    #[test]
    fn test_missing_id_is_skipped() {
        let html = format!(
            r#"<ul class="sellListContent">{}</ul>"#,
            item("", FULL_INFO, "")
        );

        let extracted = parse_sale_page(&html, &context());
        assert!(extracted.records.is_empty());
        assert_eq!(
            extracted.skipped[0].reason,
            SkipReason::MissingField("house_id")
        );
    }
}
