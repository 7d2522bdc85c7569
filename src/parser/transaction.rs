use crate::parser::{
    clean, require, require_attr, select_all, select_first, select_within, text_of, Extracted,
    PageContext, SkipReason,
};
use crate::storage::SellInfo;
use crate::url::listing_id_from_url;
use scraper::{ElementRef, Html};

/// Extracts the closed deals listed on a transaction index page
pub fn parse_transaction_page(html: &str, ctx: &PageContext<'_>) -> Extracted<SellInfo> {
    let document = Html::parse_document(html);
    let mut extracted = Extracted::default();

    for (index, item) in select_all(&document, "ul.listContent > li")
        .into_iter()
        .enumerate()
    {
        extracted.push(index, parse_item(item, ctx));
    }

    extracted
}

fn parse_item(item: ElementRef<'_>, ctx: &PageContext<'_>) -> Result<SellInfo, SkipReason> {
    let title_block = require(item, "div.title", "title")?;
    let title = text_of(title_block);
    let link = require_attr(require(title_block, "a", "link")?, "href", "link")?.to_string();
    let house_id = listing_id_from_url(&link).ok_or_else(|| SkipReason::Malformed {
        field: "link",
        value: link.clone(),
    })?;

    // "绿洲花园 2室1厅 89.5平米"
    let mut title_parts = title.split(' ').map(clean);
    let community = title_parts.next().unwrap_or_default();
    let house_type = title_parts.next().unwrap_or_default();
    let square = title_parts.next().unwrap_or_default();

    // "南 北 | 精装"
    let info = text_of(require(item, "div.houseInfo", "houseInfo")?);
    let mut info_parts = info.split('|').map(clean);
    let direction = info_parts.next().unwrap_or_default();
    let decoration = info_parts.next().unwrap_or_default();

    // "中楼层(共6层) 1998年建板楼"
    let position = text_of(require(item, "div.positionInfo", "positionInfo")?);
    let floor = position.split(' ').next().unwrap_or_default().to_string();
    let years = position.split(' ').last().unwrap_or_default().to_string();

    let total_price = span_or_text(require(item, "div.totalPrice", "total_price")?);
    let unit_price = span_or_text(require(item, "div.unitPrice", "unit_price")?);
    let deal_date = text_of(require(item, "div.dealDate", "deal_date")?).replace('.', "-");

    // "挂牌530万 成交周期45天"
    let (list_price, turnover) = select_first(item, "span.dealCycleTxt")
        .map(|cycle| {
            let spans: Vec<String> = select_within(cycle, "span").into_iter().map(text_of).collect();
            match spans.as_slice() {
                [list_price, turnover] => (list_price.clone(), turnover.clone()),
                _ => (String::new(), String::new()),
            }
        })
        .unwrap_or_default();

    Ok(SellInfo {
        house_id,
        title,
        link,
        community,
        house_type,
        square,
        direction,
        decoration,
        floor,
        years,
        total_price,
        unit_price,
        deal_date,
        list_price,
        turnover,
        region: ctx.region.to_string(),
    })
}

/// Text of the first `span` inside `element`, or of the element itself
fn span_or_text(element: ElementRef<'_>) -> String {
    select_first(element, "span")
        .map(text_of)
        .unwrap_or_else(|| text_of(element))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::tests::context;

    const DEAL: &str = r#"
        <ul class="listContent">
          <li>
            <div class="info">
              <div class="title"><a href="https://sh.lianjia.com/chengjiao/107100123456.html">绿洲花园 2室1厅 89.5平米</a></div>
              <div class="address">
                <div class="houseInfo">南 北 | 精装</div>
                <div class="dealDate">2023.11.05</div>
                <div class="totalPrice"><span class="number">505</span>万</div>
              </div>
              <div class="flood">
                <div class="positionInfo">中楼层(共6层) 1998年建板楼</div>
                <div class="unitPrice"><span class="number">56425</span>元/平</div>
              </div>
              <div class="dealCycleeInfo">
                <span class="dealCycleTxt"><span>挂牌530万</span><span>成交周期45天</span></span>
              </div>
            </div>
          </li>
        </ul>"#;

    #[test]
    fn test_parses_complete_deal() {
        let extracted = parse_transaction_page(DEAL, &context());
        assert!(extracted.skipped.is_empty(), "{:?}", extracted.skipped);

        let deal = &extracted.records[0];
        assert_eq!(deal.house_id, "107100123456");
        assert_eq!(deal.community, "绿洲花园");
        assert_eq!(deal.house_type, "2室1厅");
        assert_eq!(deal.square, "89.5平米");
        assert_eq!(deal.direction, "南 北");
        assert_eq!(deal.decoration, "精装");
        assert_eq!(deal.floor, "中楼层(共6层)");
        assert_eq!(deal.years, "1998年建板楼");
        assert_eq!(deal.total_price, "505");
        assert_eq!(deal.unit_price, "56425");
        assert_eq!(deal.deal_date, "2023-11-05");
        assert_eq!(deal.list_price, "挂牌530万");
        assert_eq!(deal.turnover, "成交周期45天");
        assert_eq!(deal.region, "pudong");
    }

    #[test]
    fn test_price_without_span_and_no_cycle() {
        let html = r#"
            <ul class="listContent">
              <li>
                <div class="title"><a href="https://sh.lianjia.com/chengjiao/107100000001.html">锦绣苑 1室0厅 35平米</a></div>
                <div class="houseInfo">南</div>
                <div class="dealDate">2023.01.20</div>
                <div class="totalPrice">暂无价格</div>
                <div class="positionInfo">低楼层(共18层)</div>
                <div class="unitPrice">暂无</div>
              </li>
            </ul>"#;

        let extracted = parse_transaction_page(html, &context());
        let deal = &extracted.records[0];
        assert_eq!(deal.total_price, "暂无价格");
        assert_eq!(deal.unit_price, "暂无");
        assert_eq!(deal.decoration, "");
        assert_eq!(deal.floor, "低楼层(共18层)");
        assert_eq!(deal.years, "低楼层(共18层)");
        assert_eq!(deal.list_price, "");
        assert_eq!(deal.turnover, "");
    }

    #[test]
    fn test_missing_deal_date_is_skipped() {
        let html = r#"
            <ul class="listContent">
              <li>
                <div class="title"><a href="https://sh.lianjia.com/chengjiao/107100000002.html">Lane 1室</a></div>
                <div class="houseInfo">南</div>
                <div class="totalPrice"><span>300</span></div>
                <div class="positionInfo">高楼层</div>
                <div class="unitPrice"><span>40000</span></div>
              </li>
            </ul>"#;

        let extracted = parse_transaction_page(html, &context());
        assert!(extracted.records.is_empty());
        assert_eq!(
            extracted.skipped[0].reason,
            SkipReason::MissingField("deal_date")
        );
    }
}
