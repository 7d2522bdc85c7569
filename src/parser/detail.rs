use crate::parser::{
    is_block_page, require, select_all, select_first, select_within, text_of, Extracted,
    SkipReason,
};
use crate::storage::{CommunityDetail, SubwayCommunity};
use scraper::{ElementRef, Html};

/// Outcome of parsing a community detail page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailPage {
    /// The portal served a verification interstitial instead of the page
    Blocked,

    /// Detail fields and nearby subway stops
    Parsed {
        detail: CommunityDetail,
        subways: Extracted<SubwayCommunity>,
    },
}

/// Parses the detail page of the community `community_id`
///
/// Info items with an unknown label are ignored. A page without the
/// surroundings block simply has no subway stops.
pub fn parse_community_detail(html: &str, community_id: &str) -> DetailPage {
    if is_block_page(html) {
        return DetailPage::Blocked;
    }

    let document = Html::parse_document(html);

    let mut detail = CommunityDetail::default();
    for item in select_all(&document, "div.xiaoquInfoItem") {
        let (Some(label), Some(content)) = (
            select_first(item, "span.xiaoquInfoLabel"),
            select_first(item, "span.xiaoquInfoContent"),
        ) else {
            continue;
        };

        let value = Some(text_of(content));
        match text_of(label).as_str() {
            "建筑年代" => detail.year = value,
            "建筑类型" => detail.house_type = value,
            "物业费用" => detail.cost = value,
            "物业公司" => detail.service = value,
            "开发商" => detail.company = value,
            "楼栋总数" => detail.building_num = value,
            "房屋总数" => detail.house_num = value,
            _ => {}
        }
    }

    let mut subways = Extracted::default();
    if let Some(around) = select_all(&document, "div#around").into_iter().next() {
        let stops = select_within(around, "li[data-index]")
            .into_iter()
            .filter(|li| {
                li.value()
                    .attr("data-index")
                    .is_some_and(|index| index.contains("subway"))
            });

        for (index, stop) in stops.enumerate() {
            subways.push(index, parse_subway(stop, community_id));
        }
    }

    DetailPage::Parsed { detail, subways }
}

fn parse_subway(stop: ElementRef<'_>, community_id: &str) -> Result<SubwayCommunity, SkipReason> {
    Ok(SubwayCommunity {
        community_id: community_id.to_string(),
        subway_name: text_of(require(stop, "div.itemInfo", "subway_name")?),
        subway_stop_name: text_of(require(stop, "span.itemTitle", "subway_stop_name")?),
        subway_distance: text_of(require(stop, "span.itemdistance", "subway_distance")?),
    })
}
