//! Record types written by the crawler
//!
//! Every record maps to one table and carries its natural identity in
//! `KEY_COLUMNS`. Writes are upserts on that identity: the columns listed in
//! `COLUMNS` replace whatever an earlier crawl stored, columns the record does
//! not carry (such as the community detail fields) are left alone.

use rusqlite::ToSql;

/// A flat record that can be upserted by its natural identity
pub trait Record {
    /// Table the record lives in
    const TABLE: &'static str;

    /// Columns written by an upsert, in the order of [`Record::values`]
    const COLUMNS: &'static [&'static str];

    /// Columns forming the natural identity (a subset of `COLUMNS`)
    const KEY_COLUMNS: &'static [&'static str];

    /// Column values, in the order of `COLUMNS`
    fn values(&self) -> Vec<&dyn ToSql>;
}

/// A residential community from the community index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Community {
    pub id: String,
    pub title: String,
    pub link: String,
    pub district: String,
    pub biz_circle: String,
    pub tag_list: String,
    pub on_sale: String,
    pub on_rent: Option<String>,
    pub price: Option<String>,
    pub city: String,
    pub region: String,
}

impl Record for Community {
    const TABLE: &'static str = "community";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "title",
        "link",
        "district",
        "biz_circle",
        "tag_list",
        "on_sale",
        "on_rent",
        "price",
        "city",
        "region",
    ];
    const KEY_COLUMNS: &'static [&'static str] = &["id"];

    fn values(&self) -> Vec<&dyn ToSql> {
        vec![
            &self.id,
            &self.title,
            &self.link,
            &self.district,
            &self.biz_circle,
            &self.tag_list,
            &self.on_sale,
            &self.on_rent,
            &self.price,
            &self.city,
            &self.region,
        ]
    }
}

/// Detail fields of a community, filled in by the detail crawl
///
/// `None` means the detail page did not show the field; the stored value is
/// kept in that case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommunityDetail {
    pub year: Option<String>,
    pub house_type: Option<String>,
    pub cost: Option<String>,
    pub service: Option<String>,
    pub company: Option<String>,
    pub building_num: Option<String>,
    pub house_num: Option<String>,
}

impl CommunityDetail {
    /// Returns true if the page yielded no detail field at all
    pub fn is_empty(&self) -> bool {
        self.year.is_none()
            && self.house_type.is_none()
            && self.cost.is_none()
            && self.service.is_none()
            && self.company.is_none()
            && self.building_num.is_none()
            && self.house_num.is_none()
    }
}

/// A home currently listed for sale
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HouseInfo {
    pub house_id: String,
    pub title: String,
    pub link: String,
    pub community: String,
    pub zone: String,
    pub house_type: String,
    pub square: String,
    pub direction: String,
    pub decoration: String,
    pub floor: String,
    pub years: String,
    pub follow_info: String,
    pub tax_type: String,
    pub total_price: String,
    pub unit_price: String,
    pub region: String,
}

impl Record for HouseInfo {
    const TABLE: &'static str = "house_info";
    const COLUMNS: &'static [&'static str] = &[
        "house_id",
        "title",
        "link",
        "community",
        "zone",
        "house_type",
        "square",
        "direction",
        "decoration",
        "floor",
        "years",
        "follow_info",
        "tax_type",
        "total_price",
        "unit_price",
        "region",
    ];
    const KEY_COLUMNS: &'static [&'static str] = &["house_id"];

    fn values(&self) -> Vec<&dyn ToSql> {
        vec![
            &self.house_id,
            &self.title,
            &self.link,
            &self.community,
            &self.zone,
            &self.house_type,
            &self.square,
            &self.direction,
            &self.decoration,
            &self.floor,
            &self.years,
            &self.follow_info,
            &self.tax_type,
            &self.total_price,
            &self.unit_price,
            &self.region,
        ]
    }
}

/// The asking price of a sale listing on the day it was seen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoricalPrice {
    pub house_id: String,
    pub total_price: String,
    /// Crawl date, `YYYY-MM-DD`
    pub date: String,
}

impl Record for HistoricalPrice {
    const TABLE: &'static str = "historical_price";
    const COLUMNS: &'static [&'static str] = &["house_id", "total_price", "date"];
    const KEY_COLUMNS: &'static [&'static str] = &["house_id", "total_price", "date"];

    fn values(&self) -> Vec<&dyn ToSql> {
        vec![&self.house_id, &self.total_price, &self.date]
    }
}

/// A closed transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SellInfo {
    pub house_id: String,
    pub title: String,
    pub link: String,
    pub community: String,
    pub house_type: String,
    pub square: String,
    pub direction: String,
    pub decoration: String,
    pub floor: String,
    pub years: String,
    pub total_price: String,
    pub unit_price: String,
    pub deal_date: String,
    pub list_price: String,
    pub turnover: String,
    pub region: String,
}

impl Record for SellInfo {
    const TABLE: &'static str = "sell_info";
    const COLUMNS: &'static [&'static str] = &[
        "house_id",
        "title",
        "link",
        "community",
        "house_type",
        "square",
        "direction",
        "decoration",
        "floor",
        "years",
        "total_price",
        "unit_price",
        "deal_date",
        "list_price",
        "turnover",
        "region",
    ];
    const KEY_COLUMNS: &'static [&'static str] = &["house_id"];

    fn values(&self) -> Vec<&dyn ToSql> {
        vec![
            &self.house_id,
            &self.title,
            &self.link,
            &self.community,
            &self.house_type,
            &self.square,
            &self.direction,
            &self.decoration,
            &self.floor,
            &self.years,
            &self.total_price,
            &self.unit_price,
            &self.deal_date,
            &self.list_price,
            &self.turnover,
            &self.region,
        ]
    }
}

/// A rental listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RentInfo {
    pub house_id: String,
    pub title: String,
    pub link: String,
    pub rent_type: String,
    pub region: String,
    pub zone: String,
    pub community: String,
    pub square: String,
    pub direction: String,
    pub house_type: String,
    pub floor: String,
    pub price: String,
    pub decoration: String,
    pub subway: String,
}

impl Record for RentInfo {
    const TABLE: &'static str = "rent_info";
    const COLUMNS: &'static [&'static str] = &[
        "house_id",
        "title",
        "link",
        "rent_type",
        "region",
        "zone",
        "community",
        "square",
        "direction",
        "house_type",
        "floor",
        "price",
        "decoration",
        "subway",
    ];
    const KEY_COLUMNS: &'static [&'static str] = &["house_id"];

    fn values(&self) -> Vec<&dyn ToSql> {
        vec![
            &self.house_id,
            &self.title,
            &self.link,
            &self.rent_type,
            &self.region,
            &self.zone,
            &self.community,
            &self.square,
            &self.direction,
            &self.house_type,
            &self.floor,
            &self.price,
            &self.decoration,
            &self.subway,
        ]
    }
}

/// A subway stop near a community
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubwayCommunity {
    pub community_id: String,
    /// Subway line
    pub subway_name: String,
    pub subway_stop_name: String,
    pub subway_distance: String,
}

impl Record for SubwayCommunity {
    const TABLE: &'static str = "subway_community";
    const COLUMNS: &'static [&'static str] = &[
        "community_id",
        "subway_name",
        "subway_stop_name",
        "subway_distance",
    ];
    const KEY_COLUMNS: &'static [&'static str] =
        &["community_id", "subway_name", "subway_stop_name"];

    fn values(&self) -> Vec<&dyn ToSql> {
        vec![
            &self.community_id,
            &self.subway_name,
            &self.subway_stop_name,
            &self.subway_distance,
        ]
    }
}

/// Records of one type, written together
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordBatch {
    Communities(Vec<Community>),
    Houses(Vec<HouseInfo>),
    HistoricalPrices(Vec<HistoricalPrice>),
    Sales(Vec<SellInfo>),
    Rentals(Vec<RentInfo>),
    SubwayCommunities(Vec<SubwayCommunity>),
}

impl RecordBatch {
    pub fn len(&self) -> usize {
        match self {
            Self::Communities(r) => r.len(),
            Self::Houses(r) => r.len(),
            Self::HistoricalPrices(r) => r.len(),
            Self::Sales(r) => r.len(),
            Self::Rentals(r) => r.len(),
            Self::SubwayCommunities(r) => r.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn table(&self) -> RecordTable {
        match self {
            Self::Communities(_) => RecordTable::Community,
            Self::Houses(_) => RecordTable::HouseInfo,
            Self::HistoricalPrices(_) => RecordTable::HistoricalPrice,
            Self::Sales(_) => RecordTable::SellInfo,
            Self::Rentals(_) => RecordTable::RentInfo,
            Self::SubwayCommunities(_) => RecordTable::SubwayCommunity,
        }
    }
}

/// The record tables of the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordTable {
    Community,
    HouseInfo,
    HistoricalPrice,
    SellInfo,
    RentInfo,
    SubwayCommunity,
}

impl RecordTable {
    pub const ALL: [RecordTable; 6] = [
        Self::Community,
        Self::HouseInfo,
        Self::HistoricalPrice,
        Self::SellInfo,
        Self::RentInfo,
        Self::SubwayCommunity,
    ];

    pub fn table_name(&self) -> &'static str {
        match self {
            Self::Community => Community::TABLE,
            Self::HouseInfo => HouseInfo::TABLE,
            Self::HistoricalPrice => HistoricalPrice::TABLE,
            Self::SellInfo => SellInfo::TABLE,
            Self::RentInfo => RentInfo::TABLE,
            Self::SubwayCommunity => SubwayCommunity::TABLE,
        }
    }
}
