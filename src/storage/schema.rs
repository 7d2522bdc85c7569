//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Listing-Sweep
//! database. Every table is keyed by the natural identity of its record so
//! upserts can target the key.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Residential communities, detail columns filled by the detail crawl
CREATE TABLE IF NOT EXISTS community (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    link TEXT NOT NULL,
    district TEXT NOT NULL,
    biz_circle TEXT NOT NULL,
    tag_list TEXT NOT NULL,
    on_sale TEXT NOT NULL,
    on_rent TEXT,
    price TEXT,
    city TEXT NOT NULL,
    region TEXT NOT NULL,
    year TEXT,
    house_type TEXT,
    cost TEXT,
    service TEXT,
    company TEXT,
    building_num TEXT,
    house_num TEXT,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_community_region ON community(region);

-- Homes listed for sale
CREATE TABLE IF NOT EXISTS house_info (
    house_id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    link TEXT NOT NULL,
    community TEXT NOT NULL,
    zone TEXT NOT NULL,
    house_type TEXT NOT NULL,
    square TEXT NOT NULL,
    direction TEXT NOT NULL,
    decoration TEXT NOT NULL,
    floor TEXT NOT NULL,
    years TEXT NOT NULL,
    follow_info TEXT NOT NULL,
    tax_type TEXT NOT NULL,
    total_price TEXT NOT NULL,
    unit_price TEXT NOT NULL,
    region TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_house_info_region ON house_info(region);

-- Asking price of a sale listing per crawl date
CREATE TABLE IF NOT EXISTS historical_price (
    house_id TEXT NOT NULL,
    total_price TEXT NOT NULL,
    date TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (house_id, total_price, date)
);

-- Closed transactions
CREATE TABLE IF NOT EXISTS sell_info (
    house_id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    link TEXT NOT NULL,
    community TEXT NOT NULL,
    house_type TEXT NOT NULL,
    square TEXT NOT NULL,
    direction TEXT NOT NULL,
    decoration TEXT NOT NULL,
    floor TEXT NOT NULL,
    years TEXT NOT NULL,
    total_price TEXT NOT NULL,
    unit_price TEXT NOT NULL,
    deal_date TEXT NOT NULL,
    list_price TEXT NOT NULL,
    turnover TEXT NOT NULL,
    region TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_sell_info_deal_date ON sell_info(deal_date);

-- Rental listings
CREATE TABLE IF NOT EXISTS rent_info (
    house_id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    link TEXT NOT NULL,
    rent_type TEXT NOT NULL,
    region TEXT NOT NULL,
    zone TEXT NOT NULL,
    community TEXT NOT NULL,
    square TEXT NOT NULL,
    direction TEXT NOT NULL,
    house_type TEXT NOT NULL,
    floor TEXT NOT NULL,
    price TEXT NOT NULL,
    decoration TEXT NOT NULL,
    subway TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Subway stops near a community
CREATE TABLE IF NOT EXISTS subway_community (
    community_id TEXT NOT NULL,
    subway_name TEXT NOT NULL,
    subway_stop_name TEXT NOT NULL,
    subway_distance TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (community_id, subway_name, subway_stop_name)
);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::RecordTable;
    use rusqlite::Connection;

    #[test]
    fn test_schema_initializes() {
        let conn = Connection::open_in_memory().unwrap();
        let result = initialize_schema(&conn);
        assert!(result.is_ok());
    }

    #[test]
    fn test_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();

        initialize_schema(&conn).unwrap();
        let result = initialize_schema(&conn);

        assert!(result.is_ok());
    }

    #[test]
    fn test_record_tables_exist_after_init() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();

        for table in RecordTable::ALL {
            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
                    [table.table_name()],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(count, 1, "Table {} should exist", table.table_name());
        }
    }

    #[test]
    fn test_updated_at_defaults() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();

        conn.execute(
            "INSERT INTO historical_price (house_id, total_price, date) VALUES ('1', '500', '2024-03-01')",
            [],
        )
        .unwrap();

        let updated_at: String = conn
            .query_row("SELECT updated_at FROM historical_price", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert!(!updated_at.is_empty());
    }
}
