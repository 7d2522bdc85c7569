//! Integration tests for the crawler
//!
//! These tests use wiremock to stand in for the listing portal and run
//! the crawl cycle end-to-end against a temporary database and cache.

use listing_sweep::cache::{FrontierCache, RunKey};
use listing_sweep::config::{Config, CrawlerConfig, OutputConfig, UserAgentConfig};
use listing_sweep::crawler::{
    build_http_client, crawl_details, run_crawl, HttpFetcher, PageFetcher, Partitioner,
};
use listing_sweep::output::load_statistics;
use listing_sweep::storage::{RecordTable, SqliteStorage};
use listing_sweep::{FetchError, ListingEndpoint, ListingKind};
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration against the mock portal
fn create_test_config(base_url: &str, dir: &Path, listings: Vec<ListingKind>) -> Config {
    Config {
        regions: vec!["pudong".to_string()],
        listings,
        crawler: CrawlerConfig {
            base_url: base_url.to_string(),
            city: "sh".to_string(),
            request_delay_ms: 0,
            region_retry_delay_ms: 0,
            max_region_attempts: 2,
            request_timeout_secs: 5,
            page_cap: None,
            detail_workers: 2,
            detail_checkpoint_every: 1,
        },
        user_agent: UserAgentConfig {
            agents: vec!["TestBot/1.0".to_string()],
        },
        output: OutputConfig {
            database_path: dir.join("listings.db").to_string_lossy().into_owned(),
            cache_dir: dir.join("cache"),
        },
    }
}

fn page_widget(total: u32) -> String {
    format!(
        r#"<html><body><div class="page-box house-lst-page-box" page-data='{{"totalPage":{},"curPage":1}}'></div></body></html>"#,
        total
    )
}

fn sale_page(ids: &[&str]) -> String {
    let items: String = ids
        .iter()
        .map(|id| {
            format!(
                r#"<li class="clear">
                    <div class="title"><a href="/ershoufang/{id}.html" data-housecode="{id}">Flat {id}</a></div>
                    <div class="houseInfo">2室1厅 | 89.5平米 | 南 | 精装 | 中楼层(共6层) | 1998年建</div>
                    <div class="positionInfo">Green Court - Beicai</div>
                    <div class="followInfo">12人关注</div>
                    <div class="totalPrice"><span>520</span>万</div>
                    <div class="unitPrice" data-price="58100"></div>
                </li>"#,
                id = id
            )
        })
        .collect();
    format!(r#"<ul class="sellListContent">{}</ul>"#, items)
}

fn community_page(base_url: &str, ids: &[&str]) -> String {
    let items: String = ids
        .iter()
        .map(|id| {
            format!(
                r#"<li class="clear xiaoquListItem" data-housecode="{id}">
                    <div class="title"><a href="{base}/xiaoqu/{id}/">Court {id}</a></div>
                    <div class="positionInfo">
                      <a class="district">浦东</a><a class="bizcircle">北蔡</a>
                    </div>
                    <div class="tagList"><span>近地铁</span></div>
                    <a class="totalSellCount"><span>3</span>套</a>
                </li>"#,
                base = base_url,
                id = id
            )
        })
        .collect();
    format!(
        "<html><body><ul>{}</ul>{}</body></html>",
        items,
        r#"<div class="page-box house-lst-page-box" page-data='{"totalPage":1,"curPage":1}'></div>"#
    )
}

const DETAIL_PAGE: &str = r#"<html><head><title>Court</title></head><body>
    <div class="xiaoquInfoItem"><span class="xiaoquInfoLabel">建筑年代</span><span class="xiaoquInfoContent">2004年建成</span></div>
    <div class="xiaoquInfoItem"><span class="xiaoquInfoLabel">房屋总数</span><span class="xiaoquInfoContent">640户</span></div>
    <div id="around"><ul>
      <li data-index="subway-0">
        <span class="itemTitle">世纪大道</span><span class="itemdistance">320米</span>
        <div class="itemInfo">2号线</div>
      </li>
    </ul></div>
</body></html>"#;

async fn mount_page(server: &MockServer, url_path: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(url_path))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

fn test_fetcher() -> HttpFetcher {
    let config = create_test_config("http://localhost", Path::new("."), vec![]);
    HttpFetcher::new(build_http_client(&config.crawler).unwrap(), Vec::new())
}

#[tokio::test]
async fn test_full_sale_crawl_single_region() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&server, "/ershoufang/pudong/", page_widget(2)).await;
    mount_page(&server, "/ershoufang/pudong/pg1/", sale_page(&["101", "102"])).await;
    mount_page(&server, "/ershoufang/pudong/pg2/", sale_page(&["103"])).await;

    let config = create_test_config(&server.uri(), dir.path(), vec![ListingKind::Sale]);
    let db_path = config.output.database_path.clone();

    let report = run_crawl(config, false).await.expect("crawl runs");

    assert_eq!(report.completed.len(), 1);
    assert!(report.abandoned.is_empty());
    assert_eq!(report.completed[0].pages, 2);
    assert_eq!(report.total_records(), 6);

    let storage = SqliteStorage::new(Path::new(&db_path)).unwrap();
    let stats = load_statistics(&storage).unwrap();
    assert_eq!(stats.count(RecordTable::HouseInfo), 3);
    assert_eq!(stats.count(RecordTable::HistoricalPrice), 3);

    let cache = FrontierCache::new(dir.path().join("cache"));
    let key = RunKey::today("ershoufang", "pudong");
    assert_eq!(cache.load(&key), Some(vec![]));
    assert!(cache.archive_path(&key).exists());
}

#[tokio::test]
async fn test_fresh_recrawl_is_idempotent() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&server, "/ershoufang/pudong/", page_widget(1)).await;
    mount_page(&server, "/ershoufang/pudong/pg1/", sale_page(&["101", "102"])).await;

    let config = create_test_config(&server.uri(), dir.path(), vec![ListingKind::Sale]);
    let db_path = config.output.database_path.clone();

    run_crawl(config.clone(), false).await.unwrap();
    let second = run_crawl(config, true).await.unwrap();
    assert!(!second.completed[0].resumed);

    let storage = SqliteStorage::new(Path::new(&db_path)).unwrap();
    let stats = load_statistics(&storage).unwrap();
    assert_eq!(stats.count(RecordTable::HouseInfo), 2);
    assert_eq!(stats.count(RecordTable::HistoricalPrice), 2);
}

#[tokio::test]
async fn test_same_day_rerun_resumes_finished_frontier() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&server, "/ershoufang/pudong/", page_widget(1)).await;
    mount_page(&server, "/ershoufang/pudong/pg1/", sale_page(&["101"])).await;

    let config = create_test_config(&server.uri(), dir.path(), vec![ListingKind::Sale]);

    run_crawl(config.clone(), false).await.unwrap();
    let requests_after_first = server.received_requests().await.unwrap().len();

    let second = run_crawl(config, false).await.unwrap();
    assert!(second.completed[0].resumed);
    assert_eq!(second.completed[0].pages, 0);
    assert_eq!(
        server.received_requests().await.unwrap().len(),
        requests_after_first
    );
}

#[tokio::test]
async fn test_partitioner_splits_over_cap() {
    let server = MockServer::start().await;

    mount_page(&server, "/ershoufang/pudong/", page_widget(5)).await;
    mount_page(&server, "/ershoufang/pudong/p1/", page_widget(1)).await;
    for band in 2..=7 {
        mount_page(&server, &format!("/ershoufang/pudong/p{}/", band), page_widget(0)).await;
    }

    let endpoint = ListingEndpoint::new(ListingKind::Sale, &server.uri()).with_page_cap(2);
    let fetcher = test_fetcher();
    let enumeration = Partitioner::new(&fetcher, Duration::ZERO)
        .enumerate(&endpoint, "pudong")
        .await
        .unwrap();

    assert_eq!(enumeration.queries, 8);
    assert_eq!(
        enumeration.urls(),
        vec![format!("{}/ershoufang/pudong/pg1p1/", server.uri())]
    );
}

#[tokio::test]
async fn test_community_then_detail_crawl() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(
        &server,
        "/xiaoqu/pudong/",
        community_page(&server.uri(), &["501", "502"]),
    )
    .await;
    mount_page(
        &server,
        "/xiaoqu/pudong/pg1/",
        community_page(&server.uri(), &["501", "502"]),
    )
    .await;
    mount_page(&server, "/xiaoqu/501/", DETAIL_PAGE.to_string()).await;
    mount_page(&server, "/xiaoqu/502/", DETAIL_PAGE.to_string()).await;

    let config = create_test_config(&server.uri(), dir.path(), vec![ListingKind::Community]);
    let db_path = config.output.database_path.clone();

    let report = run_crawl(config.clone(), false).await.unwrap();
    assert_eq!(report.completed[0].records, 2);

    let detail = crawl_details(config, false).await.unwrap();
    assert_eq!(detail.seeded, 2);
    assert_eq!(detail.updated, 2);
    assert_eq!(detail.failed, 0);

    let storage = SqliteStorage::new(Path::new(&db_path)).unwrap();
    let stats = load_statistics(&storage).unwrap();
    assert_eq!(stats.count(RecordTable::Community), 2);
    assert_eq!(stats.count(RecordTable::SubwayCommunity), 2);
}

#[tokio::test]
async fn test_fetcher_sends_user_agent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ok/"))
        .and(header_exists("user-agent"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<p>fine</p>"))
        .mount(&server)
        .await;

    let body = test_fetcher()
        .fetch(&format!("{}/ok/", server.uri()))
        .await
        .unwrap();
    assert_eq!(body, "<p>fine</p>");
}

#[tokio::test]
async fn test_fetcher_maps_http_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let url = format!("{}/missing/", server.uri());
    match test_fetcher().fetch(&url).await {
        Err(FetchError::Status { status, url: failed }) => {
            assert_eq!(status, 404);
            assert_eq!(failed, url);
        }
        other => panic!("unexpected result {:?}", other),
    }
}

#[tokio::test]
async fn test_fetcher_detects_block_page() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/ershoufang/pudong/",
        "<html><head><title>人机认证</title></head><body></body></html>".to_string(),
    )
    .await;

    let result = test_fetcher()
        .fetch(&format!("{}/ershoufang/pudong/", server.uri()))
        .await;
    assert!(matches!(result, Err(FetchError::Blocked { .. })));
}

#[tokio::test]
async fn test_failing_region_is_abandoned() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/ershoufang/pudong/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let config = create_test_config(&server.uri(), dir.path(), vec![ListingKind::Sale]);
    let report = run_crawl(config, false).await.unwrap();

    assert!(report.completed.is_empty());
    assert_eq!(report.abandoned.len(), 1);
    assert_eq!(report.abandoned[0].attempts, 2);
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}
