// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 需要本机可用的 Chrome/Chromium，默认忽略：
//! `cargo test --test integration_tests -- --ignored`

use super::helpers::{result_page, table_row};
use statcrawl::config::settings::Settings;
use statcrawl::domain::models::task_parameters::SortPreference;
use statcrawl::domain::services::crawl_service::{
    CrawlOptions, CrawlRequest, CrawlService, StopReason,
};
use statcrawl::engines::chromium_engine::ChromiumLauncher;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const INDEX: &str = "/trade/valueSearch/index";

async fn serve_portal() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(INDEX))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            result_page(&[table_row("居民消费价格指数", "")], None),
            "text/html; charset=utf-8",
        ))
        .mount(&server)
        .await;

    let first = result_page(
        &[
            table_row(
                "国内生产总值",
                r#"<a class="valueSearch_excel__3GKnk" href="/export/gdp.xls">导出</a>"#,
            ),
            table_row("第一产业增加值", ""),
        ],
        Some(&format!("{}?page=2", INDEX)),
    );
    Mock::given(method("GET"))
        .and(path(INDEX))
        .respond_with(ResponseTemplate::new(200).set_body_raw(first, "text/html; charset=utf-8"))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/export/gdp.xls"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Disposition", "attachment; filename=\"gdp.xls\"")
                .set_body_raw(vec![0u8; 4096], "application/vnd.ms-excel")
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    server
}

fn service() -> CrawlService<ChromiumLauncher> {
    let settings = Settings::defaults_only().unwrap();
    let mut options = CrawlOptions::from_settings(&settings.crawler, &settings.selectors);
    options.page_delay = Duration::from_millis(100);
    CrawlService::new(ChromiumLauncher::new(settings.browser), options)
}

#[tokio::test]
#[ignore]
async fn test_crawls_pages_and_captures_download_links() {
    let server = serve_portal().await;

    let request = CrawlRequest {
        target_url: format!("{}{}?indicateName=GDP", server.uri(), INDEX),
        page_budget: 5,
        capture_downloads: true,
        sort: SortPreference::Similarity,
    };
    let outcome = service().crawl(&request).await.unwrap();

    assert!(matches!(outcome.stop, StopReason::Exhausted), "{:?}", outcome.stop);
    assert_eq!(outcome.pages_crawled, 2);

    let indicators: Vec<_> = outcome.rows.iter().map(|r| r.indicator()).collect();
    assert_eq!(indicators, vec!["国内生产总值", "第一产业增加值", "居民消费价格指数"]);
    assert!(outcome.rows[0].download_url().ends_with("/export/gdp.xls"));
    assert_eq!(outcome.rows[1].download_url(), "");
    assert_eq!(outcome.rows[0].page_no(), "12 导出");
}

#[tokio::test]
#[ignore]
async fn test_missing_table_ends_task_with_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "<html><body><p>无结果</p></body></html>",
            "text/html; charset=utf-8",
        ))
        .mount(&server)
        .await;

    let settings = Settings::defaults_only().unwrap();
    let mut options = CrawlOptions::from_settings(&settings.crawler, &settings.selectors);
    options.row_wait_timeout = Duration::from_secs(2);
    let service = CrawlService::new(ChromiumLauncher::new(settings.browser), options);

    let request = CrawlRequest {
        target_url: format!("{}{}", server.uri(), INDEX),
        page_budget: 5,
        capture_downloads: false,
        sort: SortPreference::Default,
    };
    let outcome = service.crawl(&request).await.unwrap();

    assert!(outcome.rows.is_empty());
    assert!(outcome.error().is_some());
}
