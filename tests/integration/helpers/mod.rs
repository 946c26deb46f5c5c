// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm::DatabaseConnection;
use statcrawl::config::settings::DatabaseSettings;
use statcrawl::domain::models::indicator_row::{IndicatorRow, RowFields};
use statcrawl::domain::repositories::indicator_repository::IndicatorRepository;
use statcrawl::infrastructure::database::connection;
use statcrawl::infrastructure::repositories::indicator_repo_impl::IndicatorRepositoryImpl;
use std::path::Path;
use std::sync::Arc;

/// 在指定目录下打开（必要时创建）一个 SQLite 文件数据库并完成建表
pub async fn open_repository(dir: &Path) -> (Arc<DatabaseConnection>, IndicatorRepositoryImpl) {
    let settings = DatabaseSettings {
        url: format!("sqlite://{}?mode=rwc", dir.join("results.db").display()),
        max_connections: Some(1),
        min_connections: None,
        connect_timeout: Some(5),
        idle_timeout: None,
    };
    let db = Arc::new(connection::create_pool(&settings).await.unwrap());
    let repo = IndicatorRepositoryImpl::new(db.clone());
    repo.init_schema().await.unwrap();
    (db, repo)
}

pub fn indicator_row(indicator: &str, region: &str, page_no: &str) -> IndicatorRow {
    IndicatorRow::new(RowFields {
        time: "2023".to_string(),
        region: region.to_string(),
        indicator: indicator.to_string(),
        value: "126058.2".to_string(),
        unit: "亿元".to_string(),
        source: "中国统计年鉴".to_string(),
        page_no: page_no.to_string(),
    })
    .unwrap()
}

/// 一行八列的数据表格行，指标名称位于第四列
pub fn table_row(indicator: &str, extra: &str) -> String {
    format!(
        "<tr><td><input type=checkbox></td><td>2023</td><td>全国</td><td>{}</td>\
         <td>1</td><td>亿元</td><td>中国统计年鉴</td><td>12 {}</td></tr>",
        indicator, extra
    )
}

/// 带分页按钮的检索结果页
pub fn result_page(rows: &[String], next_href: Option<&str>) -> String {
    let next = match next_href {
        Some(href) => format!(
            r#"<button class="btn-next" onclick="location.href='{}'">下一页</button>"#,
            href
        ),
        None => r#"<button class="btn-next" disabled>下一页</button>"#.to_string(),
    };
    format!(
        "<html><body><table><thead><tr><th>#</th></tr></thead><tbody>{}\
         <tr class=\"placeholder\"><td></td><td></td><td></td><td></td><td></td><td></td><td></td><td></td></tr>\
         </tbody></table>{}</body></html>",
        rows.join(""),
        next
    )
}
